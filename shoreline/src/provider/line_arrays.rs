use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{DataAccessError, ShorelineError};
use crate::grid::{BinGrid, BinIndex};
use crate::provider::{LineDataProvider, PointDeltas};

/// Whole border or river database in the array layout of the binned files.
///
/// The layout follows [`BinnedArrays`](crate::provider::BinnedArrays), except that segments carry a level and a point
/// count in two separate arrays instead of a packed header, and have no area. Deserializable from a dump with the
/// fields `bin_size_minutes`, `num_segments`, `first_segment`, `segment_start`, `segment_level`, `segment_points`,
/// `dx` and `dy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineArraysDump", into = "LineArraysDump")]
pub struct BinnedLineArrays {
    grid: BinGrid,
    dump: LineArraysDump,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LineArraysDump {
    bin_size_minutes: u32,
    num_segments: Vec<u16>,
    first_segment: Vec<u32>,
    segment_start: Vec<u32>,
    segment_level: Vec<u8>,
    segment_points: Vec<u16>,
    dx: Vec<i16>,
    dy: Vec<i16>,
}

impl TryFrom<LineArraysDump> for BinnedLineArrays {
    type Error = ShorelineError;

    fn try_from(dump: LineArraysDump) -> Result<Self, Self::Error> {
        let grid = BinGrid::new(dump.bin_size_minutes as f64 / 60.0)?;
        let bins = grid.total_bins() as usize;

        DataAccessError::check_len("num_segments", bins, dump.num_segments.len())?;
        DataAccessError::check_len("first_segment", bins, dump.first_segment.len())?;

        let segments = dump.segment_level.len();
        DataAccessError::check_len("segment_start", segments, dump.segment_start.len())?;
        DataAccessError::check_len("segment_points", segments, dump.segment_points.len())?;
        DataAccessError::check_len("dy", dump.dx.len(), dump.dy.len())?;

        Ok(Self { grid, dump })
    }
}

impl From<BinnedLineArrays> for LineArraysDump {
    fn from(arrays: BinnedLineArrays) -> Self {
        arrays.dump
    }
}

impl BinnedLineArrays {
    /// Creates the database from its arrays. See the structure documentation for the layout.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bin_size_minutes: u32,
        num_segments: Vec<u16>,
        first_segment: Vec<u32>,
        segment_start: Vec<u32>,
        segment_level: Vec<u8>,
        segment_points: Vec<u16>,
        dx: Vec<i16>,
        dy: Vec<i16>,
    ) -> Result<Self, ShorelineError> {
        Self::try_from(LineArraysDump {
            bin_size_minutes,
            num_segments,
            first_segment,
            segment_start,
            segment_level,
            segment_points,
            dx,
            dy,
        })
    }

    fn bin_slot(&self, bin: BinIndex) -> Result<usize, DataAccessError> {
        let slot = bin.0 as usize;
        if slot < self.dump.num_segments.len() {
            Ok(slot)
        } else {
            Err(DataAccessError::NotFound(bin))
        }
    }

    fn segment_range(&self, bin: BinIndex) -> Result<Range<usize>, DataAccessError> {
        let slot = self.bin_slot(bin)?;
        let first = self.dump.first_segment[slot] as usize;
        let range = first..first + self.dump.num_segments[slot] as usize;
        let total = self.dump.segment_level.len();
        if range.end > total {
            return Err(DataAccessError::Truncated {
                what: "segment_level",
                expected: range.end,
                actual: total,
            });
        }

        Ok(range)
    }
}

impl LineDataProvider for BinnedLineArrays {
    fn grid(&self) -> &BinGrid {
        &self.grid
    }

    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
        Ok(self.dump.num_segments[self.bin_slot(bin)?] as u32)
    }

    fn read_segment_levels(&self, bin: BinIndex) -> Result<Vec<u8>, DataAccessError> {
        let range = self.segment_range(bin)?;
        Ok(self.dump.segment_level[range].to_vec())
    }

    fn read_segment_point_counts(&self, bin: BinIndex) -> Result<Vec<u32>, DataAccessError> {
        let range = self.segment_range(bin)?;
        Ok(self.dump.segment_points[range]
            .iter()
            .map(|&count| count as u32)
            .collect())
    }

    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
        let range = self.segment_range(bin)?;
        if range.is_empty() {
            return Ok(PointDeltas::default());
        }

        let point_count: usize = self.dump.segment_points[range.clone()]
            .iter()
            .map(|&count| count as usize)
            .sum();
        let start = self.dump.segment_start[range.start] as usize;
        let end = start + point_count;
        if end > self.dump.dx.len() {
            return Err(DataAccessError::Truncated {
                what: "dx",
                expected: end,
                actual: self.dump.dx.len(),
            });
        }

        Ok(PointDeltas {
            dx: self.dump.dx[start..end].to_vec(),
            dy: self.dump.dy[start..end].to_vec(),
        })
    }
}
