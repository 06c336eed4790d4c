use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{DataAccessError, ShorelineError};
use crate::grid::{BinGrid, BinIndex};
use crate::provider::{BinDataProvider, PointDeltas};
use crate::segment::SegmentHeader;

/// Whole shoreline database in the array layout of the binned GSHHS files.
///
/// Bin arrays have one value per bin, segment arrays one value per segment, and the point arrays hold the points of
/// all segments of all bins back to back. Segments of a bin are stored contiguously starting at `first_segment`, and
/// the points of a bin start at the first point of its first segment.
///
/// The structure can be deserialized from a dump of the database variables:
///
/// ```json
/// {
///   "bin_size_minutes": 60,
///   "bin_info": [...],
///   "num_segments": [...],
///   "first_segment": [...],
///   "segment_start": [...],
///   "segment_info": [...],
///   "segment_area": [...],
///   "dx": [...],
///   "dy": [...]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArraysDump", into = "ArraysDump")]
pub struct BinnedArrays {
    grid: BinGrid,
    dump: ArraysDump,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ArraysDump {
    bin_size_minutes: u32,
    bin_info: Vec<u16>,
    num_segments: Vec<u16>,
    first_segment: Vec<u32>,
    segment_start: Vec<u32>,
    segment_info: Vec<u32>,
    segment_area: Vec<i32>,
    dx: Vec<i16>,
    dy: Vec<i16>,
}

impl TryFrom<ArraysDump> for BinnedArrays {
    type Error = ShorelineError;

    fn try_from(dump: ArraysDump) -> Result<Self, Self::Error> {
        let grid = BinGrid::new(dump.bin_size_minutes as f64 / 60.0)?;
        let bins = grid.total_bins() as usize;

        DataAccessError::check_len("bin_info", bins, dump.bin_info.len())?;
        DataAccessError::check_len("num_segments", bins, dump.num_segments.len())?;
        DataAccessError::check_len("first_segment", bins, dump.first_segment.len())?;

        let segments = dump.segment_info.len();
        DataAccessError::check_len("segment_start", segments, dump.segment_start.len())?;
        DataAccessError::check_len("segment_area", segments, dump.segment_area.len())?;
        DataAccessError::check_len("dy", dump.dx.len(), dump.dy.len())?;

        Ok(Self { grid, dump })
    }
}

impl From<BinnedArrays> for ArraysDump {
    fn from(arrays: BinnedArrays) -> Self {
        arrays.dump
    }
}

impl BinnedArrays {
    /// Creates the database from its arrays. See the structure documentation for the layout.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bin_size_minutes: u32,
        bin_info: Vec<u16>,
        num_segments: Vec<u16>,
        first_segment: Vec<u32>,
        segment_start: Vec<u32>,
        segment_info: Vec<u32>,
        segment_area: Vec<i32>,
        dx: Vec<i16>,
        dy: Vec<i16>,
    ) -> Result<Self, ShorelineError> {
        Self::try_from(ArraysDump {
            bin_size_minutes,
            bin_info,
            num_segments,
            first_segment,
            segment_start,
            segment_info,
            segment_area,
            dx,
            dy,
        })
    }

    /// Total number of segments in the database.
    pub fn total_segments(&self) -> usize {
        self.dump.segment_info.len()
    }

    /// Total number of points in the database.
    pub fn total_points(&self) -> usize {
        self.dump.dx.len()
    }

    fn bin_slot(&self, bin: BinIndex) -> Result<usize, DataAccessError> {
        let slot = bin.0 as usize;
        if slot < self.dump.bin_info.len() {
            Ok(slot)
        } else {
            Err(DataAccessError::NotFound(bin))
        }
    }

    fn segment_range(&self, bin: BinIndex) -> Result<Range<usize>, DataAccessError> {
        let slot = self.bin_slot(bin)?;
        let first = self.dump.first_segment[slot] as usize;
        let range = first..first + self.dump.num_segments[slot] as usize;
        if range.end > self.total_segments() {
            return Err(DataAccessError::Truncated {
                what: "segment_info",
                expected: range.end,
                actual: self.total_segments(),
            });
        }

        Ok(range)
    }
}

impl BinDataProvider for BinnedArrays {
    fn grid(&self) -> &BinGrid {
        &self.grid
    }

    fn corner_level_bits(&self, bin: BinIndex) -> Result<u16, DataAccessError> {
        Ok(self.dump.bin_info[self.bin_slot(bin)?])
    }

    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
        Ok(self.dump.num_segments[self.bin_slot(bin)?] as u32)
    }

    fn read_segment_headers(&self, bin: BinIndex) -> Result<Vec<SegmentHeader>, DataAccessError> {
        let range = self.segment_range(bin)?;
        Ok(self.dump.segment_info[range]
            .iter()
            .map(|&packed| SegmentHeader::unpack(packed))
            .collect())
    }

    fn read_segment_areas(&self, bin: BinIndex) -> Result<Vec<f64>, DataAccessError> {
        let range = self.segment_range(bin)?;
        Ok(self.dump.segment_area[range]
            .iter()
            .map(|&area| area as f64 / 10.0)
            .collect())
    }

    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
        let range = self.segment_range(bin)?;
        if range.is_empty() {
            return Ok(PointDeltas::default());
        }

        let point_count: usize = self.dump.segment_info[range.clone()]
            .iter()
            .map(|&packed| SegmentHeader::unpack(packed).point_count as usize)
            .sum();
        let start = self.dump.segment_start[range.start] as usize;
        let end = start + point_count;
        if end > self.total_points() {
            return Err(DataAccessError::Truncated {
                what: "dx",
                expected: end,
                actual: self.total_points(),
            });
        }

        Ok(PointDeltas {
            dx: self.dump.dx[start..end].to_vec(),
            dy: self.dump.dy[start..end].to_vec(),
        })
    }
}
