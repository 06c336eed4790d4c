use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::error::DataAccessError;
use crate::grid::{BinGrid, BinIndex};
use crate::provider::{BinDataProvider, PointDeltas};
use crate::segment::{pack_corner_levels, Level, SegmentHeader};

/// Segment of a [`BinRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Raw level value.
    pub level: u8,
    /// Raw entry side code.
    pub entry_side: u8,
    /// Raw exit side code.
    pub exit_side: u8,
    /// Area of the parent polygon in km².
    pub area: f64,
    /// Longitude offsets.
    pub dx: Vec<i16>,
    /// Latitude offsets.
    pub dy: Vec<i16>,
}

impl SegmentRecord {
    fn header(&self) -> SegmentHeader {
        SegmentHeader {
            point_count: self.dx.len() as u32,
            level: self.level,
            entry_side: self.entry_side,
            exit_side: self.exit_side,
        }
    }
}

/// All records of one bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    /// Packed corner levels.
    pub corner_levels: u16,
    /// Segments in storage order.
    pub segments: Vec<SegmentRecord>,
}

impl BinRecord {
    /// Creates a record without segments from corner levels in SW, SE, NE, NW order.
    pub fn with_corners(levels: [Level; 4]) -> Self {
        Self {
            corner_levels: pack_corner_levels(levels),
            segments: vec![],
        }
    }

    /// Adds a segment to the record.
    pub fn push(&mut self, segment: SegmentRecord) -> &mut Self {
        self.segments.push(segment);
        self
    }
}

/// Provider holding bin records in memory.
///
/// Bins without a record are considered to be open ocean: all corners at level 0 and no segments.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    grid: BinGrid,
    bins: HashMap<BinIndex, BinRecord, RandomState>,
}

impl MemoryProvider {
    /// Creates an empty provider for the grid.
    pub fn new(grid: BinGrid) -> Self {
        Self {
            grid,
            bins: HashMap::default(),
        }
    }

    /// Stores the record for the bin, replacing the previous one.
    pub fn insert(&mut self, bin: BinIndex, record: BinRecord) -> Result<(), DataAccessError> {
        if bin.0 >= self.grid.total_bins() {
            return Err(DataAccessError::NotFound(bin));
        }

        for segment in &record.segments {
            if segment.dx.len() != segment.dy.len() {
                return Err(DataAccessError::Truncated {
                    what: "dy",
                    expected: segment.dx.len(),
                    actual: segment.dy.len(),
                });
            }
        }

        self.bins.insert(bin, record);
        Ok(())
    }

    /// Record of the bin, if one was stored.
    pub fn get(&self, bin: BinIndex) -> Option<&BinRecord> {
        self.bins.get(&bin)
    }

    fn segments(&self, bin: BinIndex) -> Result<&[SegmentRecord], DataAccessError> {
        self.check(bin)?;
        Ok(self
            .bins
            .get(&bin)
            .map(|record| &record.segments[..])
            .unwrap_or_default())
    }

    fn check(&self, bin: BinIndex) -> Result<(), DataAccessError> {
        if bin.0 < self.grid.total_bins() {
            Ok(())
        } else {
            Err(DataAccessError::NotFound(bin))
        }
    }
}

impl BinDataProvider for MemoryProvider {
    fn grid(&self) -> &BinGrid {
        &self.grid
    }

    fn corner_level_bits(&self, bin: BinIndex) -> Result<u16, DataAccessError> {
        self.check(bin)?;
        Ok(self
            .bins
            .get(&bin)
            .map(|record| record.corner_levels)
            .unwrap_or_default())
    }

    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
        Ok(self.segments(bin)?.len() as u32)
    }

    fn read_segment_headers(&self, bin: BinIndex) -> Result<Vec<SegmentHeader>, DataAccessError> {
        Ok(self.segments(bin)?.iter().map(SegmentRecord::header).collect())
    }

    fn read_segment_areas(&self, bin: BinIndex) -> Result<Vec<f64>, DataAccessError> {
        Ok(self.segments(bin)?.iter().map(|s| s.area).collect())
    }

    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
        let mut deltas = PointDeltas::default();
        for segment in self.segments(bin)? {
            deltas.dx.extend_from_slice(&segment.dx);
            deltas.dy.extend_from_slice(&segment.dy);
        }

        Ok(deltas)
    }
}
