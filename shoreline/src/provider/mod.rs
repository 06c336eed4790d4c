//! Data providers supply the raw records of shoreline bins.

mod arrays;
mod line_arrays;
mod memory;

pub use arrays::BinnedArrays;
pub use line_arrays::BinnedLineArrays;
pub use memory::{BinRecord, MemoryProvider, SegmentRecord};

use serde::{Deserialize, Serialize};

use crate::error::DataAccessError;
use crate::grid::{BinGrid, BinIndex};
use crate::segment::SegmentHeader;

/// Point offsets of all segments of a bin, concatenated in segment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointDeltas {
    /// Longitude offsets from the south-west corner of the bin.
    pub dx: Vec<i16>,
    /// Latitude offsets from the south-west corner of the bin.
    pub dy: Vec<i16>,
}

impl PointDeltas {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.dx.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.dx.is_empty()
    }
}

/// Source of bin records of one shoreline database.
///
/// Implementations do not interpret the records. Any failure is reported as [`DataAccessError`] and makes the whole
/// bin unavailable.
pub trait BinDataProvider {
    /// Binning parameters of the database.
    fn grid(&self) -> &BinGrid;

    /// Packed levels of the four bin corners. See [`unpack_corner_levels`](crate::segment::unpack_corner_levels).
    fn corner_level_bits(&self, bin: BinIndex) -> Result<u16, DataAccessError>;

    /// Number of segments stored for the bin.
    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError>;

    /// Segment headers in storage order.
    fn read_segment_headers(&self, bin: BinIndex) -> Result<Vec<SegmentHeader>, DataAccessError>;

    /// Areas of the parent polygons of the segments, in km², in storage order.
    fn read_segment_areas(&self, bin: BinIndex) -> Result<Vec<f64>, DataAccessError>;

    /// Point offsets of all segments of the bin.
    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError>;

    /// Hint that the given bins are about to be read. Providers backed by slow storage may use it to fetch the bins
    /// in one request.
    fn prepare_bins(&self, _bins: &[BinIndex]) -> Result<(), DataAccessError> {
        Ok(())
    }
}

impl<T: BinDataProvider + ?Sized> BinDataProvider for &T {
    fn grid(&self) -> &BinGrid {
        (**self).grid()
    }

    fn corner_level_bits(&self, bin: BinIndex) -> Result<u16, DataAccessError> {
        (**self).corner_level_bits(bin)
    }

    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
        (**self).segment_count(bin)
    }

    fn read_segment_headers(&self, bin: BinIndex) -> Result<Vec<SegmentHeader>, DataAccessError> {
        (**self).read_segment_headers(bin)
    }

    fn read_segment_areas(&self, bin: BinIndex) -> Result<Vec<f64>, DataAccessError> {
        (**self).read_segment_areas(bin)
    }

    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
        (**self).read_point_deltas(bin)
    }

    fn prepare_bins(&self, bins: &[BinIndex]) -> Result<(), DataAccessError> {
        (**self).prepare_bins(bins)
    }
}

/// Source of bin records of a line database (political borders or rivers).
///
/// Line databases use the same binning as the shoreline ones, but their segments are plain polylines with a level and
/// no perimeter information.
pub trait LineDataProvider {
    /// Binning parameters of the database.
    fn grid(&self) -> &BinGrid;

    /// Number of segments stored for the bin.
    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError>;

    /// Levels of the segments in storage order. Their meaning depends on the database.
    fn read_segment_levels(&self, bin: BinIndex) -> Result<Vec<u8>, DataAccessError>;

    /// Number of points of every segment in storage order.
    fn read_segment_point_counts(&self, bin: BinIndex) -> Result<Vec<u32>, DataAccessError>;

    /// Point offsets of all segments of the bin.
    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError>;

    /// Hint that the given bins are about to be read.
    fn prepare_bins(&self, _bins: &[BinIndex]) -> Result<(), DataAccessError> {
        Ok(())
    }
}

impl<T: LineDataProvider + ?Sized> LineDataProvider for &T {
    fn grid(&self) -> &BinGrid {
        (**self).grid()
    }

    fn segment_count(&self, bin: BinIndex) -> Result<u32, DataAccessError> {
        (**self).segment_count(bin)
    }

    fn read_segment_levels(&self, bin: BinIndex) -> Result<Vec<u8>, DataAccessError> {
        (**self).read_segment_levels(bin)
    }

    fn read_segment_point_counts(&self, bin: BinIndex) -> Result<Vec<u32>, DataAccessError> {
        (**self).read_segment_point_counts(bin)
    }

    fn read_point_deltas(&self, bin: BinIndex) -> Result<PointDeltas, DataAccessError> {
        (**self).read_point_deltas(bin)
    }

    fn prepare_bins(&self, bins: &[BinIndex]) -> Result<(), DataAccessError> {
        (**self).prepare_bins(bins)
    }
}
