//! Corrections for segments that are known to be recorded wrongly in a database.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::grid::BinIndex;
use crate::segment::{Level, Segment};

/// Correction of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOverride {
    /// Bin containing the segment.
    pub bin: BinIndex,
    /// Position of the segment in the bin storage order, counting segments removed by the area filter.
    pub ordinal: usize,
    /// Level the segment is recorded with. If the data says otherwise, the override is not applied.
    pub expected_level: Level,
    /// Level to use instead.
    pub corrected_level: Level,
    /// Whether the point order must be reversed.
    pub reverse: bool,
}

/// Table of segment corrections applied while bins are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentOverrides {
    overrides: Vec<SegmentOverride>,
}

impl SegmentOverrides {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Corrections for the high resolution GSHHS database. It has one island in a lake (bin 7380 of the 2 degree
    /// grid, south-west corner at 6N 0E) recorded as a lake, with its points in lake winding order.
    pub fn high_resolution_defects() -> Self {
        Self {
            overrides: vec![SegmentOverride {
                bin: BinIndex(7380),
                ordinal: 11,
                expected_level: Level::LAKE,
                corrected_level: Level::ISLAND_IN_LAKE,
                reverse: true,
            }],
        }
    }

    /// Adds a correction to the table.
    pub fn push(&mut self, item: SegmentOverride) {
        self.overrides.push(item);
    }

    /// Whether the table has no corrections.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Iterates over the corrections.
    pub fn iter(&self) -> impl Iterator<Item = &SegmentOverride> {
        self.overrides.iter()
    }

    /// Applies the matching correction, if any, to the segment at `ordinal` in `bin`.
    pub fn apply(&self, bin: BinIndex, ordinal: usize, segment: Segment) -> Segment {
        let Some(item) = self.overrides.iter().find(|item| {
            item.bin == bin && item.ordinal == ordinal && item.expected_level == segment.level()
        }) else {
            return segment;
        };

        trace!(
            "Correcting segment {ordinal} of bin {bin}: level {} -> {}",
            segment.level(),
            item.corrected_level
        );

        if item.reverse {
            segment.reversed(item.corrected_level)
        } else {
            segment.with_level(item.corrected_level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perimeter::Side;

    fn lake() -> Segment {
        Segment::new(
            Level::LAKE,
            Side::West.code(),
            Side::West.code(),
            11.8,
            vec![0, 100, 0],
            vec![10, 20, 30],
        )
    }

    #[test]
    fn corrects_known_defect() {
        let overrides = SegmentOverrides::high_resolution_defects();
        let segment = overrides.apply(BinIndex(7380), 11, lake());
        assert_eq!(segment.level(), Level::ISLAND_IN_LAKE);
        assert_eq!(segment.dy(), &[30, 20, 10]);
        assert_eq!(segment.entry_key(), lake().exit_key());
    }

    #[test]
    fn leaves_other_segments() {
        let overrides = SegmentOverrides::high_resolution_defects();
        assert_eq!(overrides.apply(BinIndex(7380), 10, lake()), lake());
        assert_eq!(overrides.apply(BinIndex(7381), 11, lake()), lake());
    }

    #[test]
    fn skips_already_corrected_data() {
        let overrides = SegmentOverrides::high_resolution_defects();
        let fixed = lake().reversed(Level::ISLAND_IN_LAKE);
        assert_eq!(overrides.apply(BinIndex(7380), 11, fixed.clone()), fixed);
    }

    #[test]
    fn level_only_override() {
        let mut overrides = SegmentOverrides::new();
        overrides.push(SegmentOverride {
            bin: BinIndex(1),
            ordinal: 0,
            expected_level: Level::LAKE,
            corrected_level: Level::POND_IN_ISLAND,
            reverse: false,
        });
        let segment = overrides.apply(BinIndex(1), 0, lake());
        assert_eq!(segment.level(), Level::POND_IN_ISLAND);
        assert_eq!(segment.dy(), lake().dy());
    }

    #[test]
    fn serialization() {
        let overrides = SegmentOverrides::high_resolution_defects();
        let json = serde_json::to_string(&overrides).unwrap();
        let parsed: SegmentOverrides = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, overrides);
        assert!(SegmentOverrides::default().is_empty());
    }
}
