//! Builders of synthetic bins for unit tests.

use shoreline_types::GeoClosedContour;

use crate::bin::{Bin, MinArea};
use crate::grid::{BinGrid, BinIndex};
use crate::perimeter::{Side, CLOSED_SIDE};
use crate::polygon::ShorePolygon;
use crate::provider::{BinRecord, MemoryProvider, SegmentRecord};
use crate::segment::Level;

/// Bin of the 1 degree grid with the south-west corner at 9N 10E.
pub(crate) const TEST_BIN: BinIndex = BinIndex(360 * 80 + 10);

pub(crate) fn open_segment(
    level: Level,
    entry: Side,
    exit: Side,
    points: &[(u16, u16)],
) -> SegmentRecord {
    record(level, entry.code(), exit.code(), points)
}

pub(crate) fn closed_segment(level: Level, points: &[(u16, u16)]) -> SegmentRecord {
    record(level, CLOSED_SIDE, CLOSED_SIDE, points)
}

pub(crate) fn record(
    level: Level,
    entry_side: u8,
    exit_side: u8,
    points: &[(u16, u16)],
) -> SegmentRecord {
    SegmentRecord {
        level: level.0,
        entry_side,
        exit_side,
        area: 100.0,
        dx: points.iter().map(|&(dx, _)| dx as i16).collect(),
        dy: points.iter().map(|&(_, dy)| dy as i16).collect(),
    }
}

pub(crate) fn provider(corners: [Level; 4], segments: Vec<SegmentRecord>) -> MemoryProvider {
    let mut record = BinRecord::with_corners(corners);
    record.segments = segments;

    let mut provider = MemoryProvider::new(BinGrid::default());
    provider.insert(TEST_BIN, record).expect("valid record");
    provider
}

pub(crate) fn bin(corners: [Level; 4], segments: Vec<SegmentRecord>) -> Bin {
    Bin::new(TEST_BIN, &provider(corners, segments), MinArea::DISABLED).expect("valid bin")
}

/// Checks the invariants every assembled polygon must hold.
pub(crate) fn assert_well_formed(polygon: &ShorePolygon) {
    let points = polygon.points();
    assert!(points.len() >= 3, "degenerate polygon: {points:?}");
    for pair in points.windows(2) {
        assert_ne!(pair[0], pair[1], "repeated point in {points:?}");
    }
    assert_ne!(points.first(), points.last(), "closing point repeated");
    assert_eq!(polygon.contour.winding(), polygon.winding);
}
