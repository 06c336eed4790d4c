//! Shoreline segments: pieces of GSHHS polygons cut at bin boundaries.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::impls::Contour;
use shoreline_types::Winding;

use crate::grid::BinFrame;
use crate::perimeter::{PerimeterKey, Side, CLOSED_SIDE};

/// Depth of a shoreline polygon in the land/water hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Level(pub u8);

impl Level {
    /// Open ocean. Only used for bin corners.
    pub const OCEAN: Level = Level(0);
    /// Land.
    pub const LAND: Level = Level(1);
    /// Lake on land.
    pub const LAKE: Level = Level(2);
    /// Island in a lake.
    pub const ISLAND_IN_LAKE: Level = Level(3);
    /// Pond on an island in a lake.
    pub const POND_IN_ISLAND: Level = Level(4);

    /// Whether polygons of this level enclose land.
    pub fn is_land(self) -> bool {
        self == Self::LAND || self == Self::ISLAND_IN_LAKE
    }

    /// Whether polygons of this level enclose water.
    pub fn is_water(self) -> bool {
        self == Self::LAKE || self == Self::POND_IN_ISLAND
    }

    /// Whether the value is a valid segment level.
    pub fn is_segment_level(self) -> bool {
        self.is_land() || self.is_water()
    }

    /// Winding of rings enclosing polygons of this level: counter-clockwise for land, clockwise otherwise.
    pub fn winding(self) -> Winding {
        if self.is_land() {
            Winding::CounterClockwise
        } else {
            Winding::Clockwise
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Header of one segment record.
///
/// In the database the header is packed into one integer as `points << 9 | level << 6 | entry << 3 | exit`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentHeader {
    /// Number of points in the segment.
    pub point_count: u32,
    /// Raw level value.
    pub level: u8,
    /// Raw side code where the segment enters the bin.
    pub entry_side: u8,
    /// Raw side code where the segment leaves the bin.
    pub exit_side: u8,
}

impl SegmentHeader {
    /// Unpacks a header from its database representation.
    pub fn unpack(packed: u32) -> Self {
        Self {
            point_count: packed >> 9,
            level: ((packed >> 6) & 0x7) as u8,
            entry_side: ((packed >> 3) & 0x7) as u8,
            exit_side: (packed & 0x7) as u8,
        }
    }

    /// Packs the header into its database representation.
    pub fn pack(&self) -> u32 {
        (self.point_count << 9)
            | ((self.level as u32 & 0x7) << 6)
            | ((self.entry_side as u32 & 0x7) << 3)
            | (self.exit_side as u32 & 0x7)
    }
}

/// Unpacks the four 3-bit corner levels of a bin in SW, SE, NE, NW order.
pub fn unpack_corner_levels(bits: u16) -> [Level; 4] {
    [
        Level(((bits >> 9) & 0x7) as u8),
        Level(((bits >> 6) & 0x7) as u8),
        Level(((bits >> 3) & 0x7) as u8),
        Level((bits & 0x7) as u8),
    ]
}

/// Packs four corner levels in SW, SE, NE, NW order.
pub fn pack_corner_levels(levels: [Level; 4]) -> u16 {
    levels
        .iter()
        .fold(0, |bits, level| (bits << 3) | (level.0 & 0x7) as u16)
}

/// One shoreline fragment confined to a bin.
///
/// Points are stored as 16-bit offsets from the south-west corner of the bin. Offsets are unsigned: the raw `i16`
/// values read from the database are reinterpreted as `u16`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    level: Level,
    entry_side: u8,
    exit_side: u8,
    area: f64,
    dx: Vec<i16>,
    dy: Vec<i16>,
    entry_key: Option<PerimeterKey>,
    exit_key: Option<PerimeterKey>,
}

impl Segment {
    /// Creates a segment. Perimeter keys are computed from the first and last points for sides that are not closed.
    pub fn new(
        level: Level,
        entry_side: u8,
        exit_side: u8,
        area: f64,
        dx: Vec<i16>,
        dy: Vec<i16>,
    ) -> Self {
        let entry_key = perimeter_key(entry_side, dx.first(), dy.first());
        let exit_key = perimeter_key(exit_side, dx.last(), dy.last());

        Self {
            level,
            entry_side,
            exit_side,
            area,
            dx,
            dy,
            entry_key,
            exit_key,
        }
    }

    /// Level of the segment.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Raw side code where the segment enters the bin.
    pub fn entry_side(&self) -> u8 {
        self.entry_side
    }

    /// Raw side code where the segment leaves the bin.
    pub fn exit_side(&self) -> u8 {
        self.exit_side
    }

    /// Area of the parent polygon in km².
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Raw longitude offsets.
    pub fn dx(&self) -> &[i16] {
        &self.dx
    }

    /// Raw latitude offsets.
    pub fn dy(&self) -> &[i16] {
        &self.dy
    }

    /// Number of points in the segment.
    pub fn len(&self) -> usize {
        self.dx.len()
    }

    /// Whether the segment has no points.
    pub fn is_empty(&self) -> bool {
        self.dx.is_empty()
    }

    /// Perimeter key of the first point, if the segment enters through a side.
    pub fn entry_key(&self) -> Option<PerimeterKey> {
        self.entry_key
    }

    /// Perimeter key of the last point, if the segment leaves through a side.
    pub fn exit_key(&self) -> Option<PerimeterKey> {
        self.exit_key
    }

    /// Whether the segment is a complete ring inside the bin.
    pub fn is_closed(&self) -> bool {
        self.entry_side == CLOSED_SIDE
    }

    /// Whether the segment bounds land.
    pub fn is_land_level(&self) -> bool {
        self.level.is_land()
    }

    /// Whether the segment bounds water.
    pub fn is_water_level(&self) -> bool {
        self.level.is_water()
    }

    /// Absolute locations of the segment points in the given bin, skipping points identical to their predecessor.
    pub fn locations(&self, frame: &BinFrame) -> Vec<GeoPoint2d> {
        offset_locations(frame, &self.dx, &self.dy)
    }

    /// The segment as an open line in the given bin.
    pub fn to_line_feature(&self, frame: &BinFrame) -> Contour<GeoPoint2d> {
        Contour::open(self.locations(frame))
    }

    pub(crate) fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Reverses the order of the points, swapping the entry and exit ends.
    pub(crate) fn reversed(self, level: Level) -> Self {
        let mut dx = self.dx;
        let mut dy = self.dy;
        dx.reverse();
        dy.reverse();
        Self::new(level, self.exit_side, self.entry_side, self.area, dx, dy)
    }
}

/// Converts raw point offsets into locations in the bin, skipping points identical to their predecessor.
pub(crate) fn offset_locations(frame: &BinFrame, dx: &[i16], dy: &[i16]) -> Vec<GeoPoint2d> {
    let mut prev = None;
    dx.iter()
        .zip(dy)
        .map(|(&dx, &dy)| (dx as u16, dy as u16))
        .filter(|offsets| prev.replace(*offsets) != Some(*offsets))
        .map(|(dx, dy)| frame.location(dx, dy))
        .collect()
}

fn perimeter_key(side: u8, dx: Option<&i16>, dy: Option<&i16>) -> Option<PerimeterKey> {
    let side = Side::from_code(side)?;
    Some(PerimeterKey::from_point(side, *dx? as u16, *dy? as u16))
}
