//! Positions on the perimeter of a bin, encoded as totally ordered [`PerimeterKey`]s.
//!
//! A key is `(side << 16) | offset`. Sides are numbered counter-clockwise starting with the southern one, and on the
//! northern and western sides the offset is stored inverted (`65535 - offset`). Taken together, increasing keys walk
//! the perimeter counter-clockwise starting at the south-west corner: the south side eastward, the east side
//! northward, the north side westward and the west side southward.

use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;

use crate::grid::{BinFrame, MAX_OFFSET};

/// Side code marking a segment that never touches the bin boundary.
pub const CLOSED_SIDE: u8 = 4;

const LAST_KEY: u32 = (3 << 16) | MAX_OFFSET as u32;

/// Side of a bin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Southern side, offsets grow eastward.
    South = 0,
    /// Eastern side, offsets grow northward.
    East = 1,
    /// Northern side, offsets grow eastward.
    North = 2,
    /// Western side, offsets grow northward.
    West = 3,
}

impl Side {
    /// All sides in counter-clockwise order.
    pub const ALL: [Side; 4] = [Side::South, Side::East, Side::North, Side::West];

    /// Side with the given code, or `None` for the closed marker and invalid codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::South),
            1 => Some(Self::East),
            2 => Some(Self::North),
            3 => Some(Self::West),
            _ => None,
        }
    }

    /// Numeric code of the side.
    pub fn code(self) -> u8 {
        self as u8
    }

    fn is_inverted(self) -> bool {
        matches!(self, Side::North | Side::West)
    }
}

/// Position on the bin perimeter. See module documentation for the encoding.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PerimeterKey(u32);

impl Debug for PerimeterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PerimeterKey({:?}, {})", self.side(), self.0 & 0xffff)
    }
}

impl PerimeterKey {
    /// Key with the given side and offset in walk order, without any inversion.
    pub fn new(side: Side, stored_offset: u16) -> Self {
        Self(((side.code() as u32) << 16) | stored_offset as u32)
    }

    /// Key of the corner where the walk along the side begins: SW for south, SE for east, NE for north and NW for
    /// west.
    pub fn corner(side: Side) -> Self {
        Self::new(side, 0)
    }

    /// Encodes a position on a side, where `offset` is measured from the south-west origin of the bin (the `dx` value
    /// for horizontal sides, the `dy` value for vertical ones).
    pub fn encode(side: Side, offset: u16) -> Self {
        if side.is_inverted() {
            Self::new(side, MAX_OFFSET - offset)
        } else {
            Self::new(side, offset)
        }
    }

    /// Inverse of [`PerimeterKey::encode`].
    pub fn decode(self) -> (Side, u16) {
        let side = self.side();
        let stored = (self.0 & 0xffff) as u16;
        if side.is_inverted() {
            (side, MAX_OFFSET - stored)
        } else {
            (side, stored)
        }
    }

    /// Raw key value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Side the key lies on.
    pub fn side(self) -> Side {
        match self.0 >> 16 {
            0 => Side::South,
            1 => Side::East,
            2 => Side::North,
            _ => Side::West,
        }
    }

    /// Next key in the counter-clockwise walk, or in the clockwise one if `reverse` is set. The walk is circular: the
    /// key after the last one on the west side is the south-west corner, and vice versa.
    pub fn successor(self, reverse: bool) -> Self {
        match (reverse, self.0) {
            (false, LAST_KEY) => Self(0),
            (false, value) => Self(value + 1),
            (true, 0) => Self(LAST_KEY),
            (true, value) => Self(value - 1),
        }
    }

    /// Offsets of the key position from the south-west corner of the bin, in bin units.
    pub fn to_offsets(self) -> (u16, u16) {
        let (side, offset) = self.decode();
        match side {
            Side::South => (offset, 0),
            Side::East => (MAX_OFFSET, offset),
            Side::North => (offset, MAX_OFFSET),
            Side::West => (0, offset),
        }
    }

    /// Geographic location of the key on the perimeter of the bin described by `frame`.
    pub fn to_location(self, frame: &BinFrame) -> GeoPoint2d {
        let (dx, dy) = self.to_offsets();
        frame.location(dx, dy)
    }

    pub(crate) fn from_point(side: Side, dx: u16, dy: u16) -> Self {
        match side {
            Side::South | Side::North => Self::encode(side, dx),
            Side::East | Side::West => Self::encode(side, dy),
        }
    }
}
