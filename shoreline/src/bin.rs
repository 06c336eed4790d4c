//! A [`Bin`] is one cell of the shoreline grid together with the segments clipped to it.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::impls::Contour;

use crate::assembler;
use crate::error::{DataAccessError, ShorelineError};
use crate::grid::{BinFrame, BinIndex};
use crate::overrides::SegmentOverrides;
use crate::polygon::ShorePolygon;
use crate::provider::BinDataProvider;
use crate::segment::{unpack_corner_levels, Level, Segment};

/// Corner of a bin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// South-west corner.
    SouthWest = 0,
    /// South-east corner.
    SouthEast = 1,
    /// North-east corner.
    NorthEast = 2,
    /// North-west corner.
    NorthWest = 3,
}

impl Corner {
    /// All corners in counter-clockwise order starting from the south-west one.
    pub const ALL: [Corner; 4] = [
        Corner::SouthWest,
        Corner::SouthEast,
        Corner::NorthEast,
        Corner::NorthWest,
    ];
}

/// Smallest area of the parent polygon of a segment for the segment to be read, in km².
///
/// `-1` is accepted as a marker for a disabled filter, mirroring the database tools.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MinArea(Option<f64>);

impl MinArea {
    /// Filter that keeps all segments.
    pub const DISABLED: MinArea = MinArea(None);

    /// Smallest area, or `None` if the filter is disabled.
    pub fn km2(&self) -> Option<f64> {
        self.0
    }

    /// Whether a segment with the given parent polygon area passes the filter.
    pub fn accepts(&self, area: f64) -> bool {
        match self.0 {
            Some(min) => area >= min,
            None => true,
        }
    }
}

impl TryFrom<f64> for MinArea {
    type Error = ShorelineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == -1.0 {
            Ok(Self::DISABLED)
        } else if value.is_finite() && value >= 0.0 {
            // Normalizes -0.0 so that equal values hash equally.
            Ok(Self(Some(value + 0.0)))
        } else {
            Err(ShorelineError::InvalidConfig(format!(
                "minimum area must be a non-negative number of km² or -1, got {value}"
            )))
        }
    }
}

impl From<MinArea> for f64 {
    fn from(value: MinArea) -> Self {
        value.0.unwrap_or(-1.0)
    }
}

impl Eq for MinArea {}

impl Hash for MinArea {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.map(f64::to_bits).hash(state);
    }
}

/// Bin of a shoreline database with its segments.
#[derive(Debug, Clone)]
pub struct Bin {
    index: BinIndex,
    frame: BinFrame,
    corner_levels: [Level; 4],
    min_level: Level,
    segments: Vec<Segment>,
}

impl Bin {
    /// Reads the bin from the provider, keeping only segments accepted by `min_area`.
    pub fn new(
        index: BinIndex,
        provider: &(impl BinDataProvider + ?Sized),
        min_area: MinArea,
    ) -> Result<Self, ShorelineError> {
        Self::with_overrides(index, provider, min_area, &SegmentOverrides::default())
    }

    /// Reads the bin from the provider applying the segment corrections from `overrides`.
    pub fn with_overrides(
        index: BinIndex,
        provider: &(impl BinDataProvider + ?Sized),
        min_area: MinArea,
        overrides: &SegmentOverrides,
    ) -> Result<Self, ShorelineError> {
        let frame = provider.grid().frame(index)?;
        let corner_levels = unpack_corner_levels(provider.corner_level_bits(index)?);
        let min_level = corner_levels.iter().copied().min().unwrap_or(Level::OCEAN);

        let mut bin = Self {
            index,
            frame,
            corner_levels,
            min_level,
            segments: vec![],
        };

        let count = provider.segment_count(index)? as usize;
        if count == 0 {
            return Ok(bin);
        }

        let headers = provider.read_segment_headers(index)?;
        let areas = provider.read_segment_areas(index)?;
        let deltas = provider.read_point_deltas(index)?;

        DataAccessError::check_len("segment headers", count, headers.len())?;
        DataAccessError::check_len("segment areas", count, areas.len())?;
        let total_points = headers.iter().map(|h| h.point_count as usize).sum();
        DataAccessError::check_len("dx", total_points, deltas.dx.len())?;
        DataAccessError::check_len("dy", total_points, deltas.dy.len())?;

        let mut start = 0;
        for (ordinal, (header, area)) in headers.iter().zip(areas).enumerate() {
            let end = start + header.point_count as usize;
            let range = start..end;
            start = end;

            if !min_area.accepts(area) {
                continue;
            }

            let segment = Segment::new(
                Level(header.level),
                header.entry_side,
                header.exit_side,
                area,
                deltas.dx[range.clone()].to_vec(),
                deltas.dy[range].to_vec(),
            );
            bin.segments.push(overrides.apply(index, ordinal, segment));
        }

        Ok(bin)
    }

    /// Index of the bin.
    pub fn index(&self) -> BinIndex {
        self.index
    }

    /// Geometry of the bin.
    pub fn frame(&self) -> &BinFrame {
        &self.frame
    }

    /// Level of the given corner.
    pub fn corner_level(&self, corner: Corner) -> Level {
        self.corner_levels[corner as usize]
    }

    /// Lowest level of the four corners.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Location of the given corner.
    pub fn corner(&self, corner: Corner) -> GeoPoint2d {
        let size = self.frame.size;
        match corner {
            Corner::SouthWest => self.frame.corner,
            Corner::SouthEast => self.frame.corner.offset(0.0, size),
            Corner::NorthEast => self.frame.corner.offset(size, size),
            Corner::NorthWest => self.frame.corner.offset(size, 0.0),
        }
    }

    /// Segments that passed the area filter, in storage order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every segment as an open line of geographic points.
    pub fn line_features(&self) -> Vec<Contour<GeoPoint2d>> {
        self.segments
            .iter()
            .map(|segment| segment.to_line_feature(&self.frame))
            .collect()
    }

    /// Joins the segments into closed land and water polygons, in rendering order. Land polygons wind
    /// counter-clockwise and water polygons clockwise.
    pub fn assemble_polygons(&self) -> Result<Vec<ShorePolygon>, ShorelineError> {
        assembler::assemble(self)
    }
}
