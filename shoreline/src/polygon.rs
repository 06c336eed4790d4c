use serde::{Deserialize, Serialize};
use shoreline_types::geo::GeoPoint2d;
use shoreline_types::impls::ClosedContour;
use shoreline_types::Winding;

/// Closed land or water polygon produced by the assembler.
///
/// Land polygons wind counter-clockwise and water polygons clockwise. The contour never contains two consecutive equal
/// points, and its first point is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShorePolygon {
    /// Ring of the polygon.
    pub contour: ClosedContour<GeoPoint2d>,
    /// Winding of the ring.
    pub winding: Winding,
}

impl ShorePolygon {
    /// Creates a polygon from ring points, dropping repeated points.
    pub fn new(points: Vec<GeoPoint2d>, winding: Winding) -> Self {
        Self {
            contour: ClosedContour::deduplicated(points),
            winding,
        }
    }

    /// Empty clockwise polygon used to delimit the polygons of consecutive bins in a selection.
    pub fn separator() -> Self {
        Self {
            contour: ClosedContour::new(vec![]),
            winding: Winding::Clockwise,
        }
    }

    /// Whether this is a bin separator.
    pub fn is_separator(&self) -> bool {
        self.contour.is_empty()
    }

    /// Whether the polygon encloses land.
    pub fn is_land(&self) -> bool {
        self.winding == Winding::CounterClockwise
    }

    /// Points of the ring.
    pub fn points(&self) -> &[GeoPoint2d] {
        self.contour.points()
    }
}

#[cfg(feature = "geo-types")]
impl From<ShorePolygon> for geo_types::Polygon<f64> {
    fn from(value: ShorePolygon) -> Self {
        value.contour.into()
    }
}
