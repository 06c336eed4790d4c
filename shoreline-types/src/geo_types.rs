//! Conversions into [`geo_types`] geometries, with longitude as `x` and latitude as `y`.

use geo_types::{Coord, LineString, Polygon};

use crate::geo::{GeoPoint, GeoPoint2d};
use crate::impls::{ClosedContour, Contour};

impl From<GeoPoint2d> for Coord<f64> {
    fn from(value: GeoPoint2d) -> Self {
        Coord {
            x: value.lon(),
            y: value.lat(),
        }
    }
}

impl From<Contour<GeoPoint2d>> for LineString<f64> {
    fn from(value: Contour<GeoPoint2d>) -> Self {
        let is_closed = crate::contour::Contour::is_closed(&value);
        let mut coords: Vec<Coord<f64>> = value.iter().map(|p| Coord::from(*p)).collect();
        if is_closed {
            if let Some(first) = coords.first().copied() {
                coords.push(first);
            }
        }

        LineString::new(coords)
    }
}

impl From<ClosedContour<GeoPoint2d>> for Polygon<f64> {
    fn from(value: ClosedContour<GeoPoint2d>) -> Self {
        let exterior: LineString<f64> = Contour::from(value).into();
        Polygon::new(exterior, vec![])
    }
}
