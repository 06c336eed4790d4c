use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Point on the surface of the Earth, given by latitude and longitude in degrees.
pub trait GeoPoint {
    /// Numeric type used to represent coordinates.
    type Num: Float;

    /// Latitude in degrees.
    fn lat(&self) -> Self::Num;
    /// Longitude in degrees.
    fn lon(&self) -> Self::Num;
}

/// Geo point that can be constructed from coordinates.
pub trait NewGeoPoint<N = f64>: GeoPoint<Num = N> + Sized {
    /// Creates a point from latitude and longitude.
    fn latlon(lat: N, lon: N) -> Self;

    /// Creates a point from longitude and latitude.
    fn lonlat(lon: N, lat: N) -> Self {
        Self::latlon(lat, lon)
    }
}

/// 2d point on the surface of the Earth.
///
/// Equality is exact: two points are the same only if both coordinates are bit-for-bit equal. Shoreline assembly
/// relies on this to drop repeated vertices, which is sound because all the points of one bin are derived from the same
/// integer offsets with the same arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint<f64> for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl GeoPoint2d {
    /// Returns a point moved by the given number of degrees along each axis.
    pub fn offset(&self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            lat: self.lat + d_lat,
            lon: self.lon + d_lon,
        }
    }
}

/// Creates a new GeoPoint2d from latitude and longitude values (in degrees).
///
/// ```
/// use shoreline_types::geo::GeoPoint;
/// use shoreline_types::latlon;
///
/// let point = latlon!(38.0, 52.0);
/// assert_eq!(point.lat(), 38.0);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <::shoreline_types::geo::GeoPoint2d as ::shoreline_types::geo::NewGeoPoint<f64>>::latlon(
            $lat, $lon,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_both_axes() {
        let point = GeoPoint2d::latlon(10.0, 20.0).offset(1.5, -2.0);
        assert_eq!(point.lat(), 11.5);
        assert_eq!(point.lon(), 18.0);
    }

    #[test]
    fn serializes_as_lat_lon() {
        let point = GeoPoint2d::lonlat(3.0, 4.0);
        let json = serde_json::to_string(&point).expect("serialization failed");
        assert_eq!(json, r#"{"lat":4.0,"lon":3.0}"#);
    }
}
