use serde::{Deserialize, Serialize};

/// Rectangle in geographic coordinates, in degrees.
///
/// `lon_min` may be greater than `lon_max`, in which case the rectangle crosses the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    /// Southern edge latitude.
    pub lat_min: f64,
    /// Western edge longitude.
    pub lon_min: f64,
    /// Northern edge latitude.
    pub lat_max: f64,
    /// Eastern edge longitude.
    pub lon_max: f64,
}

impl GeoRect {
    /// Creates a new rectangle.
    pub fn new(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lon_min,
            lat_max,
            lon_max,
        }
    }

    /// Whether the rectangle crosses the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.lon_min > self.lon_max
    }

    /// Width of the rectangle in degrees of longitude, accounting for antimeridian crossing.
    pub fn width(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.lon_max + 360.0 - self.lon_min
        } else {
            self.lon_max - self.lon_min
        }
    }
}
