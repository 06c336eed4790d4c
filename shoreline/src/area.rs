//! [`EarthArea`] is a coarse description of a region of the globe as a set of one-degree grid squares.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shoreline_types::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};
use shoreline_types::GeoRect;

const LAT_MIN: i32 = -90;
const LAT_MAX: i32 = 89;
const LON_MIN: i32 = -180;
const LON_MAX: i32 = 179;

/// One-degree grid square identified by the latitude and longitude of its south-west corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridSquare {
    lat: i32,
    lon: i32,
}

impl GridSquare {
    /// Creates a grid square. Returns `None` if the corner is outside `[-90, 89]` x `[-180, 179]`.
    pub fn new(lat: i32, lon: i32) -> Option<Self> {
        if (LAT_MIN..=LAT_MAX).contains(&lat) && (LON_MIN..=LON_MAX).contains(&lon) {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// The square containing the location. Longitudes are wrapped into `[-180, 180)` and the north pole belongs to
    /// the northernmost row.
    pub fn containing(location: &impl GeoPoint<Num = f64>) -> Option<Self> {
        let lat = location.lat();
        if !lat.is_finite() || !location.lon().is_finite() {
            return None;
        }

        let lat = (lat.floor() as i32).min(LAT_MAX);
        let lon = (location.lon() + 180.0).rem_euclid(360.0).floor() as i32 - 180;
        Self::new(lat, lon.min(LON_MAX))
    }

    /// Latitude of the south-west corner.
    pub fn lat(&self) -> i32 {
        self.lat
    }

    /// Longitude of the south-west corner.
    pub fn lon(&self) -> i32 {
        self.lon
    }

    /// Centre of the square.
    pub fn center(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(self.lat as f64 + 0.5, self.lon as f64 + 0.5)
    }
}

/// Set of one-degree grid squares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarthArea {
    squares: BTreeSet<GridSquare>,
}

impl EarthArea {
    /// Creates an empty area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an area covering the whole globe.
    pub fn global() -> Self {
        let mut area = Self::new();
        area.add_all();
        area
    }

    /// Creates an area containing every square that intersects the rectangle.
    pub fn from_rect(rect: &GeoRect) -> Self {
        let mut area = Self::new();
        let lat_from = (rect.lat_min.floor() as i32).clamp(LAT_MIN, LAT_MAX);
        let lat_to = ((rect.lat_max.ceil() as i32) - 1).clamp(lat_from, LAT_MAX);

        let lon_from = rect.lon_min.floor() as i32;
        let lon_count = ((rect.lon_min + rect.width()).ceil() as i32 - lon_from).clamp(1, 360);

        for lat in lat_from..=lat_to {
            for step in 0..lon_count {
                let lon = (lon_from + step + 180).rem_euclid(360) - 180;
                area.squares.insert(GridSquare { lat, lon });
            }
        }

        area
    }

    /// Whether the area has no squares.
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Number of squares in the area.
    pub fn len(&self) -> usize {
        self.squares.len()
    }

    /// Adds the square containing the location.
    pub fn add(&mut self, location: &impl GeoPoint<Num = f64>) {
        if let Some(square) = GridSquare::containing(location) {
            self.squares.insert(square);
        }
    }

    /// Adds a square.
    pub fn add_square(&mut self, square: GridSquare) {
        self.squares.insert(square);
    }

    /// Adds every square of the globe.
    pub fn add_all(&mut self) {
        for lat in LAT_MIN..=LAT_MAX {
            for lon in LON_MIN..=LON_MAX {
                self.squares.insert(GridSquare { lat, lon });
            }
        }
    }

    /// Removes the square containing the location.
    pub fn remove(&mut self, location: &impl GeoPoint<Num = f64>) {
        if let Some(square) = GridSquare::containing(location) {
            self.squares.remove(&square);
        }
    }

    /// Whether the square containing the location belongs to the area.
    pub fn contains(&self, location: &impl GeoPoint<Num = f64>) -> bool {
        GridSquare::containing(location).is_some_and(|square| self.squares.contains(&square))
    }

    /// Whether the square belongs to the area.
    pub fn contains_square(&self, square: &GridSquare) -> bool {
        self.squares.contains(square)
    }

    /// Squares present both in this area and in the other.
    pub fn intersection(&self, other: &EarthArea) -> EarthArea {
        EarthArea {
            squares: self.squares.intersection(&other.squares).copied().collect(),
        }
    }

    /// Grows the area by one square in every direction, diagonals included. Longitude wraps around the
    /// antimeridian, latitude stops at the poles.
    pub fn expand(&mut self) {
        let mut expanded = self.squares.clone();
        for square in &self.squares {
            for d_lat in -1..=1 {
                let lat = square.lat + d_lat;
                if !(LAT_MIN..=LAT_MAX).contains(&lat) {
                    continue;
                }

                for d_lon in -1..=1 {
                    let lon = (square.lon + d_lon + 180).rem_euclid(360) - 180;
                    expanded.insert(GridSquare { lat, lon });
                }
            }
        }

        self.squares = expanded;
    }

    /// Iterates over the squares from south to north, and west to east within a row.
    pub fn iter(&self) -> impl Iterator<Item = &GridSquare> {
        self.squares.iter()
    }
}

impl<'a> IntoIterator for &'a EarthArea {
    type Item = &'a GridSquare;
    type IntoIter = std::collections::btree_set::Iter<'a, GridSquare>;

    fn into_iter(self) -> Self::IntoIter {
        self.squares.iter()
    }
}
