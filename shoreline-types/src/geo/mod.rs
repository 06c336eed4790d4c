//! Points in geographic coordinates (latitude and longitude), see [`GeoPoint`].

mod point;

pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
