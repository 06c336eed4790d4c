//! Geometry types used by the `shoreline` crate.
//!
//! Everything here is expressed in geographic coordinates: points are latitude/longitude pairs in degrees, and
//! orientation computations treat longitude as the `x` axis and latitude as the `y` axis. That is the frame the binned
//! shoreline database is stored in, so no projection is involved.

pub mod contour;
pub use contour::*;

pub mod geo;
pub mod impls;

mod rect;
pub use rect::GeoRect;

mod winding;
pub use winding::{GeoClosedContour, Winding};

#[cfg(feature = "geo-types")]
mod geo_types;
