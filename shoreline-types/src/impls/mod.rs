//! Implementations of geometry traits.

mod contour;

pub use contour::{ClosedContour, Contour};
