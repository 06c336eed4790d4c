use crate::contour::ClosedContour;
use crate::geo::GeoPoint;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Direction in which the points of a closed contour are traversed.
///
/// Shoreline rings use counter-clockwise winding for land and clockwise winding for water, so that both even-odd and
/// non-zero fill rules give the same picture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Winding {
    /// Clockwise, negative signed area.
    Clockwise,
    /// Counterclockwise, positive signed area.
    CounterClockwise,
}

/// Area and orientation of closed contours of geographic points.
///
/// The computations are planar in the latitude/longitude plane, with longitude as `x` and latitude as `y`.
pub trait GeoClosedContour {
    /// Point type of the contour.
    type Point: GeoPoint;

    /// Signed area of the contour in square degrees (shoelace formula). Positive for counter-clockwise contours.
    fn area_signed(&self) -> <Self::Point as GeoPoint>::Num
    where
        Self: Sized;

    /// Winding direction of the contour. Degenerate contours with zero area are reported as clockwise.
    fn winding(&self) -> Winding
    where
        Self: Sized;
}

impl<P, T> GeoClosedContour for T
where
    P: GeoPoint,
    T: ClosedContour<Point = P>,
{
    type Point = P;

    fn area_signed(&self) -> P::Num
    where
        Self: Sized,
    {
        let mut prev;
        let mut iter = crate::contour::Contour::iter_points_closing(self);
        if let Some(p) = iter.next() {
            prev = p;
        } else {
            return P::Num::zero();
        }

        let mut aggr = P::Num::zero();

        for p in iter {
            aggr = aggr + prev.lon() * p.lat() - p.lon() * prev.lat();
            prev = p;
        }

        aggr / (P::Num::one() + P::Num::one())
    }

    fn winding(&self) -> Winding
    where
        Self: Sized,
    {
        if self.area_signed() <= P::Num::zero() {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint2d, NewGeoPoint};
    use crate::impls::ClosedContour;
    use approx::assert_abs_diff_eq;

    #[test]
    fn area() {
        let contour = ClosedContour::new(vec![
            GeoPoint2d::lonlat(0.0, 0.0),
            GeoPoint2d::lonlat(0.0, 1.0),
            GeoPoint2d::lonlat(1.0, 0.0),
        ]);
        assert_abs_diff_eq!(contour.area_signed(), -0.5);
        assert_eq!(contour.winding(), Winding::Clockwise);

        let contour = ClosedContour::new(vec![
            GeoPoint2d::lonlat(0.0, 0.0),
            GeoPoint2d::lonlat(1.0, 0.0),
            GeoPoint2d::lonlat(0.0, 1.0),
        ]);
        assert_abs_diff_eq!(contour.area_signed(), 0.5);
        assert_eq!(contour.winding(), Winding::CounterClockwise);
    }

    #[test]
    fn area_of_offset_square() {
        let contour = ClosedContour::new(vec![
            GeoPoint2d::lonlat(10.0, 40.0),
            GeoPoint2d::lonlat(12.0, 40.0),
            GeoPoint2d::lonlat(12.0, 42.0),
            GeoPoint2d::lonlat(10.0, 42.0),
        ]);
        assert_abs_diff_eq!(contour.area_signed(), 4.0, epsilon = 1e-9);
    }
}
