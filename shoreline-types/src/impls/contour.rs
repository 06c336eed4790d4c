use serde::{Deserialize, Serialize};

/// Simple [`crate::Contour`] implementation.
#[derive(Debug, Default, Clone, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Contour<Point> {
    points: Vec<Point>,
    is_closed: bool,
}

impl<Point> std::ops::Deref for Contour<Point> {
    type Target = Vec<Point>;

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl<Point> Contour<Point> {
    /// Creates a new open contour.
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            is_closed: false,
        }
    }
}

/// Closed contour implementation.
///
/// The first point is never repeated at the end of `points`.
#[derive(Debug, Clone, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct ClosedContour<Point> {
    /// Points of the contour.
    pub points: Vec<Point>,
}

impl<Point> ClosedContour<Point> {
    /// Creates a new closed contour.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Points of the contour.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points in the contour.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<Point: PartialEq> ClosedContour<Point> {
    /// Creates a closed contour dropping every point equal to its predecessor, including a last point equal to the
    /// first one.
    pub fn deduplicated(points: Vec<Point>) -> Self {
        let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
        for point in points {
            if deduped.last() != Some(&point) {
                deduped.push(point);
            }
        }

        while deduped.len() > 1 && deduped.first() == deduped.last() {
            deduped.pop();
        }

        Self { points: deduped }
    }
}

impl<P> From<ClosedContour<P>> for Contour<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            points: value.points,
            is_closed: true,
        }
    }
}

impl<P> crate::contour::ClosedContour for ClosedContour<P> {
    type Point = P;

    fn iter_points(&self) -> impl Iterator<Item = &'_ P> {
        self.points.iter()
    }
}

impl<P> crate::contour::Contour for Contour<P> {
    type Point = P;

    fn is_closed(&self) -> bool {
        self.is_closed
    }

    fn iter_points(&self) -> impl Iterator<Item = &P> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicated_drops_repeats_and_closing_point() {
        let contour = ClosedContour::deduplicated(vec![1, 1, 2, 3, 3, 3, 4, 1, 1]);
        assert_eq!(contour.points(), &[1, 2, 3, 4]);
    }

    #[test]
    fn deduplicated_keeps_single_point() {
        let contour = ClosedContour::deduplicated(vec![7, 7, 7]);
        assert_eq!(contour.points(), &[7]);
    }

    #[test]
    fn closed_contour_becomes_closed_line() {
        let contour: Contour<i32> = ClosedContour::new(vec![1, 2, 3]).into();
        assert!(crate::contour::Contour::is_closed(&contour));
        assert_eq!(*contour, vec![1, 2, 3]);
        assert!(!crate::contour::Contour::is_closed(&Contour::open(vec![1, 2])));
    }
}
