//! Point types.

use serde::{Deserialize, Serialize};

/// A 2D position in tracked units (video pixels unless rescaled).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Mean of a set of points, `None` when empty.
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Point2D> {
        let (sum_x, sum_y, count) = points
            .into_iter()
            .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
        (count > 0).then(|| Point2D::new(sum_x / count as f64, sum_y / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid() {
        let points = [Point2D::new(0.0, 0.0), Point2D::new(2.0, 4.0)];
        assert_eq!(Point2D::centroid(&points), Some(Point2D::new(1.0, 2.0)));
        assert_eq!(Point2D::centroid(&[] as &[Point2D]), None);
    }
}
