use serde::{Deserialize, Serialize};

/// A pair of coordinates in either world space (Y-up) or screen space
/// (Y-down); which one is contextual, not tagged on the type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Snaps both coordinates to 2 decimal digits. Dragged points go through
    /// this so repeated inverse transforms do not accumulate float noise.
    pub fn round_to_hundredths(self) -> Self {
        Self {
            x: (self.x * 100.0).round() / 100.0,
            y: (self.y * 100.0).round() / 100.0,
        }
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if point.is_finite() {
        Some(point)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_hundredths() {
        let point = Point::new(1.23456, -0.005).round_to_hundredths();
        assert_eq!(point, Point::new(1.23, -0.01));
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Point::new(0.0, 0.0).lerp(Point::new(2.0, 4.0), 0.5);
        assert_eq!(mid, Point::new(1.0, 2.0));
    }

    #[test]
    fn normalize_rejects_non_finite() {
        assert!(normalize_point(Point::new(f64::NAN, 0.0)).is_none());
        assert!(normalize_point(Point::new(0.0, f64::INFINITY)).is_none());
        assert!(normalize_point(Point::new(1.0, 2.0)).is_some());
    }
}
