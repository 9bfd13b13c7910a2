//! Circle annotation.

use super::{AnnotationId, Style};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle annotation, defined by center and radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: AnnotationId,
    /// Center (the pointer-down point while drawing).
    pub center: Point,
    /// Radius, never below [`Circle::MIN_RADIUS`].
    pub radius: f64,
    /// Style properties.
    pub style: Style,
}

impl Circle {
    /// Smallest representable radius.
    pub const MIN_RADIUS: f64 = 1.0;

    /// Create a minimum-radius circle at a point.
    pub fn new(center: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius: Self::MIN_RADIUS,
            style: Style::default(),
        }
    }

    /// Set the radius, clamped to the minimum.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(Self::MIN_RADIUS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_clamped_to_minimum() {
        let mut circle = Circle::new(Point::new(50.0, 50.0));
        circle.set_radius(0.2);
        assert!((circle.radius - Circle::MIN_RADIUS).abs() < f64::EPSILON);

        circle.set_radius(30.0);
        assert!((circle.radius - 30.0).abs() < f64::EPSILON);
    }
}
