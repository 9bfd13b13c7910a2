//! Rectangle annotation.

use super::{AnnotationId, Style};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle annotation.
///
/// Width and height stay signed while a drag is in progress; they are only
/// normalized when computing bounds, so the origin always records the
/// pointer-down corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: AnnotationId,
    /// Pointer-down corner.
    pub origin: Point,
    /// Signed width.
    pub width: f64,
    /// Signed height.
    pub height: f64,
    /// Style properties.
    pub style: Style,
}

impl Rectangle {
    /// Create a degenerate rectangle anchored at a point.
    pub fn new(origin: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width: 0.0,
            height: 0.0,
            style: Style::default(),
        }
    }

    /// The rectangle with non-negative width/height.
    pub fn normalized(&self) -> Rect {
        let x1 = self.origin.x + self.width;
        let y1 = self.origin.y + self.height;
        Rect::new(
            self.origin.x.min(x1),
            self.origin.y.min(y1),
            self.origin.x.max(x1),
            self.origin.y.max(y1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_degenerate() {
        let rect = Rectangle::new(Point::new(10.0, 20.0));
        assert!((rect.width).abs() < f64::EPSILON);
        assert!((rect.height).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalized_flips_negative_extent() {
        let mut rect = Rectangle::new(Point::new(100.0, 100.0));
        rect.width = -40.0;
        rect.height = -30.0;

        let r = rect.normalized();
        assert!((r.x0 - 60.0).abs() < f64::EPSILON);
        assert!((r.y0 - 70.0).abs() < f64::EPSILON);
        assert!((r.x1 - 100.0).abs() < f64::EPSILON);
        assert!((r.y1 - 100.0).abs() < f64::EPSILON);
    }
}
