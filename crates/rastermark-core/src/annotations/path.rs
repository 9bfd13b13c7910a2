//! Freehand path annotation.

use super::{AnnotationId, Style};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand path (ordered point sequence).
///
/// Always holds at least one point; it is only rendered once a second point
/// arrives, but a single-point path persists like any other degenerate shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStroke {
    pub(crate) id: AnnotationId,
    /// Points in draw order.
    pub points: Vec<Point>,
    /// Style properties.
    pub style: Style,
}

impl PathStroke {
    /// Create a path with its first point.
    pub fn new(start: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            style: Style::default(),
        }
    }

    /// Append a point.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_one_point() {
        let path = PathStroke::new(Point::new(1.0, 2.0));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_push_point() {
        let mut path = PathStroke::new(Point::ZERO);
        path.push_point(Point::new(10.0, 10.0));
        assert_eq!(path.len(), 2);
    }
}
