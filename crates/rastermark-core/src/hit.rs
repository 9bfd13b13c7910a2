//! Bounding boxes and point/rect hit-testing.

use crate::annotations::{Annotation, AnnotationId, FontSpec};
use crate::store::AnnotationStore;
use kurbo::{Point, Rect};

/// Seam to a live drawing surface that can measure text.
///
/// Text bounds need real font metrics; everything else is pure geometry.
/// When no surface exists, text annotations simply have no bounds and are
/// excluded from hit-testing and marquee selection until one does.
pub trait TextMeasurer {
    /// Measure rendered text, returning (width, height) in view pixels.
    fn measure(&self, content: &str, font: &FontSpec) -> (f64, f64);
}

/// Compute the axis-aligned bounding box of an annotation.
///
/// Returns None only for text when no measurer is available.
pub fn bounds(annotation: &Annotation, measurer: Option<&dyn TextMeasurer>) -> Option<Rect> {
    match annotation {
        Annotation::Rectangle(r) => Some(r.normalized()),
        Annotation::Arrow(a) => Some(Rect::from_points(a.start, a.end)),
        Annotation::Circle(c) => Some(Rect::new(
            c.center.x - c.radius,
            c.center.y - c.radius,
            c.center.x + c.radius,
            c.center.y + c.radius,
        )),
        Annotation::Path(p) => {
            let first = *p.points.first()?;
            let mut rect = Rect::from_points(first, first);
            for pt in &p.points[1..] {
                rect = rect.union_pt(*pt);
            }
            Some(rect)
        }
        Annotation::Text(t) => {
            let (width, height) = measurer?.measure(&t.content, &t.font);
            // Anchor is the baseline; the box extends upward from it.
            Some(Rect::new(
                t.anchor.x,
                t.anchor.y - height,
                t.anchor.x + width,
                t.anchor.y,
            ))
        }
    }
}

/// Find the top-most annotation whose bounding box contains a point.
///
/// Scans in reverse insertion order so later annotations win.
pub fn hit_test(
    store: &AnnotationStore,
    point: Point,
    measurer: Option<&dyn TextMeasurer>,
) -> Option<AnnotationId> {
    store
        .iter_ordered_rev()
        .find(|a| bounds(a, measurer).is_some_and(|b| contains_point(b, point)))
        .map(|a| a.id())
}

/// All annotations whose bounding box lies fully within `rect`,
/// inclusive of edge-touching boxes.
pub fn contained_by(
    store: &AnnotationStore,
    rect: Rect,
    measurer: Option<&dyn TextMeasurer>,
) -> Vec<AnnotationId> {
    store
        .iter_ordered()
        .filter(|a| bounds(a, measurer).is_some_and(|b| contains_rect(rect, b)))
        .map(|a| a.id())
        .collect()
}

// Closed-interval containment; kurbo's Rect::contains is half-open and would
// miss points and boxes touching the far edges.
fn contains_point(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Arrow, Circle, PathStroke, Rectangle, Text};

    /// Fixed-advance measurer standing in for a live surface.
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, content: &str, font: &FontSpec) -> (f64, f64) {
            (content.chars().count() as f64 * font.size * 0.5, font.size)
        }
    }

    fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Annotation {
        let mut r = Rectangle::new(Point::new(x, y));
        r.width = w;
        r.height = h;
        Annotation::Rectangle(r)
    }

    #[test]
    fn test_topmost_wins_on_overlap() {
        let mut store = AnnotationStore::new();
        let _a = store.add(rect_at(0.0, 0.0, 100.0, 100.0));
        let b = store.add(rect_at(50.0, 50.0, 100.0, 100.0));

        // Point in the overlap of both: the later insertion wins.
        assert_eq!(hit_test(&store, Point::new(75.0, 75.0), None), Some(b));
    }

    #[test]
    fn test_hit_includes_edges() {
        let mut store = AnnotationStore::new();
        let id = store.add(rect_at(10.0, 10.0, 20.0, 20.0));
        assert_eq!(hit_test(&store, Point::new(30.0, 30.0), None), Some(id));
        assert_eq!(hit_test(&store, Point::new(10.0, 10.0), None), Some(id));
        assert_eq!(hit_test(&store, Point::new(30.1, 30.0), None), None);
    }

    #[test]
    fn test_contained_by_includes_edge_touching() {
        let mut store = AnnotationStore::new();
        let touching = store.add(rect_at(0.0, 0.0, 50.0, 50.0));
        let outside = store.add(rect_at(49.0, 49.0, 10.0, 10.0));

        let hits = contained_by(&store, Rect::new(0.0, 0.0, 50.0, 50.0), None);
        assert_eq!(hits, vec![touching]);
        assert!(!hits.contains(&outside));
    }

    #[test]
    fn test_arrow_bounds_are_endpoint_bbox() {
        let arrow = Annotation::Arrow(Arrow::new(Point::new(20.0, 40.0), Point::new(5.0, 10.0)));
        let b = bounds(&arrow, None).unwrap();
        assert_eq!(b, Rect::new(5.0, 10.0, 20.0, 40.0));
    }

    #[test]
    fn test_circle_bounds() {
        let mut circle = Circle::new(Point::new(50.0, 60.0));
        circle.set_radius(10.0);
        let b = bounds(&Annotation::Circle(circle), None).unwrap();
        assert_eq!(b, Rect::new(40.0, 50.0, 60.0, 70.0));
    }

    #[test]
    fn test_path_bounds_over_points() {
        let mut path = PathStroke::new(Point::new(3.0, 9.0));
        path.push_point(Point::new(-2.0, 4.0));
        path.push_point(Point::new(7.0, 1.0));
        let b = bounds(&Annotation::Path(path), None).unwrap();
        assert_eq!(b, Rect::new(-2.0, 1.0, 7.0, 9.0));
    }

    #[test]
    fn test_text_bounds_need_a_measurer() {
        let text = Annotation::Text(Text::new(
            Point::new(10.0, 100.0),
            "Hi".into(),
            FontSpec::default(),
        ));
        assert!(bounds(&text, None).is_none());

        let b = bounds(&text, Some(&FixedMeasurer)).unwrap();
        // Baseline anchor: the box extends upward.
        assert_eq!(b, Rect::new(10.0, 80.0, 30.0, 100.0));
    }

    #[test]
    fn test_text_without_measurer_excluded_from_hits() {
        let mut store = AnnotationStore::new();
        store.add(Annotation::Text(Text::new(
            Point::new(0.0, 20.0),
            "Hello".into(),
            FontSpec::default(),
        )));

        assert_eq!(hit_test(&store, Point::new(5.0, 10.0), None), None);
        assert!(hit_test(&store, Point::new(5.0, 10.0), Some(&FixedMeasurer)).is_some());
    }
}
