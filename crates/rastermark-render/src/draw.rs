//! Annotation rasterization shared by the overlay renderer and the exporter.

use kurbo::{Point, Vec2};
use rastermark_core::annotations::{Annotation, Arrow};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::text::FontStore;

/// Arrowhead as a filled triangle `[tip, left corner, right corner]` in the
/// arrow's own coordinate space.
///
/// The head scales with the stroke so thick arrows do not end in a sliver;
/// the back corners sit half the head length off-axis on each side.
pub fn arrow_head(arrow: &Arrow) -> [Point; 3] {
    let u = arrow.direction();
    let len = 10.0 + arrow.style.stroke_width * 2.0;
    let base = arrow.end - u * len;
    let half = Vec2::new(-u.y, u.x) * (len * 0.5);
    [arrow.end, base + half, base - half]
}

/// Scalar quantities (stroke width, radius, font size) cannot scale per-axis,
/// so they take the mean of the two axis ratios.
pub(crate) fn scalar_scale(sx: f64, sy: f64) -> f64 {
    (sx + sy) / 2.0
}

/// Placement of a `content`-sized bitmap under the view transform: center it,
/// scale by the per-axis factors, rotate, then translate to `center`.
///
/// Renderer and exporter both go through this so the on-screen preview and
/// the flattened output position the bitmap with the same formula.
pub(crate) fn bitmap_placement(
    rotation_degrees: f64,
    scale: (f64, f64),
    center: (f64, f64),
    content: (f64, f64),
) -> Transform {
    Transform::from_translate(center.0 as f32, center.1 as f32)
        .pre_concat(Transform::from_rotate(rotation_degrees as f32))
        .pre_scale(scale.0 as f32, scale.1 as f32)
        .pre_translate(-(content.0 as f32) / 2.0, -(content.1 as f32) / 2.0)
}

/// Rasterize one annotation onto a pixmap.
///
/// `sx`/`sy` map annotation coordinates to pixmap pixels: 1.0 for the view
/// overlay, the native-per-view ratios for export. Text is skipped when no
/// font store is available.
pub fn draw_annotation(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    sx: f64,
    sy: f64,
    fonts: Option<&FontStore>,
) {
    let style = annotation.style();
    let mut paint = Paint::default();
    paint.set_color_rgba8(style.color.r, style.color.g, style.color.b, style.color.a);
    paint.anti_alias = true;

    let mut stroke = Stroke {
        width: (style.stroke_width * scalar_scale(sx, sy)) as f32,
        ..Stroke::default()
    };

    match annotation {
        Annotation::Rectangle(r) => {
            let rect = r.normalized();
            // Built point by point so degenerate extents stroke as a line
            // instead of failing rect validation.
            let mut pb = PathBuilder::new();
            pb.move_to((rect.x0 * sx) as f32, (rect.y0 * sy) as f32);
            pb.line_to((rect.x1 * sx) as f32, (rect.y0 * sy) as f32);
            pb.line_to((rect.x1 * sx) as f32, (rect.y1 * sy) as f32);
            pb.line_to((rect.x0 * sx) as f32, (rect.y1 * sy) as f32);
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Annotation::Arrow(a) => {
            let mut pb = PathBuilder::new();
            pb.move_to((a.start.x * sx) as f32, (a.start.y * sy) as f32);
            pb.line_to((a.end.x * sx) as f32, (a.end.y * sy) as f32);
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }

            let [tip, left, right] = arrow_head(a);
            let mut pb = PathBuilder::new();
            pb.move_to((tip.x * sx) as f32, (tip.y * sy) as f32);
            pb.line_to((left.x * sx) as f32, (left.y * sy) as f32);
            pb.line_to((right.x * sx) as f32, (right.y * sy) as f32);
            pb.close();
            if let Some(path) = pb.finish() {
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
        Annotation::Circle(c) => {
            let radius = (c.radius * scalar_scale(sx, sy)) as f32;
            let mut pb = PathBuilder::new();
            pb.push_circle((c.center.x * sx) as f32, (c.center.y * sy) as f32, radius);
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Annotation::Path(p) => {
            let Some(first) = p.points.first() else {
                return;
            };
            // Round caps and joins so a single-point path still leaves a dot.
            stroke.line_cap = LineCap::Round;
            stroke.line_join = LineJoin::Round;
            let mut pb = PathBuilder::new();
            pb.move_to((first.x * sx) as f32, (first.y * sy) as f32);
            if p.points.len() == 1 {
                pb.line_to((first.x * sx) as f32, (first.y * sy) as f32);
            }
            for pt in &p.points[1..] {
                pb.line_to((pt.x * sx) as f32, (pt.y * sy) as f32);
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
        Annotation::Text(t) => {
            if let Some(fonts) = fonts {
                fonts.draw_text(pixmap, &t.content, t.anchor, &t.font, style.color, sx, sy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rastermark_core::annotations::Rectangle;

    #[test]
    fn test_arrow_head_geometry() {
        let mut arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        arrow.style.stroke_width = 3.0;

        let [tip, left, right] = arrow_head(&arrow);
        // Head length 10 + 2 * 3 = 16, half-width 8.
        assert_eq!(tip, Point::new(100.0, 0.0));
        assert!((left.x - 84.0).abs() < 1e-9 && (left.y - 8.0).abs() < 1e-9);
        assert!((right.x - 84.0).abs() < 1e-9 && (right.y + 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrow_head_zero_length_points_right() {
        let arrow = Arrow::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        let [tip, left, _] = arrow_head(&arrow);
        assert_eq!(tip, Point::new(5.0, 5.0));
        // Degenerate arrows fall back to a rightward head.
        assert!(left.x < tip.x);
    }

    #[test]
    fn test_rectangle_stroke_lands_on_scaled_edges() {
        let mut pixmap = Pixmap::new(200, 200).unwrap();
        let mut r = Rectangle::new(Point::new(10.0, 10.0));
        r.width = 20.0;
        r.height = 30.0;

        draw_annotation(&mut pixmap, &Annotation::Rectangle(r), 2.0, 2.0, None);

        // View rect (10,10)-(30,40) lands at (20,20)-(60,80) at 2x.
        let on_edge = pixmap.pixel(40, 20).unwrap();
        assert!(on_edge.alpha() > 0);
        let interior = pixmap.pixel(40, 50).unwrap();
        assert_eq!(interior.alpha(), 0);
    }

    #[test]
    fn test_degenerate_rectangle_draws_without_panic() {
        let mut pixmap = Pixmap::new(50, 50).unwrap();
        let r = Rectangle::new(Point::new(10.0, 10.0));
        draw_annotation(&mut pixmap, &Annotation::Rectangle(r), 1.0, 1.0, None);
    }
}
