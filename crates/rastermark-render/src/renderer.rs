//! Two-layer CPU renderer for the annotation canvas.

use kurbo::Rect;
use rastermark_core::annotations::Annotation;
use rastermark_core::hit::{self, TextMeasurer};
use rastermark_core::Editor;
use thiserror::Error;
use tiny_skia::{
    Color, ColorU8, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::draw;
use crate::text::FontStore;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },
    #[error("bitmap data is {actual} bytes, expected {expected}")]
    BitmapSize { expected: usize, actual: usize },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// A renderer split into a base layer (the transformed bitmap) and an
/// overlay (annotations, selection, marquee), each invalidated on its own.
///
/// Pan, zoom and rotate touch only the base; annotation edits touch only the
/// overlay, so a pan drag never re-rasterizes every annotation and a text
/// keystroke never resamples the bitmap.
pub trait LayerRenderer {
    fn invalidate_base(&mut self);
    fn invalidate_overlay(&mut self);

    /// Re-render whichever layers are dirty for the given editor state.
    fn render(&mut self, editor: &Editor) -> RenderResult<()>;
}

const BACKGROUND: ColorU8 = ColorU8::from_rgba(34, 34, 38, 255);
const SELECTION: ColorU8 = ColorU8::from_rgba(59, 130, 246, 255);
const SELECTION_PADDING: f64 = 3.0;
const DASH_PATTERN: [f32; 2] = [4.0, 4.0];

/// Software [`LayerRenderer`] backed by two tiny-skia pixmaps.
pub struct PixmapRenderer {
    base: Pixmap,
    overlay: Pixmap,
    bitmap: Option<Pixmap>,
    fonts: Option<FontStore>,
    base_dirty: bool,
    overlay_dirty: bool,
}

impl PixmapRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let base = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        let overlay =
            Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        Ok(Self {
            base,
            overlay,
            bitmap: None,
            fonts: None,
            base_dirty: true,
            overlay_dirty: true,
        })
    }

    /// Reallocate both layers for a new canvas size.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.base = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        self.overlay =
            Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        self.base_dirty = true;
        self.overlay_dirty = true;
        Ok(())
    }

    /// Cache the source bitmap from straight-alpha RGBA rows.
    pub fn set_bitmap(&mut self, width: u32, height: u32, rgba: &[u8]) -> RenderResult<()> {
        self.bitmap = Some(bitmap_from_rgba(width, height, rgba)?);
        self.base_dirty = true;
        Ok(())
    }

    pub fn clear_bitmap(&mut self) {
        self.bitmap = None;
        self.base_dirty = true;
    }

    pub fn set_font_store(&mut self, fonts: FontStore) {
        self.fonts = Some(fonts);
        self.overlay_dirty = true;
    }

    /// The measurer hit-testing should use, so selection and drawing agree
    /// on text extents. None until a font store is set.
    pub fn measurer(&self) -> Option<&dyn TextMeasurer> {
        self.fonts.as_ref().map(|f| f as &dyn TextMeasurer)
    }

    pub fn base(&self) -> &Pixmap {
        &self.base
    }

    pub fn overlay(&self) -> &Pixmap {
        &self.overlay
    }

    /// Overlay composited over the base, for hosts that blit one surface.
    pub fn composite(&self) -> Pixmap {
        let mut out = self.base.clone();
        out.draw_pixmap(
            0,
            0,
            self.overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        out
    }

    fn render_base(&mut self, editor: &Editor) {
        self.base.fill(fill_color(BACKGROUND));

        let (Some(bitmap), Some(metrics)) = (&self.bitmap, editor.metrics()) else {
            return;
        };

        let t = editor.transform();
        let fit_x = metrics.view.width / metrics.native.width;
        let fit_y = metrics.view.height / metrics.native.height;
        let transform = draw::bitmap_placement(
            t.rotation_degrees,
            (t.scale * fit_x, t.scale * fit_y),
            (
                metrics.view.width / 2.0 + t.pan.x,
                metrics.view.height / 2.0 + t.pan.y,
            ),
            (metrics.native.width, metrics.native.height),
        );

        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.base
            .draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
    }

    fn render_overlay(&mut self, editor: &Editor) {
        self.overlay.fill(Color::TRANSPARENT);
        let measurer = self.fonts.as_ref().map(|f| f as &dyn TextMeasurer);

        for annotation in editor.store().iter_ordered() {
            draw::draw_annotation(&mut self.overlay, annotation, 1.0, 1.0, self.fonts.as_ref());
        }

        // Caret after the content of a live text edit.
        if let Some(id) = editor.editing_text() {
            if let (Some(Annotation::Text(text)), Some(fonts)) =
                (editor.store().get(id), self.fonts.as_ref())
            {
                let (width, height) = fonts.measure(&text.content, &text.font);
                let x = text.anchor.x + width;
                stroke_line(
                    &mut self.overlay,
                    x,
                    text.anchor.y - height,
                    x,
                    text.anchor.y,
                    SELECTION,
                );
            }
        }

        for &id in editor.selection() {
            let Some(annotation) = editor.store().get(id) else {
                continue;
            };
            if let Some(bounds) = hit::bounds(annotation, measurer) {
                stroke_dashed_rect(
                    &mut self.overlay,
                    bounds.inflate(SELECTION_PADDING, SELECTION_PADDING),
                );
            }
        }

        if let Some(marquee) = editor.marquee() {
            stroke_dashed_rect(&mut self.overlay, marquee);
        }
    }
}

impl LayerRenderer for PixmapRenderer {
    fn invalidate_base(&mut self) {
        self.base_dirty = true;
    }

    fn invalidate_overlay(&mut self) {
        self.overlay_dirty = true;
    }

    fn render(&mut self, editor: &Editor) -> RenderResult<()> {
        if self.base_dirty {
            self.render_base(editor);
            self.base_dirty = false;
        }
        if self.overlay_dirty {
            self.render_overlay(editor);
            self.overlay_dirty = false;
        }
        Ok(())
    }
}

/// Build a premultiplied pixmap from straight-alpha RGBA rows.
pub fn bitmap_from_rgba(width: u32, height: u32, rgba: &[u8]) -> RenderResult<Pixmap> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(RenderError::BitmapSize {
            expected,
            actual: rgba.len(),
        });
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
    for (pixel, chunk) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
        *pixel = ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
    }
    Ok(pixmap)
}

fn fill_color(color: ColorU8) -> Color {
    Color::from_rgba8(color.red(), color.green(), color.blue(), color.alpha())
}

fn stroke_dashed_rect(pixmap: &mut Pixmap, rect: Rect) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(
        SELECTION.red(),
        SELECTION.green(),
        SELECTION.blue(),
        SELECTION.alpha(),
    );
    paint.anti_alias = true;

    let stroke = Stroke {
        width: 1.0,
        dash: StrokeDash::new(DASH_PATTERN.to_vec(), 0.0),
        ..Stroke::default()
    };

    let mut pb = PathBuilder::new();
    pb.move_to(rect.x0 as f32, rect.y0 as f32);
    pb.line_to(rect.x1 as f32, rect.y0 as f32);
    pb.line_to(rect.x1 as f32, rect.y1 as f32);
    pb.line_to(rect.x0 as f32, rect.y1 as f32);
    pb.close();
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

fn stroke_line(pixmap: &mut Pixmap, x0: f64, y0: f64, x1: f64, y1: f64, color: ColorU8) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.red(), color.green(), color.blue(), color.alpha());
    paint.anti_alias = true;

    let mut pb = PathBuilder::new();
    pb.move_to(x0 as f32, y0 as f32);
    pb.line_to(x1 as f32, y1 as f32);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(
            &path,
            &paint,
            &Stroke {
                width: 1.0,
                ..Stroke::default()
            },
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use rastermark_core::input::{Modifiers, PointerEvent};
    use rastermark_core::Mode;

    fn editor_with_rect() -> Editor {
        let mut editor = Editor::new();
        editor.open_image(Size::new(200.0, 200.0), Size::new(100.0, 100.0));
        editor.set_mode(Mode::DrawRectangle);
        editor.handle_pointer(
            PointerEvent::Down {
                position: Point::new(10.0, 10.0),
                modifiers: Modifiers::default(),
            },
            None,
        );
        editor.handle_pointer(
            PointerEvent::Move {
                position: Point::new(40.0, 40.0),
            },
            None,
        );
        editor.handle_pointer(
            PointerEvent::Up {
                position: Point::new(40.0, 40.0),
            },
            None,
        );
        editor
    }

    #[test]
    fn test_render_clears_dirty_flags() {
        let mut renderer = PixmapRenderer::new(100, 100).unwrap();
        let editor = editor_with_rect();

        renderer.render(&editor).unwrap();
        assert!(!renderer.base_dirty);
        assert!(!renderer.overlay_dirty);

        renderer.invalidate_base();
        assert!(renderer.base_dirty);
        assert!(!renderer.overlay_dirty);
    }

    #[test]
    fn test_set_bitmap_validates_length() {
        let mut renderer = PixmapRenderer::new(100, 100).unwrap();
        let err = renderer.set_bitmap(10, 10, &[0u8; 12]).unwrap_err();
        assert!(matches!(err, RenderError::BitmapSize { expected: 400, .. }));

        renderer.set_bitmap(10, 10, &[128u8; 400]).unwrap();
        assert!(renderer.base_dirty);
    }

    #[test]
    fn test_overlay_contains_annotation_strokes() {
        let mut renderer = PixmapRenderer::new(100, 100).unwrap();
        let editor = editor_with_rect();
        renderer.render(&editor).unwrap();

        // Stroke on the rectangle edge, nothing deep inside it.
        assert!(renderer.overlay().pixel(25, 10).unwrap().alpha() > 0);
        assert_eq!(renderer.overlay().pixel(25, 25).unwrap().alpha(), 0);
    }

    #[test]
    fn test_composite_matches_layer_size() {
        let mut renderer = PixmapRenderer::new(64, 48).unwrap();
        let editor = editor_with_rect();
        renderer.render(&editor).unwrap();

        let composite = renderer.composite();
        assert_eq!((composite.width(), composite.height()), (64, 48));
    }
}
