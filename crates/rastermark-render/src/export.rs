//! Native-resolution PNG export.

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat, RgbaImage};
use rastermark_core::Editor;
use thiserror::Error;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint};

use crate::draw;
use crate::text::FontStore;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no image is open")]
    ImageUnavailable,
    #[error("cannot allocate the export surface")]
    SurfaceUnavailable,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("saving failed: {0}")]
    Save(#[from] std::io::Error),
}

/// Destination for an exported PNG. Invoked only after encoding succeeded,
/// so a failed export never produces a partial file.
pub trait SaveSink {
    fn save(&mut self, png: &[u8]) -> std::io::Result<()>;
}

/// Sink that writes the PNG to a filesystem path.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SaveSink for FileSink {
    fn save(&mut self, png: &[u8]) -> std::io::Result<()> {
        std::fs::write(&self.path, png)
    }
}

/// Flatten the current view and all annotations into a PNG at the source
/// bitmap's native resolution.
///
/// The view transform is replayed in native pixels: the pan offset scales by
/// the per-axis native-to-view ratios, rotation and zoom carry over as-is.
/// Annotations are rasterized on top with the same per-axis mapping, so the
/// export looks like the on-screen canvas at full resolution.
pub fn export(
    bitmap: &Pixmap,
    editor: &Editor,
    fonts: Option<&FontStore>,
) -> Result<Vec<u8>, ExportError> {
    let metrics = editor.metrics().ok_or(ExportError::ImageUnavailable)?;
    let width = bitmap.width();
    let height = bitmap.height();
    let mut out = Pixmap::new(width, height).ok_or(ExportError::SurfaceUnavailable)?;

    let t = editor.transform();
    let scale_x = metrics.scale_x();
    let scale_y = metrics.scale_y();
    let transform = draw::bitmap_placement(
        t.rotation_degrees,
        (t.scale, t.scale),
        (
            f64::from(width) / 2.0 + t.pan.x * scale_x,
            f64::from(height) / 2.0 + t.pan.y * scale_y,
        ),
        (f64::from(width), f64::from(height)),
    );

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);

    for annotation in editor.store().iter_ordered() {
        draw::draw_annotation(&mut out, annotation, scale_x, scale_y, fonts);
    }

    encode_png(&out)
}

/// Export and hand the PNG to a sink.
pub fn export_and_save(
    bitmap: &Pixmap,
    editor: &Editor,
    fonts: Option<&FontStore>,
    sink: &mut dyn SaveSink,
) -> Result<(), ExportError> {
    let png = export(bitmap, editor, fonts)?;
    sink.save(&png)?;
    log::info!(
        "exported {}x{} PNG ({} bytes)",
        bitmap.width(),
        bitmap.height(),
        png.len()
    );
    Ok(())
}

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let image = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or(ExportError::SurfaceUnavailable)?;
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use rastermark_core::input::{Modifiers, PointerEvent};
    use rastermark_core::Mode;
    use tiny_skia::Color;

    fn white_bitmap(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::WHITE);
        pixmap
    }

    fn draw_rect(editor: &mut Editor, from: Point, to: Point) {
        editor.set_mode(Mode::DrawRectangle);
        editor.handle_pointer(
            PointerEvent::Down {
                position: from,
                modifiers: Modifiers::default(),
            },
            None,
        );
        editor.handle_pointer(PointerEvent::Move { position: to }, None);
        editor.handle_pointer(PointerEvent::Up { position: to }, None);
    }

    #[test]
    fn test_export_requires_open_image() {
        let editor = Editor::new();
        let bitmap = white_bitmap(10, 10);
        assert!(matches!(
            export(&bitmap, &editor, None),
            Err(ExportError::ImageUnavailable)
        ));
    }

    #[test]
    fn test_identity_export_preserves_pixels() {
        let mut editor = Editor::new();
        editor.open_image(Size::new(50.0, 50.0), Size::new(50.0, 50.0));
        let bitmap = white_bitmap(50, 50);

        let png = export(&bitmap, &editor, None).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!((decoded.width(), decoded.height()), (50, 50));
        assert_eq!(decoded.get_pixel(25, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_annotations_scale_to_native_resolution() {
        let mut editor = Editor::new();
        // 200x200 native shown on a 100x100 canvas: everything doubles.
        editor.open_image(Size::new(200.0, 200.0), Size::new(100.0, 100.0));
        draw_rect(&mut editor, Point::new(10.0, 10.0), Point::new(30.0, 40.0));

        let bitmap = white_bitmap(200, 200);
        let png = export(&bitmap, &editor, None).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));

        // View rect (10,10)-(30,40) lands at (20,20)-(60,80); the stroke is
        // the default red at double width.
        let edge = decoded.get_pixel(40, 20);
        assert!(edge.0[0] > 200 && edge.0[1] < 120 && edge.0[2] < 120);
        let interior = decoded.get_pixel(40, 50);
        assert_eq!(interior.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_sink_not_called_on_failure() {
        struct CountingSink(usize);
        impl SaveSink for CountingSink {
            fn save(&mut self, _png: &[u8]) -> std::io::Result<()> {
                self.0 += 1;
                Ok(())
            }
        }

        let editor = Editor::new();
        let bitmap = white_bitmap(10, 10);
        let mut sink = CountingSink(0);
        assert!(export_and_save(&bitmap, &editor, None, &mut sink).is_err());
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn test_export_and_save_writes_once() {
        struct CollectingSink(Vec<Vec<u8>>);
        impl SaveSink for CollectingSink {
            fn save(&mut self, png: &[u8]) -> std::io::Result<()> {
                self.0.push(png.to_vec());
                Ok(())
            }
        }

        let mut editor = Editor::new();
        editor.open_image(Size::new(20.0, 20.0), Size::new(20.0, 20.0));
        let bitmap = white_bitmap(20, 20);
        let mut sink = CollectingSink(Vec::new());

        export_and_save(&bitmap, &editor, None, &mut sink).unwrap();
        assert_eq!(sink.0.len(), 1);
        // PNG signature.
        assert_eq!(&sink.0[0][..4], &[0x89, b'P', b'N', b'G']);
    }
}
