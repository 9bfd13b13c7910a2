//! Font loading, text measurement and glyph rasterization.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use kurbo::Point;
use rastermark_core::annotations::{FontFamily, FontSpec, Rgba8Color};
use rastermark_core::hit::TextMeasurer;
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::draw::scalar_scale;

const SANS_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Helvetica.ttf",
];

const SERIF_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
];

const MONO_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
];

/// Loaded fonts, one per family with the sans face as fallback.
///
/// Doubles as the [`TextMeasurer`] handed to the core crate: hit-testing and
/// rendering must agree on text extents, so both go through the same metrics.
pub struct FontStore {
    sans: FontArc,
    serif: Option<FontArc>,
    mono: Option<FontArc>,
}

impl FontStore {
    /// Load fonts from well-known system paths. None when no sans face is
    /// found; the editor then runs without text bounds or text rendering.
    pub fn load_system() -> Option<Self> {
        let sans = load_first(SANS_CANDIDATES)?;
        Some(Self {
            sans,
            serif: load_first(SERIF_CANDIDATES),
            mono: load_first(MONO_CANDIDATES),
        })
    }

    /// Build a store from raw font bytes, used for every family.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        let font = FontArc::try_from_vec(bytes).ok()?;
        Some(Self {
            sans: font,
            serif: None,
            mono: None,
        })
    }

    fn font_for(&self, family: FontFamily) -> &FontArc {
        match family {
            FontFamily::SansSerif => &self.sans,
            FontFamily::Serif => self.serif.as_ref().unwrap_or(&self.sans),
            FontFamily::Monospace => self.mono.as_ref().unwrap_or(&self.sans),
        }
    }

    fn advance_width(&self, content: &str, family: FontFamily, px: f32) -> f32 {
        let scaled = self.font_for(family).as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for ch in content.chars() {
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, glyph);
            }
            width += scaled.h_advance(glyph);
            prev = Some(glyph);
        }
        width
    }

    fn line_height(&self, family: FontFamily, px: f32) -> f32 {
        let scaled = self.font_for(family).as_scaled(PxScale::from(px));
        scaled.ascent() - scaled.descent()
    }

    /// Rasterize text with its baseline at `anchor`, blending glyph coverage
    /// into the pixmap. `sx`/`sy` follow the same convention as
    /// [`draw_annotation`](crate::draw::draw_annotation).
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        content: &str,
        anchor: Point,
        spec: &FontSpec,
        color: Rgba8Color,
        sx: f64,
        sy: f64,
    ) {
        let px = (spec.size * scalar_scale(sx, sy)) as f32;
        let font = self.font_for(spec.family);
        let scaled = font.as_scaled(PxScale::from(px));

        let mut caret = (anchor.x * sx) as f32;
        let baseline = (anchor.y * sy) as f32;
        let mut prev = None;
        for ch in content.chars() {
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(px, ab_glyph::point(caret, baseline));
            if let Some(outline) = font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    blend_pixel(
                        pixmap,
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        color,
                        coverage,
                    );
                });
            }
            caret += scaled.h_advance(glyph_id);
            prev = Some(glyph_id);
        }
    }
}

impl TextMeasurer for FontStore {
    fn measure(&self, content: &str, font: &FontSpec) -> (f64, f64) {
        let px = font.size as f32;
        (
            f64::from(self.advance_width(content, font.family, px)),
            f64::from(self.line_height(font.family, px)),
        )
    }
}

fn load_first(candidates: &[&str]) -> Option<FontArc> {
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                log::debug!("loaded font {path}");
                return Some(font);
            }
        }
    }
    None
}

/// Source-over blend of straight-alpha color at `coverage` into a
/// premultiplied pixmap pixel.
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Rgba8Color, coverage: f32) {
    if x < 0 || y < 0 || x >= pixmap.width() as i32 || y >= pixmap.height() as i32 {
        return;
    }
    let alpha = coverage.clamp(0.0, 1.0) * f32::from(color.a) / 255.0;
    if alpha <= 0.0 {
        return;
    }

    let index = y as usize * pixmap.width() as usize + x as usize;
    let dst = pixmap.pixels_mut()[index];
    let inv = 1.0 - alpha;

    let a = (alpha * 255.0 + f32::from(dst.alpha()) * inv).round().min(255.0);
    let r = (f32::from(color.r) * alpha + f32::from(dst.red()) * inv)
        .round()
        .min(a);
    let g = (f32::from(color.g) * alpha + f32::from(dst.green()) * inv)
        .round()
        .min(a);
    let b = (f32::from(color.b) * alpha + f32::from(dst.blue()) * inv)
        .round()
        .min(a);
    if let Some(out) = PremultipliedColorU8::from_rgba(r as u8, g as u8, b as u8, a as u8) {
        pixmap.pixels_mut()[index] = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These run only where a system font is installed; the store itself
    // treats missing fonts as a supported configuration.

    #[test]
    fn test_measure_grows_with_content() {
        let Some(fonts) = FontStore::load_system() else {
            return;
        };
        let spec = FontSpec::default();
        let (short, height) = fonts.measure("hi", &spec);
        let (long, _) = fonts.measure("hi there", &spec);
        assert!(long > short);
        assert!(height > 0.0);
    }

    #[test]
    fn test_draw_text_touches_pixels_above_baseline() {
        let Some(fonts) = FontStore::load_system() else {
            return;
        };
        let mut pixmap = Pixmap::new(200, 100).unwrap();
        fonts.draw_text(
            &mut pixmap,
            "Ink",
            Point::new(10.0, 60.0),
            &FontSpec::default(),
            Rgba8Color::black(),
            1.0,
            1.0,
        );

        let touched = pixmap.pixels().iter().any(|p| p.alpha() > 0);
        assert!(touched);
        // Nothing lands below the descent line.
        let bottom_row = &pixmap.pixels()[99 * 200..];
        assert!(bottom_row.iter().all(|p| p.alpha() == 0));
    }
}
