//! Annotation definitions for the image editor.

mod arrow;
mod circle;
mod path;
mod rectangle;
mod text;

pub use arrow::Arrow;
pub use circle::Circle;
pub use path::PathStroke;
pub use rectangle::Rectangle;
pub use text::{FontFamily, FontSpec, Text};

use kurbo::Vec2;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn red() -> Self {
        Self::new(229, 62, 62, 255)
    }
}

impl From<Color> for Rgba8Color {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba8Color> for Color {
    fn from(color: Rgba8Color) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke style shared by every annotation kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Style {
    /// Stroke color.
    pub color: Rgba8Color,
    /// Stroke width in view pixels.
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Rgba8Color::red(),
            stroke_width: 2.0,
        }
    }
}

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// Enum wrapper for all annotation kinds.
///
/// All coordinates are in view space (the fit-to-viewport canvas).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Annotation {
    Rectangle(Rectangle),
    Arrow(Arrow),
    Circle(Circle),
    Path(PathStroke),
    Text(Text),
}

/// Explicit per-kind mutations.
///
/// Keeping the update set closed lets the store match it exhaustively against
/// the annotation kind instead of accepting arbitrary partial patches.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationUpdate {
    /// Set a rectangle's signed width/height relative to its origin.
    ResizeRectangle { width: f64, height: f64 },
    /// Move an arrow's terminal endpoint.
    SetArrowEnd { end: kurbo::Point },
    /// Set a circle's radius (clamped to the minimum).
    SetCircleRadius { radius: f64 },
    /// Append a point to a freehand path.
    ExtendPath { point: kurbo::Point },
    /// Append a character to a text annotation's content.
    AppendChar { ch: char },
    /// Trim the last character of a text annotation's content.
    DeleteChar,
    /// Set a text annotation's editing flag.
    SetEditing { editing: bool },
    /// Translate the whole annotation by a delta.
    Translate { delta: Vec2 },
}

impl Annotation {
    pub fn id(&self) -> AnnotationId {
        match self {
            Annotation::Rectangle(a) => a.id,
            Annotation::Arrow(a) => a.id,
            Annotation::Circle(a) => a.id,
            Annotation::Path(a) => a.id,
            Annotation::Text(a) => a.id,
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            Annotation::Rectangle(a) => &a.style,
            Annotation::Arrow(a) => &a.style,
            Annotation::Circle(a) => &a.style,
            Annotation::Path(a) => &a.style,
            Annotation::Text(a) => &a.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut Style {
        match self {
            Annotation::Rectangle(a) => &mut a.style,
            Annotation::Arrow(a) => &mut a.style,
            Annotation::Circle(a) => &mut a.style,
            Annotation::Path(a) => &mut a.style,
            Annotation::Text(a) => &mut a.style,
        }
    }

    /// Translate the annotation by a delta, per kind.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Annotation::Rectangle(a) => a.origin += delta,
            Annotation::Arrow(a) => {
                a.start += delta;
                a.end += delta;
            }
            Annotation::Circle(a) => a.center += delta,
            Annotation::Path(a) => {
                for p in &mut a.points {
                    *p += delta;
                }
            }
            Annotation::Text(a) => a.anchor += delta,
        }
    }

    /// Apply an update to this annotation.
    ///
    /// Updates addressed at a different kind are ignored; the store logs them.
    /// Returns true if the update matched this annotation's kind.
    pub fn apply(&mut self, update: &AnnotationUpdate) -> bool {
        // Translation applies to every kind.
        if let AnnotationUpdate::Translate { delta } = update {
            self.translate(*delta);
            return true;
        }
        match (self, update) {
            (Annotation::Rectangle(a), AnnotationUpdate::ResizeRectangle { width, height }) => {
                a.width = *width;
                a.height = *height;
                true
            }
            (Annotation::Arrow(a), AnnotationUpdate::SetArrowEnd { end }) => {
                a.end = *end;
                true
            }
            (Annotation::Circle(a), AnnotationUpdate::SetCircleRadius { radius }) => {
                a.set_radius(*radius);
                true
            }
            (Annotation::Path(a), AnnotationUpdate::ExtendPath { point }) => {
                a.push_point(*point);
                true
            }
            (Annotation::Text(a), AnnotationUpdate::AppendChar { ch }) => {
                a.content.push(*ch);
                true
            }
            (Annotation::Text(a), AnnotationUpdate::DeleteChar) => {
                a.content.pop();
                true
            }
            (Annotation::Text(a), AnnotationUpdate::SetEditing { editing }) => {
                a.editing = *editing;
                true
            }
            _ => false,
        }
    }
}
