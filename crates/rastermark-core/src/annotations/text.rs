//! Text annotation.

use super::{AnnotationId, Style};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font family options offered by the host's font picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

impl FontFamily {
    /// Display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "Sans",
            FontFamily::Serif => "Serif",
            FontFamily::Monospace => "Mono",
        }
    }

    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::SansSerif,
            FontFamily::Serif,
            FontFamily::Monospace,
        ]
    }
}

/// Font specification carried by text annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font size in view pixels.
    pub size: f64,
    /// Font family.
    pub family: FontFamily,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            size: 20.0,
            family: FontFamily::default(),
        }
    }
}

/// A text annotation anchored at its baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: AnnotationId,
    /// Baseline anchor point.
    pub anchor: Point,
    /// Text content.
    pub content: String,
    /// Font specification.
    pub font: FontSpec,
    /// Transient editing flag; set while keystrokes are being routed here.
    #[serde(skip)]
    pub editing: bool,
    /// Style properties.
    pub style: Style,
}

impl Text {
    /// Create a new text annotation in editing state.
    pub fn new(anchor: Point, content: String, font: FontSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            font,
            editing: true,
            style: Style::default(),
        }
    }
}
