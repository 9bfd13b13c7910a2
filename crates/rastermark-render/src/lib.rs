//! RasterMark Render Library
//!
//! CPU rasterization for the annotation canvas: a two-layer pixmap renderer,
//! shared annotation drawing, font handling and the native-resolution PNG
//! exporter.

mod draw;
pub mod export;
mod renderer;
mod text;

pub use draw::{arrow_head, draw_annotation};
pub use export::{export, export_and_save, ExportError, FileSink, SaveSink};
pub use renderer::{bitmap_from_rgba, LayerRenderer, PixmapRenderer, RenderError, RenderResult};
pub use text::FontStore;
