//! RasterMark Core Library
//!
//! Platform-agnostic state and logic for the RasterMark image annotator:
//! annotation model, ordered store, view transform, hit-testing and the
//! pointer/keyboard interaction state machine.

pub mod annotations;
pub mod editor;
pub mod hit;
pub mod input;
pub mod store;
pub mod transform;

pub use annotations::{Annotation, AnnotationId, AnnotationUpdate, Style};
pub use editor::{Editor, Gesture, Mode};
pub use hit::TextMeasurer;
pub use input::{EditorKey, Modifiers, PointerEvent};
pub use store::AnnotationStore;
pub use transform::{RotateDirection, ViewCanvasMetrics, ViewTransform};
