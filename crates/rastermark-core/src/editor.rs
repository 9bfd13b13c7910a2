//! Editor state and the pointer/keyboard interaction state machine.

use crate::annotations::{
    Annotation, AnnotationId, AnnotationUpdate, Arrow, Circle, FontSpec, PathStroke, Rectangle,
    Style, Text,
};
use crate::hit::{self, TextMeasurer};
use crate::input::{EditorKey, Modifiers, PointerEvent};
use crate::store::AnnotationStore;
use crate::transform::{ViewCanvasMetrics, ViewTransform};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Interaction modes; exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Pan,
    DrawRectangle,
    DrawArrow,
    DrawCircle,
    DrawPath,
    PlaceText,
    Select,
}

/// The one in-progress gesture, if any.
///
/// Modeling all ephemeral references as a single union makes illegal
/// combinations (drawing while moving, marquee while text-editing)
/// unrepresentable. Cleared on mode switch, close, and pointer-up
/// (text editing ends on Enter/Escape instead).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pan drag; anchor is re-set after every step so clamping between
    /// steps cannot desync the drag.
    Panning { anchor: Point },
    /// A shape is being drawn; its terminal geometry follows the pointer.
    Drawing { id: AnnotationId },
    /// Selected annotations follow the pointer, incremental-anchor like Pan.
    Moving { anchor: Point },
    /// Marquee selection; corner follows the pointer, committed on up.
    Marquee { origin: Point, corner: Point },
    /// Keystrokes are routed into this text annotation.
    EditingText { id: AnnotationId },
}

/// The annotation editor: store, view transform, selection and the
/// interaction state machine, driven by pointer/keyboard events.
///
/// The host owns the decoded bitmap and the save path; the editor only
/// tracks its dimensions through [`ViewCanvasMetrics`].
#[derive(Debug, Clone)]
pub struct Editor {
    store: AnnotationStore,
    transform: ViewTransform,
    metrics: Option<ViewCanvasMetrics>,
    selection: Vec<AnnotationId>,
    mode: Mode,
    gesture: Option<Gesture>,
    style: Style,
    font: FontSpec,
    default_text: String,
    open: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            store: AnnotationStore::new(),
            transform: ViewTransform::new(),
            metrics: None,
            selection: Vec::new(),
            mode: Mode::default(),
            gesture: None,
            style: Style::default(),
            font: FontSpec::default(),
            default_text: "Text".to_string(),
            open: false,
        }
    }

    /// Open an image: compute the fit-to-viewport canvas, reset the view and
    /// clear all annotations, selection and gesture state.
    pub fn open_image(&mut self, native: Size, viewport: Size) {
        let metrics = ViewCanvasMetrics::fit(native, viewport);
        self.transform.reset();
        self.transform.set_canvas_size(metrics.view);
        self.metrics = Some(metrics);
        self.store.clear();
        self.selection.clear();
        self.gesture = None;
        self.mode = Mode::Pan;
        self.open = true;
        log::debug!(
            "opened image {}x{} (view {}x{})",
            native.width,
            native.height,
            metrics.view.width,
            metrics.view.height
        );
    }

    /// Close the editor, clearing every ephemeral reference so no stale
    /// gesture can point at a deleted annotation.
    pub fn close(&mut self) {
        self.end_text_editing();
        self.gesture = None;
        self.open = false;
    }

    /// Clear annotations and selection, keeping the open image.
    pub fn reset_annotations(&mut self) {
        self.gesture = None;
        self.store.clear();
        self.selection.clear();
    }

    // Toolbar seams (host UI glue).

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    pub fn set_default_text(&mut self, text: String) {
        self.default_text = text;
    }

    /// Switch modes, clearing any in-progress gesture. Store and selection
    /// are untouched.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.end_text_editing();
        self.gesture = None;
        log::debug!("mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    // Accessors used by the renderer and exporter.

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut ViewTransform {
        &mut self.transform
    }

    pub fn metrics(&self) -> Option<&ViewCanvasMetrics> {
        self.metrics.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selection(&self) -> &[AnnotationId] {
        &self.selection
    }

    pub fn is_selected(&self, id: AnnotationId) -> bool {
        self.selection.contains(&id)
    }

    /// The active marquee rectangle, normalized, for overlay drawing.
    pub fn marquee(&self) -> Option<Rect> {
        match self.gesture {
            Some(Gesture::Marquee { origin, corner }) => Some(Rect::from_points(origin, corner)),
            _ => None,
        }
    }

    /// The annotation currently receiving keystrokes, if any.
    pub fn editing_text(&self) -> Option<AnnotationId> {
        match self.gesture {
            Some(Gesture::EditingText { id }) => Some(id),
            _ => None,
        }
    }

    /// Process a pointer event in canvas-local coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent, measurer: Option<&dyn TextMeasurer>) {
        if !self.open {
            return;
        }
        match event {
            PointerEvent::Down {
                position,
                modifiers,
            } => self.pointer_down(position, modifiers, measurer),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position, measurer),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    fn pointer_down(
        &mut self,
        position: Point,
        modifiers: Modifiers,
        measurer: Option<&dyn TextMeasurer>,
    ) {
        // A click while a text edit is live finishes that edit first.
        self.end_text_editing();

        match self.mode {
            Mode::Pan => {
                self.gesture = Some(Gesture::Panning { anchor: position });
            }
            Mode::DrawRectangle => self.begin_drawing(Annotation::Rectangle(Rectangle::new(
                position,
            ))),
            Mode::DrawArrow => {
                self.begin_drawing(Annotation::Arrow(Arrow::new(position, position)))
            }
            Mode::DrawCircle => self.begin_drawing(Annotation::Circle(Circle::new(position))),
            Mode::DrawPath => self.begin_drawing(Annotation::Path(PathStroke::new(position))),
            Mode::PlaceText => {
                let text = Text::new(position, self.default_text.clone(), self.font);
                let mut annotation = Annotation::Text(text);
                *annotation.style_mut() = self.style;
                let id = self.store.add(annotation);
                self.selection.clear();
                self.selection.push(id);
                self.gesture = Some(Gesture::EditingText { id });
            }
            Mode::Select => {
                if modifiers.any() {
                    self.gesture = Some(Gesture::Marquee {
                        origin: position,
                        corner: position,
                    });
                } else if let Some(id) = hit::hit_test(&self.store, position, measurer) {
                    // Clicking inside the current selection keeps it, so a
                    // marquee-selected group can be dragged together.
                    if !self.selection.contains(&id) {
                        self.selection.clear();
                        self.selection.push(id);
                    }
                    self.gesture = Some(Gesture::Moving { anchor: position });
                } else {
                    self.selection.clear();
                    self.set_mode(Mode::Pan);
                }
            }
        }
    }

    fn begin_drawing(&mut self, mut annotation: Annotation) {
        *annotation.style_mut() = self.style;
        let id = self.store.add(annotation);
        self.selection.clear();
        self.selection.push(id);
        self.gesture = Some(Gesture::Drawing { id });
    }

    fn pointer_move(&mut self, position: Point) {
        match self.gesture {
            Some(Gesture::Panning { anchor }) => {
                self.transform
                    .pan_by(position.x - anchor.x, position.y - anchor.y);
                self.gesture = Some(Gesture::Panning { anchor: position });
            }
            Some(Gesture::Drawing { id }) => {
                if let Some(update) = self.drawing_update(id, position) {
                    self.store.update(id, update);
                }
            }
            Some(Gesture::Moving { anchor }) => {
                let delta = Vec2::new(position.x - anchor.x, position.y - anchor.y);
                for &id in &self.selection {
                    self.store.update(id, AnnotationUpdate::Translate { delta });
                }
                self.gesture = Some(Gesture::Moving { anchor: position });
            }
            Some(Gesture::Marquee { origin, .. }) => {
                self.gesture = Some(Gesture::Marquee {
                    origin,
                    corner: position,
                });
            }
            Some(Gesture::EditingText { .. }) | None => {}
        }
    }

    /// The per-kind terminal-geometry update for an in-progress drawing.
    fn drawing_update(&self, id: AnnotationId, position: Point) -> Option<AnnotationUpdate> {
        match self.store.get(id)? {
            Annotation::Rectangle(r) => Some(AnnotationUpdate::ResizeRectangle {
                width: position.x - r.origin.x,
                height: position.y - r.origin.y,
            }),
            Annotation::Arrow(_) => Some(AnnotationUpdate::SetArrowEnd { end: position }),
            Annotation::Circle(c) => Some(AnnotationUpdate::SetCircleRadius {
                radius: c.center.distance(position),
            }),
            Annotation::Path(_) => Some(AnnotationUpdate::ExtendPath { point: position }),
            // Text is placed, not dragged.
            Annotation::Text(_) => None,
        }
    }

    fn pointer_up(&mut self, position: Point, measurer: Option<&dyn TextMeasurer>) {
        match self.gesture {
            Some(Gesture::Marquee { origin, .. }) => {
                let rect = Rect::from_points(origin, position);
                self.selection = hit::contained_by(&self.store, rect, measurer);
                self.gesture = None;
            }
            // Text editing survives pointer-up; it ends on Enter/Escape.
            Some(Gesture::EditingText { .. }) => {}
            Some(_) => self.gesture = None,
            None => {}
        }
    }

    fn pointer_leave(&mut self) {
        // Only pan drags abort when the pointer leaves the canvas.
        if matches!(self.gesture, Some(Gesture::Panning { .. })) {
            log::debug!("pan drag aborted on pointer leave");
            self.gesture = None;
        }
    }

    /// Process a key event. Text editing consumes character keys first, so
    /// Backspace-while-editing and the global Delete never conflict.
    pub fn handle_key(&mut self, key: EditorKey) {
        if !self.open {
            return;
        }

        if let Some(Gesture::EditingText { id }) = self.gesture {
            match key {
                EditorKey::Char(ch) => self.store.update(id, AnnotationUpdate::AppendChar { ch }),
                EditorKey::Backspace => self.store.update(id, AnnotationUpdate::DeleteChar),
                EditorKey::Enter | EditorKey::Escape => {
                    self.end_text_editing();
                    self.gesture = None;
                    self.selection.clear();
                }
                // Delete is a selection-level key; swallowed while editing.
                EditorKey::Delete => {}
            }
            return;
        }

        match key {
            EditorKey::Delete => self.delete_selected(),
            EditorKey::Escape => {
                if self.mode != Mode::Pan {
                    self.set_mode(Mode::Pan);
                    self.selection.clear();
                }
            }
            EditorKey::Char(_) | EditorKey::Backspace | EditorKey::Enter => {}
        }
    }

    /// Remove all selected annotations from store and selection.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.store.remove_many(&self.selection);
        self.selection.clear();
        // A live gesture must never reference a deleted annotation.
        if let Some(Gesture::Drawing { id } | Gesture::EditingText { id }) = self.gesture {
            if !self.store.contains(id) {
                self.gesture = None;
            }
        }
    }

    /// Drop the editing flag on the annotation a live text edit points at.
    fn end_text_editing(&mut self) {
        if let Some(Gesture::EditingText { id }) = self.gesture {
            self.store
                .update(id, AnnotationUpdate::SetEditing { editing: false });
            self.gesture = None;
        }
    }
}
