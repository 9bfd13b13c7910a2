//! View transform (rotate/zoom/pan) and view-canvas metrics.

use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum zoom level.
pub const MIN_SCALE: f64 = 1.0;
/// Maximum zoom level.
pub const MAX_SCALE: f64 = 3.0;
/// Rotation step applied by the rotate controls.
pub const ROTATION_STEP: f64 = 90.0;

/// Direction for a 90-degree rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

/// The view transform applied to the source bitmap.
///
/// The invariant maintained by every mutator: for the current rotation and
/// scale, the pan offset keeps the rotated, scaled bitmap fully covering the
/// view canvas, so no background shows at any edge. The bitmap is drawn
/// fit-to-canvas, so the canvas size is also the bitmap's unscaled draw size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Rotation in degrees, normalized to [0, 360).
    pub rotation_degrees: f64,
    /// Zoom factor in [MIN_SCALE, MAX_SCALE].
    pub scale: f64,
    /// Pan offset in canvas coordinates, applied after rotation and scale.
    pub pan: Vec2,
    /// View-canvas size; None until an image is open, making clamping a no-op.
    canvas: Option<Size>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            rotation_degrees: 0.0,
            scale: MIN_SCALE,
            pan: Vec2::ZERO,
            canvas: None,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas size (on image open or viewport resize) and re-clamp.
    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.canvas = Some(canvas);
        self.reclamp();
    }

    pub fn canvas_size(&self) -> Option<Size> {
        self.canvas
    }

    /// Rotate by one 90-degree step and re-clamp.
    pub fn rotate(&mut self, dir: RotateDirection) {
        let step = match dir {
            RotateDirection::Clockwise => ROTATION_STEP,
            RotateDirection::CounterClockwise => -ROTATION_STEP,
        };
        self.rotation_degrees = (self.rotation_degrees + step).rem_euclid(360.0);
        self.reclamp();
    }

    /// Set the zoom factor, clamped to [MIN_SCALE, MAX_SCALE], and re-clamp.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.reclamp();
    }

    /// Pan by a delta in canvas coordinates and re-clamp.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan += Vec2::new(dx, dy);
        self.reclamp();
    }

    /// Reset to the identity view.
    pub fn reset(&mut self) {
        self.rotation_degrees = 0.0;
        self.scale = MIN_SCALE;
        self.pan = Vec2::ZERO;
    }

    /// Clamp an offset so the rotated, scaled bitmap still covers the canvas.
    ///
    /// The allowed range per axis is symmetric: half the amount by which the
    /// rotated bounding box exceeds the canvas. Identity while no canvas size
    /// is known. Idempotent.
    pub fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        let Some(canvas) = self.canvas else {
            return offset;
        };

        let theta = self.rotation_degrees.to_radians();
        let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
        let w = canvas.width * self.scale;
        let h = canvas.height * self.scale;
        let rot_w = w * cos + h * sin;
        let rot_h = w * sin + h * cos;

        let max_x = ((rot_w - canvas.width) / 2.0).max(0.0);
        let max_y = ((rot_h - canvas.height) / 2.0).max(0.0);

        Vec2::new(offset.x.clamp(-max_x, max_x), offset.y.clamp(-max_y, max_y))
    }

    fn reclamp(&mut self) {
        self.pan = self.clamp_offset(self.pan);
    }
}

/// Fit-to-viewport canvas dimensions for a native bitmap.
///
/// The view canvas preserves the bitmap's aspect ratio; its size is
/// independent of the native resolution, which only matters again at export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewCanvasMetrics {
    /// View-canvas size (fit-to-viewport).
    pub view: Size,
    /// Native bitmap size.
    pub native: Size,
}

impl ViewCanvasMetrics {
    /// Fit a native bitmap into a viewport, preserving aspect ratio.
    pub fn fit(native: Size, viewport: Size) -> Self {
        let scale = (viewport.width / native.width).min(viewport.height / native.height);
        Self {
            view: Size::new(native.width * scale, native.height * scale),
            native,
        }
    }

    /// Horizontal native-per-view pixel ratio.
    pub fn scale_x(&self) -> f64 {
        self.native.width / self.view.width
    }

    /// Vertical native-per-view pixel ratio. Computed independently of
    /// [`scale_x`](Self::scale_x) even though the fit keeps them equal.
    pub fn scale_y(&self) -> f64 {
        self.native.height / self.view.height
    }
}
