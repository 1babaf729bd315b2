use crate::geometry::Point;

pub const MIN_SCALE: f64 = 0.25;
pub const MAX_SCALE: f64 = 2.0;
pub const SCALE_STEP: f64 = 0.25;
pub const DEFAULT_SCALE: f64 = 1.0;

/// Wheel deltas are softened by this divisor before being applied to the
/// scale factor.
const WHEEL_SCALE_DIVISOR: f64 = 3000.0;

/// Pan/zoom state of the canvas.
///
/// Purely presentational: nothing here affects graph semantics, but pointer
/// positions must pass through [`Viewport::scale_corrected`] before they are
/// compared against step positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub origin: Point,
    pub offset: Point,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            offset: Point::default(),
            scale: DEFAULT_SCALE,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + SCALE_STEP).min(MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - SCALE_STEP).max(MIN_SCALE);
    }

    /// Applies a scroll-wheel delta to the scale factor, clamped to the
    /// supported range.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        self.scale = (self.scale - delta_y / WHEEL_SCALE_DIVISOR).clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Converts a client-space position into canvas space by dividing out the
    /// scale factor.
    pub fn scale_corrected(&self, position: Point) -> Point {
        Point::new(position.x / self.scale, position.y / self.scale)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset = self.offset.offset(dx, dy);
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Resets pan and zoom to the initial view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
