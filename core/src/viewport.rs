use crate::point::Point;

pub const DEFAULT_SCALE: f64 = 50.0;
pub const ZOOM_STEP: f64 = 1.025;
pub const MIN_SCALE: f64 = 0.05;
pub const MAX_SCALE: f64 = 5000.0;

/// World-to-screen mapping for one canvas: pan offset in world units plus a
/// scale in pixels per world unit. World space is Y-up, screen space Y-down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
    pub pan: Point,
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px: width_px.max(0.0),
            height_px: height_px.max(0.0),
            pan: Point::default(),
            scale: DEFAULT_SCALE,
        }
    }

    /// Transform state is never persisted across a resize: pan and scale go
    /// back to their defaults.
    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        *self = Self::new(width_px, height_px);
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point {
            x: self.width_px * 0.5 + (world.x + self.pan.x) * self.scale,
            y: self.height_px * 0.5 - (world.y + self.pan.y) * self.scale,
        }
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.width_px * 0.5) / self.scale - self.pan.x,
            y: (self.height_px * 0.5 - screen.y) / self.scale - self.pan.y,
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale / ZOOM_STEP);
    }

    fn set_scale(&mut self, scale: f64) {
        // Each wheel tick multiplies or divides, so the raw value can never
        // hit zero, but it can still run away; clamp to a sane range.
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Moves the pan offset so content follows a pointer drag given in
    /// screen pixels. The Y component flips sign with the axis.
    pub fn pan_by_screen_delta(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx / self.scale;
        self.pan.y -= dy / self.scale;
    }

    pub fn visible_world_bounds(&self) -> WorldBounds {
        let top_left = self.to_world(Point::new(0.0, 0.0));
        let bottom_right = self.to_world(Point::new(self.width_px, self.height_px));
        WorldBounds {
            min_x: top_left.x,
            min_y: bottom_right.y,
            max_x: bottom_right.x,
            max_y: top_left.y,
        }
    }
}
