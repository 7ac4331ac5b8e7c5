use crate::point::Point;
use crate::viewport::Viewport;

/// Gridlines are never rendered closer together than this many pixels.
pub const MIN_LABEL_SPACING_PX: f64 = 50.0;

/// World-space gridline positions for the current transform. Pure data; the
/// client turns it into canvas lines and labels.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    /// Label step in world units.
    pub step: f64,
    /// World X of each vertical gridline, zero excluded.
    pub vertical: Vec<f64>,
    /// World Y of each horizontal gridline, zero excluded.
    pub horizontal: Vec<f64>,
}

/// Smallest whole-unit step that keeps gridlines at least
/// `MIN_LABEL_SPACING_PX` apart at the given scale.
pub fn label_step(scale: f64) -> f64 {
    (MIN_LABEL_SPACING_PX / scale).ceil().max(1.0)
}

pub fn grid_lines(viewport: &Viewport) -> GridLayout {
    let step = label_step(viewport.scale);
    let bounds = viewport.visible_world_bounds();
    GridLayout {
        step,
        vertical: step_multiples(bounds.min_x, bounds.max_x, step),
        horizontal: step_multiples(bounds.min_y, bounds.max_y, step),
    }
}

fn step_multiples(min: f64, max: f64, step: f64) -> Vec<f64> {
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    // The value 0 is skipped; the axes are drawn separately, on top.
    (first..=last)
        .filter(|index| *index != 0)
        .map(|index| index as f64 * step)
        .collect()
}

/// Screen position of the world origin, clamped into the viewport so axis
/// labels stay at the visible edge when the origin itself is off-screen.
pub fn axis_anchor(viewport: &Viewport) -> Point {
    let origin = viewport.to_screen(Point::default());
    Point {
        x: origin.x.clamp(0.0, viewport.width_px),
        y: origin.y.clamp(0.0, viewport.height_px),
    }
}
