use thiserror::Error;

use crate::curve::{self, Curve, MIN_CURVE_POINTS};
use crate::point::{normalize_point, Point};
use crate::shape::Shape;
use crate::viewport::Viewport;

/// Euclidean screen-space radius within which a pointer grabs a control point.
pub const HIT_RADIUS_PX: f64 = 8.0;
/// Pointer displacement below which a down/up sequence still counts as a click.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;
/// How long after a significant drag ends a click is still swallowed.
pub const CLICK_SUPPRESS_MS: f64 = 200.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("curve name must not be empty")]
    EmptyName,
    #[error("curve needs at least 2 control points")]
    TooFewPoints,
    #[error("coordinates must be finite numbers")]
    NonFinitePoint,
    #[error("shape needs at least 3 vertices")]
    DegenerateShape,
    #[error("no curve is being edited")]
    NoActiveCurve,
}

#[derive(Clone, Copy, Debug)]
struct DragSession {
    start: Point,
    last: Point,
    significant: bool,
}

impl DragSession {
    fn new(at: Point) -> Self {
        Self {
            start: at,
            last: at,
            significant: false,
        }
    }

    /// Advances to a new pointer position, returning the screen delta since
    /// the previous one.
    fn advance(&mut self, to: Point) -> (f64, f64) {
        let dx = to.x - self.last.x;
        let dy = to.y - self.last.y;
        self.last = to;
        if self.start.distance(to) > DRAG_THRESHOLD_PX {
            self.significant = true;
        }
        (dx, dy)
    }
}

#[derive(Clone, Copy, Debug)]
enum PointerMode {
    Idle,
    Panning(DragSession),
    PointDragging {
        point_index: usize,
        session: DragSession,
    },
}

/// Host-visible view of the pointer state machine, for cursor feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerState {
    Idle,
    Panning,
    PointDragging,
}

#[derive(Clone, Copy, Debug)]
struct DragRelease {
    at_ms: f64,
    significant: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// The click added this world point to the active curve.
    PointAdded(Point),
    /// The click arrived in the cooldown window of a significant drag.
    Suppressed,
    /// Nothing to do: no active curve, or a non-finite position.
    Ignored,
}

/// All cross-event mutable state for one canvas: the transform, the curve
/// list plus active id, the shape list and the ephemeral drag session.
/// Every operation is synchronous; event callbacks feed pointer positions
/// (in canvas-local pixels) and timestamps in, pure state comes out.
pub struct Engine {
    pub viewport: Viewport,
    curves: Vec<Curve>,
    active_curve_id: Option<String>,
    shapes: Vec<Shape>,
    mode: PointerMode,
    last_release: Option<DragRelease>,
}

impl Engine {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            viewport: Viewport::new(width_px, height_px),
            curves: Vec::new(),
            active_curve_id: None,
            shapes: Vec::new(),
            mode: PointerMode::Idle,
            last_release: None,
        }
    }

    /// Resets the transform to default pan/scale; zoom and pan are not
    /// preserved across a container resize.
    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.viewport.resize(width_px, height_px);
        self.mode = PointerMode::Idle;
        self.last_release = None;
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Finalized curves only; drafts are excluded from this enumeration.
    pub fn committed_curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter().filter(|curve| !curve.is_draft)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn active_curve(&self) -> Option<&Curve> {
        let id = self.active_curve_id.as_deref()?;
        self.curves.iter().find(|curve| curve.id == id)
    }

    fn active_curve_mut(&mut self) -> Option<&mut Curve> {
        let id = self.active_curve_id.as_deref()?;
        self.curves.iter_mut().find(|curve| curve.id == id)
    }

    pub fn pointer_state(&self) -> PointerState {
        match self.mode {
            PointerMode::Idle => PointerState::Idle,
            PointerMode::Panning(_) => PointerState::Panning,
            PointerMode::PointDragging { .. } => PointerState::PointDragging,
        }
    }

    /// First control point of the active curve within `HIT_RADIUS_PX` of the
    /// screen position, in index order. Points of non-active curves are inert.
    pub fn hit_test(&self, screen: Point) -> Option<usize> {
        let curve = self.active_curve()?;
        curve
            .points
            .iter()
            .position(|point| self.viewport.to_screen(*point).distance(screen) <= HIT_RADIUS_PX)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let screen = match normalize_point(Point::new(x, y)) {
            Some(screen) => screen,
            None => return,
        };
        let session = DragSession::new(screen);
        self.mode = match self.hit_test(screen) {
            Some(point_index) => PointerMode::PointDragging {
                point_index,
                session,
            },
            None => PointerMode::Panning(session),
        };
    }

    /// Returns true when the move changed state and the surface needs a
    /// full repaint.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let screen = match normalize_point(Point::new(x, y)) {
            Some(screen) => screen,
            None => return false,
        };
        match self.mode {
            PointerMode::Idle => false,
            PointerMode::Panning(mut session) => {
                let (dx, dy) = session.advance(screen);
                self.mode = PointerMode::Panning(session);
                self.viewport.pan_by_screen_delta(dx, dy);
                true
            }
            PointerMode::PointDragging {
                point_index,
                mut session,
            } => {
                session.advance(screen);
                self.mode = PointerMode::PointDragging {
                    point_index,
                    session,
                };
                let world = self.viewport.to_world(screen).round_to_hundredths();
                if !world.is_finite() {
                    return false;
                }
                match self.active_curve_mut() {
                    Some(curve) => match curve.points.get_mut(point_index) {
                        Some(point) => {
                            *point = world;
                            true
                        }
                        None => false,
                    },
                    None => false,
                }
            }
        }
    }

    pub fn pointer_up(&mut self, now_ms: f64) {
        match std::mem::replace(&mut self.mode, PointerMode::Idle) {
            PointerMode::Idle => {}
            PointerMode::Panning(session) => {
                self.last_release = Some(DragRelease {
                    at_ms: now_ms,
                    significant: session.significant,
                });
            }
            PointerMode::PointDragging { .. } => {
                // Releasing a grabbed point fires a click too; it must never
                // read as a fresh add-point click.
                self.last_release = Some(DragRelease {
                    at_ms: now_ms,
                    significant: true,
                });
            }
        }
    }

    pub fn pointer_leave(&mut self, now_ms: f64) {
        self.pointer_up(now_ms);
    }

    /// Wheel-up (negative delta) zooms in, wheel-down zooms out. The zoom
    /// recenters on the viewport center, not the cursor.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if !delta_y.is_finite() || delta_y == 0.0 {
            return false;
        }
        if delta_y < 0.0 {
            self.viewport.zoom_in();
        } else {
            self.viewport.zoom_out();
        }
        true
    }

    /// Add-point semantics for a click at a canvas-local pixel position. The
    /// release record is consumed here so a swallowed drag-end click cannot
    /// leak suppression into the next genuine one.
    pub fn click(&mut self, x: f64, y: f64, now_ms: f64) -> ClickOutcome {
        if let Some(release) = self.last_release.take() {
            if release.significant && now_ms - release.at_ms <= CLICK_SUPPRESS_MS {
                return ClickOutcome::Suppressed;
            }
        }
        let screen = match normalize_point(Point::new(x, y)) {
            Some(screen) => screen,
            None => return ClickOutcome::Ignored,
        };
        if self.active_curve_id.is_none() {
            return ClickOutcome::Ignored;
        }
        let world = self.viewport.to_world(screen).round_to_hundredths();
        match self.active_curve_mut() {
            Some(curve) => {
                curve.points.push(world);
                ClickOutcome::PointAdded(world)
            }
            None => ClickOutcome::Ignored,
        }
    }

    /// Replaces the whole curve list. Non-finite control points are dropped
    /// and preview parameters clamped on the way in; an active id that is
    /// not present in the new list is discarded as stale.
    pub fn set_curves(&mut self, curves: Vec<Curve>, active_curve_id: Option<String>) {
        let mut adopted = Vec::with_capacity(curves.len());
        for mut curve in curves {
            curve.points.retain(|point| point.is_finite());
            curve.preview_parameter = curve
                .preview_parameter
                .filter(|t| t.is_finite())
                .map(|t| t.clamp(0.0, 1.0));
            adopted.push(curve);
        }
        self.curves = adopted;
        self.active_curve_id =
            active_curve_id.filter(|id| self.curves.iter().any(|curve| &curve.id == id));
        self.mode = PointerMode::Idle;
    }

    pub fn add_point_to_active(&mut self, world: Point) {
        let world = match normalize_point(world) {
            Some(world) => world,
            None => return,
        };
        if let Some(curve) = self.active_curve_mut() {
            curve.points.push(world);
        }
    }

    /// Finalizes the active draft. The kind's nominal point count is not
    /// checked here; see [`active_curve_hint`](Self::active_curve_hint).
    pub fn commit_active(&mut self) -> Result<(), EngineError> {
        let curve = match self.active_curve_mut() {
            Some(curve) => curve,
            None => return Err(EngineError::NoActiveCurve),
        };
        curve::validate_commit(curve)?;
        curve.is_draft = false;
        self.active_curve_id = None;
        Ok(())
    }

    /// Soft warning about the active curve's control-point count, surfaced
    /// to the host; never blocks a commit.
    pub fn active_curve_hint(&self) -> Option<String> {
        curve::point_count_hint(self.active_curve()?)
    }

    /// Drops the active curve wholesale when it is still a draft, otherwise
    /// just deactivates it. A no-op without an active curve.
    pub fn discard_active(&mut self) {
        let Some(id) = self.active_curve_id.take() else {
            return;
        };
        if let Some(index) = self
            .curves
            .iter()
            .position(|curve| curve.id == id && curve.is_draft)
        {
            self.curves.remove(index);
        }
    }

    /// Removes one control point. Refused (returns false) when the curve or
    /// index is unknown, or when the deletion would leave fewer than 2 points.
    pub fn delete_point(&mut self, curve_id: &str, index: usize) -> bool {
        let Some(curve) = self.curves.iter_mut().find(|curve| curve.id == curve_id) else {
            return false;
        };
        if curve.points.len() <= MIN_CURVE_POINTS || index >= curve.points.len() {
            return false;
        }
        curve.points.remove(index);
        true
    }

    pub fn set_preview_parameter(&mut self, curve_id: &str, t: f64) {
        if !t.is_finite() {
            return;
        }
        if let Some(curve) = self.curves.iter_mut().find(|curve| curve.id == curve_id) {
            curve.preview_parameter = Some(t.clamp(0.0, 1.0));
        }
    }

    pub fn draw_shape(
        &mut self,
        vertices: Vec<Point>,
        fill_color: String,
        border_color: String,
    ) -> Result<(), EngineError> {
        let shape = Shape::new(vertices, fill_color, border_color)?;
        self.shapes.push(shape);
        Ok(())
    }

    pub fn clear_shapes(&mut self) {
        self.shapes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveKind;

    fn draft(id: &str, points: Vec<Point>) -> Curve {
        Curve {
            id: id.to_string(),
            kind: CurveKind::Cubic,
            name: "bogen".to_string(),
            points,
            color: "#4a7de4".to_string(),
            is_draft: true,
            preview_parameter: None,
        }
    }

    fn committed(id: &str, points: Vec<Point>) -> Curve {
        let mut curve = draft(id, points);
        curve.is_draft = false;
        curve
    }

    fn engine_with_active(points: Vec<Point>) -> Engine {
        let mut engine = Engine::new(800.0, 600.0);
        engine.set_curves(vec![draft("c1", points)], Some("c1".to_string()));
        engine
    }

    #[test]
    fn small_jitter_before_click_still_adds_a_point() {
        // 3 px of movement stays below the significance threshold.
        let mut engine = engine_with_active(Vec::new());
        engine.pointer_down(400.0, 300.0);
        engine.pointer_move(403.0, 300.0);
        engine.pointer_up(1000.0);
        let outcome = engine.click(403.0, 300.0, 1010.0);
        assert!(matches!(outcome, ClickOutcome::PointAdded(_)));
        assert_eq!(engine.active_curve().unwrap().points.len(), 1);
    }

    #[test]
    fn click_right_after_a_real_pan_is_suppressed() {
        let mut engine = engine_with_active(Vec::new());
        engine.pointer_down(400.0, 300.0);
        engine.pointer_move(420.0, 300.0);
        engine.pointer_up(1000.0);
        assert_eq!(engine.click(420.0, 300.0, 1150.0), ClickOutcome::Suppressed);
        assert!(engine.active_curve().unwrap().points.is_empty());
    }

    #[test]
    fn suppression_expires_after_the_cooldown() {
        let mut engine = engine_with_active(Vec::new());
        engine.pointer_down(400.0, 300.0);
        engine.pointer_move(420.0, 300.0);
        engine.pointer_up(1000.0);
        let outcome = engine.click(420.0, 300.0, 1250.0);
        assert!(matches!(outcome, ClickOutcome::PointAdded(_)));
    }

    #[test]
    fn suppression_flag_does_not_leak_into_the_next_click() {
        let mut engine = engine_with_active(Vec::new());
        engine.pointer_down(400.0, 300.0);
        engine.pointer_move(420.0, 300.0);
        engine.pointer_up(1000.0);
        assert_eq!(engine.click(420.0, 300.0, 1100.0), ClickOutcome::Suppressed);
        let outcome = engine.click(420.0, 300.0, 1105.0);
        assert!(matches!(outcome, ClickOutcome::PointAdded(_)));
    }

    #[test]
    fn panning_moves_the_viewport() {
        let mut engine = Engine::new(800.0, 600.0);
        engine.pointer_down(400.0, 300.0);
        assert_eq!(engine.pointer_state(), PointerState::Panning);
        assert!(engine.pointer_move(450.0, 280.0));
        assert!((engine.viewport.pan.x - 1.0).abs() < 1e-9);
        assert!((engine.viewport.pan.y - 0.4).abs() < 1e-9);
        engine.pointer_up(0.0);
        assert_eq!(engine.pointer_state(), PointerState::Idle);
    }

    #[test]
    fn grabbing_a_point_enters_point_dragging() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        // World (0,0) sits at screen (400,300); 7 px away is inside the radius.
        engine.pointer_down(407.0, 300.0);
        assert_eq!(engine.pointer_state(), PointerState::PointDragging);
    }

    #[test]
    fn misses_outside_the_hit_radius_pan_instead() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        engine.pointer_down(409.0, 300.0);
        assert_eq!(engine.pointer_state(), PointerState::Panning);
    }

    #[test]
    fn hit_ties_go_to_the_lowest_index() {
        let engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(0.02, 0.0)]);
        assert_eq!(engine.hit_test(Point::new(400.5, 300.0)), Some(0));
    }

    #[test]
    fn points_of_non_active_curves_are_inert() {
        let mut engine = Engine::new(800.0, 600.0);
        engine.set_curves(
            vec![committed("c1", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])],
            None,
        );
        engine.pointer_down(400.0, 300.0);
        assert_eq!(engine.pointer_state(), PointerState::Panning);
    }

    #[test]
    fn dragging_a_point_snaps_to_hundredths() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        engine.pointer_down(400.0, 300.0);
        assert!(engine.pointer_move(433.3, 266.7));
        let point = engine.active_curve().unwrap().points[0];
        assert_eq!(point, Point::new(0.67, 0.67));
    }

    #[test]
    fn releasing_a_dragged_point_swallows_the_trailing_click() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        engine.pointer_down(400.0, 300.0);
        engine.pointer_move(500.0, 300.0);
        engine.pointer_up(1000.0);
        assert_eq!(engine.click(500.0, 300.0, 1050.0), ClickOutcome::Suppressed);
        assert_eq!(engine.active_curve().unwrap().points.len(), 2);
    }

    #[test]
    fn click_without_active_curve_is_ignored() {
        let mut engine = Engine::new(800.0, 600.0);
        assert_eq!(engine.click(100.0, 100.0, 0.0), ClickOutcome::Ignored);
    }

    #[test]
    fn delete_point_keeps_the_two_point_floor() {
        let mut engine = engine_with_active(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(engine.delete_point("c1", 1));
        assert!(!engine.delete_point("c1", 0));
        assert_eq!(engine.active_curve().unwrap().points.len(), 2);
    }

    #[test]
    fn delete_point_ignores_stale_references() {
        let mut engine = engine_with_active(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(!engine.delete_point("nope", 0));
        assert!(!engine.delete_point("c1", 3));
        assert_eq!(engine.active_curve().unwrap().points.len(), 3);
    }

    #[test]
    fn commit_finalizes_and_deactivates() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        engine.commit_active().unwrap();
        assert!(engine.active_curve().is_none());
        assert_eq!(engine.committed_curves().count(), 1);
    }

    #[test]
    fn commit_rejects_invalid_drafts_and_keeps_them_active() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0)]);
        assert_eq!(engine.commit_active(), Err(EngineError::TooFewPoints));
        assert!(engine.active_curve().is_some());
        assert_eq!(engine.committed_curves().count(), 0);
    }

    #[test]
    fn commit_without_active_curve_errors() {
        let mut engine = Engine::new(800.0, 600.0);
        assert_eq!(engine.commit_active(), Err(EngineError::NoActiveCurve));
    }

    #[test]
    fn discard_removes_drafts_and_spares_committed_curves() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0)]);
        engine.discard_active();
        assert!(engine.curves().is_empty());

        let mut engine = Engine::new(800.0, 600.0);
        engine.set_curves(
            vec![committed("c1", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])],
            Some("c1".to_string()),
        );
        engine.discard_active();
        assert_eq!(engine.curves().len(), 1);
        assert!(engine.active_curve().is_none());
    }

    #[test]
    fn discard_is_idempotent() {
        let mut engine = Engine::new(800.0, 600.0);
        engine.discard_active();
        engine.discard_active();
        assert!(engine.curves().is_empty());
    }

    #[test]
    fn set_curves_drops_stale_active_id() {
        let mut engine = Engine::new(800.0, 600.0);
        engine.set_curves(vec![draft("c1", Vec::new())], Some("ghost".to_string()));
        assert!(engine.active_curve().is_none());
    }

    #[test]
    fn set_curves_filters_non_finite_points_and_clamps_preview() {
        let mut engine = Engine::new(800.0, 600.0);
        let mut curve = draft(
            "c1",
            vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)],
        );
        curve.preview_parameter = Some(3.5);
        engine.set_curves(vec![curve], Some("c1".to_string()));
        let curve = engine.active_curve().unwrap();
        assert_eq!(curve.points.len(), 1);
        assert_eq!(curve.preview_parameter, Some(1.0));
    }

    #[test]
    fn preview_parameter_is_clamped_per_curve() {
        let mut engine = engine_with_active(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        engine.set_preview_parameter("c1", -0.5);
        assert_eq!(engine.active_curve().unwrap().preview_parameter, Some(0.0));
        engine.set_preview_parameter("c1", 0.25);
        assert_eq!(engine.active_curve().unwrap().preview_parameter, Some(0.25));
        engine.set_preview_parameter("ghost", 0.5);
        engine.set_preview_parameter("c1", f64::NAN);
        assert_eq!(engine.active_curve().unwrap().preview_parameter, Some(0.25));
    }

    #[test]
    fn shapes_are_append_only_with_bulk_clear() {
        let mut engine = Engine::new(800.0, 600.0);
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.5, 1.0),
        ];
        engine
            .draw_shape(triangle.clone(), "#fff".to_string(), "#000".to_string())
            .unwrap();
        engine
            .draw_shape(triangle, "#eee".to_string(), "#111".to_string())
            .unwrap();
        assert_eq!(engine.shapes().len(), 2);
        engine.clear_shapes();
        engine.clear_shapes();
        assert!(engine.shapes().is_empty());
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        let mut engine = Engine::new(800.0, 600.0);
        let result = engine.draw_shape(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            "#fff".to_string(),
            "#000".to_string(),
        );
        assert_eq!(result, Err(EngineError::DegenerateShape));
        assert!(engine.shapes().is_empty());
    }

    #[test]
    fn wheel_zooms_and_resize_resets() {
        use crate::viewport::DEFAULT_SCALE;

        let mut engine = Engine::new(800.0, 600.0);
        assert!(engine.wheel(-1.0));
        assert!(engine.viewport.scale > DEFAULT_SCALE);
        engine.pointer_down(0.0, 0.0);
        engine.resize(400.0, 400.0);
        assert_eq!(engine.viewport.scale, DEFAULT_SCALE);
        assert_eq!(engine.pointer_state(), PointerState::Idle);
        assert!(!engine.wheel(0.0));
    }
}
