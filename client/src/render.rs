use web_sys::CanvasRenderingContext2d;

use curveboard_core::curve::{construction_levels, de_casteljau, sample};
use curveboard_core::grid::{axis_anchor, grid_lines};
use curveboard_core::{Curve, CurveKind, Engine, Point, Viewport, CURVE_SEGMENTS};

use crate::palette::level_color;

const GRID_COLOR: &str = "#e3e3e3";
const AXIS_COLOR: &str = "#8a8a8a";
const LABEL_COLOR: &str = "#6b6b6b";
const HANDLE_COLOR: &str = "#1a1f2a";
const PREVIEW_COLOR: &str = "#d43d3d";
const HANDLE_RADIUS: f64 = 4.0;
const PREVIEW_RADIUS: f64 = 5.0;

/// Full repaint: clear, grid, axes, shapes, curves, active-curve overlay.
pub fn redraw(ctx: &CanvasRenderingContext2d, engine: &Engine) {
    let viewport = &engine.viewport;
    ctx.clear_rect(0.0, 0.0, viewport.width_px, viewport.height_px);
    draw_grid(ctx, viewport);
    draw_axes(ctx, viewport);
    for shape in engine.shapes() {
        draw_shape(ctx, viewport, shape);
    }
    let active_id = engine.active_curve().map(|curve| curve.id.clone());
    for curve in engine.curves() {
        let is_active = active_id.as_deref() == Some(curve.id.as_str());
        draw_curve(ctx, viewport, curve, is_active);
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    let layout = grid_lines(viewport);
    let anchor = axis_anchor(viewport);
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0);
    ctx.set_fill_style_str(LABEL_COLOR);
    ctx.set_font("11px sans-serif");

    for world_x in &layout.vertical {
        let x = viewport.to_screen(Point::new(*world_x, 0.0)).x;
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, viewport.height_px);
        ctx.stroke();
        let label_y = anchor.y.max(12.0).min(viewport.height_px - 4.0);
        let _ = ctx.fill_text(&format!("{world_x}"), x + 3.0, label_y - 3.0);
    }
    for world_y in &layout.horizontal {
        let y = viewport.to_screen(Point::new(0.0, *world_y)).y;
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(viewport.width_px, y);
        ctx.stroke();
        let label_x = anchor.x.max(3.0).min(viewport.width_px - 28.0);
        let _ = ctx.fill_text(&format!("{world_y}"), label_x + 3.0, y - 3.0);
    }
}

fn draw_axes(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    let origin = viewport.to_screen(Point::default());
    ctx.set_stroke_style_str(AXIS_COLOR);
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(origin.x, 0.0);
    ctx.line_to(origin.x, viewport.height_px);
    ctx.move_to(0.0, origin.y);
    ctx.line_to(viewport.width_px, origin.y);
    ctx.stroke();
}

fn draw_shape(
    ctx: &CanvasRenderingContext2d,
    viewport: &Viewport,
    shape: &curveboard_core::Shape,
) {
    ctx.set_fill_style_str(&shape.fill_color);
    ctx.set_stroke_style_str(&shape.border_color);
    ctx.set_line_width(1.5);
    ctx.begin_path();
    trace_polyline(ctx, viewport, &shape.vertices);
    ctx.close_path();
    ctx.fill();
    ctx.stroke();
}

fn draw_curve(ctx: &CanvasRenderingContext2d, viewport: &Viewport, curve: &Curve, active: bool) {
    let rendered = match curve.kind {
        CurveKind::Polyline => curve.points.clone(),
        _ => sample(&curve.points, CURVE_SEGMENTS),
    };
    if rendered.len() >= 2 {
        ctx.set_stroke_style_str(&curve.color);
        ctx.set_line_width(2.0);
        ctx.begin_path();
        trace_polyline(ctx, viewport, &rendered);
        ctx.stroke();
    }
    if active {
        draw_edit_overlay(ctx, viewport, curve);
    }
}

/// Dashed control polygon, point handles, per-level construction lines and
/// the evaluated preview point of the curve under edit.
fn draw_edit_overlay(ctx: &CanvasRenderingContext2d, viewport: &Viewport, curve: &Curve) {
    if curve.points.len() >= 2 && curve.kind != CurveKind::Polyline {
        ctx.set_stroke_style_str("rgba(26, 31, 42, 0.35)");
        ctx.set_line_width(1.0);
        let _ = ctx.set_line_dash(&js_sys::Array::of2(&4.into(), &6.into()));
        ctx.begin_path();
        trace_polyline(ctx, viewport, &curve.points);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    if let Some(t) = curve.preview_parameter {
        for (level, points) in construction_levels(&curve.points, t).iter().enumerate() {
            let color = level_color(level);
            if points.len() >= 2 {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                trace_polyline(ctx, viewport, points);
                ctx.stroke();
            }
            for point in points {
                draw_dot(ctx, viewport, *point, color, 2.5);
            }
        }
        if let Some(position) = de_casteljau(&curve.points, t) {
            draw_dot(ctx, viewport, position, PREVIEW_COLOR, PREVIEW_RADIUS);
        }
    }

    for point in &curve.points {
        draw_handle(ctx, viewport, *point);
    }
}

fn trace_polyline(ctx: &CanvasRenderingContext2d, viewport: &Viewport, points: &[Point]) {
    let mut first = true;
    for point in points {
        let screen = viewport.to_screen(*point);
        if first {
            ctx.move_to(screen.x, screen.y);
            first = false;
        } else {
            ctx.line_to(screen.x, screen.y);
        }
    }
}

fn draw_dot(
    ctx: &CanvasRenderingContext2d,
    viewport: &Viewport,
    world: Point,
    color: &str,
    radius: f64,
) {
    let screen = viewport.to_screen(world);
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    let _ = ctx.arc(screen.x, screen.y, radius, 0.0, std::f64::consts::PI * 2.0);
    ctx.fill();
}

fn draw_handle(ctx: &CanvasRenderingContext2d, viewport: &Viewport, world: Point) {
    let screen = viewport.to_screen(world);
    ctx.set_fill_style_str(HANDLE_COLOR);
    ctx.begin_path();
    let _ = ctx.arc(screen.x, screen.y, HANDLE_RADIUS, 0.0, std::f64::consts::PI * 2.0);
    ctx.fill();
    ctx.set_stroke_style_str("#ffffff");
    ctx.set_line_width(1.5);
    ctx.begin_path();
    let _ = ctx.arc(screen.x, screen.y, HANDLE_RADIUS, 0.0, std::f64::consts::PI * 2.0);
    ctx.stroke();
}
