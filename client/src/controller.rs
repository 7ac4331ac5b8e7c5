use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent,
};

use curveboard_core::{ClickOutcome, Curve, Engine, Point};

use crate::dom::{event_position, get_element, set_canvas_cursor};
use crate::render::redraw;

type Listener = (&'static str, Closure<dyn FnMut(Event)>);

struct Surface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    listeners: Vec<Listener>,
}

struct Inner {
    engine: Engine,
    surface: Option<Surface>,
}

impl Inner {
    fn redraw(&self) {
        if let Some(surface) = &self.surface {
            redraw(&surface.ctx, &self.engine);
        }
    }

    fn sync_cursor(&self) {
        if let Some(surface) = &self.surface {
            set_canvas_cursor(
                &surface.canvas,
                self.engine.pointer_state(),
                self.engine.active_curve().is_some(),
            );
        }
    }

    fn unbind(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        for (name, closure) in &surface.listeners {
            let _ = surface
                .canvas
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShapePayload {
    vertices: Vec<Point>,
    fill_color: String,
    border_color: String,
}

/// One canvas, one controller. The hosting component constructs it, calls
/// `initialize` with the canvas element id, and from then on feeds the
/// editing API; pointer and wheel events are handled internally.
#[wasm_bindgen]
pub struct CanvasController {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl CanvasController {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CanvasController {
        console_error_panic_hook::set_once();
        CanvasController {
            inner: Rc::new(RefCell::new(Inner {
                engine: Engine::new(0.0, 0.0),
                surface: None,
            })),
        }
    }

    /// Binds the controller to a canvas and installs pointer/wheel/click
    /// listeners. Re-initialization removes the previous bindings first, so
    /// repeated calls never stack listeners. On failure the controller is
    /// left unbound and every drawing call becomes a no-op.
    pub fn initialize(
        &self,
        canvas_id: &str,
        width_px: f64,
        height_px: f64,
    ) -> Result<(), JsValue> {
        self.inner.borrow_mut().unbind();

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("Missing document"))?;
        let canvas: HtmlCanvasElement = get_element(&document, canvas_id)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        canvas.set_width(width_px.max(0.0) as u32);
        canvas.set_height(height_px.max(0.0) as u32);

        let listeners = install_listeners(&self.inner, &canvas)?;
        let mut inner = self.inner.borrow_mut();
        inner.engine.resize(width_px, height_px);
        inner.surface = Some(Surface {
            canvas,
            ctx,
            listeners,
        });
        inner.redraw();
        inner.sync_cursor();
        Ok(())
    }

    /// Externally triggered by the host; resets the transform to default
    /// pan/scale (zoom and pan are not preserved across a resize).
    pub fn resize(&self, width_px: f64, height_px: f64) {
        let mut inner = self.inner.borrow_mut();
        if let Some(surface) = &inner.surface {
            surface.canvas.set_width(width_px.max(0.0) as u32);
            surface.canvas.set_height(height_px.max(0.0) as u32);
        }
        inner.engine.resize(width_px, height_px);
        inner.redraw();
    }

    /// Replaces the curve list from a JSON array; `active_curve_id` marks at
    /// most one curve as editable.
    pub fn set_curves(
        &self,
        curves_json: &str,
        active_curve_id: Option<String>,
    ) -> Result<(), JsValue> {
        let curves: Vec<Curve> = serde_json::from_str(curves_json).map_err(|error| {
            web_sys::console::warn_1(&format!("set_curves: bad payload: {error}").into());
            JsValue::from_str(&error.to_string())
        })?;
        let mut inner = self.inner.borrow_mut();
        inner.engine.set_curves(curves, active_curve_id);
        inner.redraw();
        inner.sync_cursor();
        Ok(())
    }

    pub fn add_point_to_active_curve(&self, x: f64, y: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.add_point_to_active(Point::new(x, y));
        inner.redraw();
    }

    pub fn commit_active_curve(&self) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        inner
            .engine
            .commit_active()
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        inner.redraw();
        inner.sync_cursor();
        Ok(())
    }

    /// Soft warning about the active curve's point count, or null. Commits
    /// are never blocked by this.
    pub fn active_curve_hint(&self) -> Option<String> {
        self.inner.borrow().engine.active_curve_hint()
    }

    pub fn discard_active_curve(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.discard_active();
        inner.redraw();
        inner.sync_cursor();
    }

    pub fn delete_point(&self, curve_id: &str, index: u32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let deleted = inner.engine.delete_point(curve_id, index as usize);
        if deleted {
            inner.redraw();
        }
        deleted
    }

    pub fn set_preview_parameter(&self, curve_id: &str, t: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.set_preview_parameter(curve_id, t);
        inner.redraw();
    }

    /// Appends a closed polygon from a JSON payload with `vertices`,
    /// `fillColor` and `borderColor`.
    pub fn draw_shape(&self, shape_json: &str) -> Result<(), JsValue> {
        let payload: ShapePayload = serde_json::from_str(shape_json).map_err(|error| {
            web_sys::console::warn_1(&format!("draw_shape: bad payload: {error}").into());
            JsValue::from_str(&error.to_string())
        })?;
        let mut inner = self.inner.borrow_mut();
        inner
            .engine
            .draw_shape(payload.vertices, payload.fill_color, payload.border_color)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        inner.redraw();
        Ok(())
    }

    pub fn clear_shapes(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.engine.clear_shapes();
        inner.redraw();
    }

    /// The full curve list, drafts included, as JSON for the host.
    pub fn curves_json(&self) -> String {
        serde_json::to_string(self.inner.borrow().engine.curves())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Committed curves only; drafts are excluded from this enumeration.
    pub fn committed_curves_json(&self) -> String {
        let inner = self.inner.borrow();
        let committed: Vec<&Curve> = inner.engine.committed_curves().collect();
        serde_json::to_string(&committed).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new()
    }
}

fn install_listeners(
    inner: &Rc<RefCell<Inner>>,
    canvas: &HtmlCanvasElement,
) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            if event.button() != 0 {
                return;
            }
            event.prevent_default();
            let mut inner = state.borrow_mut();
            let Some(surface) = inner.surface.as_ref() else {
                return;
            };
            let Some((x, y)) = event_position(&surface.canvas, event) else {
                return;
            };
            inner.engine.pointer_down(x, y);
            inner.sync_cursor();
        });
        canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        listeners.push(("pointerdown", closure));
    }

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let mut inner = state.borrow_mut();
            let Some(surface) = inner.surface.as_ref() else {
                return;
            };
            let Some((x, y)) = event_position(&surface.canvas, event) else {
                return;
            };
            if inner.engine.pointer_move(x, y) {
                inner.redraw();
            }
        });
        canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        listeners.push(("pointermove", closure));
    }

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let mut inner = state.borrow_mut();
            inner.engine.pointer_up(event.time_stamp());
            inner.sync_cursor();
        });
        canvas.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
        listeners.push(("pointerup", closure));
    }

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let mut inner = state.borrow_mut();
            inner.engine.pointer_leave(event.time_stamp());
            inner.sync_cursor();
        });
        canvas.add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref())?;
        listeners.push(("pointerleave", closure));
    }

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut inner = state.borrow_mut();
            let Some(surface) = inner.surface.as_ref() else {
                return;
            };
            let Some((x, y)) = event_position(&surface.canvas, event) else {
                return;
            };
            match inner.engine.click(x, y, event.time_stamp()) {
                ClickOutcome::PointAdded(_) => inner.redraw(),
                ClickOutcome::Suppressed | ClickOutcome::Ignored => {}
            }
        });
        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        listeners.push(("click", closure));
    }

    {
        let state = inner.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            let mut inner = state.borrow_mut();
            if inner.engine.wheel(event.delta_y()) {
                inner.redraw();
            }
        });
        canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
        listeners.push(("wheel", closure));
    }

    Ok(listeners)
}
