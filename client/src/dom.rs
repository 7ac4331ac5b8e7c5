use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, MouseEvent};

use curveboard_core::PointerState;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

/// Pointer position in canvas-local pixels, or None while the canvas has no
/// layout box yet.
pub fn event_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Option<(f64, f64)> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    Some((
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    ))
}

pub fn set_canvas_cursor(canvas: &HtmlCanvasElement, state: PointerState, editing: bool) {
    let cursor = match state {
        PointerState::Panning => "grabbing",
        PointerState::PointDragging => "move",
        PointerState::Idle => {
            if editing {
                "crosshair"
            } else {
                "grab"
            }
        }
    };
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor);
    }
}
