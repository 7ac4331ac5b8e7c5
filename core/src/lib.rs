pub mod curve;
pub mod engine;
pub mod grid;
pub mod point;
pub mod shape;
pub mod viewport;

pub use curve::{Curve, CurveKind, CURVE_SEGMENTS, MIN_CURVE_POINTS};
pub use engine::{ClickOutcome, Engine, EngineError, PointerState};
pub use grid::{GridLayout, MIN_LABEL_SPACING_PX};
pub use point::Point;
pub use shape::Shape;
pub use viewport::{Viewport, DEFAULT_SCALE};
