mod controller;
mod dom;
mod palette;
mod render;

pub use controller::CanvasController;
