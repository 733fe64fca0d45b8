//! The Orbis application: control-panel state, input, frame timing and the winit event loop.

pub mod app;
pub mod clock;
pub mod controls;
pub mod input;
pub mod scene;
pub mod stats;

pub use app::{AppError, AppState, FrameStep, run, step_frame};
pub use controls::{ControlPanel, Controls};
