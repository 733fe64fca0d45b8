//! Mouse state for camera orbiting.
//!
//! [`OrbitInput`] accumulates winit cursor, button and wheel events between
//! frames. Cursor motion only counts as drag while the left button is held.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of touchpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Default)]
pub struct OrbitInput {
    cursor: Option<Vec2>,
    dragging: bool,
    drag: Vec2,
    scroll: f32,
}

impl OrbitInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if self.dragging
            && let Some(previous) = self.cursor
        {
            self.drag += position - previous;
        }
        self.cursor = Some(position);
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
    }

    /// Forget the cursor so re-entry does not register as a jump.
    pub fn on_cursor_left(&mut self) {
        self.cursor = None;
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Drain the drag (pixels) and scroll (lines) accumulated since the last call.
    pub fn take(&mut self) -> (Vec2, f32) {
        (
            std::mem::take(&mut self.drag),
            std::mem::take(&mut self.scroll),
        )
    }
}
