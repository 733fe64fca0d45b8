//! The live parameter record and the keyboard panel that edits it.
//!
//! [`Controls`] holds every value the render loop reads each frame. All
//! mutators clamp to the documented ranges. [`ControlPanel`] maps key
//! presses onto those mutators and queues one-shot requests (load scene,
//! reload shaders, quit) that the loop drains with the `take_*` methods.

use std::ops::RangeInclusive;

use glam::{Vec3, Vec4};
use orbis_config::SceneConfig;
use orbis_geometry::MAX_SUBDIVISIONS;
use orbis_render::{FrameParams, ShaderKind};
use tracing::{info, warn};
use winit::keyboard::KeyCode;

pub const TESSELLATION_RANGE: RangeInclusive<u32> = 0..=MAX_SUBDIVISIONS;
pub const CHAOS_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const HEIGHT_RANGE: RangeInclusive<f32> = -0.5..=0.5;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.0..=10.0;

const CHAOS_STEP: f32 = 0.1;
const HEIGHT_STEP: f32 = 0.01;
const SPEED_STEP: f32 = 0.1;
const COLOR_STEP: u8 = 15;

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

/// Displacement band selected by `J`, `K` and `L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightBand {
    Ocean = 0,
    Land = 1,
    Mountain = 2,
}

/// Values shared between the control panel and the render loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub tessellations: u32,
    /// 0-255 RGB.
    pub color: [u8; 3],
    pub shader: ShaderKind,
    pub chaos: f32,
    /// Ocean, land and mountain displacement.
    pub heights: [f32; 3],
    pub speed: f32,
    pub swap_colors: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            tessellations: 5,
            color: [255, 0, 0],
            shader: ShaderKind::Lambert,
            chaos: 1.0,
            heights: [0.0, 0.05, 0.15],
            speed: 1.0,
            swap_colors: false,
        }
    }
}

impl Controls {
    /// Seed from the configured scene, clamping out-of-range values.
    /// An unknown shader name falls back to lambert.
    pub fn from_scene(scene: &SceneConfig) -> Self {
        let shader = scene.shader.parse::<ShaderKind>().unwrap_or_else(|e| {
            warn!("{e}, using {}", ShaderKind::Lambert);
            ShaderKind::Lambert
        });

        let mut controls = Self {
            shader,
            color: scene.color,
            swap_colors: scene.swap_colors,
            ..Self::default()
        };
        controls.set_tessellations(scene.tessellations);
        controls.set_chaos(scene.chaos);
        controls.set_speed(scene.speed);
        for (band, value) in [HeightBand::Ocean, HeightBand::Land, HeightBand::Mountain]
            .into_iter()
            .zip(scene.heights)
        {
            controls.set_height(band, value);
        }
        controls
    }

    pub fn set_tessellations(&mut self, level: u32) {
        self.tessellations = level.min(*TESSELLATION_RANGE.end());
    }

    pub fn adjust_tessellations(&mut self, delta: i32) {
        let level = self.tessellations.saturating_add_signed(delta);
        self.set_tessellations(level);
    }

    pub fn set_chaos(&mut self, chaos: f32) {
        self.chaos = clamp_to(chaos, &CHAOS_RANGE);
    }

    pub fn set_height(&mut self, band: HeightBand, value: f32) {
        self.heights[band as usize] = clamp_to(value, &HEIGHT_RANGE);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_to(speed, &SPEED_RANGE);
    }

    /// Raise or lower one channel (0 = red, 1 = green, 2 = blue), saturating at 0 and 255.
    pub fn adjust_color(&mut self, channel: usize, raise: bool) {
        let Some(value) = self.color.get_mut(channel) else {
            return;
        };
        *value = if raise {
            value.saturating_add(COLOR_STEP)
        } else {
            value.saturating_sub(COLOR_STEP)
        };
    }

    /// Color as RGBA in `[0, 1]` with alpha 1.
    pub fn color_vec4(&self) -> Vec4 {
        let [r, g, b] = self.color.map(|c| f32::from(c) / 255.0);
        Vec4::new(r, g, b, 1.0)
    }

    pub fn heights_vec3(&self) -> Vec3 {
        Vec3::from_array(self.heights)
    }

    /// Frame uniforms for the current values at animation time `time`.
    pub fn frame_params(&self, time: f32) -> FrameParams {
        FrameParams {
            color: self.color_vec4(),
            time,
            chaos: self.chaos,
            heights: self.heights_vec3(),
            swap_colors: self.swap_colors,
        }
    }
}

/// Keyboard front end over a [`Controls`] record.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    controls: Controls,
    load_scene: bool,
    reload_shaders: bool,
    quit: bool,
}

impl ControlPanel {
    pub fn new(controls: Controls) -> Self {
        Self {
            controls,
            ..Self::default()
        }
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    /// Apply one key press. Returns `false` for unbound keys.
    pub fn handle_key(&mut self, key: KeyCode, shift: bool) -> bool {
        let c = &mut self.controls;
        match key {
            KeyCode::ArrowUp => c.adjust_tessellations(1),
            KeyCode::ArrowDown => c.adjust_tessellations(-1),
            KeyCode::Digit1 => c.shader = ShaderKind::Lambert,
            KeyCode::Digit2 => c.shader = ShaderKind::Custom,
            KeyCode::Digit3 => c.shader = ShaderKind::Planet,
            KeyCode::Tab => c.shader = c.shader.next(),
            KeyCode::KeyR => c.adjust_color(0, !shift),
            KeyCode::KeyG => c.adjust_color(1, !shift),
            KeyCode::KeyB => c.adjust_color(2, !shift),
            KeyCode::BracketLeft => c.set_chaos(c.chaos - CHAOS_STEP),
            KeyCode::BracketRight => c.set_chaos(c.chaos + CHAOS_STEP),
            KeyCode::KeyZ => c.set_speed(c.speed - SPEED_STEP),
            KeyCode::KeyX => c.set_speed(c.speed + SPEED_STEP),
            KeyCode::KeyJ => nudge_height(c, HeightBand::Ocean, shift),
            KeyCode::KeyK => nudge_height(c, HeightBand::Land, shift),
            KeyCode::KeyL => nudge_height(c, HeightBand::Mountain, shift),
            KeyCode::KeyS => c.swap_colors = !c.swap_colors,
            KeyCode::Enter | KeyCode::NumpadEnter => {
                self.load_scene = true;
                info!("Load scene requested");
                return true;
            }
            KeyCode::F5 => {
                self.reload_shaders = true;
                info!("Shader reload requested");
                return true;
            }
            KeyCode::Escape => {
                self.quit = true;
                return true;
            }
            _ => return false,
        }
        info!(key = ?key, controls = ?self.controls, "Controls changed");
        true
    }

    /// Whether a scene load was requested since the last call.
    pub fn take_load_scene(&mut self) -> bool {
        std::mem::take(&mut self.load_scene)
    }

    pub fn take_reload_shaders(&mut self) -> bool {
        std::mem::take(&mut self.reload_shaders)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

fn nudge_height(controls: &mut Controls, band: HeightBand, lower: bool) {
    let step = if lower { -HEIGHT_STEP } else { HEIGHT_STEP };
    controls.set_height(band, controls.heights[band as usize] + step);
}
