//! Configuration sections with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    /// Initial control-panel values and optional extra primitives.
    pub scene: SceneConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub title: String,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Background color, linear RGBA.
    pub clear_color: [f32; 4],
    /// Directory of `<shader>.<vert|frag>.wgsl` files that override the
    /// built-in shaders and are re-read on reload.
    pub shader_dir: Option<PathBuf>,
    pub cull_back_faces: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Icosphere subdivision level (0..=8).
    pub tessellations: u32,
    /// Geometry color as 0-255 RGB.
    pub color: [u8; 3],
    /// One of `lambert`, `custom`, `planet`.
    pub shader: String,
    /// Noise frequency multiplier for the planet shader.
    pub chaos: f32,
    /// Ocean, land and mountain displacement.
    pub heights: [f32; 3],
    /// Animation speed multiplier.
    pub speed: f32,
    pub swap_colors: bool,
    pub show_cube: bool,
    pub show_square: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. "debug", "info,wgpu=warn").
    pub log_level: String,
    /// Seconds between frame-rate log lines; 0 disables them.
    pub stats_interval_secs: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Orbis".to_string(),
            vsync: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.2, 0.2, 1.0],
            shader_dir: None,
            cull_back_faces: true,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            tessellations: 5,
            color: [255, 0, 0],
            shader: "lambert".to_string(),
            chaos: 1.0,
            heights: [0.0, 0.05, 0.15],
            speed: 1.0,
            swap_colors: false,
            show_cube: false,
            show_square: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval_secs: 5.0,
        }
    }
}

/// `<platform config dir>/orbis`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("orbis"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there if it does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);

        if path.exists() {
            let config = Self::read(&path)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read `config.ron`; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
