//! Configuration for Orbis.
//!
//! Settings persist to `config.ron` in the user's config directory, load
//! with defaults for any missing field, and accept command-line overrides.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RenderConfig, SceneConfig, WindowConfig, default_config_dir};
pub use error::ConfigError;
