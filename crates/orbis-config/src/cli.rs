//! Command-line overrides.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orbis command-line arguments. Values given here win over `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orbis", about = "Procedural icosphere and planet shader demo")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial icosphere subdivision level (0-8).
    #[arg(long)]
    pub tessellations: Option<u32>,

    /// Initial shader (lambert, custom, planet).
    #[arg(long)]
    pub shader: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(t) = args.tessellations {
            self.scene.tessellations = t;
        }
        if let Some(ref shader) = args.shader {
            self.scene.shader = shader.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "orbis",
            "--tessellations",
            "3",
            "--shader",
            "planet",
            "--config",
            "/tmp/orbis",
        ]);
        assert_eq!(args.tessellations, Some(3));
        assert_eq!(args.shader.as_deref(), Some("planet"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/orbis")));
        assert_eq!(args.width, None);
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            shader: Some("custom".to_string()),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.scene.shader, "custom");
        assert_eq!(config.window.height, 720);
        assert_eq!(config.scene.tessellations, 5);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
