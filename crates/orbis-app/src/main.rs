//! Orbis binary: loads `config.ron`, applies CLI overrides, starts logging and runs the window.
//!
//! `cargo run -p orbis-app -- --tessellations 6 --shader planet`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orbis_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone().map_or_else(default_config_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}, using ./orbis");
            PathBuf::from("orbis")
        }
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Some(log_file) =
        orbis_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        info!("Writing JSON log to {}", log_file.display());
    }
    info!(
        "Orbis starting: {}x{}, tessellations {}, shader {}",
        config.window.width, config.window.height, config.scene.tessellations, config.scene.shader
    );

    match orbis_app::run(config, config_dir, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Orbis exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}
