// SPDX-License-Identifier: MPL-2.0

// Without `playback` only config and source checks run; the pipeline is
// still built so its tests cover the loop.
#[cfg_attr(not(feature = "playback"), allow(dead_code))]
mod desktop;
#[cfg_attr(not(feature = "playback"), allow(dead_code))]
mod error;
#[cfg_attr(not(feature = "playback"), allow(dead_code, unused_imports))]
mod media;
#[cfg_attr(not(feature = "playback"), allow(dead_code))]
mod present;
#[cfg_attr(not(feature = "playback"), allow(dead_code))]
mod wallpaper;

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vidpaper_config::Config;

use crate::wallpaper::PlaybackOptions;

#[derive(Debug, Parser)]
#[command(name = "vidpaper")]
#[command(about = "Play a video as the desktop wallpaper")]
struct Cli {
    /// Video file path or URI. Overrides the configured source.
    source: Option<String>,

    /// Frames per second used for the fixed delay between frames.
    #[arg(long)]
    frame_rate: Option<u32>,

    /// Read configuration from this file instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective configuration back before playing.
    #[arg(long)]
    save: bool,
}

fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidpaper=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|err| {
        error!(%err, "Config file error, falling back to defaults");
        Config::default()
    });

    if let Some(source) = &cli.source {
        config.source = Some(PathBuf::from(source));
    }
    if let Some(rate) = cli.frame_rate {
        config.frame_rate = rate;
    }

    if cli.save {
        match cli.config.clone().or_else(Config::path) {
            Some(path) => {
                config.save_to(&path)?;
                info!(path = %path.display(), "Saved configuration");
            }
            None => error!("No configuration directory, not saving"),
        }
    }

    let Some(source) = config.source.as_ref().map(|p| p.to_string_lossy().into_owned()) else {
        error!("No video source given on the command line or in the configuration");
        return Ok(ExitCode::FAILURE);
    };

    media::detection::inspect_source(&source);
    let options = PlaybackOptions::from(&config);

    run(&source, &options)
}

#[cfg(feature = "playback")]
fn run(source: &str, options: &PlaybackOptions) -> eyre::Result<ExitCode> {
    let mut backend = wallpaper::NativeBackend::init()?;

    match wallpaper::set_video(&mut backend, source, options) {
        Ok(stats) => {
            info!(?stats, "Wallpaper closed");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(%err, "Failed to play video wallpaper");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(not(feature = "playback"))]
fn run(source: &str, _options: &PlaybackOptions) -> eyre::Result<ExitCode> {
    error!(source, "Built without the `playback` feature, cannot play video");
    Ok(ExitCode::FAILURE)
}
