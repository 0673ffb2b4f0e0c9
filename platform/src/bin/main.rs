//! Handmade - platform executable
//!
//! Loads the game library, opens a window and runs the fixed-rate loop.
//!
//! # Usage
//!
//! ```bash
//! handmade
//! handmade --game target/debug/libhandmade_game.so
//! handmade --width 1280 --height 720 --update-hz 60
//! ```
//!
//! # Keyboard Shortcuts
//!
//! - WASD: Move
//! - Arrows: Action buttons
//! - P: Pause/Resume
//! - L: Record input, then loop it, then stop

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use handmade_core::config;
use handmade_core::reload::default_library_path;
use handmade_platform::{PlatformOptions, run};

#[derive(Parser)]
#[command(name = "handmade")]
#[command(author, version, about = "Handmade - hot-reloading game platform layer")]
struct Args {
    /// Game library to load and watch for rebuilds
    #[arg(long, value_name = "FILE")]
    game: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Back buffer width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Back buffer height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Game update rate in Hz (default: half the monitor refresh rate)
    #[arg(long)]
    update_hz: Option<f32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    if let Some(width) = args.width {
        config.video.width = width;
    }
    if let Some(height) = args.height {
        config.video.height = height;
    }
    if let Some(hz) = args.update_hz {
        config.video.game_update_hz = Some(hz);
    }

    let game_library = args
        .game
        .or_else(|| config.game.library_path.clone())
        .or_else(default_library_path)
        .context("could not determine the game library path")?;

    let temp_dir = std::env::temp_dir().join("handmade");
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("failed to create {}", temp_dir.display()))?;

    tracing::info!("Game library: {}", game_library.display());

    run(PlatformOptions {
        config,
        game_library,
        temp_dir,
    })
}
