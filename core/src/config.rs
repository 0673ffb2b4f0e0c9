//! Configuration management (`config.toml` in the platform config directory)
//!
//! Every field has a default, so a missing or partial file is never an error
//! for [`load`]. Use [`load_from`] when a parse error should be reported.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Platform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlatformConfig {
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Window and back buffer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Back buffer width in pixels (default: 960)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Back buffer height in pixels (default: 540)
    #[serde(default = "default_height")]
    pub height: u32,
    /// Refresh rate assumed when the monitor doesn't report one (default: 60)
    #[serde(default = "default_refresh")]
    pub monitor_refresh_hz: u32,
    /// Fixed logic rate; half the monitor refresh when unset
    #[serde(default)]
    pub game_update_hz: Option<f32>,
}

/// Sound output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_samples_per_second")]
    pub samples_per_second: u32,
    /// Length of the device ring (default: 1 second)
    #[serde(default = "default_buffer_seconds")]
    pub buffer_seconds: f32,
    /// Safety margin as a fraction of one frame's bytes (default: 1/3)
    #[serde(default = "default_safety_fraction")]
    pub safety_frame_fraction: f32,
}

/// Game memory sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_permanent_megabytes")]
    pub permanent_megabytes: u32,
    #[serde(default = "default_transient_megabytes")]
    pub transient_megabytes: u32,
}

/// Game module location and reload behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Library to load; next to the executable when unset
    #[serde(default)]
    pub library_path: Option<PathBuf>,
    /// Watch the library for rebuilds (default: true)
    #[serde(default = "default_true")]
    pub poll_reload: bool,
}

/// Frame pacing behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_true")]
    pub sleep_is_granular: bool,
    #[serde(default = "default_true")]
    pub spin_wait: bool,
}

/// Debug aids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Draw audio cursor markers over the game (default: false)
    #[serde(default)]
    pub sync_display: bool,
    /// Number of frames of cursor history kept (default: 15)
    #[serde(default = "default_time_marks")]
    pub time_mark_count: usize,
    /// Where input recordings go; the data directory when unset
    #[serde(default)]
    pub replay_dir: Option<PathBuf>,
}

fn default_width() -> u32 {
    960
}
fn default_height() -> u32 {
    540
}
fn default_refresh() -> u32 {
    60
}
fn default_samples_per_second() -> u32 {
    48_000
}
fn default_buffer_seconds() -> f32 {
    1.0
}
fn default_safety_fraction() -> f32 {
    1.0 / 3.0
}
fn default_permanent_megabytes() -> u32 {
    64
}
fn default_transient_megabytes() -> u32 {
    64
}
fn default_time_marks() -> usize {
    15
}
fn default_true() -> bool {
    true
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            monitor_refresh_hz: default_refresh(),
            game_update_hz: None,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            samples_per_second: default_samples_per_second(),
            buffer_seconds: default_buffer_seconds(),
            safety_frame_fraction: default_safety_fraction(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            permanent_megabytes: default_permanent_megabytes(),
            transient_megabytes: default_transient_megabytes(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            poll_reload: default_true(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sleep_is_granular: default_true(),
            spin_wait: default_true(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            sync_display: false,
            time_mark_count: default_time_marks(),
            replay_dir: None,
        }
    }
}

impl VideoConfig {
    /// Logic rate for a monitor refreshing at `monitor_refresh_hz`.
    pub fn game_update_hz(&self, monitor_refresh_hz: Option<u32>) -> f32 {
        self.game_update_hz.unwrap_or_else(|| {
            monitor_refresh_hz.unwrap_or(self.monitor_refresh_hz).max(2) as f32 / 2.0
        })
    }
}

impl MemoryConfig {
    pub fn permanent_bytes(&self) -> usize {
        self.permanent_megabytes as usize * 1024 * 1024
    }

    pub fn transient_bytes(&self) -> usize {
        self.transient_megabytes as usize * 1024 * 1024
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io.handmade", "", "Handmade")
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory, used for input recordings.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path of the default config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from disk, falling back to defaults.
pub fn load() -> PlatformConfig {
    match config_path() {
        Some(path) if path.exists() => load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("{}, using defaults", e);
            PlatformConfig::default()
        }),
        _ => PlatformConfig::default(),
    }
}

/// Loads the configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<PlatformConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Saves the configuration to the default location.
pub fn save(config: &PlatformConfig) -> Result<(), ConfigError> {
    match config_path() {
        Some(path) => save_to(config, &path),
        None => Ok(()),
    }
}

/// Saves the configuration to `path`, creating parent directories.
pub fn save_to(config: &PlatformConfig, path: &Path) -> Result<(), ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)
}
