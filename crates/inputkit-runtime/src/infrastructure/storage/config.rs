//! TOML-based configuration persistence for the runtime.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\InputKit\config.toml`
//! - Linux:    `~/.config/inputkit/config.toml`
//! - macOS:    `~/Library/Application Support/InputKit/config.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  Example:
//!
//! ```toml
//! [runtime]
//! log_level = "debug"
//! frame_rate = 60
//!
//! [input]
//! stick_deadzone = 0.4
//! key_bindings = [
//!     { key = "Enter", button = "A" },
//!     { key = "Escape", button = "B" },
//! ]
//!
//! [animation]
//! shake_seed = 42
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, and every
//! section is itself optional.  A missing file behaves exactly like an empty
//! one.
//!
//! # Raw values vs runtime settings
//!
//! `AppConfig` mirrors the file one-to-one and accepts any number.
//! [`AppConfig::runtime_settings`] validates it and converts it into the
//! typed values (durations, keyboard mapping, focus settings) the frame loop
//! consumes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use inputkit_core::{FocusSettings, KeyBinding, KeyboardMapping};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::frame::FrameSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed fine but is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Frame loop and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Length of the headless demo session, in frames.
    #[serde(default = "default_demo_frames")]
    pub demo_frames: u32,
}

/// Controller and keyboard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Left-stick deflection at which it starts acting as a D-pad.
    #[serde(default = "default_stick_deadzone")]
    pub stick_deadzone: f32,
    /// Whether keyboard keys are mapped onto controller buttons.
    #[serde(default = "default_true")]
    pub keyboard_enabled: bool,
    /// Overrides the built-in keyboard mapping.  Empty keeps the built-in one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_bindings: Vec<KeyBinding>,
}

/// Focus highlight settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimationConfig {
    #[serde(default = "default_highlight_duration_ms")]
    pub highlight_duration_ms: u64,
    /// Fixes the shake amplitudes for reproducible sessions.  Absent means a
    /// clock-derived seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shake_seed: Option<u64>,
}

/// Background task loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasksConfig {
    #[serde(default = "default_async_poll_interval_ms")]
    pub async_poll_interval_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_frame_rate() -> u32 {
    60
}
fn default_demo_frames() -> u32 {
    180
}
fn default_stick_deadzone() -> f32 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_highlight_duration_ms() -> u64 {
    100
}
fn default_async_poll_interval_ms() -> u64 {
    500
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            frame_rate: default_frame_rate(),
            demo_frames: default_demo_frames(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            stick_deadzone: default_stick_deadzone(),
            keyboard_enabled: default_true(),
            key_bindings: Vec::new(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            highlight_duration_ms: default_highlight_duration_ms(),
            shake_seed: None,
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self { async_poll_interval_ms: default_async_poll_interval_ms() }
    }
}

// ── Runtime settings ──────────────────────────────────────────────────────────

/// Validated, typed view of [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub frame_interval: Duration,
    pub demo_frames: u32,
    pub frame: FrameSettings,
    pub keyboard: KeyboardMapping,
    pub focus: FocusSettings,
    pub shake_seed: Option<u64>,
    pub async_poll_interval: Duration,
}

impl AppConfig {
    /// Validates the raw values and converts them for the frame loop.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the frame rate is zero, the stick
    /// deadzone lies outside `(0, 1]`, or the async poll interval is zero.
    pub fn runtime_settings(&self) -> Result<RuntimeSettings, ConfigError> {
        if self.runtime.frame_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "runtime.frame_rate",
                reason: "must be greater than 0".to_string(),
            });
        }
        let deadzone = self.input.stick_deadzone;
        if !(deadzone > 0.0 && deadzone <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "input.stick_deadzone",
                reason: format!("{deadzone} is outside (0, 1]"),
            });
        }
        if self.tasks.async_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tasks.async_poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(RuntimeSettings {
            frame_interval: Duration::from_secs(1) / self.runtime.frame_rate,
            demo_frames: self.runtime.demo_frames,
            frame: FrameSettings {
                stick_deadzone: deadzone,
                keyboard_enabled: self.input.keyboard_enabled,
            },
            keyboard: KeyboardMapping::from_bindings(&self.input.key_bindings),
            focus: FocusSettings {
                highlight_duration: Duration::from_millis(self.animation.highlight_duration_ms),
            },
            shake_seed: self.animation.shake_seed,
            async_poll_interval: Duration::from_millis(self.tasks.async_poll_interval_ms),
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`; a missing file yields the defaults.
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path: path.to_path_buf(), source: e }),
    }
}

/// Resolves the platform config directory, including the `InputKit` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("InputKit"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("inputkit"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("InputKit"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
