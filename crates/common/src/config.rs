//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClipforgeError, ClipforgeResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render pipeline settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the render pipeline and its worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Media engine executable (looked up on `PATH` when relative).
    pub ffmpeg_bin: PathBuf,

    /// Directory receiving finished outputs.
    pub output_dir: PathBuf,

    /// Scratch directory for per-job intermediate files.
    /// Keep it on the same filesystem as `output_dir` so placement is a rename.
    pub work_dir: PathBuf,

    /// Number of jobs allowed to execute at the same time.
    pub max_concurrent_jobs: usize,

    /// How much trailing engine stderr to keep as a failure diagnostic.
    pub max_diagnostic_bytes: usize,

    /// Encoder settings applied to every stage.
    pub encode: EncodeSettings,
}

/// Encoder parameters passed to the media engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    /// Video codec (e.g. `libx264`).
    pub video_codec: String,

    /// Encoder speed preset.
    pub preset: String,

    /// Constant rate factor.
    pub crf: u32,

    /// Audio codec used where audio is re-encoded.
    pub audio_codec: String,

    /// Audio bitrate (e.g. `128k`).
    pub audio_bitrate: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipforge=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let output_dir = PathBuf::from("outputs");
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            work_dir: output_dir.join(".work"),
            output_dir,
            max_concurrent_jobs: 2,
            max_diagnostic_bytes: 8 * 1024,
            encode: EncodeSettings::default(),
        }
    }
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl RenderConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ClipforgeResult<()> {
        if self.max_concurrent_jobs == 0 {
            return Err(ClipforgeError::config("max_concurrent_jobs must be at least 1"));
        }
        if self.ffmpeg_bin.as_os_str().is_empty() {
            return Err(ClipforgeError::config("ffmpeg_bin must not be empty"));
        }
        if self.encode.video_codec.trim().is_empty() || self.encode.audio_codec.trim().is_empty() {
            return Err(ClipforgeError::config("codec names must not be empty"));
        }
        if self.max_diagnostic_bytes == 0 {
            return Err(ClipforgeError::config("max_diagnostic_bytes must be positive"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Errors are propagated.
    pub fn load_from(path: &Path) -> ClipforgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClipforgeError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.render.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipforge").join("config.json")
}
