//! Clip and overlay descriptors.
//!
//! These are plain values. Validation checks structure only; it never
//! touches the filesystem.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A time-bounded excerpt of one source media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipTrim {
    /// Source media file. Never modified or removed by the pipeline.
    pub source: PathBuf,

    /// Offset into the source where the excerpt begins.
    #[serde(default)]
    pub start: f64,

    /// Length of the excerpt.
    pub duration: f64,
}

/// Timed text rendered onto the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    /// Text to draw. Escaped before it reaches the filter graph.
    pub text: String,

    /// Window start; the text is visible for `[start, end)`.
    pub start: f64,

    /// Window end.
    pub end: f64,

    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Font color: a color name, `#RRGGBB[AA]` or `0xRRGGBB[AA]`,
    /// optionally followed by `@alpha`.
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_font_size() -> u32 {
    24
}

fn default_color() -> String {
    "white".to_string()
}

/// A structural problem with a single clip or overlay.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("source path is empty")]
    EmptySource,

    #[error("start offset must be a finite value >= 0 (got {0})")]
    InvalidStart(f64),

    #[error("duration must be a finite value > 0 (got {0})")]
    InvalidDuration(f64),

    #[error("window end ({end}) must be greater than window start ({start})")]
    EmptyWindow { start: f64, end: f64 },

    #[error("font size must be positive")]
    InvalidFontSize,

    #[error("text is empty")]
    EmptyText,

    #[error("text contains control characters")]
    ControlCharacter,

    #[error("unsupported color '{0}'")]
    InvalidColor(String),
}

impl ClipTrim {
    pub fn new(source: impl Into<PathBuf>, start: f64, duration: f64) -> Self {
        Self {
            source: source.into(),
            start,
            duration,
        }
    }

    /// End of the excerpt within the source.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.source.as_os_str().is_empty() {
            return Err(FieldError::EmptySource);
        }
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(FieldError::InvalidStart(self.start));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(FieldError::InvalidDuration(self.duration));
        }
        Ok(())
    }
}

impl OverlaySpec {
    /// Overlay with the default style (24px, white).
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            font_size: default_font_size(),
            color: default_color(),
        }
    }

    pub fn with_style(mut self, font_size: u32, color: impl Into<String>) -> Self {
        self.font_size = font_size;
        self.color = color.into();
        self
    }

    /// Check the time window only.
    pub fn validate_window(&self) -> Result<(), FieldError> {
        if !self.start.is_finite() || self.start < 0.0 {
            return Err(FieldError::InvalidStart(self.start));
        }
        // NaN fails this comparison too.
        if !self.end.is_finite() || !(self.end > self.start) {
            return Err(FieldError::EmptyWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        self.validate_window()?;
        if self.font_size == 0 {
            return Err(FieldError::InvalidFontSize);
        }
        if self.text.trim().is_empty() {
            return Err(FieldError::EmptyText);
        }
        if self.text.chars().any(char::is_control) {
            return Err(FieldError::ControlCharacter);
        }
        if !is_valid_color(&self.color) {
            return Err(FieldError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Accepts the subset of engine color syntax that needs no escaping.
fn is_valid_color(color: &str) -> bool {
    let (base, alpha) = match color.split_once('@') {
        Some((base, alpha)) => (base, Some(alpha)),
        None => (color, None),
    };

    if let Some(alpha) = alpha {
        match alpha.parse::<f64>() {
            Ok(a) if (0.0..=1.0).contains(&a) => {}
            _ => return false,
        }
    }

    let hex = base
        .strip_prefix('#')
        .or_else(|| base.strip_prefix("0x"))
        .or_else(|| base.strip_prefix("0X"));

    match hex {
        Some(digits) => {
            matches!(digits.len(), 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => !base.is_empty() && base.chars().all(|c| c.is_ascii_alphabetic()),
    }
}
