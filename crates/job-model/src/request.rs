//! Render requests and their structural validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clip::{ClipTrim, FieldError, OverlaySpec};
use crate::job::JobId;

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, ValidationError> {
        if width == 0 || height == 0 {
            return Err(ValidationError::InvalidResolution {
                value: format!("{width}x{height}"),
            });
        }
        Ok(Self { width, height })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidResolution {
            value: s.to_string(),
        };
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Self::new(width, height).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Resolution {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

/// Everything needed to render one output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Human-readable name, used as the output file stem.
    #[serde(default = "default_name")]
    pub name: String,

    /// Clips in output order.
    pub clips: Vec<ClipTrim>,

    /// Overlays in application order; later overlays draw on top.
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,

    #[serde(default)]
    pub resolution: Resolution,

    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_name() -> String {
    "render".to_string()
}

fn default_fps() -> u32 {
    30
}

/// Why a render request was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("a render request needs at least one clip")]
    NoClips,

    #[error("frame rate must be positive")]
    InvalidFps,

    #[error("invalid resolution '{value}': expected WIDTHxHEIGHT with positive dimensions")]
    InvalidResolution { value: String },

    #[error("clip {index}: {reason}")]
    Clip {
        index: usize,
        #[source]
        reason: FieldError,
    },

    #[error("overlay {index}: {reason}")]
    Overlay {
        index: usize,
        #[source]
        reason: FieldError,
    },
}

impl RenderRequest {
    pub fn new(clips: Vec<ClipTrim>) -> Self {
        Self {
            name: default_name(),
            clips,
            overlays: Vec::new(),
            resolution: Resolution::default(),
            fps: default_fps(),
        }
    }

    pub fn with_overlays(mut self, overlays: Vec<OverlaySpec>) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn with_output(mut self, resolution: Resolution, fps: u32) -> Self {
        self.resolution = resolution;
        self.fps = fps;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Structural validation. Performed before a job record is created.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.clips.is_empty() {
            return Err(ValidationError::NoClips);
        }
        if self.fps == 0 {
            return Err(ValidationError::InvalidFps);
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ValidationError::InvalidResolution {
                value: self.resolution.to_string(),
            });
        }
        for (index, clip) in self.clips.iter().enumerate() {
            clip.validate()
                .map_err(|reason| ValidationError::Clip { index, reason })?;
        }
        for (index, overlay) in self.overlays.iter().enumerate() {
            overlay
                .validate()
                .map_err(|reason| ValidationError::Overlay { index, reason })?;
        }
        Ok(())
    }

    /// Number of engine invocations this request needs.
    pub fn stage_count(&self) -> usize {
        1 + self.overlays.len()
    }

    /// Total output duration.
    pub fn total_duration(&self) -> f64 {
        self.clips.iter().map(|c| c.duration).sum()
    }

    /// File name of the finished output: `<name>_<short id>.mp4`.
    pub fn output_file_name(&self, id: &JobId) -> String {
        format!("{}_{}.mp4", sanitize_stem(&self.name), id.short())
    }
}

/// Restrict a user-supplied name to characters safe in a file name.
fn sanitize_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        default_name()
    } else {
        stem
    }
}
