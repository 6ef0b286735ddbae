//! Render job records and their state machine.
//!
//! ```text
//! Pending ──(scheduled)──> Processing ──(all stages succeed)──> Completed
//!                               │
//!                               └──(any stage or setup fails)──> Failed
//! ```
//!
//! Completed and Failed are terminal: every transition method refuses to
//! touch a terminal record.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::RenderRequest;

/// Opaque job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, used in file names.
    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle state of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected state transition. The record is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("job is already {0} and accepts no further changes")]
    Terminal(JobState),

    #[error("cannot move job from {from} to {to}")]
    Invalid { from: JobState, to: JobState },
}

/// The tracked record of one render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    id: JobId,
    state: JobState,
    progress: u8,
    output_path: Option<PathBuf>,
    error_detail: Option<String>,
    request: RenderRequest,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Point-in-time view of a job, as returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: JobId,
    pub state: JobState,
    pub progress: u8,
    pub output_path: Option<PathBuf>,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Time of the last state or progress change.
    pub updated_at: DateTime<Utc>,
}

impl JobStatus {
    /// Time from submission to the last recorded change.
    pub fn elapsed(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}

impl RenderJob {
    /// New record in the Pending state with progress 0.
    pub fn new(id: JobId, request: RenderRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: JobState::Pending,
            progress: 0,
            output_path: None,
            error_detail: None,
            request,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pending -> Processing.
    pub fn start_processing(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JobState::Pending => {
                self.state = JobState::Processing;
                self.touch();
                Ok(())
            }
            state if state.is_terminal() => Err(TransitionError::Terminal(state)),
            from => Err(TransitionError::Invalid {
                from,
                to: JobState::Processing,
            }),
        }
    }

    /// Raise progress while Processing. Values above 100 are clamped and
    /// lower values are ignored, so observed progress never decreases.
    /// Returns the progress after the update.
    pub fn advance(&mut self, progress: u8) -> Result<u8, TransitionError> {
        self.require_processing(JobState::Processing)?;
        let progress = progress.min(100);
        if progress > self.progress {
            self.progress = progress;
            self.touch();
        }
        Ok(self.progress)
    }

    /// Processing -> Completed. Progress becomes 100 in the same step.
    pub fn complete(&mut self, output_path: PathBuf) -> Result<(), TransitionError> {
        self.require_processing(JobState::Completed)?;
        self.state = JobState::Completed;
        self.progress = 100;
        self.output_path = Some(output_path);
        self.touch();
        Ok(())
    }

    /// Processing -> Failed. Progress keeps the value reached so far.
    pub fn fail(&mut self, detail: impl Into<String>) -> Result<(), TransitionError> {
        self.require_processing(JobState::Failed)?;
        self.state = JobState::Failed;
        self.error_detail = Some(detail.into());
        self.touch();
        Ok(())
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            id: self.id,
            state: self.state,
            progress: self.progress,
            output_path: self.output_path.clone(),
            error_detail: self.error_detail.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn require_processing(&self, to: JobState) -> Result<(), TransitionError> {
        match self.state {
            JobState::Processing => Ok(()),
            state if state.is_terminal() => Err(TransitionError::Terminal(state)),
            from => Err(TransitionError::Invalid { from, to }),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
