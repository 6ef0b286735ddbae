//! Clipforge Job Model
//!
//! Defines the data contracts shared by the render pipeline:
//! - **Clips:** time-bounded excerpts of source media ([`ClipTrim`])
//! - **Overlays:** timed text burned onto the video ([`OverlaySpec`])
//! - **Requests:** a validated description of one render ([`RenderRequest`])
//! - **Jobs:** the tracked record of a request from submission to a
//!   terminal state ([`RenderJob`])
//!
//! All times are in seconds relative to the start of the relevant media.

pub mod clip;
pub mod job;
pub mod request;

pub use clip::*;
pub use job::*;
pub use request::*;
