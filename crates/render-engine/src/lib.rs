//! Clipforge Render Engine
//!
//! Turns a validated [`RenderRequest`](clipforge_job_model::RenderRequest)
//! into a chain of ffmpeg runs and executes it.
//!
//! # Stage Chain
//!
//! ```text
//! clip 0 ──┐
//! clip 1 ──┼── trim/fps/scale/pad ── concat ──> stage-0.mp4
//! clip N ──┘                                        │
//!                                  drawtext (overlay 1)
//!                                                   ▼
//!                                              stage-1.mp4
//!                                                   │
//!                                                  ...
//!                                                   ▼
//!                                  <output_dir>/<name>_<id>.mp4
//! ```
//!
//! Graph text is built in [`graph`], turned into literal argument lists in
//! [`command`], and run through a [`ProcessInvoker`](invoker::ProcessInvoker).
//! [`pipeline`] plans and drives the chain and owns the intermediates.

pub mod command;
pub mod graph;
pub mod invoker;
pub mod pipeline;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use command::{stage_invocation, Invocation};
pub use graph::{build_concat_graph, build_overlay_graph, AudioRoute, GraphSpec};
pub use invoker::{diagnostic_tail, FfmpegInvoker, ProcessInvoker, ProcessOutcome};
pub use pipeline::{plan_stages, Stage, StageChainExecutor, StageKind, StagePlan};
