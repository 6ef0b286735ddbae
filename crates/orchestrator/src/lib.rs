//! Clipforge Orchestrator
//!
//! Owns render jobs from submission to a terminal state:
//! - [`store`]: the shared job-record store and its concurrency contract
//! - [`pool`]: the bounded worker pool jobs are scheduled on
//! - [`orchestrator`]: submission, polling and output lookup

pub mod orchestrator;
pub mod pool;
pub mod store;

pub use orchestrator::{Orchestrator, SubmitReceipt};
pub use pool::WorkerPool;
pub use store::{InMemoryJobStore, JobStore};
