//! Bounded job scheduling.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use clipforge_common::error::{ClipforgeError, ClipforgeResult};
use clipforge_job_model::JobId;

/// Runs job futures as independent tokio tasks, at most `bound` at a time.
///
/// Submission never waits: the task is spawned immediately and queues on the
/// pool's permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    bound: usize,
}

impl WorkerPool {
    /// A bound of zero is raised to one.
    pub fn new(bound: usize) -> Self {
        let bound = bound.max(1);
        Self {
            permits: Arc::new(Semaphore::new(bound)),
            bound,
        }
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Number of jobs that could start right now.
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Schedule `work` for `job_id` on the current tokio runtime. Fails
    /// without running `work` when called outside one.
    pub fn submit<F>(&self, job_id: JobId, work: F) -> ClipforgeResult<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| {
            ClipforgeError::Other(anyhow::anyhow!(
                "no tokio runtime to schedule job {job_id}: {e}"
            ))
        })?;
        let permits = Arc::clone(&self.permits);
        Ok(runtime.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(job_id = %job_id, "Worker pool closed, job not started");
                    return;
                }
            };
            tracing::debug!(job_id = %job_id, "Worker acquired");
            work.await;
            tracing::debug!(job_id = %job_id, "Worker released");
        }))
    }
}
