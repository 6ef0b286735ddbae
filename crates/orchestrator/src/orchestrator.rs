//! Job submission, execution and polling.
//!
//! `submit` validates the request, stores a Pending record and schedules the
//! job on the worker pool before returning. The job's own task is the only
//! writer of its record: it moves the job to Processing, forwards stage
//! progress, and records the terminal state. Pollers only read snapshots.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use clipforge_common::config::RenderConfig;
use clipforge_common::error::{ClipforgeError, ClipforgeResult};
use clipforge_job_model::{JobId, JobState, JobStatus, RenderJob, RenderRequest};
use clipforge_render_engine::{ProcessInvoker, StageChainExecutor, StagePlan};

use crate::pool::WorkerPool;
use crate::store::{InMemoryJobStore, JobStore};

/// Returned by [`Orchestrator::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub state: JobState,
}

/// Entry point for render jobs.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    executor: Arc<StageChainExecutor>,
    pool: WorkerPool,
    output_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(config: RenderConfig, invoker: Arc<dyn ProcessInvoker>) -> Self {
        Self {
            store: Arc::new(InMemoryJobStore::new()),
            executor: Arc::new(StageChainExecutor::new(&config, invoker)),
            pool: WorkerPool::new(config.max_concurrent_jobs),
            output_dir: config.output_dir,
        }
    }

    /// Replace the job store. Call before submitting anything.
    pub fn with_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.store = store;
        self
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Validate and schedule a render. Invalid requests are rejected with
    /// [`ClipforgeError::InvalidInput`] and leave no record behind. Outside a
    /// tokio runtime the job cannot be scheduled; that is reported as
    /// [`ClipforgeError::Other`] and also leaves no record.
    pub fn submit(&self, request: RenderRequest) -> ClipforgeResult<SubmitReceipt> {
        request
            .validate()
            .map_err(|e| ClipforgeError::invalid_input(e.to_string()))?;

        let job_id = JobId::new();
        let output = self.output_dir.join(request.output_file_name(&job_id));
        self.store.put(RenderJob::new(job_id, request.clone()));

        tracing::info!(
            job_id = %job_id,
            clips = request.clips.len(),
            overlays = request.overlays.len(),
            output = %output.display(),
            "Render job submitted"
        );

        let scheduled = self.pool.submit(
            job_id,
            run_job(
                Arc::clone(&self.store),
                Arc::clone(&self.executor),
                job_id,
                request,
                output,
            ),
        );
        if let Err(err) = scheduled {
            self.store.remove(&job_id);
            tracing::error!(job_id = %job_id, error = %err, "Render job not scheduled");
            return Err(err);
        }

        Ok(SubmitReceipt {
            job_id,
            state: JobState::Pending,
        })
    }

    pub fn poll(&self, job_id: &JobId) -> ClipforgeResult<JobStatus> {
        self.store
            .get(job_id)
            .map(|job| job.status())
            .ok_or_else(|| ClipforgeError::not_found(format!("job {job_id}")))
    }

    /// Location of a completed job's output file.
    pub fn fetch_output_location(&self, job_id: &JobId) -> ClipforgeResult<PathBuf> {
        let job = self
            .store
            .get(job_id)
            .ok_or_else(|| ClipforgeError::not_found(format!("job {job_id}")))?;

        if job.state() != JobState::Completed {
            return Err(ClipforgeError::not_ready(format!(
                "job {job_id} is {}",
                job.state()
            )));
        }

        let path = job.output_path().ok_or_else(|| {
            ClipforgeError::not_found(format!("output path of completed job {job_id}"))
        })?;
        if !path.is_file() {
            tracing::error!(
                job_id = %job_id,
                path = %path.display(),
                "Completed job has no output file"
            );
            return Err(ClipforgeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(path.to_path_buf())
    }

    pub fn check_available(&self) -> bool {
        self.executor.invoker().check_available()
    }

    /// The stage chain a request would run, without running it.
    pub fn plan(&self, request: &RenderRequest) -> ClipforgeResult<StagePlan> {
        let job_id = JobId::new();
        let output = self.output_dir.join(request.output_file_name(&job_id));
        self.executor.plan(job_id, request, &output)
    }

    /// Poll until the job is terminal.
    pub async fn wait_for_terminal(
        &self,
        job_id: &JobId,
        interval: Duration,
    ) -> ClipforgeResult<JobStatus> {
        self.watch(job_id, interval, |_| {}).await
    }

    /// Poll until the job is terminal, calling `on_change` whenever the
    /// observed state or progress differs from the previous poll.
    pub async fn watch<F>(
        &self,
        job_id: &JobId,
        interval: Duration,
        mut on_change: F,
    ) -> ClipforgeResult<JobStatus>
    where
        F: FnMut(&JobStatus),
    {
        let mut last: Option<(JobState, u8)> = None;
        loop {
            let status = self.poll(job_id)?;
            let seen = (status.state, status.progress);
            if last != Some(seen) {
                on_change(&status);
                last = Some(seen);
            }
            if status.state.is_terminal() {
                return Ok(status);
            }
            tokio::time::sleep(interval).await;
        }
    }
}

/// Body of one job's task.
async fn run_job(
    store: Arc<dyn JobStore>,
    executor: Arc<StageChainExecutor>,
    job_id: JobId,
    request: RenderRequest,
    output: PathBuf,
) {
    let mut started = false;
    let exists = store.update(&job_id, &mut |job| match job.start_processing() {
        Ok(()) => started = true,
        Err(err) => tracing::warn!(job_id = %job_id, error = %err, "Job not started"),
    });
    if !exists || !started {
        return;
    }
    tracing::info!(job_id = %job_id, "Job processing");

    let progress_store = Arc::clone(&store);
    let result = tokio::task::spawn_blocking(move || {
        let report = |progress: u8| {
            progress_store.update(&job_id, &mut |job| {
                if let Err(err) = job.advance(progress) {
                    tracing::warn!(job_id = %job_id, error = %err, "Progress update rejected");
                }
            });
        };
        executor.execute(job_id, &request, &output, &report)
    })
    .await;

    match result {
        Ok(Ok(path)) => {
            tracing::info!(job_id = %job_id, output = %path.display(), "Job completed");
            store.update(&job_id, &mut |job| {
                if let Err(err) = job.complete(path.clone()) {
                    tracing::warn!(job_id = %job_id, error = %err, "Completion rejected");
                }
            });
        }
        Ok(Err(err)) => {
            tracing::error!(job_id = %job_id, error = %err, "Job failed");
            record_failure(store.as_ref(), job_id, err.to_string());
        }
        Err(join_err) => {
            tracing::error!(job_id = %job_id, error = %join_err, "Job task aborted");
            record_failure(
                store.as_ref(),
                job_id,
                format!("render task aborted: {join_err}"),
            );
        }
    }
}

fn record_failure(store: &dyn JobStore, job_id: JobId, detail: String) {
    store.update(&job_id, &mut |job| {
        if let Err(err) = job.fail(detail.clone()) {
            tracing::warn!(job_id = %job_id, error = %err, "Failure not recorded");
        }
    });
}
