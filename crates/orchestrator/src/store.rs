//! Job record storage.
//!
//! Every job task and every poller shares one store. A record is only ever
//! changed through [`JobStore::update`], which applies the whole closure as
//! one step: readers see the record before or after it, never in between.

use dashmap::DashMap;

use clipforge_job_model::{JobId, RenderJob};

/// Keyed storage for job records.
///
/// Implementations must make `update` atomic per key. The in-memory store
/// does not survive a restart; a durable backend implements the same trait.
pub trait JobStore: Send + Sync {
    fn put(&self, job: RenderJob);

    /// Snapshot of the current record.
    fn get(&self, id: &JobId) -> Option<RenderJob>;

    /// Drop a record. Only external retention policies call this.
    fn remove(&self, id: &JobId) -> Option<RenderJob>;

    /// Apply `apply` to the record under the key's lock.
    /// Returns `false` when no record exists.
    fn update(&self, id: &JobId, apply: &mut dyn FnMut(&mut RenderJob)) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, RenderJob>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn put(&self, job: RenderJob) {
        self.jobs.insert(job.id(), job);
    }

    fn get(&self, id: &JobId) -> Option<RenderJob> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }

    fn remove(&self, id: &JobId) -> Option<RenderJob> {
        self.jobs.remove(id).map(|(_, job)| job)
    }

    fn update(&self, id: &JobId, apply: &mut dyn FnMut(&mut RenderJob)) -> bool {
        match self.jobs.get_mut(id) {
            Some(mut entry) => {
                apply(entry.value_mut());
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}
