use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};

use async_trait::async_trait;
use taskdesk_model::{JobId, JobSpec, JobState, JobStatus, Percent};
use tracing::{debug, trace, warn};

use crate::{
    error::QueueError,
    queue::{QueueDispatcher, QueueStatusProvider},
};

/// In-memory job record store.
///
/// Implements both queue contracts for the workflow side, and exposes the
/// calls an executor makes while it works a job off (`start`, `report`,
/// `fail`, `complete`, `retire`). It never runs anything itself.
///
/// Completion is monotonic: a completed job stays completed and a retired
/// job id never gets a status again. Retiring drops the record; submitted
/// ids are fresh UUIDs and never reused.
#[derive(Clone)]
pub struct MemoryQueue {
    inner: Arc<RwLock<MemoryQueueInner>>,
    retire_on_complete: bool,
}

struct MemoryQueueInner {
    /// Tracked jobs indexed by id.
    jobs: HashMap<JobId, JobRecord>,
}

struct JobRecord {
    spec: JobSpec,
    status: JobStatus,
}

impl MemoryQueue {
    /// Create an empty queue that retires job records on completion.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryQueueInner {
                jobs: HashMap::new(),
            })),
            retire_on_complete: true,
        }
    }

    /// Keep completed records around until [`retire`](MemoryQueue::retire) is called.
    pub fn with_retire_on_complete(mut self, retire: bool) -> Self {
        self.retire_on_complete = retire;
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryQueueInner>, QueueError> {
        self.inner.read().map_err(|_| QueueError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryQueueInner>, QueueError> {
        self.inner.write().map_err(|_| QueueError::Poisoned)
    }

    /// Specification of a tracked job.
    pub fn spec(&self, id: &JobId) -> Result<Option<JobSpec>, QueueError> {
        let inner = self.read()?;
        Ok(inner.jobs.get(id).map(|r| r.spec.clone()))
    }

    /// Jobs nobody picked up yet, oldest first.
    pub fn waiting(&self) -> Result<Vec<(JobId, JobSpec)>, QueueError> {
        let inner = self.read()?;
        let mut items: Vec<_> = inner
            .jobs
            .values()
            .filter(|r| r.status.state == JobState::Waiting && !r.status.done)
            .map(|r| (r.status.created_at, r.status.id.clone(), r.spec.clone()))
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(items.into_iter().map(|(_, id, spec)| (id, spec)).collect())
    }

    /// Mark a waiting job as picked up.
    pub fn start(&self, id: &JobId) -> Result<bool, QueueError> {
        self.update(id, |status| {
            status.state = JobState::InProgress;
        })
    }

    /// Record progress of a running job. `percent` is capped at 100.
    pub fn report(
        &self,
        id: &JobId,
        percent: Percent,
        message: Option<String>,
    ) -> Result<bool, QueueError> {
        self.update(id, |status| {
            status.state = JobState::InProgress;
            status.percent = Some(percent.min(100));
            if message.is_some() {
                status.message = message;
            }
        })
    }

    /// Record an executor failure. The record stays tracked.
    pub fn fail(&self, id: &JobId, message: impl Into<String>) -> Result<bool, QueueError> {
        let message = message.into();
        self.update(id, |status| {
            status.state = JobState::Error;
            status.message = Some(message);
        })
    }

    /// Mark a job as completed, retiring its record unless configured otherwise.
    pub fn complete(&self, id: &JobId) -> Result<bool, QueueError> {
        let updated = self.update(id, |status| {
            status.done = true;
            status.percent = Some(100);
        })?;

        if updated && self.retire_on_complete {
            self.retire(id)?;
        }
        Ok(updated)
    }

    /// Drop a job record. Its id reports no status from now on.
    pub fn retire(&self, id: &JobId) -> Result<bool, QueueError> {
        let mut inner = self.write()?;

        let removed = inner.jobs.remove(id).is_some();
        if removed {
            debug!(job = %id, "job record retired");
        }
        Ok(removed)
    }

    /// Number of tracked job records.
    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.read()?.jobs.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.read()?.jobs.is_empty())
    }

    /// Apply `f` to a tracked, not yet completed job.
    fn update<F>(&self, id: &JobId, f: F) -> Result<bool, QueueError>
    where
        F: FnOnce(&mut JobStatus),
    {
        let mut inner = self.write()?;

        match inner.jobs.get_mut(id) {
            Some(record) if !record.status.done => {
                f(&mut record.status);
                record.status.updated_at = SystemTime::now();
                trace!(job = %id, state = ?record.status.state, percent = ?record.status.percent, "job status updated");
                Ok(true)
            }
            Some(_) => {
                trace!(job = %id, "ignoring update of a completed job");
                Ok(false)
            }
            None => {
                warn!(job = %id, "update for unknown or retired job");
                Ok(false)
            }
        }
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueDispatcher for MemoryQueue {
    async fn submit(&self, spec: JobSpec) -> Result<JobId, QueueError> {
        if spec.kind.trim().is_empty() {
            return Err(QueueError::Rejected("job kind cannot be empty".into()));
        }

        let id = JobId::new(uuid::Uuid::new_v4().to_string());
        let status = JobStatus::waiting(id.clone(), spec.queue.clone());

        let mut inner = self.write()?;
        debug!(job = %id, kind = %spec.kind, queue = %spec.queue, "job queued");
        inner.jobs.insert(id.clone(), JobRecord { spec, status });
        Ok(id)
    }
}

#[async_trait]
impl QueueStatusProvider for MemoryQueue {
    async fn status(&self, id: &JobId) -> Result<Option<JobStatus>, QueueError> {
        let inner = self.read()?;
        Ok(inner.jobs.get(id).map(|r| r.status.clone()))
    }
}
