//! Contracts the workflow needs from the job queue.
//!
//! The executor, its persistence and its retry policy live behind these
//! traits. [`MemoryQueue`] is an in-process record store implementing both.

use async_trait::async_trait;
use taskdesk_model::{JobId, JobSpec, JobStatus};

use crate::error::QueueError;

mod memory;
pub use memory::MemoryQueue;

/// Accepts jobs for out-of-band execution.
#[async_trait]
pub trait QueueDispatcher: Send + Sync + 'static {
    /// Queue a job and return its id immediately.
    async fn submit(&self, spec: JobSpec) -> Result<JobId, QueueError>;
}

/// Reports the status of queued jobs.
///
/// A job whose record was retired after completion reports `None`, and must
/// keep reporting `None` from then on.
#[async_trait]
pub trait QueueStatusProvider: Send + Sync + 'static {
    async fn status(&self, id: &JobId) -> Result<Option<JobStatus>, QueueError>;
}
