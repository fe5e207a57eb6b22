use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{JobId, Percent};

/// Execution state of a job whose record is still tracked by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is queued and waiting for an executor.
    Waiting,
    /// An executor picked the job up.
    InProgress,
    /// The executor reported a failure.
    Error,
}

impl JobState {
    /// Returns `true` if the job is waiting or running.
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Waiting | JobState::InProgress)
    }
}

/// Point-in-time snapshot of a queued job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Job identifier.
    pub id: JobId,
    /// Queue holding the job.
    pub queue: String,
    /// Completion flag. Once set it never clears.
    pub done: bool,
    /// Current execution state.
    pub state: JobState,
    /// Progress in percent, when the executor reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percent>,
    /// Last progress or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the job was queued.
    #[serde(with = "time_serde")]
    pub created_at: SystemTime,
    /// When the status last changed.
    #[serde(with = "time_serde")]
    pub updated_at: SystemTime,
}

impl JobStatus {
    /// Fresh status for a job that was just queued.
    pub fn waiting(id: JobId, queue: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            queue: queue.into(),
            done: false,
            state: JobState::Waiting,
            percent: None,
            message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

mod time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        since_epoch.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}
