use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queue used when a task does not pick one.
pub const DEFAULT_QUEUE: &str = "default";

/// Description of a unit of work, built by a task and handed to the queue.
///
/// The payload is opaque to the workflow; only the executor that handles
/// `kind` interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Executor-facing job type (e.g. `"export-report"`).
    pub kind: String,
    /// Name of the queue the job is placed on.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Human readable description shown while the job is tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Job parameters.
    #[serde(default)]
    pub payload: Value,
}

fn default_queue() -> String {
    DEFAULT_QUEUE.to_string()
}

impl JobSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            queue: default_queue(),
            description: None,
            payload: Value::Null,
        }
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
