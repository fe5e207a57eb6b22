use std::fmt;

/// Workflow entry point an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Select,
    Invoke,
    Progress,
    Finish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Select => "select",
            Stage::Invoke => "invoke",
            Stage::Progress => "progress",
            Stage::Finish => "finish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics hook called by the workflow.
///
/// Implementations must be cheap; they run inline with every request.
pub trait WorkflowMetrics: Send + Sync {
    /// A job was handed to the dispatcher for `task`.
    fn record_submitted(&self, task: &str);

    /// An entry point finished with `outcome` (e.g. `"form"`, `"not_found"`, `"download"`).
    fn record_outcome(&self, stage: Stage, outcome: &str);
}

/// Metrics backend that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl WorkflowMetrics for NoopMetrics {
    fn record_submitted(&self, _task: &str) {}

    fn record_outcome(&self, _stage: Stage, _outcome: &str) {}
}
