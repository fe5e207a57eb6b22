use serde::Serialize;
use taskdesk_model::{Form, JobId, JobStatus, TaskId, ValidationErrors};

use crate::resolver::ResultVariant;

pub const TEMPLATE_SELECT: &str = "task/select";
pub const TEMPLATE_INVOKE: &str = "task/invoke";
pub const TEMPLATE_PROGRESS: &str = "task/progress";
pub const TEMPLATE_ERROR: &str = "task/error";
pub const TEMPLATE_FINISH: &str = "task/finish";

/// Workflow step a caller is sent to next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Location {
    Invoke { task: TaskId },
    Progress { task: TaskId, job: JobId },
    Finish { task: TaskId, job: JobId },
}

/// Why an entry point answered "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TaskNotFound(TaskId),
    JobNotFound { task: TaskId, job: JobId },
}

/// One option of the task selection form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChoice {
    pub id: TaskId,
    pub name: String,
}

/// Task selection form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectView {
    pub form: Form,
    pub tasks: Vec<TaskChoice>,
    pub errors: ValidationErrors,
}

/// Extra argument form of a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeView {
    pub name: String,
    pub task_id: TaskId,
    pub form: Form,
    pub errors: ValidationErrors,
}

/// Progress of a queued job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub name: String,
    pub task_id: TaskId,
    pub job_id: JobId,
    pub status: JobStatus,
    /// Suggested delay before polling again.
    pub refresh_ms: u64,
    /// Where to go once the job's status is gone.
    pub finish: Location,
}

/// Finish was requested while the queue still tracks the job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorView {
    pub name: String,
    pub task_id: TaskId,
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Classified output of a finished job.
#[derive(Debug, Clone)]
pub struct ResolvedResult {
    pub name: String,
    pub task_id: TaskId,
    pub job_id: JobId,
    pub variant: ResultVariant,
}

#[derive(Debug, Clone)]
pub enum SelectOutcome {
    Form(SelectView),
    Redirect(Location),
}

impl SelectOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            SelectOutcome::Form(view) if !view.errors.is_empty() => "invalid",
            SelectOutcome::Form(_) => "form",
            SelectOutcome::Redirect(_) => "redirect",
        }
    }
}

#[derive(Debug, Clone)]
pub enum InvokeOutcome {
    Form(InvokeView),
    Redirect(Location),
    NotFound(Rejection),
}

impl InvokeOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            InvokeOutcome::Form(view) if !view.errors.is_empty() => "invalid",
            InvokeOutcome::Form(_) => "form",
            InvokeOutcome::Redirect(_) => "redirect",
            InvokeOutcome::NotFound(_) => "not_found",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProgressOutcome {
    View(ProgressView),
    NotFound(Rejection),
}

impl ProgressOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressOutcome::View(_) => "view",
            ProgressOutcome::NotFound(_) => "not_found",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FinishOutcome {
    Resolved(ResolvedResult),
    JobStillActive(ErrorView),
    NotFound(Rejection),
}

impl FinishOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            FinishOutcome::Resolved(resolved) => resolved.variant.kind(),
            FinishOutcome::JobStillActive(_) => "job_still_active",
            FinishOutcome::NotFound(_) => "not_found",
        }
    }
}
