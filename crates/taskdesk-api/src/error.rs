use taskdesk_core::{Rejection, WorkflowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("job not found: {job} (task {task})")]
    JobNotFound { task: String, job: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::TaskNotFound(task) => ApiError::TaskNotFound(task.to_string()),
            Rejection::JobNotFound { task, job } => ApiError::JobNotFound {
                task: task.to_string(),
                job: job.to_string(),
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ApiError::TaskNotFound(_) | ApiError::JobNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Workflow(e) => {
                tracing::error!(error = %e, "workflow failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
