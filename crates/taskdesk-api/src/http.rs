use std::sync::Arc;

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use taskdesk_core::{
    FinishOutcome, InvokeOutcome, Location, ProgressOutcome, ResultVariant, SelectOutcome,
    TaskWorkflow,
    workflow::{
        ResolvedResult, TEMPLATE_ERROR, TEMPLATE_FINISH, TEMPLATE_INVOKE, TEMPLATE_PROGRESS,
        TEMPLATE_SELECT,
    },
};
use taskdesk_model::{FileArtifact, FormInput, JobId, TaskId};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::ApiError;

type SharedWorkflow = Arc<TaskWorkflow>;

/// HTTP API service builder.
pub struct HttpApi {
    workflow: SharedWorkflow,
}

impl HttpApi {
    pub fn new(workflow: Arc<TaskWorkflow>) -> Self {
        Self { workflow }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET/POST /tasks - select a task
    /// - GET/POST /tasks/{task} - collect arguments and queue a job
    /// - GET /tasks/{task}/jobs/{job}/progress - job status
    /// - GET /tasks/{task}/jobs/{job}/finish - job result
    pub fn router(self) -> Router {
        Router::new()
            .route("/tasks", get(select_form).post(select_submit))
            .route("/tasks/{task}", get(invoke_form).post(invoke_submit))
            .route("/tasks/{task}/jobs/{job}/progress", get(progress))
            .route("/tasks/{task}/jobs/{job}/finish", get(finish))
            .with_state(self.workflow)
    }
}

/// Route path serving a workflow step.
pub fn location_path(location: &Location) -> String {
    match location {
        Location::Invoke { task } => format!("/tasks/{}", segment(task.as_str())),
        Location::Progress { task, job } => format!(
            "/tasks/{}/jobs/{}/progress",
            segment(task.as_str()),
            segment(job.as_str())
        ),
        Location::Finish { task, job } => format!(
            "/tasks/{}/jobs/{}/finish",
            segment(task.as_str()),
            segment(job.as_str())
        ),
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Serialize)]
struct Rendered<'a, C> {
    template: &'a str,
    context: C,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishContext {
    name: String,
    task_id: TaskId,
    job_id: JobId,
    result: Value,
}

fn render<C: Serialize>(status: StatusCode, template: &str, context: C) -> Response {
    (status, Json(Rendered { template, context })).into_response()
}

fn see_other(location: String) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
}

fn form_status(valid: bool) -> StatusCode {
    if valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks
async fn select_form(State(workflow): State<SharedWorkflow>) -> Response {
    select_response(workflow.select(None))
}

/// POST /tasks
async fn select_submit(
    State(workflow): State<SharedWorkflow>,
    Form(input): Form<FormInput>,
) -> Response {
    select_response(workflow.select(Some(&input)))
}

fn select_response(outcome: SelectOutcome) -> Response {
    match outcome {
        SelectOutcome::Redirect(location) => see_other(location_path(&location)),
        SelectOutcome::Form(view) => {
            render(form_status(view.errors.is_empty()), TEMPLATE_SELECT, view)
        }
    }
}

/// GET /tasks/{task}
async fn invoke_form(
    State(workflow): State<SharedWorkflow>,
    Path(task): Path<String>,
) -> Result<Response, ApiError> {
    invoke_response(workflow.invoke(&task, None).await?)
}

/// POST /tasks/{task}
async fn invoke_submit(
    State(workflow): State<SharedWorkflow>,
    Path(task): Path<String>,
    Form(input): Form<FormInput>,
) -> Result<Response, ApiError> {
    invoke_response(workflow.invoke(&task, Some(&input)).await?)
}

fn invoke_response(outcome: InvokeOutcome) -> Result<Response, ApiError> {
    match outcome {
        InvokeOutcome::Redirect(location) => Ok(see_other(location_path(&location))),
        InvokeOutcome::Form(view) => Ok(render(
            form_status(view.errors.is_empty()),
            TEMPLATE_INVOKE,
            view,
        )),
        InvokeOutcome::NotFound(rejection) => Err(rejection.into()),
    }
}

/// GET /tasks/{task}/jobs/{job}/progress
async fn progress(
    State(workflow): State<SharedWorkflow>,
    Path((task, job)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    match workflow.progress(&task, &job).await? {
        ProgressOutcome::View(view) => Ok(render(StatusCode::OK, TEMPLATE_PROGRESS, view)),
        ProgressOutcome::NotFound(rejection) => Err(rejection.into()),
    }
}

/// GET /tasks/{task}/jobs/{job}/finish
async fn finish(
    State(workflow): State<SharedWorkflow>,
    Path((task, job)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let resolved = match workflow.finish(&task, &job).await? {
        FinishOutcome::Resolved(resolved) => resolved,
        FinishOutcome::JobStillActive(view) => {
            return Ok(render(
                StatusCode::INTERNAL_SERVER_ERROR,
                TEMPLATE_ERROR,
                view,
            ));
        }
        FinishOutcome::NotFound(rejection) => return Err(rejection.into()),
    };

    let ResolvedResult {
        name,
        task_id,
        job_id,
        variant,
    } = resolved;

    match variant {
        ResultVariant::Download(file) => download(file).await,
        ResultVariant::View(view) => Ok(Json(view).into_response()),
        ResultVariant::Redirect(target) => Ok(see_other(target)),
        ResultVariant::Data(result) => Ok(render(
            StatusCode::OK,
            TEMPLATE_FINISH,
            FinishContext {
                name,
                task_id,
                job_id,
                result,
            },
        )),
    }
}

async fn download(file: FileArtifact) -> Result<Response, ApiError> {
    let read_failed =
        |e: std::io::Error| ApiError::Internal(format!("read {}: {e}", file.path.display()));
    let handle = tokio::fs::File::open(&file.path).await.map_err(read_failed)?;
    let len = handle.metadata().await.map_err(read_failed)?.len();
    debug!(name = %file.name, bytes = len, "serving download");

    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_LENGTH, len.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&file.name)),
    ];
    let body = Body::from_stream(ReaderStream::new(handle));
    Ok((headers, body).into_response())
}

/// `attachment` disposition with an ASCII `filename` and an RFC 6266 `filename*`.
fn content_disposition(name: &str) -> String {
    let name: String = name.chars().filter(|c| !c.is_control()).collect();
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(&name)
    )
}
