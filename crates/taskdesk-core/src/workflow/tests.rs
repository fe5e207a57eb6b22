use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::json;
use taskdesk_model::{
    ArgumentBag, FieldDef, FileArtifact, FormBuilder, FormInput, JobId, JobSpec, JobState,
    JobStatus, TaskOutput, View,
};

use super::*;
use crate::{
    error::QueueError,
    i18n::Catalog,
    queue::MemoryQueue,
    resolver::ResultVariant,
    task::Task,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

struct ExportReport {
    output: Mutex<Option<TaskOutput>>,
    result_calls: AtomicUsize,
}

impl ExportReport {
    fn new() -> Self {
        Self {
            output: Mutex::new(None),
            result_calls: AtomicUsize::new(0),
        }
    }

    fn set_output(&self, output: TaskOutput) {
        *self.output.lock().unwrap() = Some(output);
    }

    fn calls(&self) -> usize {
        self.result_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Task for ExportReport {
    fn name(&self) -> &'static str {
        "export_report"
    }

    fn queue_job(&self, args: &ArgumentBag) -> JobSpec {
        JobSpec::new("export-report").with_payload(args.to_value())
    }

    async fn result(&self, _job_id: &JobId) -> Option<TaskOutput> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        self.output.lock().unwrap().clone()
    }
}

struct MonthlyDigest;

impl Task for MonthlyDigest {
    fn name(&self) -> &'static str {
        "monthly_digest"
    }

    fn prepare_form(&self, form: &mut FormBuilder, translator: &dyn Translator) {
        form.add_field(
            FieldDef::integer("month")
                .with_label(translator.translate("label.month"))
                .required(),
        );
    }

    fn queue_job(&self, args: &ArgumentBag) -> JobSpec {
        JobSpec::new("monthly-digest").with_payload(json!({ "month": args.get_i64("month") }))
    }
}

struct FixedDispatcher {
    next: JobId,
    submitted: Mutex<Vec<JobSpec>>,
}

#[async_trait]
impl QueueDispatcher for FixedDispatcher {
    async fn submit(&self, spec: JobSpec) -> Result<JobId, QueueError> {
        self.submitted.lock().unwrap().push(spec);
        Ok(self.next.clone())
    }
}

struct DownDispatcher;

#[async_trait]
impl QueueDispatcher for DownDispatcher {
    async fn submit(&self, _spec: JobSpec) -> Result<JobId, QueueError> {
        Err(QueueError::Unavailable("connection refused".into()))
    }
}

/// Status store that never brings a retired job back.
#[derive(Default)]
struct FakeStatuses {
    statuses: Mutex<HashMap<JobId, JobStatus>>,
    retired: Mutex<HashSet<JobId>>,
}

impl FakeStatuses {
    fn set(&self, id: &str, percent: u8) {
        let id = JobId::from(id);
        if self.retired.lock().unwrap().contains(&id) {
            return;
        }
        let mut status = JobStatus::waiting(id.clone(), "default");
        status.state = JobState::InProgress;
        status.percent = Some(percent);
        self.statuses.lock().unwrap().insert(id, status);
    }

    fn fail(&self, id: &str) {
        if let Some(status) = self.statuses.lock().unwrap().get_mut(&JobId::from(id)) {
            status.state = JobState::Error;
            status.message = Some("boom".into());
        }
    }

    fn retire(&self, id: &str) {
        let id = JobId::from(id);
        self.statuses.lock().unwrap().remove(&id);
        self.retired.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl QueueStatusProvider for FakeStatuses {
    async fn status(&self, id: &JobId) -> Result<Option<JobStatus>, QueueError> {
        Ok(self.statuses.lock().unwrap().get(id).cloned())
    }
}

#[derive(Default)]
struct RecordingMetrics {
    submitted: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<(Stage, String)>>,
}

impl WorkflowMetrics for RecordingMetrics {
    fn record_submitted(&self, task: &str) {
        self.submitted.lock().unwrap().push(task.to_string());
    }

    fn record_outcome(&self, stage: Stage, outcome: &str) {
        self.outcomes.lock().unwrap().push((stage, outcome.to_string()));
    }
}

struct Fixture {
    workflow: TaskWorkflow,
    export: Arc<ExportReport>,
    dispatcher: Arc<FixedDispatcher>,
    statuses: Arc<FakeStatuses>,
    metrics: Arc<RecordingMetrics>,
}

fn fixture() -> Fixture {
    let export = Arc::new(ExportReport::new());
    let registry = TaskRegistry::new()
        .with_task("export-report", export.clone())
        .unwrap()
        .with_task("monthly-digest", Arc::new(MonthlyDigest))
        .unwrap();

    let dispatcher = Arc::new(FixedDispatcher {
        next: JobId::from("job-42"),
        submitted: Mutex::new(Vec::new()),
    });
    let statuses = Arc::new(FakeStatuses::default());
    let metrics = Arc::new(RecordingMetrics::default());

    let translator = Catalog::new()
        .with("task.export_report", "Export report")
        .with("label.task", "Task");

    let workflow = TaskWorkflow::builder(Arc::new(registry), dispatcher.clone(), statuses.clone())
        .with_translator(Arc::new(translator))
        .with_metrics(metrics.clone())
        .with_config(WorkflowConfig { refresh_ms: 2500 })
        .build();

    Fixture {
        workflow,
        export,
        dispatcher,
        statuses,
        metrics,
    }
}

fn resolved(outcome: FinishOutcome) -> ResolvedResult {
    match outcome {
        FinishOutcome::Resolved(resolved) => resolved,
        other => panic!("expected a resolved result, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Select
// ---------------------------------------------------------------------------

#[test]
fn select_lists_registered_tasks() {
    let f = fixture();

    let SelectOutcome::Form(view) = f.workflow.select(None) else {
        panic!("expected the selection form");
    };

    let names: Vec<_> = view.tasks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Export report", "task.monthly_digest"]);
    assert!(view.errors.is_empty());

    let field = view.form.field(SELECT_FIELD).expect("choice field");
    assert!(field.required);
    assert_eq!(field.label.as_deref(), Some("Task"));
}

#[test]
fn select_redirects_to_chosen_task() {
    let f = fixture();
    let input = FormInput::new().with(SELECT_FIELD, "monthly-digest");

    match f.workflow.select(Some(&input)) {
        SelectOutcome::Redirect(location) => assert_eq!(
            location,
            Location::Invoke {
                task: TaskId::from("monthly-digest")
            }
        ),
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[test]
fn select_redisplays_on_invalid_choice() {
    let f = fixture();

    for input in [FormInput::new(), FormInput::new().with(SELECT_FIELD, "missing")] {
        let SelectOutcome::Form(view) = f.workflow.select(Some(&input)) else {
            panic!("expected the selection form again");
        };
        assert_eq!(view.errors.for_field(SELECT_FIELD).count(), 1);
        assert_eq!(view.tasks.len(), 2);
    }
}

// ---------------------------------------------------------------------------
// Invoke
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_invoke_shows_empty_form_then_queues() {
    let f = fixture();

    let outcome = f.workflow.invoke("export-report", None).await.unwrap();
    let InvokeOutcome::Form(view) = outcome else {
        panic!("expected the argument form");
    };
    assert!(view.form.is_empty());
    assert_eq!(view.name, "Export report");
    assert!(f.dispatcher.submitted.lock().unwrap().is_empty());

    let outcome = f
        .workflow
        .invoke("export-report", Some(&FormInput::new()))
        .await
        .unwrap();

    match outcome {
        InvokeOutcome::Redirect(location) => assert_eq!(
            location,
            Location::Progress {
                task: TaskId::from("export-report"),
                job: JobId::from("job-42"),
            }
        ),
        other => panic!("expected redirect to progress, got {other:?}"),
    }

    let submitted = f.dispatcher.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].kind, "export-report");
    assert_eq!(*f.metrics.submitted.lock().unwrap(), ["export-report"]);
}

#[tokio::test]
async fn invoke_passes_collected_arguments_to_job() {
    let f = fixture();
    let input = FormInput::new().with("month", "5");

    let outcome = f.workflow.invoke("monthly-digest", Some(&input)).await.unwrap();
    assert!(matches!(outcome, InvokeOutcome::Redirect(Location::Progress { .. })));

    let submitted = f.dispatcher.submitted.lock().unwrap();
    assert_eq!(submitted[0].payload, json!({"month": 5}));
}

#[tokio::test]
async fn invoke_redisplays_on_validation_failure() {
    let f = fixture();
    let input = FormInput::new().with("month", "may");

    let outcome = f.workflow.invoke("monthly-digest", Some(&input)).await.unwrap();
    let InvokeOutcome::Form(view) = outcome else {
        panic!("expected the argument form again");
    };
    assert_eq!(view.errors.for_field("month").count(), 1);
    assert_eq!(view.form.fields().len(), 1);
    assert!(f.dispatcher.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invoke_surfaces_queue_failures() {
    let registry = TaskRegistry::new()
        .with_task("export-report", Arc::new(ExportReport::new()))
        .unwrap();
    let workflow = TaskWorkflow::builder(
        Arc::new(registry),
        Arc::new(DownDispatcher),
        Arc::new(FakeStatuses::default()),
    )
    .build();

    let err = workflow
        .invoke("export-report", Some(&FormInput::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Queue(QueueError::Unavailable(_))));
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_b_progress_renders_status() {
    let f = fixture();
    f.statuses.set("job-42", 40);

    let outcome = f.workflow.progress("export-report", "job-42").await.unwrap();
    let ProgressOutcome::View(view) = outcome else {
        panic!("expected a progress view");
    };

    assert!(!view.status.done);
    assert_eq!(view.status.percent, Some(40));
    assert_eq!(view.refresh_ms, 2500);
    assert_eq!(
        view.finish,
        Location::Finish {
            task: TaskId::from("export-report"),
            job: JobId::from("job-42"),
        }
    );
    assert_eq!(f.export.calls(), 0);
}

#[tokio::test]
async fn progress_for_unknown_job_is_not_found() {
    let f = fixture();

    let outcome = f.workflow.progress("export-report", "job-7").await.unwrap();
    match outcome {
        ProgressOutcome::NotFound(Rejection::JobNotFound { task, job }) => {
            assert_eq!(task.as_str(), "export-report");
            assert_eq!(job.as_str(), "job-7");
        }
        other => panic!("expected job not found, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Finish
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_c_finish_while_tracked_is_an_error() {
    let f = fixture();
    f.statuses.set("job-42", 80);
    f.export.set_output(TaskOutput::text("https://example.com/done"));

    let outcome = f.workflow.finish("export-report", "job-42").await.unwrap();
    let FinishOutcome::JobStillActive(view) = outcome else {
        panic!("expected the error state");
    };
    assert_eq!(view.status.percent, Some(80));
    assert_eq!(f.export.calls(), 0);
}

#[tokio::test]
async fn finish_with_errored_job_is_an_error() {
    let f = fixture();
    f.statuses.set("job-42", 10);
    f.statuses.fail("job-42");

    let outcome = f.workflow.finish("export-report", "job-42").await.unwrap();
    let FinishOutcome::JobStillActive(view) = outcome else {
        panic!("expected the error state");
    };
    assert_eq!(view.status.state, JobState::Error);
    assert_eq!(f.export.calls(), 0);
}

#[tokio::test]
async fn scenario_d_finish_downloads_file() {
    let f = fixture();
    f.statuses.set("job-42", 100);
    f.statuses.retire("job-42");
    f.export
        .set_output(TaskOutput::File(FileArtifact::new("report.csv", "/var/exports/job-42.csv")));

    let result = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());
    match result.variant {
        ResultVariant::Download(file) => assert_eq!(file.name, "report.csv"),
        other => panic!("expected download, got {other:?}"),
    }
    assert_eq!(f.export.calls(), 1);
}

#[tokio::test]
async fn scenario_e_finish_redirects_to_url() {
    let f = fixture();
    f.export.set_output(TaskOutput::text("https://example.com/done"));

    let result = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());
    assert_eq!(
        result.variant,
        ResultVariant::Redirect("https://example.com/done".into())
    );
}

#[tokio::test]
async fn scenario_f_finish_renders_data() {
    let f = fixture();
    f.export.set_output(TaskOutput::Data(json!({"rows": 12})));

    let result = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());
    assert_eq!(result.name, "Export report");
    assert_eq!(result.task_id.as_str(), "export-report");
    assert_eq!(result.variant, ResultVariant::Data(json!({"rows": 12})));
}

#[tokio::test]
async fn finish_renders_view_directly() {
    let f = fixture();
    let view = View::new("report/summary", json!({"rows": 12}));
    f.export.set_output(TaskOutput::View(view.clone()));

    let result = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());
    assert_eq!(result.variant, ResultVariant::View(view));
}

#[tokio::test]
async fn finish_without_result_renders_null_data() {
    let f = fixture();

    let result = resolved(f.workflow.finish("monthly-digest", "job-1").await.unwrap());
    assert_eq!(result.variant, ResultVariant::Data(serde_json::Value::Null));
}

#[tokio::test]
async fn finish_is_idempotent() {
    let f = fixture();
    f.export
        .set_output(TaskOutput::File(FileArtifact::new("report.csv", "/var/exports/job-42.csv")));

    let first = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());
    let second = resolved(f.workflow.finish("export-report", "job-42").await.unwrap());

    assert_eq!(first.variant, second.variant);
    assert_eq!(f.export.calls(), 2);
}

// ---------------------------------------------------------------------------
// Cross-cutting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_task_is_not_found_everywhere() {
    let f = fixture();
    let expected = Rejection::TaskNotFound(TaskId::from("nope"));

    match f.workflow.invoke("nope", None).await.unwrap() {
        InvokeOutcome::NotFound(r) => assert_eq!(r, expected),
        other => panic!("invoke: {other:?}"),
    }
    match f.workflow.invoke("nope", Some(&FormInput::new())).await.unwrap() {
        InvokeOutcome::NotFound(r) => assert_eq!(r, expected),
        other => panic!("invoke with input: {other:?}"),
    }
    match f.workflow.progress("nope", "job-42").await.unwrap() {
        ProgressOutcome::NotFound(r) => assert_eq!(r, expected),
        other => panic!("progress: {other:?}"),
    }
    match f.workflow.finish("nope", "job-42").await.unwrap() {
        FinishOutcome::NotFound(r) => assert_eq!(r, expected),
        other => panic!("finish: {other:?}"),
    }
    assert!(f.dispatcher.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn retired_job_never_reports_status_again() {
    let f = fixture();
    f.statuses.set("job-42", 90);
    f.statuses.retire("job-42");
    f.statuses.set("job-42", 10);

    assert!(matches!(
        f.workflow.progress("export-report", "job-42").await.unwrap(),
        ProgressOutcome::NotFound(Rejection::JobNotFound { .. })
    ));
    assert!(matches!(
        f.workflow.finish("export-report", "job-42").await.unwrap(),
        FinishOutcome::Resolved(_)
    ));
}

#[tokio::test]
async fn outcomes_are_recorded() {
    let f = fixture();
    f.statuses.set("job-42", 40);

    f.workflow.select(None);
    f.workflow.progress("export-report", "job-42").await.unwrap();
    f.workflow.finish("export-report", "job-42").await.unwrap();
    f.workflow.finish("missing", "job-42").await.unwrap();

    let outcomes = f.metrics.outcomes.lock().unwrap();
    assert_eq!(
        *outcomes,
        [
            (Stage::Select, "form".to_string()),
            (Stage::Progress, "view".to_string()),
            (Stage::Finish, "job_still_active".to_string()),
            (Stage::Finish, "not_found".to_string()),
        ]
    );
}

#[tokio::test]
async fn full_cycle_with_memory_queue() {
    let queue = Arc::new(MemoryQueue::new());
    let export = Arc::new(ExportReport::new());
    export.set_output(TaskOutput::Data(json!({"rows": 3})));

    let registry = TaskRegistry::new()
        .with_task("export-report", export.clone())
        .unwrap();
    let workflow = TaskWorkflow::builder(Arc::new(registry), queue.clone(), queue.clone()).build();

    let InvokeOutcome::Redirect(Location::Progress { job, .. }) = workflow
        .invoke("export-report", Some(&FormInput::new()))
        .await
        .unwrap()
    else {
        panic!("expected redirect to progress");
    };

    queue.report(&job, 50, None).unwrap();
    assert!(matches!(
        workflow.progress("export-report", job.as_str()).await.unwrap(),
        ProgressOutcome::View(_)
    ));
    assert!(matches!(
        workflow.finish("export-report", job.as_str()).await.unwrap(),
        FinishOutcome::JobStillActive(_)
    ));

    queue.complete(&job).unwrap();
    let result = resolved(workflow.finish("export-report", job.as_str()).await.unwrap());
    assert_eq!(result.variant, ResultVariant::Data(json!({"rows": 3})));
}
