//! Select → invoke → progress → finish.
//!
//! Every step is an independent handler: the caller carries the task id and
//! job id between steps, the workflow keeps no per-invocation state and never
//! waits for a job. Waiting means calling [`TaskWorkflow::progress`] again.

use std::sync::Arc;

use taskdesk_model::{FieldDef, FieldOption, FormBuilder, FormInput, JobId, TaskId, ValidationErrors};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::WorkflowError,
    form::{FieldCollector, FormCollector},
    i18n::{Catalog, Translator},
    metrics::{NoopMetrics, Stage, WorkflowMetrics},
    queue::{QueueDispatcher, QueueStatusProvider},
    registry::TaskRegistry,
    resolver::ResultResolver,
    task::TaskRef,
};

mod outcome;
pub use outcome::*;

/// Name of the choice field on the selection form.
pub const SELECT_FIELD: &str = "task";

const DEFAULT_REFRESH_MS: u64 = 1000;

/// Workflow tuning.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Re-poll hint handed out with every progress view.
    pub refresh_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
        }
    }
}

/// The four entry points of a task invocation.
pub struct TaskWorkflow {
    registry: Arc<TaskRegistry>,
    dispatcher: Arc<dyn QueueDispatcher>,
    statuses: Arc<dyn QueueStatusProvider>,
    collector: Arc<dyn FormCollector>,
    resolver: ResultResolver,
    translator: Arc<dyn Translator>,
    metrics: Arc<dyn WorkflowMetrics>,
    config: WorkflowConfig,
}

/// Builder for [`TaskWorkflow`]; every collaborator but the registry and the
/// queue has a default.
pub struct TaskWorkflowBuilder {
    registry: Arc<TaskRegistry>,
    dispatcher: Arc<dyn QueueDispatcher>,
    statuses: Arc<dyn QueueStatusProvider>,
    collector: Arc<dyn FormCollector>,
    resolver: ResultResolver,
    translator: Arc<dyn Translator>,
    metrics: Arc<dyn WorkflowMetrics>,
    config: WorkflowConfig,
}

impl TaskWorkflowBuilder {
    pub fn with_collector(mut self, collector: Arc<dyn FormCollector>) -> Self {
        self.collector = collector;
        self
    }

    pub fn with_resolver(mut self, resolver: ResultResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn WorkflowMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TaskWorkflow {
        TaskWorkflow {
            registry: self.registry,
            dispatcher: self.dispatcher,
            statuses: self.statuses,
            collector: self.collector,
            resolver: self.resolver,
            translator: self.translator,
            metrics: self.metrics,
            config: self.config,
        }
    }
}

impl TaskWorkflow {
    pub fn builder(
        registry: Arc<TaskRegistry>,
        dispatcher: Arc<dyn QueueDispatcher>,
        statuses: Arc<dyn QueueStatusProvider>,
    ) -> TaskWorkflowBuilder {
        TaskWorkflowBuilder {
            registry,
            dispatcher,
            statuses,
            collector: Arc::new(FieldCollector),
            resolver: ResultResolver::default(),
            translator: Arc::new(Catalog::new()),
            metrics: Arc::new(NoopMetrics),
            config: WorkflowConfig::default(),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Offer all registered tasks; a valid choice moves on to invoking it.
    #[instrument(level = "debug", skip_all, fields(submitted = input.is_some()))]
    pub fn select(&self, input: Option<&FormInput>) -> SelectOutcome {
        let tr = self.translator.as_ref();

        let tasks: Vec<TaskChoice> = self
            .registry
            .resolve_all()
            .map(|(id, task)| TaskChoice {
                id: id.clone(),
                name: task.display_name(tr),
            })
            .collect();

        let options = tasks
            .iter()
            .map(|c| FieldOption::new(c.id.as_str(), c.name.as_str()))
            .collect();

        let mut builder = FormBuilder::new();
        builder.add_field(
            FieldDef::choice(SELECT_FIELD, options)
                .with_label(tr.translate("label.task"))
                .with_description(tr.translate("label.task.select.description"))
                .required(),
        );
        let form = builder.build();

        let mut errors = ValidationErrors::new();
        if let Some(input) = input {
            match self.collector.collect(&form, input) {
                Ok(args) => match args.get_str(SELECT_FIELD) {
                    Some(task) => {
                        debug!(task, "task selected");
                        return self.done(
                            Stage::Select,
                            SelectOutcome::Redirect(Location::Invoke {
                                task: TaskId::from(task),
                            }),
                            |o| o.kind(),
                        );
                    }
                    None => errors.push(SELECT_FIELD, "this field is required"),
                },
                Err(e) => errors = e,
            }
        }

        self.done(
            Stage::Select,
            SelectOutcome::Form(SelectView {
                form,
                tasks,
                errors,
            }),
            |o| o.kind(),
        )
    }

    /// Ask for the task's extra arguments and queue its job.
    #[instrument(level = "debug", skip(self, input), fields(submitted = input.is_some()))]
    pub async fn invoke(
        &self,
        task_id: &str,
        input: Option<&FormInput>,
    ) -> Result<InvokeOutcome, WorkflowError> {
        let task = match self.lookup(task_id) {
            Ok(task) => task,
            Err(rejection) => {
                return Ok(self.done(Stage::Invoke, InvokeOutcome::NotFound(rejection), |o| o.kind()));
            }
        };
        let tr = self.translator.as_ref();

        let mut builder = FormBuilder::new();
        task.prepare_form(&mut builder, tr);
        let form = builder.build();

        let mut errors = ValidationErrors::new();
        if let Some(input) = input {
            match self.collector.collect(&form, input) {
                Ok(args) => {
                    let spec = task.queue_job(&args);
                    let job = self.dispatcher.submit(spec).await?;

                    info!(task = task_id, %job, "task queued");
                    self.metrics.record_submitted(task_id);

                    let outcome = InvokeOutcome::Redirect(Location::Progress {
                        task: TaskId::from(task_id),
                        job,
                    });
                    return Ok(self.done(Stage::Invoke, outcome, |o| o.kind()));
                }
                Err(e) => errors = e,
            }
        }

        let outcome = InvokeOutcome::Form(InvokeView {
            name: task.display_name(tr),
            task_id: TaskId::from(task_id),
            form,
            errors,
        });
        Ok(self.done(Stage::Invoke, outcome, |o| o.kind()))
    }

    /// Show the current status of a queued job.
    ///
    /// Never decides completion; callers poll this until the job's status is
    /// gone and then move on to [`finish`](TaskWorkflow::finish).
    #[instrument(level = "debug", skip(self))]
    pub async fn progress(
        &self,
        task_id: &str,
        job_id: &str,
    ) -> Result<ProgressOutcome, WorkflowError> {
        let task = match self.lookup(task_id) {
            Ok(task) => task,
            Err(rejection) => {
                return Ok(self.done(Stage::Progress, ProgressOutcome::NotFound(rejection), |o| o.kind()));
            }
        };

        let job = JobId::from(job_id);
        let Some(status) = self.statuses.status(&job).await? else {
            debug!(task = task_id, job = job_id, "no status for job");
            let rejection = Rejection::JobNotFound {
                task: TaskId::from(task_id),
                job,
            };
            return Ok(self.done(Stage::Progress, ProgressOutcome::NotFound(rejection), |o| o.kind()));
        };

        let outcome = ProgressOutcome::View(ProgressView {
            name: task.display_name(self.translator.as_ref()),
            task_id: TaskId::from(task_id),
            job_id: job.clone(),
            status,
            refresh_ms: self.config.refresh_ms,
            finish: Location::Finish {
                task: TaskId::from(task_id),
                job,
            },
        });
        Ok(self.done(Stage::Progress, outcome, |o| o.kind()))
    }

    /// Resolve the outcome of a job the queue no longer tracks.
    ///
    /// A job that still has a status, whatever its state, is an error here:
    /// the task's result is not looked at.
    #[instrument(level = "debug", skip(self))]
    pub async fn finish(&self, task_id: &str, job_id: &str) -> Result<FinishOutcome, WorkflowError> {
        let task = match self.lookup(task_id) {
            Ok(task) => task,
            Err(rejection) => {
                return Ok(self.done(Stage::Finish, FinishOutcome::NotFound(rejection), |o| o.kind()));
            }
        };
        let name = task.display_name(self.translator.as_ref());
        let job = JobId::from(job_id);

        if let Some(status) = self.statuses.status(&job).await? {
            if status.state.is_active() {
                warn!(task = task_id, job = job_id, state = ?status.state, "finish requested while the job is still running");
            } else {
                warn!(task = task_id, job = job_id, message = ?status.message, "finish requested for a failed job");
            }
            let outcome = FinishOutcome::JobStillActive(ErrorView {
                name,
                task_id: TaskId::from(task_id),
                job_id: job,
                status,
            });
            return Ok(self.done(Stage::Finish, outcome, |o| o.kind()));
        }

        let variant = self.resolver.resolve(task.result(&job).await);
        debug!(task = task_id, job = job_id, variant = variant.kind(), "task result resolved");

        let outcome = FinishOutcome::Resolved(ResolvedResult {
            name,
            task_id: TaskId::from(task_id),
            job_id: job,
            variant,
        });
        Ok(self.done(Stage::Finish, outcome, |o| o.kind()))
    }

    fn lookup(&self, task_id: &str) -> Result<TaskRef, Rejection> {
        self.registry.resolve(task_id).map_err(|e| {
            debug!(error = %e, "task lookup failed");
            Rejection::TaskNotFound(TaskId::from(task_id))
        })
    }

    fn done<O>(&self, stage: Stage, outcome: O, kind: impl Fn(&O) -> &'static str) -> O {
        self.metrics.record_outcome(stage, kind(&outcome));
        outcome
    }
}

#[cfg(test)]
mod tests;
