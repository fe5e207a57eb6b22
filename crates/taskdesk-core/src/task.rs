use std::sync::Arc;

use async_trait::async_trait;
use taskdesk_model::{ArgumentBag, FormBuilder, JobId, JobSpec, TaskOutput};

use crate::i18n::Translator;

/// Shared handle to a registered task.
pub type TaskRef = Arc<dyn Task>;

/// A named, parameterized unit of deferred work an operator can invoke.
///
/// Implementations hold no per-invocation state: everything an invocation
/// needs travels in the [`ArgumentBag`] and, after queueing, in the [`JobId`].
///
/// Required:
/// - [`name`](Task::name) - constant used to derive the translation key
/// - [`queue_job`](Task::queue_job) - what work to run
///
/// The remaining hooks have defaults: a translated display name, no extra
/// form fields and no result.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Compile-time name of the task (e.g. `"export-report"`).
    fn name(&self) -> &'static str;

    /// Display name, translated from `task.<name>`.
    fn display_name(&self, translator: &dyn Translator) -> String {
        translator.translate(&format!("task.{}", self.name()))
    }

    /// Declare extra arguments on the invocation form.
    fn prepare_form(&self, _form: &mut FormBuilder, _translator: &dyn Translator) {}

    /// Build the job to queue from validated arguments.
    ///
    /// Must not queue anything itself.
    fn queue_job(&self, args: &ArgumentBag) -> JobSpec;

    /// Outcome of a completed job.
    ///
    /// Called every time the finish step is visited, so it must return the
    /// same value for the same job id.
    async fn result(&self, _job_id: &JobId) -> Option<TaskOutput> {
        None
    }
}
