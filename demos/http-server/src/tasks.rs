use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use taskdesk_core::{Catalog, Task, TaskRegistry, Translator};
use taskdesk_model::{
    ArgumentBag, FieldDef, FieldOption, FormBuilder, JobId, JobSpec, TaskOutput,
};
use tracing::warn;

pub const EXPORT_REPORT: &str = "export-report";
pub const PUBLISH_DIGEST: &str = "publish-digest";
pub const QUEUE_PROBE: &str = "queue-probe";

/// Outputs produced by the executor, read back by the tasks.
#[derive(Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<HashMap<JobId, TaskOutput>>>,
}

impl ResultStore {
    pub fn put(&self, job: JobId, output: TaskOutput) {
        match self.inner.write() {
            Ok(mut map) => {
                map.insert(job, output);
            }
            Err(_) => warn!(%job, "result store poisoned, output dropped"),
        }
    }

    pub fn get(&self, job: &JobId) -> Option<TaskOutput> {
        self.inner.read().ok()?.get(job).cloned()
    }
}

pub struct ExportReport {
    store: ResultStore,
}

#[async_trait]
impl Task for ExportReport {
    fn name(&self) -> &'static str {
        EXPORT_REPORT
    }

    fn prepare_form(&self, form: &mut FormBuilder, tr: &dyn Translator) {
        form.add_field(
            FieldDef::integer("month")
                .with_label(tr.translate("label.month"))
                .required(),
        )
        .add_field(
            FieldDef::choice(
                "separator",
                vec![
                    FieldOption::new("comma", tr.translate("label.separator.comma")),
                    FieldOption::new("semicolon", tr.translate("label.separator.semicolon")),
                ],
            )
            .with_label(tr.translate("label.separator"))
            .with_default("comma"),
        )
        .add_field(FieldDef::boolean("header").with_label(tr.translate("label.header")));
    }

    fn queue_job(&self, args: &ArgumentBag) -> JobSpec {
        let month = args.get_i64("month").unwrap_or_default();
        JobSpec::new(EXPORT_REPORT)
            .with_queue("reports")
            .with_description(format!("monthly report #{month}"))
            .with_payload(args.to_value())
    }

    async fn result(&self, job_id: &JobId) -> Option<TaskOutput> {
        self.store.get(job_id)
    }
}

pub struct PublishDigest {
    store: ResultStore,
}

#[async_trait]
impl Task for PublishDigest {
    fn name(&self) -> &'static str {
        PUBLISH_DIGEST
    }

    fn prepare_form(&self, form: &mut FormBuilder, tr: &dyn Translator) {
        form.add_field(
            FieldDef::text("title")
                .with_label(tr.translate("label.title"))
                .required(),
        );
    }

    fn queue_job(&self, args: &ArgumentBag) -> JobSpec {
        JobSpec::new(PUBLISH_DIGEST).with_payload(args.to_value())
    }

    async fn result(&self, job_id: &JobId) -> Option<TaskOutput> {
        self.store.get(job_id)
    }
}

/// No arguments; reports queue statistics as plain data.
pub struct QueueProbe {
    store: ResultStore,
}

#[async_trait]
impl Task for QueueProbe {
    fn name(&self) -> &'static str {
        QUEUE_PROBE
    }

    fn queue_job(&self, _args: &ArgumentBag) -> JobSpec {
        JobSpec::new(QUEUE_PROBE)
    }

    async fn result(&self, job_id: &JobId) -> Option<TaskOutput> {
        self.store.get(job_id)
    }
}

pub fn registry(store: &ResultStore) -> anyhow::Result<TaskRegistry> {
    let registry = TaskRegistry::new()
        .with_task(EXPORT_REPORT, Arc::new(ExportReport { store: store.clone() }))?
        .with_task(PUBLISH_DIGEST, Arc::new(PublishDigest { store: store.clone() }))?
        .with_task(QUEUE_PROBE, Arc::new(QueueProbe { store: store.clone() }))?;
    Ok(registry)
}

pub fn catalog() -> Catalog {
    Catalog::new()
        .with("label.task", "Task")
        .with("label.task.select.description", "Pick the task to run")
        .with("task.export-report", "Export monthly report")
        .with("task.publish-digest", "Publish digest")
        .with("task.queue-probe", "Probe the queue")
        .with("label.month", "Month")
        .with("label.separator", "Column separator")
        .with("label.separator.comma", "Comma")
        .with("label.separator.semicolon", "Semicolon")
        .with("label.header", "Include header row")
        .with("label.title", "Title")
}
