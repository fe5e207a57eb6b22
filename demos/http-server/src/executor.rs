use std::{path::PathBuf, time::Duration};

use serde_json::{Value, json};
use taskdesk_core::MemoryQueue;
use taskdesk_model::{FileArtifact, JobId, JobSpec, TaskOutput};
use tracing::{debug, error, info, instrument, warn};

use crate::tasks::{EXPORT_REPORT, PUBLISH_DIGEST, QUEUE_PROBE, ResultStore};

const STEPS: u8 = 5;

/// Simulated worker draining the in-memory queue one job at a time.
pub struct Executor {
    queue: MemoryQueue,
    store: ResultStore,
    out_dir: PathBuf,
    tick: Duration,
}

impl Executor {
    pub fn new(queue: MemoryQueue, store: ResultStore, out_dir: PathBuf) -> Self {
        Self {
            queue,
            store,
            out_dir,
            tick: Duration::from_millis(400),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub async fn run(self) {
        info!(out_dir = %self.out_dir.display(), "executor started");
        loop {
            if let Err(e) = self.drain().await {
                error!(error = %e, "executor pass failed");
            }
            tokio::time::sleep(self.tick).await;
        }
    }

    /// Work off every waiting job once.
    pub async fn drain(&self) -> anyhow::Result<usize> {
        let waiting = self.queue.waiting()?;
        let count = waiting.len();
        for (id, spec) in waiting {
            self.work(&id, &spec).await?;
        }
        Ok(count)
    }

    #[instrument(level = "debug", skip(self, spec), fields(kind = %spec.kind))]
    async fn work(&self, id: &JobId, spec: &JobSpec) -> anyhow::Result<()> {
        self.queue.start(id)?;

        for step in 1..STEPS {
            tokio::time::sleep(self.tick).await;
            let percent = step * (100 / STEPS);
            self.queue.report(id, percent, Some(format!("step {step} of {STEPS}")))?;
        }

        match self.produce(id, spec).await {
            Ok(output) => {
                self.store.put(id.clone(), output);
                self.queue.complete(id)?;
                debug!(job = %id, "job completed");
            }
            Err(e) => {
                warn!(job = %id, error = %e, "job failed");
                self.queue.fail(id, e.to_string())?;
            }
        }
        Ok(())
    }

    async fn produce(&self, id: &JobId, spec: &JobSpec) -> anyhow::Result<TaskOutput> {
        match spec.kind.as_str() {
            EXPORT_REPORT => self.export_report(id, &spec.payload).await,
            PUBLISH_DIGEST => Ok(TaskOutput::text(format!(
                "https://digest.example.com/{}",
                id.as_str()
            ))),
            QUEUE_PROBE => Ok(TaskOutput::Data(json!({
                "tracked": self.queue.len()?,
                "waiting": self.queue.waiting()?.len(),
            }))),
            other => anyhow::bail!("no handler for job kind '{other}'"),
        }
    }

    async fn export_report(&self, id: &JobId, payload: &Value) -> anyhow::Result<TaskOutput> {
        let month = payload["month"].as_i64().unwrap_or_default();
        if !(1..=12).contains(&month) {
            anyhow::bail!("month out of range: {month}");
        }
        let sep = match payload["separator"].as_str() {
            Some("semicolon") => ';',
            _ => ',',
        };

        let mut csv = String::new();
        if payload["header"].as_bool().unwrap_or(false) {
            csv.push_str(&format!("day{sep}orders\n"));
        }
        for day in 1..=28 {
            csv.push_str(&format!("{day}{sep}{}\n", (day * month) % 17));
        }

        tokio::fs::create_dir_all(&self.out_dir).await?;
        let path = self.out_dir.join(format!("{}.csv", id.as_str()));
        tokio::fs::write(&path, csv).await?;

        Ok(TaskOutput::File(
            FileArtifact::new(format!("report-{month:02}.csv"), path).with_content_type("text/csv"),
        ))
    }
}
