use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder, proto::MetricFamily};
use taskdesk_core::{Stage, WorkflowMetrics};
use tracing::warn;

/// Workflow counters registered on a dedicated [`Registry`].
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    jobs_submitted: IntCounterVec,
    outcomes: IntCounterVec,
}

impl PrometheusMetrics {
    /// Create the counters on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Create the counters on an existing registry.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let jobs_submitted = IntCounterVec::new(
            Opts::new(
                "taskdesk_jobs_submitted_total",
                "Jobs handed to the queue dispatcher",
            ),
            &["task"],
        )?;
        let outcomes = IntCounterVec::new(
            Opts::new(
                "taskdesk_workflow_outcomes_total",
                "Workflow entry point outcomes",
            ),
            &["stage", "outcome"],
        )?;

        registry.register(Box::new(jobs_submitted.clone()))?;
        registry.register(Box::new(outcomes.clone()))?;

        Ok(Self {
            registry,
            jobs_submitted,
            outcomes,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl WorkflowMetrics for PrometheusMetrics {
    fn record_submitted(&self, task: &str) {
        match self.jobs_submitted.get_metric_with_label_values(&[task]) {
            Ok(counter) => counter.inc(),
            Err(e) => warn!(error = %e, "failed to record job submission"),
        }
    }

    fn record_outcome(&self, stage: Stage, outcome: &str) {
        match self
            .outcomes
            .get_metric_with_label_values(&[stage.as_str(), outcome])
        {
            Ok(counter) => counter.inc(),
            Err(e) => warn!(error = %e, "failed to record workflow outcome"),
        }
    }
}
