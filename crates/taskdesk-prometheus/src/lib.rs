//! Prometheus metrics backend for the taskdesk workflow.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`taskdesk_core::WorkflowMetrics`] that exposes metrics in Prometheus format.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskdesk_core::{MemoryQueue, TaskRegistry, TaskWorkflow};
//! use taskdesk_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let queue = Arc::new(MemoryQueue::new());
//!
//! let workflow = TaskWorkflow::builder(Arc::new(TaskRegistry::new()), queue.clone(), queue)
//!     .with_metrics(Arc::new(metrics.clone()))
//!     .build();
//!
//! let text = metrics.render()?;
//! # let _ = (workflow, text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `taskdesk_jobs_submitted_total{task}` - Counter
//! - `taskdesk_workflow_outcomes_total{stage, outcome}` - Counter
//!
//! ## HTTP Server
//! This crate does NOT provide HTTP server for `/metrics` endpoint.
//! Mount [`PrometheusMetrics::render`] in your application's router.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
