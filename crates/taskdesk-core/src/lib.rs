pub mod error;
pub use error::{CoreError, QueueError, WorkflowError};
pub mod form;
pub use form::{FieldCollector, FormCollector};
pub mod i18n;
pub use i18n::{Catalog, Translator};
pub mod locator;
pub use locator::{LocatorValidator, WebsiteValidator};
pub mod metrics;
pub use metrics::{NoopMetrics, Stage, WorkflowMetrics};
pub mod queue;
pub use queue::{MemoryQueue, QueueDispatcher, QueueStatusProvider};
mod registry;
pub use registry::TaskRegistry;
pub mod resolver;
pub use resolver::{ResultResolver, ResultVariant};
mod task;
pub use task::{Task, TaskRef};
pub mod workflow;
pub use workflow::{
    FinishOutcome, InvokeOutcome, Location, ProgressOutcome, Rejection, SelectOutcome,
    TaskWorkflow, TaskWorkflowBuilder, WorkflowConfig,
};
