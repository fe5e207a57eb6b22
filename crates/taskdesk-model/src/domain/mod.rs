mod task_id;
pub use task_id::TaskId;

mod job_id;
pub use job_id::JobId;

mod job_spec;
pub use job_spec::{DEFAULT_QUEUE, JobSpec};

mod job_status;
pub use job_status::{JobState, JobStatus};

mod arguments;
pub use arguments::ArgumentBag;

mod form;
pub use form::{FieldDef, FieldError, FieldKind, FieldOption, Form, FormBuilder, FormInput, ValidationErrors};

mod output;
pub use output::{FileArtifact, TaskOutput, View};

/// Progress of a job in percent (`0..=100`).
pub type Percent = u8;
