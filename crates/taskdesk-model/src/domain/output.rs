use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File produced by a job, offered to the operator as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileArtifact {
    /// File name used for the download.
    pub name: String,
    /// Location of the content on disk.
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileArtifact {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Pre-built presentation object: a template name and its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub template: String,
    #[serde(default)]
    pub context: Value,
}

impl View {
    pub fn new(template: impl Into<String>, context: Value) -> Self {
        Self {
            template: template.into(),
            context,
        }
    }
}

/// Whatever a task hands back once its job is finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum TaskOutput {
    File(FileArtifact),
    View(View),
    Data(Value),
}

impl TaskOutput {
    /// Shorthand for a plain string result (often a URL to redirect to).
    pub fn text(value: impl Into<String>) -> Self {
        TaskOutput::Data(Value::String(value.into()))
    }

    /// String form of the output, if it has one.
    ///
    /// Files expose their path, string data exposes itself. Views and
    /// non-string data have none.
    pub fn locator_candidate(&self) -> Option<&str> {
        match self {
            TaskOutput::File(file) => file.path.to_str(),
            TaskOutput::View(_) => None,
            TaskOutput::Data(Value::String(s)) => Some(s.as_str()),
            TaskOutput::Data(_) => None,
        }
    }
}
