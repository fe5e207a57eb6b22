use std::sync::Arc;

use serde_json::Value;
use taskdesk_model::{FileArtifact, TaskOutput, View};

use crate::locator::{LocatorValidator, WebsiteValidator};

/// Classification of a finished task's output.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultVariant {
    /// Force a download of the artifact under its name.
    Download(FileArtifact),
    /// Render the view as is.
    View(View),
    /// Redirect to a validated locator.
    Redirect(String),
    /// Render the generic finish view with the raw value.
    Data(Value),
}

impl ResultVariant {
    /// Short symbolic identifier, used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResultVariant::Download(_) => "download",
            ResultVariant::View(_) => "view",
            ResultVariant::Redirect(_) => "redirect",
            ResultVariant::Data(_) => "data",
        }
    }
}

/// Ordered, first-match-wins classification of task outputs.
///
/// 1. file artifact -> [`ResultVariant::Download`]
/// 2. view -> [`ResultVariant::View`]
/// 3. anything whose locator candidate passes the validator -> [`ResultVariant::Redirect`]
/// 4. everything else, including no output at all -> [`ResultVariant::Data`]
#[derive(Clone)]
pub struct ResultResolver {
    validator: Arc<dyn LocatorValidator>,
}

impl ResultResolver {
    pub fn new(validator: Arc<dyn LocatorValidator>) -> Self {
        Self { validator }
    }

    pub fn resolve(&self, output: Option<TaskOutput>) -> ResultVariant {
        let Some(output) = output else {
            return ResultVariant::Data(Value::Null);
        };

        let locator = output
            .locator_candidate()
            .filter(|candidate| self.validator.is_valid_locator(candidate))
            .map(str::to_string);

        // arm order is the priority order
        match (output, locator) {
            (TaskOutput::File(file), _) => ResultVariant::Download(file),
            (TaskOutput::View(view), _) => ResultVariant::View(view),
            (_, Some(locator)) => ResultVariant::Redirect(locator),
            (TaskOutput::Data(value), None) => ResultVariant::Data(value),
        }
    }
}

impl Default for ResultResolver {
    fn default() -> Self {
        Self::new(Arc::new(WebsiteValidator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AcceptAll;

    impl LocatorValidator for AcceptAll {
        fn is_valid_locator(&self, _value: &str) -> bool {
            true
        }
    }

    #[test]
    fn file_becomes_download() {
        let file = FileArtifact::new("report.csv", "/var/exports/report.csv");
        let variant = ResultResolver::default().resolve(Some(TaskOutput::File(file.clone())));
        assert_eq!(variant, ResultVariant::Download(file));
    }

    #[test]
    fn download_wins_over_redirect() {
        // the path is itself a valid locator, the file rule must still win
        let file = FileArtifact::new("report.csv", "https://example.com/report.csv");
        let resolver = ResultResolver::default();
        assert!(WebsiteValidator.is_valid_locator(file.path.to_str().unwrap()));

        let variant = resolver.resolve(Some(TaskOutput::File(file.clone())));
        assert_eq!(variant, ResultVariant::Download(file));
    }

    #[test]
    fn view_wins_over_redirect() {
        let view = View::new("report/summary", json!({"rows": 3}));
        let resolver = ResultResolver::new(Arc::new(AcceptAll));
        let variant = resolver.resolve(Some(TaskOutput::View(view.clone())));
        assert_eq!(variant, ResultVariant::View(view));
    }

    #[test]
    fn valid_url_becomes_redirect() {
        let variant =
            ResultResolver::default().resolve(Some(TaskOutput::text("https://example.com/done")));
        assert_eq!(variant, ResultVariant::Redirect("https://example.com/done".into()));
        assert_eq!(variant.kind(), "redirect");
    }

    #[test]
    fn plain_string_is_data() {
        let variant = ResultResolver::default().resolve(Some(TaskOutput::text("all done")));
        assert_eq!(variant, ResultVariant::Data(json!("all done")));
    }

    #[test]
    fn structured_value_is_data() {
        let variant = ResultResolver::new(Arc::new(AcceptAll))
            .resolve(Some(TaskOutput::Data(json!({"rows": 12}))));
        assert_eq!(variant, ResultVariant::Data(json!({"rows": 12})));
    }

    #[test]
    fn missing_output_is_null_data() {
        assert_eq!(ResultResolver::default().resolve(None), ResultVariant::Data(Value::Null));
    }
}
