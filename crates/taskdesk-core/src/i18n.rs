use std::collections::HashMap;

/// Turns translation keys into display strings.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

/// Map backed translator.
///
/// Unknown keys translate to themselves, so a lookup never yields an empty string.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => key.to_string(),
        }
    }
}
