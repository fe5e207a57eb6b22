use serde_json::Value;
use taskdesk_model::{ArgumentBag, FieldDef, FieldKind, Form, FormInput, ValidationErrors};
use tracing::trace;

/// Turns a raw submission into validated arguments.
pub trait FormCollector: Send + Sync {
    fn collect(&self, form: &Form, input: &FormInput) -> Result<ArgumentBag, ValidationErrors>;
}

/// Default collector driven by the declared field kinds.
///
/// - blank values fall back to the field default, then count as missing
/// - missing required fields are errors, missing optional ones are left out
/// - integers must parse, choices must match a declared option
/// - booleans accept `1`/`true`/`on`/`yes` and `0`/`false`/`off`/`no`; absent means `false`,
///   and a required boolean must be `true`
/// - submitted keys without a declared field are ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCollector;

impl FormCollector for FieldCollector {
    fn collect(&self, form: &Form, input: &FormInput) -> Result<ArgumentBag, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut values = Vec::with_capacity(form.fields().len());

        for field in form.fields() {
            match convert(field, input.get(&field.name)) {
                Ok(Some(value)) => values.push((field.name.clone(), value)),
                Ok(None) => {}
                Err(message) => errors.push(field.name.clone(), message),
            }
        }

        if !errors.is_empty() {
            trace!(errors = errors.len(), "form submission rejected");
            return Err(errors);
        }
        Ok(values.into_iter().collect())
    }
}

fn convert(field: &FieldDef, raw: Option<&str>) -> Result<Option<Value>, String> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or(field.default.as_deref());

    match (&field.kind, raw) {
        (FieldKind::Boolean, raw) => {
            let checked = match raw {
                Some(v) => parse_bool(v).ok_or_else(|| format!("'{v}' is not a boolean"))?,
                None => false,
            };
            if field.required && !checked {
                return Err("this field must be checked".to_string());
            }
            Ok(Some(Value::Bool(checked)))
        }
        (_, None) if field.required => Err("this field is required".to_string()),
        (_, None) => Ok(None),
        (FieldKind::Text, Some(raw)) => Ok(Some(Value::String(raw.to_string()))),
        (FieldKind::Integer, Some(raw)) => raw
            .parse::<i64>()
            .map(|n| Some(Value::from(n)))
            .map_err(|_| format!("'{raw}' is not an integer")),
        (FieldKind::Choice { options }, Some(raw)) => {
            if options.iter().any(|o| o.value == raw) {
                Ok(Some(Value::String(raw.to_string())))
            } else {
                Err(format!("'{raw}' is not a valid option"))
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
