use crate::errors::ToolError;
use serde_json::{Map, Value};

/// Argument checks the JSON schema cannot express, such as "non-blank".
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    pub fn ensure_object<'a>(
        &self,
        value: Option<&'a Value>,
        label: &str,
    ) -> Result<&'a Map<String, Value>, ToolError> {
        value
            .and_then(|v| v.as_object())
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be an object", label)))
    }

    pub fn ensure_optional_object<'a>(
        &self,
        value: Option<&'a Value>,
        label: &str,
    ) -> Result<Option<&'a Map<String, Value>>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(val) => self.ensure_object(Some(val), label).map(Some),
        }
    }
}
