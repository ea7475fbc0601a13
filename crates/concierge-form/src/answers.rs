use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Validation error metadata reported for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.to_string(),
        }
    }
}

/// Result returned from step and form validation.
///
/// `errors` only holds entries for invalid fields; `valid` is true exactly
/// when it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
        }
    }

    pub fn from_errors(errors: impl IntoIterator<Item = ValidationError>) -> Self {
        let errors: BTreeMap<_, _> = errors
            .into_iter()
            .map(|error| (error.field.clone(), error))
            .collect();
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Field name to human-readable message, for invalid fields only.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.clone(), error.message.clone()))
            .collect()
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(|error| error.message.as_str())
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }
}
