use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::ValidationResult;
use crate::error::FormError;
use crate::spec::field::{FieldKind, FieldSpec};
use crate::value::Fields;

/// One page of the wizard. Immutable once the form is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            fields,
        }
    }

    /// Names of the fields that gate forward navigation off this step.
    pub fn required_fields(&self) -> BTreeSet<&str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.id.as_str())
            .collect()
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Pure validation of this step against a snapshot of the fields.
    pub fn validate(&self, fields: &Fields) -> ValidationResult {
        crate::validate::validate_step(self, fields)
    }
}

/// Top-level wizard form definition: an ordered list of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    pub steps: Vec<StepSpec>,
}

impl FormSpec {
    pub fn from_json(raw: &str) -> Result<Self, FormError> {
        let spec: FormSpec = serde_json::from_str(raw)?;
        spec.check()?;
        Ok(spec)
    }

    /// Structural checks: at least one step, unique field ids, options on
    /// every choice field, and conditions that only read declared fields.
    pub fn check(&self) -> Result<(), FormError> {
        if self.steps.is_empty() {
            return Err(FormError::NoSteps(self.id.clone()));
        }
        let mut seen = BTreeSet::new();
        for field in self.fields() {
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::DuplicateField(field.id.clone()));
            }
            if field.kind == FieldKind::Choice
                && field.choices.as_ref().is_none_or(|choices| choices.is_empty())
            {
                return Err(FormError::MissingChoices(field.id.clone()));
            }
        }
        for field in self.fields() {
            if let Some(condition) = &field.visible_if
                && let Some(target) = condition
                    .referenced_fields()
                    .into_iter()
                    .find(|target| !seen.contains(target))
            {
                return Err(FormError::UnknownConditionField {
                    field: field.id.clone(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn last_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.id == id)
    }

    /// Every declared field, initialised to its empty value.
    pub fn empty_fields(&self) -> Fields {
        self.fields()
            .map(|field| (field.id.clone(), Default::default()))
            .collect()
    }
}
