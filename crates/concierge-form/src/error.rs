use thiserror::Error;

/// Errors raised while loading or checking a form definition.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to parse form definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("form '{0}' declares no steps")]
    NoSteps(String),
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("choice field '{0}' declares no options")]
    MissingChoices(String),
    #[error("field '{field}' has a condition on unknown field '{target}'")]
    UnknownConditionField { field: String, target: String },
}
