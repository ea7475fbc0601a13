use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, Fields};

/// Predicate over the current field values, used for conditional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Equals { field: String, value: FieldValue },
    NotEquals { field: String, value: FieldValue },
    IsSet { field: String },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluates against a snapshot of the fields. Missing fields read as empty.
    pub fn evaluate(&self, fields: &Fields) -> bool {
        match self {
            Condition::Equals { field, value } => same_value(lookup(fields, field), value),
            Condition::NotEquals { field, value } => !same_value(lookup(fields, field), value),
            Condition::IsSet { field } => !lookup(fields, field).is_blank(),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(fields)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(fields)),
            Condition::Not { condition } => !condition.evaluate(fields),
        }
    }

    /// Every field name this condition reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            Condition::Equals { field, .. }
            | Condition::NotEquals { field, .. }
            | Condition::IsSet { field } => vec![field.as_str()],
            Condition::All { conditions } | Condition::Any { conditions } => conditions
                .iter()
                .flat_map(Condition::referenced_fields)
                .collect(),
            Condition::Not { condition } => condition.referenced_fields(),
        }
    }
}

static EMPTY: FieldValue = FieldValue::Empty;

fn lookup<'a>(fields: &'a Fields, field: &str) -> &'a FieldValue {
    fields.get(field).unwrap_or(&EMPTY)
}

// Selector values compare on trimmed text so stray whitespace cannot hide a sentinel.
fn same_value(actual: &FieldValue, expected: &FieldValue) -> bool {
    match (actual, expected) {
        (FieldValue::Text(a), FieldValue::Text(b)) => a.trim() == b.trim(),
        _ => actual == expected,
    }
}
