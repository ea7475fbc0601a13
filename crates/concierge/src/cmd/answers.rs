use std::path::Path;

use anyhow::{Context, Result, bail};
use concierge_form::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const ANSWERS_SCHEMA: &str = "concierge-answers/v1";

/// Answers file accepted by `wizard --answers` and `validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswersDocument {
    pub schema: String,
    #[serde(default)]
    pub fields: JsonMap<String, JsonValue>,
}

impl AnswersDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers {}", path.display()))?;
        let doc: AnswersDocument = serde_json::from_str(&raw)
            .with_context(|| format!("answers {} must be valid JSON", path.display()))?;
        if doc.schema != ANSWERS_SCHEMA {
            bail!(
                "answers {} declare schema `{}`, expected `{ANSWERS_SCHEMA}`",
                path.display(),
                doc.schema
            );
        }
        Ok(doc)
    }

    /// Converts the JSON values to field values. Numbers become text so the
    /// number validator sees what the user typed.
    pub fn field_values(&self) -> Result<Fields> {
        self.fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    JsonValue::Null => FieldValue::Empty,
                    JsonValue::Bool(flag) => FieldValue::Flag(*flag),
                    JsonValue::Number(number) => FieldValue::text(number.to_string()),
                    JsonValue::String(text) => FieldValue::text(text.as_str()),
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        bail!("answer `{name}` must be a string, number, boolean or null")
                    }
                };
                Ok((name.clone(), value))
            })
            .collect()
    }
}
