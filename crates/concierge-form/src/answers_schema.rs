use serde_json::{Map, Value};

use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::form::FormSpec;

const EMAIL_SCHEMA_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_SCHEMA_PATTERN: &str = r"^[0-9 +()\-]+$";
/// Non-negative decimals as typed, exponent allowed. Overflow to infinity
/// is left to the validator.
const NUMBER_SCHEMA_PATTERN: &str = r"^\s*(\+?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)?\s*$";

/// Generates a JSON schema for an answers document covering every field of
/// the form. Conditional fields are never listed as required because the
/// schema cannot express their condition.
pub fn generate(spec: &FormSpec) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in spec.fields() {
        properties.insert(field.id.clone(), field_schema(field));
        if field.required && field.visible_if.is_none() {
            required.push(Value::String(field.id.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("type".into(), Value::String("object".into()));
    root.insert("title".into(), Value::String(spec.title.clone()));
    root.insert("properties".into(), Value::Object(properties));
    root.insert("additionalProperties".into(), Value::Bool(false));
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }

    Value::Object(root)
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = Map::new();
    schema.insert("title".into(), Value::String(field.label.clone()));
    match field.kind {
        FieldKind::Text => {
            schema.insert("type".into(), Value::String("string".into()));
            if field.required {
                schema.insert("minLength".into(), Value::Number(1.into()));
            }
        }
        FieldKind::Email => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("pattern".into(), Value::String(EMAIL_SCHEMA_PATTERN.into()));
        }
        FieldKind::Phone => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("pattern".into(), Value::String(PHONE_SCHEMA_PATTERN.into()));
        }
        FieldKind::Number => {
            // JSON numbers and typed text are both accepted by the answers loader.
            schema.insert(
                "type".into(),
                Value::Array(vec![
                    Value::String("number".into()),
                    Value::String("string".into()),
                    Value::String("null".into()),
                ]),
            );
            schema.insert("minimum".into(), Value::Number(0.into()));
            schema.insert("pattern".into(), Value::String(NUMBER_SCHEMA_PATTERN.into()));
        }
        FieldKind::Choice => {
            schema.insert("type".into(), Value::String("string".into()));
            if let Some(choices) = &field.choices {
                schema.insert(
                    "enum".into(),
                    Value::Array(
                        choices
                            .iter()
                            .map(|value| Value::String(value.clone()))
                            .collect(),
                    ),
                );
            }
        }
        FieldKind::Acknowledgement => {
            schema.insert("type".into(), Value::String("boolean".into()));
            if field.required {
                schema.insert("const".into(), Value::Bool(true));
            }
        }
    }

    if let Some(help) = &field.help {
        schema.insert("description".into(), Value::String(help.clone()));
    }

    Value::Object(schema)
}
