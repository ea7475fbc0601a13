use once_cell::sync::Lazy;
use regex::Regex;

use crate::answers::{ValidationError, ValidationResult};
use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::form::{FormSpec, StepSpec};
use crate::value::{FieldValue, Fields};
use crate::visibility::resolve_visibility;

// local@domain.tld shape only; deliberately looser than RFC 5322.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9 +()\-]+$").expect("phone pattern is valid"));

static EMPTY: FieldValue = FieldValue::Empty;

/// Why a single value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Required,
    InvalidEmail,
    InvalidPhone,
    NotAccepted,
    InvalidNumber,
    NegativeNumber,
    UnknownChoice,
    TypeMismatch,
}

impl Rejection {
    pub fn code(self) -> &'static str {
        match self {
            Rejection::Required => "required",
            Rejection::InvalidEmail => "invalid_email",
            Rejection::InvalidPhone => "invalid_phone",
            Rejection::NotAccepted => "not_accepted",
            Rejection::InvalidNumber => "invalid_number",
            Rejection::NegativeNumber => "negative_number",
            Rejection::UnknownChoice => "unknown_choice",
            Rejection::TypeMismatch => "type_mismatch",
        }
    }

    pub fn message(self, label: &str) -> String {
        match self {
            Rejection::Required => format!("{label} is required"),
            Rejection::InvalidEmail => "Please enter a valid email address".to_string(),
            Rejection::InvalidPhone => {
                "Phone numbers may only contain digits, spaces, +, ( ) and -".to_string()
            }
            Rejection::NotAccepted => format!("{label} must be accepted to continue"),
            Rejection::InvalidNumber => format!("{label} must be a number"),
            Rejection::NegativeNumber => format!("{label} cannot be negative"),
            Rejection::UnknownChoice => format!("Please select a {label} from the list"),
            Rejection::TypeMismatch => format!("{label} has an unexpected value"),
        }
    }
}

/// Validates every visible field of one step.
pub fn validate_step(step: &StepSpec, fields: &Fields) -> ValidationResult {
    let visibility = resolve_visibility(step, fields);
    let errors = step
        .fields
        .iter()
        .filter(|field| visibility.get(&field.id).copied().unwrap_or(true))
        .filter_map(|field| {
            let value = fields.get(&field.id).unwrap_or(&EMPTY);
            validate_field(field, value).err().map(|rejection| {
                ValidationError::new(
                    field.id.clone(),
                    rejection.message(&field.label),
                    rejection.code(),
                )
            })
        });
    ValidationResult::from_errors(errors)
}

/// Validates all steps of a form at once.
pub fn validate_form(spec: &FormSpec, fields: &Fields) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for step in &spec.steps {
        result.merge(validate_step(step, fields));
    }
    result
}

/// Validates one value against its field definition, ignoring visibility.
pub fn validate_field(field: &FieldSpec, value: &FieldValue) -> Result<(), Rejection> {
    match field.kind {
        FieldKind::Acknowledgement => match value {
            FieldValue::Text(_) => Err(Rejection::TypeMismatch),
            _ if field.required => validate_acknowledgement(value),
            _ => Ok(()),
        },
        FieldKind::Text => check_text(field, value, validate_required_text),
        FieldKind::Email => check_text(field, value, validate_email),
        FieldKind::Phone => check_text(field, value, validate_phone),
        FieldKind::Number => check_text(field, value, |text| validate_number(text).map(|_| ())),
        FieldKind::Choice => check_text(field, value, |text| {
            validate_choice(text, field.choices.as_deref().unwrap_or_default())
        }),
    }
}

// Blank text only fails when the field is required; otherwise `check` decides.
fn check_text(
    field: &FieldSpec,
    value: &FieldValue,
    check: impl FnOnce(&str) -> Result<(), Rejection>,
) -> Result<(), Rejection> {
    let text = match value {
        FieldValue::Flag(_) => return Err(Rejection::TypeMismatch),
        FieldValue::Empty => "",
        FieldValue::Text(text) => text.as_str(),
    };
    if text.trim().is_empty() {
        return if field.required {
            Err(Rejection::Required)
        } else {
            Ok(())
        };
    }
    check(text)
}

pub fn validate_required_text(value: &str) -> Result<(), Rejection> {
    if value.trim().is_empty() {
        Err(Rejection::Required)
    } else {
        Ok(())
    }
}

pub fn validate_email(value: &str) -> Result<(), Rejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Rejection::Required);
    }
    if EMAIL_PATTERN.is_match(trimmed) {
        Ok(())
    } else {
        Err(Rejection::InvalidEmail)
    }
}

pub fn validate_phone(value: &str) -> Result<(), Rejection> {
    if value.trim().is_empty() {
        return Err(Rejection::Required);
    }
    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(Rejection::InvalidPhone)
    }
}

/// Only a literal `true` is accepted.
pub fn validate_acknowledgement(value: &FieldValue) -> Result<(), Rejection> {
    match value {
        FieldValue::Flag(true) => Ok(()),
        FieldValue::Text(_) => Err(Rejection::TypeMismatch),
        _ => Err(Rejection::NotAccepted),
    }
}

/// Blank input is absent (`Ok(None)`); anything else must parse as a
/// finite, non-negative number.
pub fn validate_number(value: &str) -> Result<Option<f64>, Rejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed: f64 = trimmed.parse().map_err(|_| Rejection::InvalidNumber)?;
    if !parsed.is_finite() {
        return Err(Rejection::InvalidNumber);
    }
    if parsed < 0.0 {
        return Err(Rejection::NegativeNumber);
    }
    Ok(Some(parsed))
}

pub fn validate_choice(value: &str, choices: &[String]) -> Result<(), Rejection> {
    let trimmed = value.trim();
    if choices.iter().any(|choice| choice == trimmed) {
        Ok(())
    } else {
        Err(Rejection::UnknownChoice)
    }
}
