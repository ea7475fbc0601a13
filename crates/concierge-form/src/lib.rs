#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod error;
pub mod spec;
pub mod validate;
pub mod value;
pub mod visibility;

pub use answers::{ValidationError, ValidationResult};
pub use answers_schema::generate as answers_schema;
pub use error::FormError;
pub use spec::{Condition, FieldKind, FieldSpec, FormSpec, StepSpec};
pub use validate::{
    Rejection, validate_acknowledgement, validate_choice, validate_email, validate_field,
    validate_form, validate_number, validate_phone, validate_required_text, validate_step,
};
pub use value::{FieldValue, Fields};
pub use visibility::{VisibilityMap, resolve_visibility};
