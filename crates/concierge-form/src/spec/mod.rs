pub mod condition;
pub mod field;
pub mod form;

pub use condition::Condition;
pub use field::{FieldKind, FieldSpec};
pub use form::{FormSpec, StepSpec};
