pub mod answers;
pub mod form;
pub mod prompt;
pub mod validate;
pub mod wizard;
