//! Internal utilities.

pub mod validation;

pub use validation::{validate, FieldRules, Rule, ValidationResult};
