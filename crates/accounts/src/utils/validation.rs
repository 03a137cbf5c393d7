//! Declarative rule-table validation for form records.
//!
//! Each form declares a static table of `(field, [(rule, message)])`. The
//! evaluator runs every rule of every field and collects all messages, so a
//! client sees every problem with the form at once.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::entities::FormRecord;
use crate::types::{AccountError, FieldErrors};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not blank.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    /// Syntactically valid email address.
    Email,
    /// Equal to the named field, with absent, `null` and `""` all equal.
    MatchesField(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [(Rule, &'static str)],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<(), AccountError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(errors) => Err(AccountError::Validation(errors)),
        }
    }
}

/// Evaluate `table` against `record`.
pub fn validate(table: &[FieldRules], record: &FormRecord) -> ValidationResult {
    let mut errors = FieldErrors::new();

    for entry in table {
        let value = field_text(record.get(entry.field));

        for (rule, message) in entry.rules {
            if !rule_holds(*rule, value.as_deref(), record) {
                errors.push(entry.field, *message);
            }
        }
    }

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

fn rule_holds(rule: Rule, value: Option<&str>, record: &FormRecord) -> bool {
    let empty = value.map_or(true, str::is_empty);

    match rule {
        Rule::Required => value.map_or(false, |text| !text.trim().is_empty()),
        // Format rules leave empty values to `Required`; whitespace is still checked.
        Rule::MaxLength(max) => empty || value.map_or(0, |text| text.chars().count()) <= max,
        Rule::Email => empty || value.map_or(false, |text| EMAIL_REGEX.is_match(text)),
        Rule::MatchesField(other) => {
            let other = field_text(record.get(other));
            value.unwrap_or("") == other.as_deref().unwrap_or("")
        }
    }
}

fn field_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}
