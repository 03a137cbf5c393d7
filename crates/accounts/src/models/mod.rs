//! Workflow models, one per account form.
//!
//! Each model owns the form's [`FormRecord`](crate::entities::FormRecord),
//! validates it against the form's rule table, and runs the form's workflow
//! against an [`AccountServices`](crate::services::AccountServices) context.
//! Callers must check `validate()` before running the workflow.

pub mod account;
pub mod confirm_user;
pub mod forgot_password;
pub mod register;
pub mod reset_user_password;

pub use account::{AccountModel, AccountView};
pub use confirm_user::ConfirmUserModel;
pub use forgot_password::ForgotPasswordModel;
pub use register::RegisterModel;
pub use reset_user_password::ResetUserPasswordModel;

use serde_json::Value;

use crate::utils::{FieldRules, Rule};

pub(crate) const FIRST_NAME: FieldRules = FieldRules {
    field: "firstName",
    rules: &[
        (Rule::Required, "Hey Girl, I need your first name."),
        (
            Rule::MaxLength(150),
            "Hey Girl, your name is just too long! Less than 150 characters please.",
        ),
    ],
};

pub(crate) const LAST_NAME: FieldRules = FieldRules {
    field: "lastName",
    rules: &[
        (Rule::Required, "Hey Girl, what's your last name?"),
        (
            Rule::MaxLength(150),
            "Hey Girl, your last name can't be more than 150 characters",
        ),
    ],
};

pub(crate) const PROFILE_EMAIL: FieldRules = FieldRules {
    field: "email",
    rules: &[
        (Rule::Required, "Hey Girl, I can't sign you up without your email."),
        (Rule::Email, "Hey Girl, that doesn't look like a valid email."),
        (
            Rule::MaxLength(150),
            "Hey Girl, your email is too long. Keep it under 150 characters.",
        ),
    ],
};

pub(crate) const PASSWORD_TOO_LONG: &str =
    "Hey Girl, you're being overambitious. Your password can't be more than 20 characters.";

pub(crate) const PASSWORDS_DIFFER: &str =
    "Hey Girl, your passwords don't match. I can't help you until you figure that out!";

/// Identifier text from a directory value, which may be a string or a number.
pub(crate) fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
