//! Setting a new password with a reset token.

use serde_json::Value;
use tracing::{debug, info};

use portal_directory::SendReceipt;

use crate::entities::FormRecord;
use crate::services::AccountServices;
use crate::types::{AccountError, AccountResult};
use crate::utils::{validate, FieldRules, Rule, ValidationResult};

const RULES: &[FieldRules] = &[
    FieldRules {
        field: "password",
        rules: &[(Rule::Required, "The password is required")],
    },
    FieldRules {
        field: "token",
        rules: &[(Rule::Required, "The token is required")],
    },
];

/// Reset-link landing form: `{password, token}`.
#[derive(Debug, Clone)]
pub struct ResetUserPasswordModel {
    record: FormRecord,
}

impl ResetUserPasswordModel {
    pub fn new(input: FormRecord) -> Self {
        Self { record: input }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn validate(&self) -> ValidationResult {
        validate(RULES, &self.record)
    }

    /// Apply the new password, then let the account holder know it changed.
    /// The notification's delivery is not checked.
    pub async fn save(&self, services: &AccountServices) -> AccountResult<SendReceipt> {
        let password = self.record.text("password").unwrap_or_default();
        let token = self.record.text("token").unwrap_or_default();

        debug!("resetting password");
        let user = services.directory.reset_password(&token, &password).await?;
        let email = user
            .get("email")
            .and_then(Value::as_str)
            .ok_or(AccountError::MalformedResponse("email"))?;

        let receipt = services.mailer.reset_password_notification(email).await?;
        info!(receipt = %receipt.id, "password reset confirmed");
        Ok(receipt)
    }
}
