//! Password reset requests.

use tracing::{debug, info, warn};

use crate::entities::FormRecord;
use crate::services::AccountServices;
use crate::types::{AccountError, AccountResult};
use crate::utils::{validate, FieldRules, Rule, ValidationResult};

const RULES: &[FieldRules] = &[FieldRules {
    field: "email",
    rules: &[
        (Rule::Required, "Hey girl, this email address is required."),
        (Rule::Email, "Hey girl, this email address needs to be valid."),
    ],
}];

/// "Forgot my password" form: `{email, origin}`, where `origin` is the base
/// URL the reset link in the email points back to.
#[derive(Debug, Clone)]
pub struct ForgotPasswordModel {
    record: FormRecord,
}

impl ForgotPasswordModel {
    pub fn new(input: FormRecord) -> Self {
        Self { record: input }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn validate(&self) -> ValidationResult {
        validate(RULES, &self.record)
    }

    /// Request a reset token and mail it to the account holder.
    pub async fn save(&self, services: &AccountServices) -> AccountResult<()> {
        let email = self.record.get_str("email").unwrap_or_default();
        let origin = self.record.get_str("origin").unwrap_or_default();

        debug!("requesting password reset token");
        let grant = services
            .directory
            .forgot_password(&self.record.without(&["origin"]))
            .await?;
        let Some(token) = grant.token() else {
            warn!("directory issued no password reset token");
            return Err(AccountError::ResetTokenUnavailable);
        };

        let receipt = services
            .mailer
            .reset_password_email(email, token, origin)
            .await?;
        let status = services.mailer.email_status(&receipt).await?;

        if !status.is_sent() {
            warn!(
                receipt = %receipt.id,
                status = ?status.status,
                error = ?status.error_message,
                "password reset email not sent"
            );
            return Err(AccountError::ResetEmailNotSent);
        }

        info!(receipt = %receipt.id, "password reset email sent");
        Ok(())
    }
}
