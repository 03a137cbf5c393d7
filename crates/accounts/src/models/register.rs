//! New account registration.

use serde_json::json;
use tracing::{debug, info, warn};

use portal_directory::{JsonObject, RemoteUser};

use super::{id_text, FIRST_NAME, LAST_NAME, PASSWORDS_DIFFER, PASSWORD_TOO_LONG, PROFILE_EMAIL};
use crate::entities::FormRecord;
use crate::services::AccountServices;
use crate::types::{AccountError, AccountResult};
use crate::utils::{validate, FieldRules, Rule, ValidationResult};

const RULES: &[FieldRules] = &[
    FIRST_NAME,
    LAST_NAME,
    PROFILE_EMAIL,
    FieldRules {
        field: "password",
        rules: &[
            (
                Rule::Required,
                "Hey Girl, give me a password. It'll be just between us.",
            ),
            (Rule::MaxLength(20), PASSWORD_TOO_LONG),
        ],
    },
    FieldRules {
        field: "passwordConfirmation",
        rules: &[
            (Rule::Required, "Hey Girl, you need to confirm your password."),
            (Rule::MatchesField("password"), PASSWORDS_DIFFER),
        ],
    },
    FieldRules {
        field: "origin",
        rules: &[(Rule::Required, "The origin is required")],
    },
];

/// Form-only fields that never reach the directory's user record.
const LOCAL_FIELDS: &[&str] = &["passwordConfirmation", "businessType", "origin"];

#[derive(Debug, Clone)]
pub struct RegisterModel {
    record: FormRecord,
}

impl RegisterModel {
    pub fn new(input: FormRecord) -> Self {
        Self {
            record: input.with_defaults(&[("businessType", json!(""))]),
        }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn validate(&self) -> ValidationResult {
        validate(RULES, &self.record)
    }

    /// Body for the directory's create call. An empty country is dropped
    /// because the directory rejects it instead of treating it as unset.
    pub fn create_body(&self) -> JsonObject {
        let mut omitted = LOCAL_FIELDS.to_vec();
        if !self.record.is_truthy("country") {
            omitted.push("country");
        }
        self.record.without(&omitted)
    }

    /// Create the account, then record the terms-of-service agreement, save
    /// the business type preference and send the confirmation email
    /// concurrently. Every one of the three must succeed.
    ///
    /// Returns the account's fields without the password pair.
    pub async fn save(&mut self, services: &AccountServices) -> AccountResult<JsonObject> {
        debug!("creating account");
        let created = services.directory.create_user(&self.create_body()).await?;

        let id_value = created
            .get("id")
            .cloned()
            .ok_or(AccountError::MalformedResponse("id"))?;
        let id = id_text(Some(&id_value)).ok_or(AccountError::MalformedResponse("id"))?;
        self.record.set("id", id_value);

        let business_type = self
            .record
            .get("businessType")
            .cloned()
            .unwrap_or_else(|| json!(""));
        let preference_body = json!({
            "private": {
                "preferences": {
                    "businessType": business_type,
                }
            }
        });
        let origin = self.record.get_str("origin").unwrap_or_default();

        let (agreements, preferences, confirmation) = tokio::join!(
            services
                .directory
                .approve_agreements(&id, &services.terms.id, &services.terms.version),
            services
                .directory
                .save_user_preferences(&id, &services.site_id, &preference_body),
            send_confirmation(services, &created, origin),
        );
        agreements?;
        preferences?;
        confirmation?;

        info!(user_id = %id, site_id = %services.site_id, "account registered");
        Ok(self.record.without(&["password", "passwordConfirmation"]))
    }
}

async fn send_confirmation(
    services: &AccountServices,
    user: &RemoteUser,
    origin: &str,
) -> AccountResult<()> {
    let receipt = services
        .mailer
        .confirm_registration_email(user, origin)
        .await?;
    let status = services.mailer.email_status(&receipt).await?;

    if !status.is_sent() {
        warn!(
            receipt = %receipt.id,
            status = ?status.status,
            error = ?status.error_message,
            "registration confirmation email not sent"
        );
        return Err(AccountError::ConfirmationEmailNotSent);
    }
    Ok(())
}
