//! Profile viewing and editing.

use serde::Serialize;
use serde_json::{json, Value};
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
        rules: &[(Rule::MaxLength(20), PASSWORD_TOO_LONG)],
    },
    FieldRules {
        field: "passwordConfirmation",
        rules: &[(Rule::MatchesField("password"), PASSWORDS_DIFFER)],
    },
];

/// Directory bookkeeping never shown to the account holder.
const INTERNAL_FIELDS: &[&str] = &["gsa", "tos", "confirmedAt"];

/// Client-facing shape of a loaded account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub account: FormRecord,
}

#[derive(Debug, Clone)]
pub struct AccountModel {
    record: FormRecord,
}

impl AccountModel {
    pub fn new(input: FormRecord) -> Self {
        // The directory rejects an empty country, so it defaults to null.
        let record = input.with_defaults(&[
            ("addressLine1", json!("")),
            ("addressLine2", json!("")),
            ("city", json!("")),
            ("state", json!("")),
            ("country", Value::Null),
            ("zipCode", json!("")),
            ("phoneNumber", json!("")),
            ("company", json!("")),
            ("primaryJobRole", json!("")),
        ]);
        Self { record }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn validate(&self) -> ValidationResult {
        validate(RULES, &self.record)
    }

    /// Load the account with its site preferences and agreement history
    /// merged in.
    pub async fn read(
        &mut self,
        services: &AccountServices,
        user_id: &str,
    ) -> AccountResult<AccountView> {
        debug!(user_id, "reading account");
        let mut user = services.directory.get_user(user_id).await?;
        let id = id_text(user.get("id")).unwrap_or_else(|| user_id.to_string());

        let (preferences, agreements) = tokio::join!(
            services
                .directory
                .get_user_preferences(&id, &services.site_id),
            services.directory.agreements_history(&id),
        );
        let preferences = preferences?;
        let agreements = agreements?;

        if let Some(Value::Object(preferences)) = preferences.pointer("/private/preferences") {
            user.extend(preferences.clone());
        }
        user.extend(agreements);
        strip_internal_fields(&mut user);

        self.record.merge(user);
        info!(user_id = %id, site_id = %services.site_id, "account loaded");

        Ok(AccountView {
            account: self.record.clone(),
        })
    }

    /// Push the edited profile to the directory. A new password is applied
    /// through the reset-token flow once the profile update has landed.
    pub async fn update(&self, services: &AccountServices, id: &str) -> AccountResult<RemoteUser> {
        debug!(user_id = id, "updating account");
        let body = self.record.without(&["passwordConfirmation"]);
        let updated = services.directory.update_user(id, &body).await?;

        if !self.record.is_truthy("password") {
            info!(user_id = id, "account updated");
            return Ok(updated);
        }

        let email = updated
            .get("email")
            .and_then(Value::as_str)
            .ok_or(AccountError::MalformedResponse("email"))?;

        let mut request = JsonObject::new();
        request.insert("email".to_string(), json!(email));
        let grant = services.directory.forgot_password(&request).await?;
        let Some(token) = grant.token() else {
            warn!(user_id = id, "directory issued no reset token for password change");
            return Err(AccountError::ResetTokenUnavailable);
        };

        let password = self.record.text("password").unwrap_or_default();
        let user = services.directory.reset_password(token, &password).await?;
        info!(user_id = id, "account updated with new password");
        Ok(user)
    }
}

fn strip_internal_fields(user: &mut RemoteUser) {
    for field in INTERNAL_FIELDS {
        user.remove(*field);
    }
}
