//! Account confirmation from an emailed link.

use serde_json::Value;
use tracing::{debug, info};

use crate::entities::FormRecord;
use crate::services::AccountServices;
use crate::types::AccountResult;
use crate::utils::{validate, FieldRules, Rule, ValidationResult};

const RULES: &[FieldRules] = &[
    FieldRules {
        field: "id",
        rules: &[(Rule::Required, "The id is required")],
    },
    FieldRules {
        field: "token",
        rules: &[(Rule::Required, "The token is required")],
    },
];

/// Email confirmation link landing: `{id, token}`.
#[derive(Debug, Clone)]
pub struct ConfirmUserModel {
    record: FormRecord,
}

impl ConfirmUserModel {
    pub fn new(input: FormRecord) -> Self {
        Self { record: input }
    }

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn validate(&self) -> ValidationResult {
        validate(RULES, &self.record)
    }

    pub async fn save(&self, services: &AccountServices) -> AccountResult<Value> {
        let id = self.record.text("id").unwrap_or_default();
        let token = self.record.text("token").unwrap_or_default();

        debug!(user_id = %id, "confirming account");
        let confirmation = services.directory.confirm_user(&id, &token).await?;
        info!(user_id = %id, "account confirmed");
        Ok(confirmation)
    }
}
