//! Service contracts consumed by the account workflows.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteResult;
use crate::types::{EmailStatus, JsonObject, RemoteUser, ResetTokenGrant, SendReceipt};

/// The user-directory service: system of record for accounts, per-site
/// preferences and agreements.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn get_user(&self, id: &str) -> RemoteResult<RemoteUser>;

    async fn get_user_preferences(&self, user_id: &str, site_id: &str) -> RemoteResult<Value>;

    async fn agreements_history(&self, id: &str) -> RemoteResult<JsonObject>;

    async fn update_user(&self, id: &str, body: &JsonObject) -> RemoteResult<RemoteUser>;

    /// Ask for a password-reset token. `body` carries at least `email`.
    async fn forgot_password(&self, body: &JsonObject) -> RemoteResult<ResetTokenGrant>;

    /// Change the password using a previously issued reset token. Replies
    /// with the affected account.
    async fn reset_password(&self, token: &str, password: &str) -> RemoteResult<RemoteUser>;

    async fn confirm_user(&self, id: &str, token: &str) -> RemoteResult<Value>;

    async fn create_user(&self, body: &JsonObject) -> RemoteResult<RemoteUser>;

    async fn approve_agreements(
        &self,
        id: &str,
        tos_id: &str,
        tos_version: &str,
    ) -> RemoteResult<Value>;

    async fn save_user_preferences(
        &self,
        user_id: &str,
        site_id: &str,
        body: &Value,
    ) -> RemoteResult<Value>;
}

/// Transactional email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn reset_password_email(
        &self,
        to_email: &str,
        token: &str,
        base_url: &str,
    ) -> RemoteResult<SendReceipt>;

    async fn confirm_registration_email(
        &self,
        user: &RemoteUser,
        origin: &str,
    ) -> RemoteResult<SendReceipt>;

    async fn reset_password_notification(&self, to_email: &str) -> RemoteResult<SendReceipt>;

    async fn email_status(&self, receipt: &SendReceipt) -> RemoteResult<EmailStatus>;
}
