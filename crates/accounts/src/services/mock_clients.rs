//! In-memory directory and mailer used to exercise the workflows.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Barrier, RwLock};

use portal_directory::{
    DeliveryStatus, DirectoryClient, EmailStatus, JsonObject, Mailer, RemoteCallError,
    RemoteResult, RemoteUser, ResetTokenGrant, SendReceipt,
};

/// One call received by [`MockDirectory`].
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    GetUser { id: String },
    GetUserPreferences { user_id: String, site_id: String },
    AgreementsHistory { id: String },
    UpdateUser { id: String, body: JsonObject },
    ForgotPassword { body: JsonObject },
    ResetPassword { token: String, password: String },
    ConfirmUser { id: String, token: String },
    CreateUser { body: JsonObject },
    ApproveAgreements { id: String, tos_id: String, tos_version: String },
    SaveUserPreferences { user_id: String, site_id: String, body: Value },
}

impl DirectoryCall {
    pub fn operation(&self) -> &'static str {
        match self {
            DirectoryCall::GetUser { .. } => "get_user",
            DirectoryCall::GetUserPreferences { .. } => "get_user_preferences",
            DirectoryCall::AgreementsHistory { .. } => "agreements_history",
            DirectoryCall::UpdateUser { .. } => "update_user",
            DirectoryCall::ForgotPassword { .. } => "forgot_password",
            DirectoryCall::ResetPassword { .. } => "reset_password",
            DirectoryCall::ConfirmUser { .. } => "confirm_user",
            DirectoryCall::CreateUser { .. } => "create_user",
            DirectoryCall::ApproveAgreements { .. } => "approve_agreements",
            DirectoryCall::SaveUserPreferences { .. } => "save_user_preferences",
        }
    }
}

/// Mock user directory for testing
pub struct MockDirectory {
    users: Arc<RwLock<HashMap<String, RemoteUser>>>,
    preferences: Arc<RwLock<HashMap<(String, String), Value>>>,
    agreements: Arc<RwLock<HashMap<String, JsonObject>>>,
    reset_tokens: Arc<RwLock<HashMap<String, String>>>,
    next_id: Arc<RwLock<i64>>,
    failing: Arc<RwLock<HashSet<&'static str>>>,
    gates: Arc<RwLock<HashMap<&'static str, Arc<Barrier>>>>,
    calls: Arc<RwLock<Vec<DirectoryCall>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            preferences: Arc::new(RwLock::new(HashMap::new())),
            agreements: Arc::new(RwLock::new(HashMap::new())),
            reset_tokens: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
            failing: Arc::new(RwLock::new(HashSet::new())),
            gates: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed an account. The record must carry a string `id`.
    pub async fn insert_user(&self, user: Value) {
        if let Value::Object(user) = user {
            if let Some(id) = user.get("id").and_then(Value::as_str).map(str::to_string) {
                self.users.write().await.insert(id, user);
            }
        }
    }

    pub async fn insert_preferences(&self, user_id: &str, site_id: &str, preferences: Value) {
        self.preferences
            .write()
            .await
            .insert((user_id.to_string(), site_id.to_string()), preferences);
    }

    pub async fn insert_agreements(&self, user_id: &str, agreements: Value) {
        if let Value::Object(agreements) = agreements {
            self.agreements
                .write()
                .await
                .insert(user_id.to_string(), agreements);
        }
    }

    /// Make every later call to `operation` fail.
    pub async fn fail_on(&self, operation: &'static str) {
        self.failing.write().await.insert(operation);
    }

    /// Hold calls to `operation` at `barrier` until all its parties arrive.
    pub async fn gate(&self, operation: &'static str, barrier: Arc<Barrier>) {
        self.gates.write().await.insert(operation, barrier);
    }

    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.read().await.clone()
    }

    pub async fn operations(&self) -> Vec<&'static str> {
        self.calls
            .read()
            .await
            .iter()
            .map(DirectoryCall::operation)
            .collect()
    }

    pub async fn user(&self, id: &str) -> Option<RemoteUser> {
        self.users.read().await.get(id).cloned()
    }

    pub async fn stored_preferences(&self, user_id: &str, site_id: &str) -> Option<Value> {
        self.preferences
            .read()
            .await
            .get(&(user_id.to_string(), site_id.to_string()))
            .cloned()
    }

    async fn record(&self, call: DirectoryCall) -> RemoteResult<()> {
        let operation = call.operation();
        self.calls.write().await.push(call);
        let gate = self.gates.read().await.get(operation).cloned();
        if let Some(barrier) = gate {
            barrier.wait().await;
        }
        if self.failing.read().await.contains(operation) {
            return Err(RemoteCallError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }

    async fn existing_user(&self, id: &str) -> RemoteResult<RemoteUser> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: &str) -> RemoteCallError {
    RemoteCallError::Rejected {
        status: 404,
        body: format!("user {id} not found"),
    }
}

fn public_view(user: &RemoteUser) -> RemoteUser {
    let mut user = user.clone();
    user.remove("password");
    user
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    async fn get_user(&self, id: &str) -> RemoteResult<RemoteUser> {
        self.record(DirectoryCall::GetUser { id: id.to_string() })
            .await?;
        Ok(public_view(&self.existing_user(id).await?))
    }

    async fn get_user_preferences(&self, user_id: &str, site_id: &str) -> RemoteResult<Value> {
        self.record(DirectoryCall::GetUserPreferences {
            user_id: user_id.to_string(),
            site_id: site_id.to_string(),
        })
        .await?;
        Ok(self
            .stored_preferences(user_id, site_id)
            .await
            .unwrap_or_else(|| json!({})))
    }

    async fn agreements_history(&self, id: &str) -> RemoteResult<JsonObject> {
        self.record(DirectoryCall::AgreementsHistory { id: id.to_string() })
            .await?;
        Ok(self
            .agreements
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_user(&self, id: &str, body: &JsonObject) -> RemoteResult<RemoteUser> {
        self.record(DirectoryCall::UpdateUser {
            id: id.to_string(),
            body: body.clone(),
        })
        .await?;

        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or_else(|| not_found(id))?;
        // Password changes go through the reset-token flow.
        user.extend(
            body.iter()
                .filter(|(key, _)| key.as_str() != "password")
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Ok(public_view(user))
    }

    async fn forgot_password(&self, body: &JsonObject) -> RemoteResult<ResetTokenGrant> {
        self.record(DirectoryCall::ForgotPassword { body: body.clone() })
            .await?;

        let email = body.get("email").and_then(Value::as_str);
        let owner = self
            .users
            .read()
            .await
            .iter()
            .find(|(_, user)| user.get("email").and_then(Value::as_str) == email)
            .map(|(id, _)| id.clone());

        match owner {
            Some(id) => {
                let token = format!("reset-{id}");
                self.reset_tokens.write().await.insert(token.clone(), id);
                Ok(ResetTokenGrant::new(token))
            }
            None => Ok(ResetTokenGrant::default()),
        }
    }

    async fn reset_password(&self, token: &str, password: &str) -> RemoteResult<RemoteUser> {
        self.record(DirectoryCall::ResetPassword {
            token: token.to_string(),
            password: password.to_string(),
        })
        .await?;

        let id = self
            .reset_tokens
            .write()
            .await
            .remove(token)
            .ok_or_else(|| RemoteCallError::Rejected {
                status: 400,
                body: "invalid reset token".to_string(),
            })?;

        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(|| not_found(&id))?;
        user.insert("password".to_string(), json!(password));
        Ok(public_view(user))
    }

    async fn confirm_user(&self, id: &str, token: &str) -> RemoteResult<Value> {
        self.record(DirectoryCall::ConfirmUser {
            id: id.to_string(),
            token: token.to_string(),
        })
        .await?;

        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or_else(|| not_found(id))?;
        user.insert("confirmedAt".to_string(), json!("2024-01-01T00:00:00Z"));
        Ok(json!({ "id": id, "confirmed": true }))
    }

    async fn create_user(&self, body: &JsonObject) -> RemoteResult<RemoteUser> {
        self.record(DirectoryCall::CreateUser { body: body.clone() })
            .await?;

        let mut next_id = self.next_id.write().await;
        let id = format!("user_{}", *next_id);
        *next_id += 1;

        let mut user = body.clone();
        user.insert("id".to_string(), json!(id));
        self.users.write().await.insert(id, user.clone());
        Ok(public_view(&user))
    }

    async fn approve_agreements(
        &self,
        id: &str,
        tos_id: &str,
        tos_version: &str,
    ) -> RemoteResult<Value> {
        self.record(DirectoryCall::ApproveAgreements {
            id: id.to_string(),
            tos_id: tos_id.to_string(),
            tos_version: tos_version.to_string(),
        })
        .await?;

        let tos = json!({ "id": tos_id, "version": tos_version });
        self.agreements
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .insert("tos".to_string(), tos.clone());
        Ok(json!({ "tos": tos }))
    }

    async fn save_user_preferences(
        &self,
        user_id: &str,
        site_id: &str,
        body: &Value,
    ) -> RemoteResult<Value> {
        self.record(DirectoryCall::SaveUserPreferences {
            user_id: user_id.to_string(),
            site_id: site_id.to_string(),
            body: body.clone(),
        })
        .await?;

        self.insert_preferences(user_id, site_id, body.clone()).await;
        Ok(body.clone())
    }
}

/// One call received by [`MockMailer`].
#[derive(Debug, Clone, PartialEq)]
pub enum MailerCall {
    ResetPasswordEmail { to_email: String, token: String, base_url: String },
    ConfirmRegistrationEmail { user: RemoteUser, origin: String },
    ResetPasswordNotification { to_email: String },
    EmailStatus { receipt: SendReceipt },
}

impl MailerCall {
    pub fn operation(&self) -> &'static str {
        match self {
            MailerCall::ResetPasswordEmail { .. } => "reset_password_email",
            MailerCall::ConfirmRegistrationEmail { .. } => "confirm_registration_email",
            MailerCall::ResetPasswordNotification { .. } => "reset_password_notification",
            MailerCall::EmailStatus { .. } => "email_status",
        }
    }
}

/// Mock mailer reporting a scripted delivery status for every message.
pub struct MockMailer {
    status: Arc<RwLock<EmailStatus>>,
    next_id: Arc<RwLock<i64>>,
    failing: Arc<RwLock<HashSet<&'static str>>>,
    gates: Arc<RwLock<HashMap<&'static str, Arc<Barrier>>>>,
    calls: Arc<RwLock<Vec<MailerCall>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(EmailStatus::new(DeliveryStatus::Delivered))),
            next_id: Arc::new(RwLock::new(1)),
            failing: Arc::new(RwLock::new(HashSet::new())),
            gates: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_status(&self, status: EmailStatus) {
        *self.status.write().await = status;
    }

    pub async fn fail_on(&self, operation: &'static str) {
        self.failing.write().await.insert(operation);
    }

    pub async fn gate(&self, operation: &'static str, barrier: Arc<Barrier>) {
        self.gates.write().await.insert(operation, barrier);
    }

    pub async fn calls(&self) -> Vec<MailerCall> {
        self.calls.read().await.clone()
    }

    pub async fn operations(&self) -> Vec<&'static str> {
        self.calls
            .read()
            .await
            .iter()
            .map(MailerCall::operation)
            .collect()
    }

    async fn record(&self, call: MailerCall) -> RemoteResult<()> {
        let operation = call.operation();
        self.calls.write().await.push(call);
        let gate = self.gates.read().await.get(operation).cloned();
        if let Some(barrier) = gate {
            barrier.wait().await;
        }
        if self.failing.read().await.contains(operation) {
            return Err(RemoteCallError::Unavailable(format!("{operation} failed")));
        }
        Ok(())
    }

    async fn receipt(&self) -> SendReceipt {
        let mut next_id = self.next_id.write().await;
        let receipt = SendReceipt::new(format!("msg-{}", *next_id));
        *next_id += 1;
        receipt
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn reset_password_email(
        &self,
        to_email: &str,
        token: &str,
        base_url: &str,
    ) -> RemoteResult<SendReceipt> {
        self.record(MailerCall::ResetPasswordEmail {
            to_email: to_email.to_string(),
            token: token.to_string(),
            base_url: base_url.to_string(),
        })
        .await?;
        Ok(self.receipt().await)
    }

    async fn confirm_registration_email(
        &self,
        user: &RemoteUser,
        origin: &str,
    ) -> RemoteResult<SendReceipt> {
        self.record(MailerCall::ConfirmRegistrationEmail {
            user: user.clone(),
            origin: origin.to_string(),
        })
        .await?;
        Ok(self.receipt().await)
    }

    async fn reset_password_notification(&self, to_email: &str) -> RemoteResult<SendReceipt> {
        self.record(MailerCall::ResetPasswordNotification {
            to_email: to_email.to_string(),
        })
        .await?;
        Ok(self.receipt().await)
    }

    async fn email_status(&self, receipt: &SendReceipt) -> RemoteResult<EmailStatus> {
        self.record(MailerCall::EmailStatus {
            receipt: receipt.clone(),
        })
        .await?;
        Ok(self.status.read().await.clone())
    }
}
