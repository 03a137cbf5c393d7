//! HTTP client for the user directory.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use portal_config::DirectoryConfig;

use super::transport::JsonTransport;
use crate::client::DirectoryClient;
use crate::error::RemoteResult;
use crate::types::{JsonObject, RemoteUser, ResetTokenGrant};

/// Directory client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    transport: JsonTransport,
}

impl HttpDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> RemoteResult<Self> {
        let transport = JsonTransport::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        Ok(Self { transport })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn get_user(&self, id: &str) -> RemoteResult<RemoteUser> {
        self.transport.get(&["users", id]).await
    }

    async fn get_user_preferences(&self, user_id: &str, site_id: &str) -> RemoteResult<Value> {
        self.transport
            .get(&["users", user_id, "preferences", site_id])
            .await
    }

    async fn agreements_history(&self, id: &str) -> RemoteResult<JsonObject> {
        self.transport.get(&["users", id, "agreements"]).await
    }

    async fn update_user(&self, id: &str, body: &JsonObject) -> RemoteResult<RemoteUser> {
        self.transport.put(&["users", id], body).await
    }

    async fn forgot_password(&self, body: &JsonObject) -> RemoteResult<ResetTokenGrant> {
        self.transport
            .post(&["users", "forgot-password"], body)
            .await
    }

    async fn reset_password(&self, token: &str, password: &str) -> RemoteResult<RemoteUser> {
        self.transport
            .post(
                &["users", "reset-password", token],
                &json!({ "password": password }),
            )
            .await
    }

    async fn confirm_user(&self, id: &str, token: &str) -> RemoteResult<Value> {
        self.transport
            .post(&["users", id, "confirm", token], &json!({}))
            .await
    }

    async fn create_user(&self, body: &JsonObject) -> RemoteResult<RemoteUser> {
        self.transport.post(&["users"], body).await
    }

    async fn approve_agreements(
        &self,
        id: &str,
        tos_id: &str,
        tos_version: &str,
    ) -> RemoteResult<Value> {
        let body = json!({
            "tos": {
                "id": tos_id,
                "version": tos_version,
            }
        });
        self.transport
            .post(&["users", id, "agreements"], &body)
            .await
    }

    async fn save_user_preferences(
        &self,
        user_id: &str,
        site_id: &str,
        body: &Value,
    ) -> RemoteResult<Value> {
        self.transport
            .put(&["users", user_id, "preferences", site_id], body)
            .await
    }
}
