//! HTTP client for the mailer service.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use portal_config::MailerConfig;

use super::transport::JsonTransport;
use crate::client::Mailer;
use crate::error::RemoteResult;
use crate::types::{EmailStatus, RemoteUser, SendReceipt};

/// Mailer client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    transport: JsonTransport,
}

impl HttpMailer {
    pub fn new(config: &MailerConfig) -> RemoteResult<Self> {
        let transport = JsonTransport::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )?;
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn reset_password_email(
        &self,
        to_email: &str,
        token: &str,
        base_url: &str,
    ) -> RemoteResult<SendReceipt> {
        let body = json!({
            "toUser": { "email": to_email },
            "token": token,
            "baseUrl": base_url,
        });
        self.transport
            .post(&["emails", "reset-password"], &body)
            .await
    }

    async fn confirm_registration_email(
        &self,
        user: &RemoteUser,
        origin: &str,
    ) -> RemoteResult<SendReceipt> {
        let body = json!({
            "user": user,
            "origin": origin,
        });
        self.transport
            .post(&["emails", "confirm-registration"], &body)
            .await
    }

    async fn reset_password_notification(&self, to_email: &str) -> RemoteResult<SendReceipt> {
        let body = json!({ "toUser": { "email": to_email } });
        self.transport
            .post(&["emails", "reset-password-notification"], &body)
            .await
    }

    async fn email_status(&self, receipt: &SendReceipt) -> RemoteResult<EmailStatus> {
        self.transport
            .get(&["emails", receipt.id.as_str(), "status"])
            .await
    }
}
