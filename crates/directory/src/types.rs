//! Records exchanged with the directory and the mailer.

use serde::{Deserialize, Serialize};

/// A JSON object as sent to or received from a remote service.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// The directory's representation of an account. Read, patched, and
/// discarded per call.
pub type RemoteUser = JsonObject;

/// Reply to a forgot-password request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenGrant {
    #[serde(default)]
    pub reset_password_token: Option<String>,
}

impl ResetTokenGrant {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            reset_password_token: Some(token.into()),
        }
    }

    /// The token, ignoring an empty string the same way as a missing one.
    pub fn token(&self) -> Option<&str> {
        self.reset_password_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Handle for a message accepted by the mailer, used to poll its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub id: String,
}

impl SendReceipt {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    InProgress,
    /// Also covers any status string the mailer reports that we do not know.
    #[serde(other)]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    pub status: DeliveryStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl EmailStatus {
    pub fn new(status: DeliveryStatus) -> Self {
        Self {
            status,
            error_message: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// A message counts as sent when it is delivered or still in flight and
    /// the mailer reported no error.
    pub fn is_sent(&self) -> bool {
        matches!(
            self.status,
            DeliveryStatus::Delivered | DeliveryStatus::InProgress
        ) && self.error_message.is_none()
    }
}
