use crate::error::NotificationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 120;
pub const MESSAGE_MAX_CHARS: usize = 500;

/// Generated per connection; never reused.
pub type ClientId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub variant: NotificationVariant,
    pub created_at: DateTime<Utc>,
    /// Producer context, e.g. the job a worker notification is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendNotificationRequest {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub variant: Option<NotificationVariant>,
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), NotificationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(NotificationError::InvalidPayload(format!(
            "{field} must not be empty"
        )));
    }
    if len > max {
        return Err(NotificationError::InvalidPayload(format!(
            "{field} must be at most {max} characters, got {len}"
        )));
    }
    Ok(())
}

impl SendNotificationRequest {
    pub fn validate(&self) -> Result<(), NotificationError> {
        check_length("title", &self.title, TITLE_MAX_CHARS)?;
        check_length("message", &self.message, MESSAGE_MAX_CHARS)
    }

    /// Validates the request and stamps it into a deliverable payload.
    pub fn into_payload(self) -> Result<NotificationPayload, NotificationError> {
        self.validate()?;

        Ok(NotificationPayload {
            id: Uuid::new_v4(),
            title: self.title,
            message: self.message,
            variant: self.variant.unwrap_or_default(),
            created_at: Utc::now(),
            metadata: None,
        })
    }
}

/// Frames written on the text-event-stream transport that are not
/// notifications themselves.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    Connected {
        #[serde(rename = "clientId")]
        client_id: ClientId,
    },
}

/// Envelope for JSON text frames on the WebSocket transport.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SocketFrame<'a> {
    Notification { payload: &'a NotificationPayload },
}
