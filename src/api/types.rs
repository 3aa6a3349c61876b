//! Wire types for the portal backend API
//!
//! All response structs tolerate missing optional fields via
//! `#[serde(default)]`, so a terse backend payload deserializes to
//! defaults instead of failing the whole call.

use serde::{Deserialize, Serialize};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Delivery status of a stored or returned message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Completed,
    Error,
}

/// Notification severity/category
///
/// Unknown values deserialize to `Unknown`, which renders with the
/// info icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Danger,
    Success,
    #[serde(other)]
    Unknown,
}

/// Response from `POST /chatAI/api/create-session/`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One row in the session history list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

/// Response from `GET /chatAI/api/sessions/`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsResponse {
    pub success: bool,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A stored message returned by `GET /chatAI/api/sessions/{id}/messages/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub message_text: String,
    pub sender: Sender,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub personal_context_used: bool,
}

/// Response from `GET /chatAI/api/sessions/{id}/messages/`
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for `POST /chatAI/api/send-message/`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub use_personal_context: bool,
}

/// Server echo of the just-stored user message
///
/// Carries the authoritative personal-context flag, which may differ
/// from the client's optimistic guess.
#[derive(Debug, Clone, Deserialize)]
pub struct UserMessageEcho {
    #[serde(default)]
    pub personal_context_used: bool,
}

/// Assistant reply inside a send-message response
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub message_text: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub personal_context_used: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Response from `POST /chatAI/api/send-message/`
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_message: Option<UserMessageEcho>,
    #[serde(default)]
    pub assistant_message: Option<AssistantMessage>,
}

/// Response from `POST /chatAI/api/sessions/{id}/delete/`
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteSessionResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// A single notification as returned by `GET /api/notifications/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

/// Response from `GET /api/notifications/`
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsResponse {
    pub success: bool,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}
