//! Portal backend API module
//!
//! This module contains the typed HTTP client for the portal's chat and
//! notification endpoints, plus the wire types they exchange.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AssistantMessage, CreateSessionResponse, DeleteSessionResponse, MessageRecord, MessageStatus,
    MessagesResponse, Notification, NotificationKind, NotificationsResponse, SendMessageRequest,
    SendMessageResponse, Sender, SessionSummary, SessionsResponse, UserMessageEcho,
};
