//! Chat controller
//!
//! Owns the one piece of page-lifetime chat state, the current session
//! id, and drives the message pane and history list against the portal's
//! chat API. User messages render optimistically and are patched once
//! the server's authoritative response arrives; transport failures never
//! roll back what the user already sees.

use crate::api::types::{MessageStatus, SendMessageRequest, Sender};
use crate::api::ApiClient;
use crate::config::ChatConfig;
use crate::view::{EmptyState, HistoryList, HistoryRow, MessagePane};

/// Result of a send operation, as the caller should surface it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was rendered or sent
    Ignored,
    /// No current session; the caller should prompt the user to create
    /// or select one. No request was issued.
    SessionRequired,
    /// The exchange completed; `alert` carries backend-reported error
    /// text that should be surfaced without discarding rendered messages
    Delivered { alert: Option<String> },
    /// The request never completed; the optimistic user message remains
    TransportFailed,
}

/// Result of a delete operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined the confirmation; no request was issued
    Cancelled,
    Deleted,
    Failed { alert: String },
}

/// Controller for one chat surface
///
/// Scoped to a single instance with an explicit lifecycle: created when
/// the chat opens, dropped when it closes. `session_id` is reset whenever
/// a session is created, loaded, or deleted.
pub struct ChatController {
    api: ApiClient,
    pane: MessagePane,
    history: HistoryList,
    session_id: Option<String>,
    use_personal_context: bool,
}

impl ChatController {
    pub fn new(api: ApiClient, config: &ChatConfig) -> Self {
        Self {
            api,
            pane: MessagePane::new(EmptyState::PickOrCreate),
            history: HistoryList::with_limit(config.history_limit),
            session_id: None,
            use_personal_context: config.use_personal_context,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn pane(&self) -> &MessagePane {
        &self.pane
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn personal_context(&self) -> bool {
        self.use_personal_context
    }

    pub fn set_personal_context(&mut self, on: bool) {
        self.use_personal_context = on;
    }

    /// Start a new session
    ///
    /// Clears the pane to its empty state and asks the backend for a
    /// fresh session id. Failure is logged, not surfaced; the pane stays
    /// on the empty state and no session is selected.
    pub async fn new_session(&mut self) -> Option<String> {
        self.history.clear_active();
        self.pane.clear_to(EmptyState::NewConversation);

        match self.api.create_session().await {
            Ok(resp) if resp.success && resp.session_id.is_some() => {
                self.session_id = resp.session_id.clone();
                self.refresh_sessions().await;
                resp.session_id
            }
            Ok(resp) => {
                tracing::warn!(
                    "create-session rejected: {}",
                    resp.error.as_deref().unwrap_or("no error text")
                );
                None
            }
            Err(e) => {
                tracing::error!("Failed to create session: {}", e);
                None
            }
        }
    }

    /// Load an existing session by id
    ///
    /// Marks the history row active and renders the session's messages
    /// in order, or the empty state when it has none. Failures are
    /// logged only; the selection still sticks.
    pub async fn open_session(&mut self, session_id: &str) {
        self.history.set_active(session_id);
        self.session_id = Some(session_id.to_string());

        match self.api.session_messages(session_id).await {
            Ok(resp) if resp.success => {
                self.pane.clear_to(EmptyState::NewConversation);
                for msg in &resp.messages {
                    self.pane.push_message(
                        msg.sender,
                        &msg.message_text,
                        &msg.created_at,
                        msg.status,
                        msg.personal_context_used,
                    );
                }
            }
            Ok(resp) => {
                tracing::warn!(
                    "messages fetch rejected for {}: {}",
                    session_id,
                    resp.error.as_deref().unwrap_or("no error text")
                );
            }
            Err(e) => {
                tracing::error!("Failed to load session {}: {}", session_id, e);
            }
        }
    }

    /// Refresh the session history list
    ///
    /// Rebuilds the rows without active highlighting; selecting a row is
    /// what highlights it. Failures are logged only.
    pub async fn refresh_sessions(&mut self) {
        match self.api.list_sessions().await {
            Ok(resp) if resp.success => {
                let rows = resp
                    .sessions
                    .into_iter()
                    .map(|s| HistoryRow {
                        session_id: s.session_id,
                        summary: s.summary,
                        updated_at: s.updated_at,
                        active: false,
                    })
                    .collect();
                self.history.set_rows(rows);
            }
            Ok(resp) => {
                tracing::warn!(
                    "session list rejected: {}",
                    resp.error.as_deref().unwrap_or("no error text")
                );
            }
            Err(e) => {
                tracing::error!("Failed to load session list: {}", e);
            }
        }
    }

    /// Send a message in the current session
    ///
    /// Quick-suggestion input goes through this same path. The user
    /// message renders immediately, tagged with the current
    /// personal-context toggle; once the server answers, the badge is
    /// patched to the server's authoritative flag and the assistant
    /// reply is rendered with its own flag and status.
    ///
    /// # Examples
    ///
    /// ```
    /// use careterm::api::ApiClient;
    /// use careterm::chat::{ChatController, SendOutcome};
    /// use careterm::config::{ChatConfig, ServerConfig};
    ///
    /// # tokio_test::block_on(async {
    /// let api = ApiClient::new(&ServerConfig::default()).unwrap();
    /// let mut chat = ChatController::new(api, &ChatConfig::default());
    /// // Without a selected session, nothing is rendered or sent
    /// assert_eq!(chat.send("hello").await, SendOutcome::SessionRequired);
    /// # });
    /// ```
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(session_id) = self.session_id.clone() else {
            return SendOutcome::SessionRequired;
        };

        let user_msg = self.pane.push_message(
            Sender::User,
            message,
            &now_hhmm(),
            MessageStatus::Completed,
            self.use_personal_context,
        );
        self.pane.show_typing();

        let request = SendMessageRequest {
            message: message.to_string(),
            session_id: Some(session_id),
            use_personal_context: self.use_personal_context,
        };

        let resp = match self.api.send_message(&request).await {
            Ok(resp) => resp,
            Err(e) => {
                self.pane.hide_typing();
                tracing::error!("Failed to send message: {}", e);
                return SendOutcome::TransportFailed;
            }
        };

        self.pane.hide_typing();

        if !resp.success {
            let alert = resp.error.unwrap_or_else(|| "Unknown error".to_string());
            return SendOutcome::Delivered { alert: Some(alert) };
        }

        // The server may assign or reassign the session id
        if resp.session_id.is_some() {
            self.session_id = resp.session_id;
        }

        if let Some(echo) = resp.user_message {
            self.pane
                .set_context_badge(user_msg, echo.personal_context_used);
        }

        let mut alert = None;
        match resp.assistant_message {
            Some(assistant) => {
                let time = if assistant.created_at.is_empty() {
                    now_hhmm()
                } else {
                    assistant.created_at.clone()
                };
                self.pane.push_message(
                    Sender::Assistant,
                    &assistant.message_text,
                    &time,
                    assistant.status,
                    assistant.personal_context_used,
                );
                if assistant.status == MessageStatus::Error {
                    // The backend sends "" when it has no error text
                    alert = Some(
                        assistant
                            .error_message
                            .filter(|text| !text.is_empty())
                            .unwrap_or_else(|| {
                                "The assistant could not answer this message".to_string()
                            }),
                    );
                }
            }
            None => {
                self.pane.push_message(
                    Sender::Assistant,
                    "No reply was received for this message",
                    &now_hhmm(),
                    MessageStatus::Error,
                    false,
                );
            }
        }

        // Summary and timestamp of the session just changed
        self.refresh_sessions().await;

        SendOutcome::Delivered { alert }
    }

    /// Delete a session by id
    ///
    /// The caller is responsible for obtaining explicit user
    /// confirmation; an unconfirmed delete issues no request.
    pub async fn delete_session(&mut self, session_id: &str, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::Cancelled;
        }

        let resp = match self.api.delete_session(session_id).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Failed to delete session {}: {}", session_id, e);
                return DeleteOutcome::Failed {
                    alert: "Failed to delete the conversation".to_string(),
                };
            }
        };

        if !resp.success {
            return DeleteOutcome::Failed {
                alert: resp.error.unwrap_or_else(|| "Unknown error".to_string()),
            };
        }

        if self.session_id.as_deref() == Some(session_id) {
            self.session_id = None;
            self.pane.clear_to(EmptyState::PickOrCreate);
        }

        self.history.clear_active();
        self.refresh_sessions().await;

        DeleteOutcome::Deleted
    }
}

fn now_hhmm() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
