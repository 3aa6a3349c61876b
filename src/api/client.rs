//! HTTP client for the portal backend
//!
//! This module implements the typed client for the chat and notification
//! endpoints. Mutating requests carry the configured CSRF token in an
//! `X-CSRFToken` header; every request carries the session cookie when
//! one is configured.

use crate::api::types::{
    CreateSessionResponse, DeleteSessionResponse, MessagesResponse, NotificationsResponse,
    SendMessageRequest, SendMessageResponse, SessionsResponse,
};
use crate::config::ServerConfig;
use crate::error::{CaretermError, Result};

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Typed client for the portal's chat and notification API
///
/// Cloning is cheap (the underlying `reqwest::Client` is an `Arc`), which
/// lets the notification poller fire mark-read requests from spawned
/// tasks without blocking its poll loop.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
    session_cookie: Option<String>,
}

impl ApiClient {
    /// Create a new client from server configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("careterm/0.1.0")
            .build()
            .map_err(|e| CaretermError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized API client: base_url={}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    /// Whether the client carries a session cookie for an authenticated viewer
    pub fn is_authenticated(&self) -> bool {
        self.session_cookie.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_cookie(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie.clone()),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_cookie(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.csrf_token {
            builder = builder.header("X-CSRFToken", token.clone());
        }
        self.with_cookie(builder)
    }

    /// Create a new chat session
    pub async fn create_session(&self) -> Result<CreateSessionResponse> {
        let response = self
            .post("/chatAI/api/create-session/")
            .send()
            .await?
            .json::<CreateSessionResponse>()
            .await?;
        Ok(response)
    }

    /// List all chat sessions for the current user
    pub async fn list_sessions(&self) -> Result<SessionsResponse> {
        let response = self
            .get("/chatAI/api/sessions/")
            .send()
            .await?
            .json::<SessionsResponse>()
            .await?;
        Ok(response)
    }

    /// Fetch the messages of one session, oldest first
    pub async fn session_messages(&self, session_id: &str) -> Result<MessagesResponse> {
        let path = format!("/chatAI/api/sessions/{}/messages/", session_id);
        let response = self
            .get(&path)
            .send()
            .await?
            .json::<MessagesResponse>()
            .await?;
        Ok(response)
    }

    /// Send a chat message and wait for the assistant's reply
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<SendMessageResponse> {
        let response = self
            .post("/chatAI/api/send-message/")
            .json(request)
            .send()
            .await?
            .json::<SendMessageResponse>()
            .await?;
        Ok(response)
    }

    /// Delete a chat session by id
    pub async fn delete_session(&self, session_id: &str) -> Result<DeleteSessionResponse> {
        let path = format!("/chatAI/api/sessions/{}/delete/", session_id);
        let response = self
            .post(&path)
            .send()
            .await?
            .json::<DeleteSessionResponse>()
            .await?;
        Ok(response)
    }

    /// Fetch unread notifications and the unread count
    ///
    /// This is the one call whose HTTP status is inspected: the poller
    /// treats a non-success status as a skipped cycle, so it is reported
    /// here as an error rather than parsed.
    pub async fn notifications(&self) -> Result<NotificationsResponse> {
        let response = self.get("/api/notifications/").send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                CaretermError::Api(format!("notification poll returned HTTP {}", status)).into(),
            );
        }

        let body = response.json::<NotificationsResponse>().await?;
        Ok(body)
    }

    /// Mark one notification as read
    ///
    /// The response body is not inspected; only transport failures are
    /// reported.
    pub async fn mark_notification_read(&self, id: i64) -> Result<()> {
        let path = format!("/api/notifications/{}/read/", id);
        self.post(&path).send().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ServerConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url("/chatAI/api/sessions/"),
            "http://localhost:8000/chatAI/api/sessions/"
        );
    }

    #[test]
    fn test_is_authenticated_reflects_session_cookie() {
        let mut config = ServerConfig::default();
        let client = ApiClient::new(&config).unwrap();
        assert!(!client.is_authenticated());

        config.session_cookie = Some("sessionid=abc123".to_string());
        let client = ApiClient::new(&config).unwrap();
        assert!(client.is_authenticated());
    }
}
