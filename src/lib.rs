//! Careterm - terminal client for the care portal
//!
//! This library provides the client-side logic for the portal's chat and
//! notification features: a typed API client, the chat controller, the
//! notification poller with its toast tray, form validation, and the
//! typed view construction behind the terminal UI.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Typed HTTP client and wire types for the portal backend
//! - `chat`: Chat controller owning the current session and its views
//! - `notify`: Notification poller, seen-id dedup, and toast tray
//! - `validate`: Login/registration form rules and per-field error state
//! - `view`: Typed view nodes for the chat pane, history, and badge
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use careterm::api::ApiClient;
//! use careterm::chat::ChatController;
//! use careterm::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let api = ApiClient::new(&config.server)?;
//!     let mut chat = ChatController::new(api, &config.chat);
//!     chat.refresh_sessions().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notify;
pub mod validate;
pub mod view;

// Re-export commonly used types
pub use api::ApiClient;
pub use chat::{ChatController, DeleteOutcome, SendOutcome};
pub use config::Config;
pub use error::{CaretermError, Result};
pub use notify::{NotificationPoller, ToastTray};
pub use validate::{validate_login, validate_registration, FieldError, FormState};
