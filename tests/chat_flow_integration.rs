use serde_json::json;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use careterm::api::types::{MessageStatus, Sender};
use careterm::api::ApiClient;
use careterm::chat::{ChatController, DeleteOutcome, SendOutcome};
use careterm::config::{ChatConfig, ServerConfig};

fn controller_for(server: &MockServer) -> ChatController {
    let config = ServerConfig {
        base_url: server.uri(),
        csrf_token: Some("csrf-token".to_string()),
        ..Default::default()
    };
    let api = ApiClient::new(&config).unwrap();
    ChatController::new(api, &ChatConfig::default())
}

async fn mount_session_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "sessions": [
                {"session_id": "s1", "summary": "Blood sugar questions", "updated_at": "today"}
            ]
        })))
        .mount(server)
        .await;
}

/// Creating a session carries the CSRF header and selects the new id
#[tokio::test]
async fn test_create_session_sends_csrf_and_selects_id() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/create-session/"))
        .and(header("X-CSRFToken", "csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "s1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    let created = chat.new_session().await;

    assert_eq!(created.as_deref(), Some("s1"));
    assert_eq!(chat.session_id(), Some("s1"));
    assert!(!chat.history().is_empty());
}

/// A rejected create leaves no session selected and is not fatal
#[tokio::test]
async fn test_create_session_failure_is_logged_only() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/create-session/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "too many sessions"
        })))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    assert!(chat.new_session().await.is_none());
    assert!(chat.session_id().is_none());
}

/// Opening a session renders its messages in order with their flags
#[tokio::test]
async fn test_open_session_renders_messages_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "messages": [
                {"message_text": "how do I log readings?", "sender": "user",
                 "created_at": "09:00", "status": "completed", "personal_context_used": true},
                {"message_text": "open the journal tab", "sender": "assistant",
                 "created_at": "09:01", "status": "completed", "personal_context_used": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;

    assert_eq!(chat.session_id(), Some("s1"));
    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert!(messages[0].meta.context_badge);
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert!(!messages[1].meta.context_badge);
}

/// Sending without a session issues no send-message request at all
#[tokio::test]
async fn test_send_without_session_issues_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    assert_eq!(chat.send("hello").await, SendOutcome::SessionRequired);

}

/// The server's authoritative personal-context flag patches the already
/// rendered user message without replacing the node
#[tokio::test]
async fn test_send_patches_user_message_context_badge() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .and(body_partial_json(json!({
            "message": "what did I eat yesterday?",
            "session_id": "s1",
            "use_personal_context": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "s1",
            "user_message": {"personal_context_used": true},
            "assistant_message": {
                "message_text": "you logged oatmeal and soup",
                "created_at": "10:02",
                "status": "completed",
                "personal_context_used": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;

    // Optimistically rendered without the badge (toggle is off)...
    let outcome = chat.send("what did I eat yesterday?").await;
    assert_eq!(outcome, SendOutcome::Delivered { alert: None });

    // ...but patched to the server's authoritative flag afterwards.
    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert!(messages[0].meta.context_badge);
    assert!(messages[1].meta.context_badge);
    assert!(!chat.pane().is_typing());
}

/// An assistant reply with error status stays rendered and surfaces the
/// server-supplied error text
#[tokio::test]
async fn test_assistant_error_status_surfaces_alert() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "s1",
            "user_message": {"personal_context_used": false},
            "assistant_message": {
                "message_text": "I could not process this",
                "status": "error",
                "error_message": "model unavailable"
            }
        })))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;
    let outcome = chat.send("hello").await;

    assert_eq!(
        outcome,
        SendOutcome::Delivered {
            alert: Some("model unavailable".to_string())
        }
    );
    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].status, MessageStatus::Error);
}

/// The backend sends `error_message: ""` when it has no error text; the
/// alert falls back to the generic message instead of surfacing nothing
#[tokio::test]
async fn test_empty_error_message_falls_back_to_generic_alert() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "s1",
            "user_message": {"personal_context_used": false},
            "assistant_message": {
                "message_text": "",
                "status": "error",
                "error_message": ""
            }
        })))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;
    let outcome = chat.send("hello").await;

    assert_eq!(
        outcome,
        SendOutcome::Delivered {
            alert: Some("The assistant could not answer this message".to_string())
        }
    );
    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].status, MessageStatus::Error);
}

/// A success response without any assistant message renders a synthetic
/// error-status placeholder
#[tokio::test]
async fn test_missing_assistant_message_renders_placeholder() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "session_id": "s1"
        })))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;
    chat.send("hello").await;

    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].status, MessageStatus::Error);
}

/// A backend `success:false` hides the typing indicator and alerts while
/// keeping the optimistic user message
#[tokio::test]
async fn test_backend_rejection_alerts_and_keeps_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/send-message/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "quota exceeded"
        })))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;
    let outcome = chat.send("hello").await;

    assert_eq!(
        outcome,
        SendOutcome::Delivered {
            alert: Some("quota exceeded".to_string())
        }
    );
    assert_eq!(chat.pane().messages().count(), 1);
    assert!(!chat.pane().is_typing());
}

/// A transport failure removes the typing indicator but never rolls back
/// the optimistically rendered user message
#[tokio::test]
async fn test_transport_failure_keeps_optimistic_message() {
    // Nothing is listening on this port; the session fetch inside
    // open_session fails too, which is logged only.
    let config = ServerConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    };
    let api = ApiClient::new(&config).unwrap();
    let mut chat = ChatController::new(api, &ChatConfig::default());

    chat.open_session("s1").await;
    assert_eq!(chat.session_id(), Some("s1"));

    let outcome = chat.send("hello").await;
    assert_eq!(outcome, SendOutcome::TransportFailed);

    let messages: Vec<_> = chat.pane().messages().collect();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, Sender::User);
    assert!(!chat.pane().is_typing());
}

/// Deleting the active session resets the controller to the empty state
#[tokio::test]
async fn test_delete_active_session_resets_state() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/sessions/s1/delete/"))
        .and(header("X-CSRFToken", "csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;

    let outcome = chat.delete_session("s1", true).await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(chat.session_id().is_none());
    assert!(chat.pane().empty_state().is_some());
    assert!(chat.history().rows().iter().all(|r| !r.active));
}

/// An unconfirmed delete never reaches the backend
#[tokio::test]
async fn test_unconfirmed_delete_issues_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/sessions/s1/delete/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    assert_eq!(
        chat.delete_session("s1", false).await,
        DeleteOutcome::Cancelled
    );

}

/// Deleting a non-active session keeps the current one selected
#[tokio::test]
async fn test_delete_other_session_keeps_current() {
    let server = MockServer::start().await;
    mount_session_list(&server).await;

    Mock::given(method("GET"))
        .and(path("/chatAI/api/sessions/s1/messages/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "messages": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chatAI/api/sessions/s2/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.open_session("s1").await;

    assert_eq!(chat.delete_session("s2", true).await, DeleteOutcome::Deleted);
    assert_eq!(chat.session_id(), Some("s1"));
}
