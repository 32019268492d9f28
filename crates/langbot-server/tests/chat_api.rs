//! Integration tests for the `/chat` endpoint.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use langbot_chat::ConversationHandler;
use langbot_core::session::{InMemorySessionStore, SessionStore};
use langbot_core::types::{LlmResponse, Message};
use langbot_providers::{LlmProvider, LlmRequestConfig, ProviderError};
use langbot_server::{build_router, AppState};

/// Replies with the prompt it was given, or fails with a fixed message.
struct EchoProvider {
    prompts: Mutex<Vec<String>>,
    fail_with: Mutex<Option<String>>,
}

impl EchoProvider {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    fn fail_with(&self, msg: &str) {
        *self.fail_with.lock().unwrap() = Some(msg.to_string());
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn chat(
        &self,
        messages: &[Message],
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        let prompt = messages
            .iter()
            .map(Message::content)
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            return Err(ProviderError::Api {
                status: 401,
                body: msg,
            });
        }
        Ok(LlmResponse {
            content: prompt,
            ..Default::default()
        })
    }

    fn default_model(&self) -> &str {
        "echo"
    }

    fn display_name(&self) -> &str {
        "Echo"
    }
}

struct TestApp {
    router: axum::Router,
    provider: Arc<EchoProvider>,
    sessions: Arc<InMemorySessionStore>,
}

fn test_app() -> TestApp {
    let provider = Arc::new(EchoProvider::new());
    let sessions = Arc::new(InMemorySessionStore::default());
    let handler = ConversationHandler::new(provider.clone(), sessions.clone(), None, None, None);
    TestApp {
        router: build_router(AppState::new(handler)),
        provider,
        sessions,
    }
}

async fn post_chat(router: &axum::Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_echo_scenario() {
    let app = test_app();

    let (status, json) = post_chat(&app.router, r#"{"message": "Hi", "session_id": "u1"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let reply = json["response"].as_str().unwrap();
    assert!(reply.contains("You are LangBot, a helpful AI assistant."));
    assert!(reply.contains("User: Hi"));
}

#[tokio::test]
async fn test_missing_message_is_400() {
    let app = test_app();

    for body in [
        r#"{}"#,
        r#"{"message": ""}"#,
        r#"{"message": null, "session_id": "u1"}"#,
        r#"{"session_id": "u1"}"#,
    ] {
        let (status, json) = post_chat(&app.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json, serde_json::json!({ "error": "No input provided" }));
    }

    assert!(app.sessions.is_empty());
    assert!(app.provider.prompts().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = test_app();

    for body in ["not json", r#"{"message": 42}"#, "[]"] {
        let (status, json) = post_chat(&app.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["error"], "No input provided");
    }
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn test_default_session_used_when_omitted() {
    let app = test_app();

    post_chat(&app.router, r#"{"message": "remember the word pineapple"}"#).await;
    let (status, json) = post_chat(&app.router, r#"{"message": "what word?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["response"]
        .as_str()
        .unwrap()
        .contains("remember the word pineapple"));
    assert_eq!(app.sessions.len(), 1);
    assert!(app.sessions.get("default").is_some());
}

#[tokio::test]
async fn test_history_inclusion() {
    let app = test_app();

    post_chat(&app.router, r#"{"message": "Hello", "session_id": "s"}"#).await;
    post_chat(&app.router, r#"{"message": "What did I just say?", "session_id": "s"}"#).await;

    let prompts = app.provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Hello"));
    assert!(prompts[1].contains("What did I just say?"));
}

#[tokio::test]
async fn test_sessions_isolated() {
    let app = test_app();

    post_chat(&app.router, r#"{"message": "only-b-knows", "session_id": "b"}"#).await;
    post_chat(&app.router, r#"{"message": "same text", "session_id": "a"}"#).await;
    post_chat(&app.router, r#"{"message": "same text", "session_id": "b"}"#).await;

    let prompts = app.provider.prompts();
    assert!(!prompts[1].contains("only-b-knows"));
    assert!(prompts[2].contains("only-b-knows"));
}

#[tokio::test]
async fn test_provider_error_is_500_and_not_recorded() {
    let app = test_app();

    post_chat(&app.router, r#"{"message": "first", "session_id": "u1"}"#).await;
    app.provider.fail_with("invalid api key");

    let (status, json) = post_chat(&app.router, r#"{"message": "second", "session_id": "u1"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("invalid api key"));
    assert!(error.contains("401"));

    let handle = app.sessions.get("u1").unwrap();
    let session = handle.lock().await;
    assert_eq!(session.turns.len(), 1);
    assert_eq!(session.turns[0].user, "first");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/chat")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
