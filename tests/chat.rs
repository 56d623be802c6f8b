//! Conversation and query endpoint integration tests

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use nebula_chat::chat::{NO_VALID_RESPONSE, QueryClient};
use nebula_chat::repl::QUERY_ERROR_FALLBACK;
use nebula_chat::{ChatSession, Voice};

mod common;
use common::spawn_server;

fn session_for(url: String) -> ChatSession {
    let query = QueryClient::new(url).expect("query client");
    ChatSession::new(query, None, None, Voice::default(), false)
}

#[tokio::test]
async fn hello_prompt_appends_user_then_bot_message() {
    let app = Router::new().route(
        "/query",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["prompt"], "hello");
            Json(json!({"response": {"response": "hi there"}}))
        }),
    );
    let url = spawn_server(app).await;

    let mut session = session_for(format!("{url}/query"));
    let reply = session.submit_prompt("hello").await;
    assert_eq!(reply, "hi there");

    // Greeting, then user prompt, then bot reply, in insertion order
    let messages = session.conversation().messages();
    assert_eq!(messages.len(), 3);
    assert!(!messages[0].is_user);
    assert_eq!(messages[1].content, "hello");
    assert!(messages[1].is_user);
    assert_eq!(messages[2].content, "hi there");
    assert!(!messages[2].is_user);
    assert!(messages[1].id < messages[2].id);
}

#[tokio::test]
async fn missing_nested_response_yields_fallback_content() {
    let app = Router::new().route(
        "/query",
        post(|| async { Json(json!({"response": {}})) }),
    );
    let url = spawn_server(app).await;

    let mut session = session_for(format!("{url}/query"));
    let reply = session.submit_prompt("anything").await;
    assert_eq!(reply, NO_VALID_RESPONSE);
}

#[tokio::test]
async fn missing_response_object_yields_fallback_content() {
    let app = Router::new().route("/query", post(|| async { Json(json!({})) }));
    let url = spawn_server(app).await;

    let client = QueryClient::new(format!("{url}/query")).unwrap();
    assert_eq!(client.ask("hi").await.unwrap(), NO_VALID_RESPONSE);
}

#[tokio::test]
async fn server_error_appends_error_message_and_keeps_session_alive() {
    let app = Router::new().route(
        "/query",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = spawn_server(app).await;

    let mut session = session_for(format!("{url}/query"));
    let reply = session.submit_prompt("hello").await;
    assert_eq!(reply, QUERY_ERROR_FALLBACK);

    let messages = session.conversation().messages();
    assert_eq!(messages.last().unwrap().content, QUERY_ERROR_FALLBACK);
    assert!(!messages.last().unwrap().is_user);
    assert!(!session.conversation().loading);

    // The session stays interactive after a failure
    let reply = session.submit_prompt("again").await;
    assert_eq!(reply, QUERY_ERROR_FALLBACK);
    assert_eq!(session.conversation().messages().len(), 5);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_query_error() {
    // Nothing listens here
    let client = QueryClient::new("http://127.0.0.1:1/query".to_string()).unwrap();
    let err = client.ask("hello").await.unwrap_err();
    assert!(matches!(err, nebula_chat::Error::Query(_)));
}
