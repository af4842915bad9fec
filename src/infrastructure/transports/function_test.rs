use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::Function;
use crate::configuration::DEFAULT_FUNCTION_NAME;
use crate::domain::models::ChatError;
use crate::domain::models::CompletionRequest;
use crate::domain::models::CompletionResult;
use crate::domain::models::HistoryEntry;
use crate::domain::models::Role;
use crate::domain::models::Transport;
use crate::infrastructure::functions::Functions;

impl Function {
    fn with_url(url: String) -> Function {
        return Function {
            functions: Functions::new(&url, "anon-key", Duration::from_secs(5)),
            name: DEFAULT_FUNCTION_NAME.to_string(),
        };
    }
}

fn request(session_id: Option<&str>) -> CompletionRequest {
    return CompletionRequest {
        history: vec![HistoryEntry {
            role: Role::User,
            content: "Earlier question".to_string(),
        }],
        input: "Hello there".to_string(),
        image_base64: None,
        session_id: session_id.map(|id| return id.to_string()),
    };
}

#[tokio::test]
async fn it_health_checks_configuration() {
    assert!(Function::with_url("https://example.supabase.co".to_string())
        .health_check()
        .await
        .is_ok());
    assert!(Function::with_url("".to_string())
        .health_check()
        .await
        .is_err());
}

#[tokio::test]
async fn it_sends_message_and_empty_session() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .match_body(Matcher::Json(json!({
            "message": "Hello there",
            "session_id": ""
        })))
        .with_status(200)
        .with_body(r#"{"response":"Hi!","session_id":"sess-1"}"#)
        .create_async()
        .await;

    let transport = Function::with_url(server.url());
    let res = transport.send(request(None)).await?;
    mock.assert_async().await;

    assert_eq!(
        res,
        CompletionResult {
            text: "Hi!".to_string(),
            session_id: Some("sess-1".to_string()),
        }
    );

    return Ok(());
}

#[tokio::test]
async fn it_carries_session_id() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .match_body(Matcher::PartialJson(json!({ "session_id": "sess-1" })))
        .with_status(200)
        .with_body(r#"{"response":"Again!","session_id":"sess-1"}"#)
        .create_async()
        .await;

    let transport = Function::with_url(server.url());
    transport.send(request(Some("sess-1"))).await?;
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_normalizes_string_and_object_bodies() -> Result<()> {
    let mut object_server = mockito::Server::new_async().await;
    let object_mock = object_server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .with_status(200)
        .with_body(r#"{"response":"same","session_id":"s"}"#)
        .create_async()
        .await;

    let mut string_server = mockito::Server::new_async().await;
    let string_mock = string_server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .with_status(200)
        .with_body(r#""{\"response\":\"same\",\"session_id\":\"s\"}""#)
        .create_async()
        .await;

    let from_object = Function::with_url(object_server.url())
        .send(request(None))
        .await?;
    let from_string = Function::with_url(string_server.url())
        .send(request(None))
        .await?;

    object_mock.assert_async().await;
    string_mock.assert_async().await;
    assert_eq!(from_object, from_string);
    assert_eq!(from_object.text, "same");

    return Ok(());
}

#[tokio::test]
async fn it_defaults_missing_response_to_empty_text() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .with_status(200)
        .with_body(r#"{"session_id":""}"#)
        .create_async()
        .await;

    let res = Function::with_url(server.url()).send(request(None)).await?;
    assert_eq!(res, CompletionResult::default());

    return Ok(());
}

#[tokio::test]
async fn it_maps_function_errors() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/functions/v1/send_message_to_openai")
        .with_status(500)
        .with_body(r#"{"error":"OpenAI quota exceeded"}"#)
        .create_async()
        .await;

    let res = Function::with_url(server.url()).send(request(None)).await;
    assert_eq!(
        res,
        Err(ChatError::Server {
            status: 500,
            message: "OpenAI quota exceeded".to_string(),
        })
    );

    return Ok(());
}
