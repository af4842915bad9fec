use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::IdentityService;
use crate::domain::models::ChatError;
use crate::domain::models::User;
use crate::infrastructure::functions::Functions;

impl IdentityService {
    fn with_url(url: String) -> IdentityService {
        return IdentityService::new(Functions::new(&url, "anon-key", Duration::from_secs(5)));
    }
}

#[tokio::test]
async fn it_gets_users() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/get-user")
        .match_header("apikey", "anon-key")
        .match_body(Matcher::Json(json!({ "email": "ada@example.com", "phone": "+15550100" })))
        .with_status(200)
        .with_body(r#"{"user_id":"u-1","email":"ada@example.com","phone":"+15550100","is_new":true}"#)
        .create_async()
        .await;

    let service = IdentityService::with_url(server.url());
    let user = service.get_user("ada@example.com", "+15550100").await?;

    mock.assert_async().await;
    assert_eq!(
        user,
        User {
            user_id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15550100".to_string(),
            is_new: true,
        }
    );

    return Ok(());
}

#[tokio::test]
async fn it_validates_users_from_string_encoded_payloads() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/functions/v1/validate-user")
        .match_body(Matcher::Json(json!({ "user_id": "u-1" })))
        .with_status(200)
        .with_body(r#""{\"success\":true,\"user_id\":\"u-1\",\"phone\":\"+15550100\",\"email\":\"ada@example.com\"}""#)
        .create_async()
        .await;

    let service = IdentityService::with_url(server.url());
    let validated = service.validate_user("u-1").await?;

    mock.assert_async().await;
    assert!(validated.success);
    assert_eq!(validated.message, None);
    assert_eq!(validated.email, "ada@example.com");

    return Ok(());
}

#[tokio::test]
async fn it_surfaces_validation_failures() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/functions/v1/validate-user")
        .with_status(404)
        .with_body(r#"{"error":"user not found"}"#)
        .create_async()
        .await;

    let service = IdentityService::with_url(server.url());
    let res = service.validate_user("nobody").await;

    assert_eq!(
        res,
        Err(ChatError::Server {
            status: 404,
            message: "user not found".to_string(),
        })
    );

    return Ok(());
}
