#[cfg(test)]
#[path = "server_test.rs"]
pub(crate) mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::stocks;
use crate::domain::models::HistoryEntry;
use crate::domain::models::ProviderBox;
use crate::domain::services::build_conversation;
use crate::domain::services::SYSTEM_PROMPT;
use crate::infrastructure::providers::openai::OpenAI;

pub const BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;
pub const FALLBACK_CONTENT: &str = "Unable to generate a response.";
pub const EMPTY_MESSAGE_ERROR: &str = "Please enter a message.";

pub struct ServerState {
    pub provider: ProviderBox,
    pub system_prompt: String,
}

/// Every field may be missing or `null`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub messages: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    pub current_message: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponseBody {
    fn content(content: String) -> ChatResponseBody {
        return ChatResponseBody {
            content: Some(content),
            success: true,
            error: None,
        };
    }

    pub(crate) fn error(error: String) -> ChatResponseBody {
        return ChatResponseBody {
            content: None,
            success: false,
            error: Some(error),
        };
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponseBody {
    pub status: String,
    pub message: String,
}

async fn health() -> Json<HealthResponseBody> {
    return Json(HealthResponseBody {
        status: "healthy".to_string(),
        message: "API server is running".to_string(),
    });
}

/// Bodies that can't be read still get the JSON error envelope.
pub(crate) fn rejected(rejection: JsonRejection) -> (StatusCode, Json<ChatResponseBody>) {
    tracing::warn!(error = %rejection.body_text(), "Rejected request body");

    return (
        StatusCode::BAD_REQUEST,
        Json(ChatResponseBody::error(rejection.body_text())),
    );
}

async fn chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> (StatusCode, Json<ChatResponseBody>) {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejected(rejection),
    };

    let messages = body.messages.unwrap_or_default();
    let current_message = body.current_message.as_deref().unwrap_or_default().trim();
    if current_message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponseBody::error(EMPTY_MESSAGE_ERROR.to_string())),
        );
    }

    let image_base64 = body
        .image_base64
        .as_deref()
        .map(|image| return image.trim())
        .filter(|image| return !image.is_empty());

    let conversation = build_conversation(
        &state.system_prompt,
        &messages,
        current_message,
        image_base64,
    );

    tracing::debug!(
        history = messages.len(),
        has_image = image_base64.is_some(),
        "Forwarding chat request"
    );

    match state.provider.chat(conversation).await {
        Ok(content) => {
            let content = content.unwrap_or_else(|| return FALLBACK_CONTENT.to_string());
            return (StatusCode::OK, Json(ChatResponseBody::content(content)));
        }
        Err(err) => {
            tracing::error!(error = ?err, "Chat request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponseBody::error(err.public_message())),
            );
        }
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    return Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .merge(stocks::routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?err, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down");
}

pub async fn serve(port: u16) -> Result<()> {
    let provider = OpenAI::default();
    if !provider.has_token() {
        bail!("An OpenAI token is required to run the server. Set --openai-token or POCKETCHAT_OPENAI_TOKEN.");
    }

    let state = Arc::new(ServerState {
        provider: Box::new(provider),
        system_prompt: SYSTEM_PROMPT.to_string(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "PocketChat server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    return Ok(());
}
