#[cfg(test)]
#[path = "stocks_test.rs"]
mod tests;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::server::rejected;
use super::server::ChatResponseBody;
use super::server::HealthResponseBody;
use super::server::ServerState;
use crate::domain::models::Holding;
use crate::domain::models::Stock;
use crate::domain::services::build_portfolio;
use crate::domain::services::portfolio_summary_conversation;
use crate::domain::services::search_stocks;
use crate::domain::services::stock_report_conversation;
use crate::domain::services::DEFAULT_PORTFOLIO_MODEL;
use crate::domain::services::DEFAULT_RISK_LEVEL;
use crate::domain::services::REPORT_MAX_TOKENS;
use crate::domain::services::SUMMARY_MAX_TOKENS;

pub const MISSING_STOCK_ERROR: &str = "Please enter a stock name and ticker.";
pub const REPORT_FALLBACK: &str = "Unable to generate the analysis.";
pub const SUMMARY_FALLBACK: &str = "Unable to generate the portfolio summary.";
/// No market data source is wired in.
pub const UNKNOWN_PRICE: &str = "N/A";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequestBody {
    #[serde(default)]
    pub stock_name: Option<String>,
    #[serde(default)]
    pub stock_ticker: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponseBody {
    pub success: bool,
    pub stock_name: String,
    pub stock_ticker: String,
    pub latest_price: String,
    pub report: String,
    pub citations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioRequestBody {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub risk_level: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponseBody {
    pub success: bool,
    pub portfolio: Vec<Holding>,
    pub summary: String,
    pub model: String,
    pub risk_level: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    pub success: bool,
    pub stocks: Vec<Stock>,
}

fn failed(status: StatusCode, error: String) -> Response {
    return (status, Json(ChatResponseBody::error(error))).into_response();
}

async fn health() -> Json<HealthResponseBody> {
    return Json(HealthResponseBody {
        status: "healthy".to_string(),
        message: "Stock API server is running".to_string(),
    });
}

async fn analyze(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<AnalyzeRequestBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejected(rejection).into_response(),
    };

    let stock_name = body.stock_name.unwrap_or_default().trim().to_string();
    let stock_ticker = body.stock_ticker.unwrap_or_default().trim().to_string();
    if stock_name.is_empty() || stock_ticker.is_empty() {
        return failed(StatusCode::BAD_REQUEST, MISSING_STOCK_ERROR.to_string());
    }

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let conversation = stock_report_conversation(&stock_name, &stock_ticker, &today);
    tracing::info!(stock = %stock_name, ticker = %stock_ticker, "Analyzing stock");

    match state.provider.complete(conversation, REPORT_MAX_TOKENS).await {
        Ok(report) => {
            return Json(AnalyzeResponseBody {
                success: true,
                stock_name,
                stock_ticker,
                latest_price: UNKNOWN_PRICE.to_string(),
                report: report.unwrap_or_else(|| return REPORT_FALLBACK.to_string()),
                citations: vec![],
            })
            .into_response();
        }
        Err(err) => {
            tracing::error!(error = ?err, stock = %stock_name, "Stock analysis failed");
            return failed(StatusCode::INTERNAL_SERVER_ERROR, err.public_message());
        }
    }
}

async fn portfolio(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PortfolioRequestBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejected(rejection).into_response(),
    };

    let model = body
        .model
        .filter(|model| return !model.is_empty())
        .unwrap_or_else(|| return DEFAULT_PORTFOLIO_MODEL.to_string());
    let risk_level = body.risk_level.unwrap_or(DEFAULT_RISK_LEVEL);
    tracing::info!(model = %model, risk_level = risk_level, "Building portfolio");

    let portfolio = build_portfolio(risk_level);
    let conversation = portfolio_summary_conversation(&portfolio);

    match state.provider.complete(conversation, SUMMARY_MAX_TOKENS).await {
        Ok(summary) => {
            return Json(PortfolioResponseBody {
                success: true,
                portfolio,
                summary: summary.unwrap_or_else(|| return SUMMARY_FALLBACK.to_string()),
                model,
                risk_level,
            })
            .into_response();
        }
        Err(err) => {
            tracing::error!(error = ?err, "Portfolio summary failed");
            return failed(StatusCode::INTERNAL_SERVER_ERROR, err.public_message());
        }
    }
}

async fn search(Query(params): Query<SearchParams>) -> Json<SearchResponseBody> {
    let query = params.q.unwrap_or_default();

    return Json(SearchResponseBody {
        success: true,
        stocks: search_stocks(&query),
    });
}

pub fn routes() -> Router<Arc<ServerState>> {
    return Router::new()
        .route("/api/stock/health", get(health))
        .route("/api/stock/analyze", post(analyze))
        .route("/api/stock/portfolio", post(portfolio))
        .route("/api/stock/search", get(search));
}
