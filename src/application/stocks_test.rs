use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use serde_json::Value;

use crate::application::server::tests::app;
use crate::application::server::tests::call;
use crate::application::server::tests::FakeProvider;
use crate::domain::models::ChatContent;
use crate::domain::models::ProviderError;

#[tokio::test]
async fn it_reports_stock_health() -> Result<()> {
    let provider = FakeProvider::answering(Ok(None));

    let (status, res) = call(app(&provider), "GET", "/api/stock/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    insta::assert_snapshot!(res, @r###"{"status":"healthy","message":"Stock API server is running"}"###);

    return Ok(());
}

#[tokio::test]
async fn it_searches_stocks() -> Result<()> {
    let provider = FakeProvider::answering(Ok(None));

    let (status, res) = call(app(&provider), "GET", "/api/stock/search?q=kakao", None).await?;
    assert_eq!(status, StatusCode::OK);
    insta::assert_snapshot!(res, @r###"{"success":true,"stocks":[{"name":"Kakao","ticker":"035720"}]}"###);

    let (_, res) = call(app(&provider), "GET", "/api/stock/search", None).await?;
    let json: Value = serde_json::from_str(&res)?;
    assert_eq!(json["stocks"].as_array().map(|stocks| return stocks.len()), Some(15));
    assert_eq!(provider.calls(), 0);

    return Ok(());
}

#[tokio::test]
async fn it_analyzes_stocks() -> Result<()> {
    let provider = FakeProvider::answering(Ok(Some("## Fundamental Analysis".to_string())));
    let body = r#"{"stock_name":"Kakao","stock_ticker":"035720"}"#;

    let (status, res) = call(app(&provider), "POST", "/api/stock/analyze", Some(body)).await?;
    assert_eq!(status, StatusCode::OK);
    insta::assert_snapshot!(res, @r###"{"success":true,"stock_name":"Kakao","stock_ticker":"035720","latest_price":"N/A","report":"## Fundamental Analysis","citations":[]}"###);

    assert_eq!(*provider.max_tokens.lock().unwrap(), vec![4096]);
    let conversations = provider.conversations.lock().unwrap();
    match &conversations[0][1].content {
        ChatContent::Text(prompt) => assert!(prompt.contains("Kakao (ticker: 035720)")),
        ChatContent::Parts(_) => panic!("report prompts are text only"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_requires_name_and_ticker() -> Result<()> {
    let provider = FakeProvider::answering(Ok(Some("unused".to_string())));

    for body in [r#"{"stock_name":"Kakao"}"#, r#"{"stock_name":"","stock_ticker":"035720"}"#, "{}"] {
        let (status, res) = call(app(&provider), "POST", "/api/stock/analyze", Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        insta::allow_duplicates! {
            insta::assert_snapshot!(res, @r###"{"success":false,"error":"Please enter a stock name and ticker."}"###);
        }
    }
    assert_eq!(provider.calls(), 0);

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_when_no_report_is_produced() -> Result<()> {
    let provider = FakeProvider::answering(Ok(None));
    let body = r#"{"stock_name":"Kakao","stock_ticker":"035720"}"#;

    let (_, res) = call(app(&provider), "POST", "/api/stock/analyze", Some(body)).await?;
    let json: Value = serde_json::from_str(&res)?;
    assert_eq!(json["report"], json!("Unable to generate the analysis."));

    return Ok(());
}

#[tokio::test]
async fn it_builds_portfolios_with_defaults() -> Result<()> {
    let provider = FakeProvider::answering(Ok(Some("Balanced and tech heavy.".to_string())));

    let (status, res) = call(app(&provider), "POST", "/api/stock/portfolio", Some("{}")).await?;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&res)?;
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["model"], json!("STOCK_ETF"));
    assert_eq!(json["risk_level"], json!(6));
    assert_eq!(json["summary"], json!("Balanced and tech heavy."));
    assert_eq!(json["portfolio"].as_array().map(|holdings| return holdings.len()), Some(6));
    assert_eq!(
        json["portfolio"][3],
        json!({ "name": "LG Energy Solution", "ticker": "373220", "sector": "Battery", "weight": 1.0 / 6.0 })
    );
    assert_eq!(*provider.max_tokens.lock().unwrap(), vec![2048]);

    return Ok(());
}

#[tokio::test]
async fn it_builds_portfolios_for_the_requested_risk() -> Result<()> {
    let provider = FakeProvider::answering(Ok(None));
    let body = r#"{"model":"STOCK_ONLY","risk_level":9}"#;

    let (_, res) = call(app(&provider), "POST", "/api/stock/portfolio", Some(body)).await?;
    let json: Value = serde_json::from_str(&res)?;
    assert_eq!(json["model"], json!("STOCK_ONLY"));
    assert_eq!(json["portfolio"].as_array().map(|holdings| return holdings.len()), Some(8));
    assert_eq!(json["summary"], json!("Unable to generate the portfolio summary."));

    return Ok(());
}

#[tokio::test]
async fn it_surfaces_provider_failures_from_stock_routes() -> Result<()> {
    let provider = FakeProvider::answering(Err(ProviderError::Api {
        status: 429,
        message: "Rate limit reached".to_string(),
    }));

    let (status, res) = call(app(&provider), "POST", "/api/stock/portfolio", Some("{}")).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    insta::assert_snapshot!(res, @r###"{"success":false,"error":"Rate limit reached"}"###);

    let body = r#"{"stock_name":"Kakao","stock_ticker":"035720"}"#;
    let (status, _) = call(app(&provider), "POST", "/api/stock/analyze", Some(body)).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    return Ok(());
}

#[tokio::test]
async fn it_answers_unreadable_stock_bodies_with_the_error_envelope() -> Result<()> {
    let provider = FakeProvider::answering(Ok(None));

    let (status, res) = call(app(&provider), "POST", "/api/stock/portfolio", Some(r#"{"risk_level":"high"}"#)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&res)?;
    assert_eq!(json["success"], json!(false));
    assert_eq!(provider.calls(), 0);

    return Ok(());
}
