use super::build_portfolio;
use super::portfolio_summary_conversation;
use super::search_stocks;
use super::stock_report_conversation;
use crate::domain::models::ChatContent;
use crate::domain::models::RiskProfile;
use crate::domain::models::Role;

fn text_of(content: &ChatContent) -> String {
    match content {
        ChatContent::Text(text) => return text.to_string(),
        ChatContent::Parts(_) => return "".to_string(),
    }
}

#[test]
fn it_lists_the_whole_catalog_for_empty_queries() {
    assert_eq!(search_stocks("").len(), 15);
    assert_eq!(search_stocks("   ").len(), 15);
}

#[test]
fn it_searches_names_case_insensitively() {
    let tickers = search_stocks("samsung")
        .into_iter()
        .map(|stock| return stock.ticker)
        .collect::<Vec<String>>();
    assert_eq!(tickers, vec!["005930", "207940"]);
}

#[test]
fn it_searches_tickers() {
    let res = search_stocks("0356");
    assert_eq!(res.len(), 0);

    let res = search_stocks("035720");
    assert_eq!(res.len(), 1);
    assert_eq!(res[0].name, "Kakao");
}

#[test]
fn it_buckets_risk_levels() {
    assert_eq!(RiskProfile::from_level(1), RiskProfile::Conservative);
    assert_eq!(RiskProfile::from_level(3), RiskProfile::Conservative);
    assert_eq!(RiskProfile::from_level(4), RiskProfile::Balanced);
    assert_eq!(RiskProfile::from_level(6), RiskProfile::Balanced);
    assert_eq!(RiskProfile::from_level(7), RiskProfile::Aggressive);
    assert_eq!(RiskProfile::from_level(10), RiskProfile::Aggressive);
}

#[test]
fn it_weights_holdings_equally() {
    for (level, count) in [(2, 4), (6, 6), (9, 8)] {
        let portfolio = build_portfolio(level);
        assert_eq!(portfolio.len(), count);

        let total = portfolio.iter().map(|holding| return holding.weight).sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(portfolio
            .iter()
            .all(|holding| return holding.weight == portfolio[0].weight));
    }
}

#[test]
fn it_builds_report_prompts() {
    let conversation = stock_report_conversation("Kakao", "035720", "2024-05-01");
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[0].role, Role::System);

    let prompt = text_of(&conversation[1].content);
    assert!(prompt.contains("Kakao (ticker: 035720)"));
    assert!(prompt.contains("up to today (2024-05-01)"));
}

#[test]
fn it_lists_weights_in_summary_prompts() {
    let conversation = portfolio_summary_conversation(&build_portfolio(1));
    let prompt = text_of(&conversation[1].content);

    insta::assert_snapshot!(prompt.lines().nth(2).unwrap(), @"Portfolio: Samsung Electronics(25.00%), KODEX 200(25.00%), SK hynix(25.00%), NAVER(25.00%)");
}
