#[cfg(test)]
#[path = "stocks_test.rs"]
mod tests;

use crate::domain::models::ChatMessage;
use crate::domain::models::Holding;
use crate::domain::models::RiskProfile;
use crate::domain::models::Role;
use crate::domain::models::Stock;

pub const REPORT_MAX_TOKENS: u32 = 4096;
pub const SUMMARY_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_PORTFOLIO_MODEL: &str = "STOCK_ETF";
pub const DEFAULT_RISK_LEVEL: i64 = 6;

/// Listed symbols the search endpoint answers from, as (name, ticker).
const STOCK_CATALOG: [(&str, &str); 15] = [
    ("Samsung Electronics", "005930"),
    ("SK hynix", "000660"),
    ("LG Electronics", "066570"),
    ("Hyundai Motor", "005380"),
    ("NAVER", "035420"),
    ("Kakao", "035720"),
    ("LG Energy Solution", "373220"),
    ("Samsung Biologics", "207940"),
    ("KODEX 200", "069500"),
    ("KB Financial Group", "105560"),
    ("Shinhan Financial Group", "055550"),
    ("POSCO Holdings", "005490"),
    ("Kia", "000270"),
    ("HD Hyundai Electric", "267260"),
    ("HMM", "011200"),
];

// (name, ticker, sector)
const CONSERVATIVE_HOLDINGS: [(&str, &str, &str); 4] = [
    ("Samsung Electronics", "005930", "IT"),
    ("KODEX 200", "069500", "ETF"),
    ("SK hynix", "000660", "IT"),
    ("NAVER", "035420", "IT"),
];

const BALANCED_HOLDINGS: [(&str, &str, &str); 6] = [
    ("Samsung Electronics", "005930", "IT"),
    ("SK hynix", "000660", "IT"),
    ("NAVER", "035420", "IT"),
    ("LG Energy Solution", "373220", "Battery"),
    ("Hyundai Motor", "005380", "Automotive"),
    ("KODEX 200", "069500", "ETF"),
];

const AGGRESSIVE_HOLDINGS: [(&str, &str, &str); 8] = [
    ("Samsung Electronics", "005930", "IT"),
    ("SK hynix", "000660", "IT"),
    ("NAVER", "035420", "IT"),
    ("Kakao", "035720", "IT"),
    ("LG Energy Solution", "373220", "Battery"),
    ("HD Hyundai Electric", "267260", "Electrical Equipment"),
    ("Samsung Biologics", "207940", "Bio"),
    ("LG Electronics", "066570", "Electronics"),
];

/// Case-insensitive match on the name, or a substring match on the ticker.
/// An empty query lists the whole catalog.
pub fn search_stocks(query: &str) -> Vec<Stock> {
    let query = query.trim().to_lowercase();

    return STOCK_CATALOG
        .iter()
        .filter(|(name, ticker)| {
            return query.is_empty()
                || name.to_lowercase().contains(&query)
                || ticker.contains(&query);
        })
        .map(|(name, ticker)| {
            return Stock {
                name: name.to_string(),
                ticker: ticker.to_string(),
            };
        })
        .collect();
}

/// Equal-weight portfolio for the profile `risk_level` falls into.
pub fn build_portfolio(risk_level: i64) -> Vec<Holding> {
    let holdings: &[(&str, &str, &str)] = match RiskProfile::from_level(risk_level) {
        RiskProfile::Conservative => &CONSERVATIVE_HOLDINGS,
        RiskProfile::Balanced => &BALANCED_HOLDINGS,
        RiskProfile::Aggressive => &AGGRESSIVE_HOLDINGS,
    };
    let weight = 1.0 / holdings.len() as f64;

    return holdings
        .iter()
        .map(|(name, ticker, sector)| {
            return Holding {
                name: name.to_string(),
                ticker: ticker.to_string(),
                sector: sector.to_string(),
                weight,
            };
        })
        .collect();
}

pub fn stock_report_conversation(stock_name: &str, stock_ticker: &str, today: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        r#"Write a detailed stock analysis report of about 900 characters on {stock_name} (ticker: {stock_ticker}).

Prefer information from Naver Finance, Yonhap Infomax and DART filings. Format the report in markdown with an h2 title for each section followed by a blank line. Do not use tables and do not add anything outside the sections below. Open with a one sentence summary of the stock, without a title.

Base every section on the most recent information available up to today ({today}). The "Recent Performance & News" section in particular must reflect market moves, filings and news up to {today}.

1. **Fundamental Analysis**

2. **Recent Performance & News**

3. **Growth Drivers & Future Outlook**

4. **Risk Factors**

5. **Valuation Summary**"#
    );

    return vec![
        ChatMessage::text(
            Role::System,
            "You are an AI fund manager building quarterly investment portfolios. Analyze stocks listed on the Korean market and write detailed investment reports.",
        ),
        ChatMessage::text(Role::User, &prompt),
    ];
}

pub fn portfolio_summary_conversation(portfolio: &[Holding]) -> Vec<ChatMessage> {
    let composition = portfolio
        .iter()
        .map(|holding| return format!("{}({:.2}%)", holding.name, holding.weight * 100.0))
        .collect::<Vec<String>>()
        .join(", ");

    let prompt = format!(
        r#"You are a senior portfolio manager. Write a concise overall assessment of the following stock portfolio.

Portfolio: {composition}

The assessment must cover:
1. The overall character of the portfolio, such as sector concentration, stability and growth potential.
2. Its strengths and potential risks. Stay as positive as possible but mention the risks briefly.
3. Three to four paragraphs in a professional analyst tone."#
    );

    return vec![
        ChatMessage::text(
            Role::System,
            "You are a senior portfolio manager. Assess the given portfolio composition objectively.",
        ),
        ChatMessage::text(Role::User, &prompt),
    ];
}
