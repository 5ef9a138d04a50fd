//! Nasdaq option-chain fetcher
//!
//! The Nasdaq option-chain endpoint returns every expiration for a ticker in
//! one flat table. Expirations appear as header rows (`expirygroup` set to a
//! date such as `"January 17, 2025"`) followed by the strike rows belonging
//! to that date. Call and put prices share a row, prefixed `c_` and `p_`.
//! Numbers are display strings (`"1.25"`, `"--"`).

use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::{OptionType, PricerError, PricerResult, RawField, RawQuote};

const NASDAQ_OPTIONS_URL: &str = "https://api.nasdaq.com/api/quote";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const EXPIRY_GROUP_FORMAT: &str = "%B %d, %Y";

/// Nasdaq API client
pub struct NasdaqClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NasdaqClient {
    pub fn new() -> PricerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| PricerError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: NASDAQ_OPTIONS_URL.to_string(),
        })
    }

    /// Fetch the full option table for a ticker
    pub fn option_data(&self, ticker: &str) -> PricerResult<NasdaqOptionData> {
        let ticker = ticker.trim().to_uppercase();
        let url = format!("{}/{}/option-chain", self.base_url, ticker);

        let response = self
            .client
            .get(&url)
            .query(&[("assetclass", "stocks"), ("limit", "9999")])
            .header("Accept", "application/json, text/plain, */*")
            .header("Origin", "https://www.nasdaq.com")
            .header(
                "Referer",
                format!(
                    "https://www.nasdaq.com/market-activity/stocks/{}/option-chain",
                    ticker.to_lowercase()
                ),
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .map_err(|e| PricerError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PricerError::network(format!(
                "Nasdaq option chain request failed ({})",
                status.as_u16()
            )));
        }

        let payload: NasdaqResponse = response
            .json()
            .map_err(|e| PricerError::data(format!("Nasdaq returned invalid data: {}", e)))?;

        let data = payload
            .data
            .ok_or_else(|| PricerError::data(format!("No Nasdaq option data found for ticker {}.", ticker)))?;

        if data.rows().is_empty() {
            return Err(PricerError::data(format!(
                "No Nasdaq option rows found for ticker {}.",
                ticker
            )));
        }

        tracing::debug!("Fetched {} Nasdaq option rows for {}", data.rows().len(), ticker);
        Ok(data)
    }
}

// Nasdaq API response structures

#[derive(Debug, Deserialize)]
struct NasdaqResponse {
    data: Option<NasdaqOptionData>,
}

/// Payload of the option-chain endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NasdaqOptionData {
    #[serde(rename = "lastTrade")]
    pub last_trade: Option<String>,
    table: Option<NasdaqTable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NasdaqTable {
    rows: Option<Vec<NasdaqRow>>,
}

impl NasdaqOptionData {
    pub fn from_rows(rows: Vec<NasdaqRow>, last_trade: Option<String>) -> Self {
        Self {
            last_trade,
            table: Some(NasdaqTable { rows: Some(rows) }),
        }
    }

    pub fn rows(&self) -> &[NasdaqRow] {
        self.table
            .as_ref()
            .and_then(|t| t.rows.as_deref())
            .unwrap_or(&[])
    }

    /// Underlying price parsed from the `lastTrade` banner
    pub fn last_trade_price(&self) -> Option<f64> {
        self.last_trade.as_deref().and_then(parse_last_trade_price)
    }
}

/// One row of the option table: an expiry header or a strike
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NasdaqRow {
    pub expirygroup: Option<String>,
    pub strike: Option<RawField>,
    #[serde(rename = "c_Last")]
    pub call_last: Option<RawField>,
    #[serde(rename = "c_Bid")]
    pub call_bid: Option<RawField>,
    #[serde(rename = "c_Ask")]
    pub call_ask: Option<RawField>,
    #[serde(rename = "p_Last")]
    pub put_last: Option<RawField>,
    #[serde(rename = "p_Bid")]
    pub put_bid: Option<RawField>,
    #[serde(rename = "p_Ask")]
    pub put_ask: Option<RawField>,
}

impl NasdaqRow {
    /// Expiration date if this is a header row.
    ///
    /// `Some(None)` marks a header whose date could not be parsed.
    fn header_date(&self) -> Option<Option<NaiveDate>> {
        let group = self.expirygroup.as_deref()?.trim();
        if !group.contains(',') {
            return None;
        }
        Some(NaiveDate::parse_from_str(group, EXPIRY_GROUP_FORMAT).ok())
    }

    fn has_strike(&self) -> bool {
        match &self.strike {
            None => false,
            Some(RawField::Number(_)) => true,
            Some(RawField::Text(s)) => {
                let s = s.trim();
                !s.is_empty() && s != "--"
            }
        }
    }

    /// Quote for one side of this row
    pub fn to_raw_quote(&self, option_type: OptionType) -> RawQuote {
        let (bid, ask, last) = match option_type {
            OptionType::Call => (&self.call_bid, &self.call_ask, &self.call_last),
            OptionType::Put => (&self.put_bid, &self.put_ask, &self.put_last),
        };

        RawQuote {
            strike: self.strike.clone(),
            bid: bid.clone(),
            ask: ask.clone(),
            last: last.clone(),
            implied_vol: None,
        }
    }
}

/// Distinct expirations in first-seen order
pub fn expirations_from_rows(rows: &[NasdaqRow]) -> Vec<NaiveDate> {
    let mut expiries = Vec::new();
    for date in rows.iter().filter_map(|r| r.header_date().flatten()) {
        if !expiries.contains(&date) {
            expiries.push(date);
        }
    }
    expiries
}

/// Strike rows under the header for `expiry`
pub fn rows_for_expiration(rows: &[NasdaqRow], expiry: NaiveDate) -> Vec<&NasdaqRow> {
    let mut current = None;
    let mut matching = Vec::new();

    for row in rows {
        if let Some(date) = row.header_date() {
            current = date;
            continue;
        }
        if current == Some(expiry) && row.has_strike() {
            matching.push(row);
        }
    }

    matching
}

/// First `$?digits(.digits)?` token, e.g. `"LAST TRADE: $189.46 (AS OF ...)"`
pub fn parse_last_trade_price(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tail = &text[start..];

    let int_len = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    let mut end = int_len;

    let rest = &tail[int_len..];
    if let Some(frac) = rest.strip_prefix('.') {
        let frac_len = frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len());
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    tail[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(group: &str) -> NasdaqRow {
        NasdaqRow {
            expirygroup: Some(group.to_string()),
            ..Default::default()
        }
    }

    fn strike_row(strike: &str, c_bid: &str, p_bid: &str) -> NasdaqRow {
        NasdaqRow {
            expirygroup: Some(String::new()),
            strike: Some(RawField::from(strike)),
            call_bid: Some(RawField::from(c_bid)),
            call_ask: Some(RawField::from("--")),
            put_bid: Some(RawField::from(p_bid)),
            put_ask: Some(RawField::from("1.10")),
            ..Default::default()
        }
    }

    fn sample_rows() -> Vec<NasdaqRow> {
        vec![
            header("January 17, 2025"),
            strike_row("100.00", "5.10", "0.90"),
            strike_row("--", "1.00", "1.00"),
            strike_row("105.00", "2.10", "2.90"),
            header("Februar 30, 2025"),
            strike_row("110.00", "9.99", "9.99"),
            header("February 21, 2025"),
            strike_row("100.00", "6.00", "1.50"),
            header("January 17, 2025"),
        ]
    }

    #[test]
    fn test_expirations() {
        let expiries = expirations_from_rows(&sample_rows());
        assert_eq!(
            expiries,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 21).unwrap(),
            ]
        );
    }

    #[test]
    fn test_rows_for_expiration() {
        let rows = sample_rows();
        let jan = rows_for_expiration(&rows, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(jan.len(), 2);

        // Rows under an unparseable header belong to no expiration
        let feb = rows_for_expiration(&rows, NaiveDate::from_ymd_opt(2025, 2, 21).unwrap());
        assert_eq!(feb.len(), 1);

        let none = rows_for_expiration(&rows, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert!(none.is_empty());
    }

    #[test]
    fn test_side_selection() {
        let row = strike_row("100.00", "5.10", "0.90");

        let call = row.to_raw_quote(OptionType::Call).normalize().unwrap();
        assert_eq!(call.bid, 5.10);
        // Missing call ask synthesized from bid
        assert_eq!(call.ask, 5.10);

        let put = row.to_raw_quote(OptionType::Put).normalize().unwrap();
        assert_eq!(put.bid, 0.90);
        assert_eq!(put.ask, 1.10);
    }

    #[test]
    fn test_parse_last_trade_price() {
        assert_eq!(
            parse_last_trade_price("LAST TRADE: $189.46 (AS OF JAN 10, 2025)"),
            Some(189.46)
        );
        assert_eq!(parse_last_trade_price("$42"), Some(42.0));
        assert_eq!(parse_last_trade_price("12. dollars"), Some(12.0));
        assert_eq!(parse_last_trade_price("no price"), None);
        assert_eq!(parse_last_trade_price(""), None);
    }

    #[test]
    fn test_deserializes_payload() {
        let json = r#"{
            "lastTrade": "LAST TRADE: $101.25 (AS OF JAN 10, 2025)",
            "table": {"rows": [
                {"expirygroup": "January 17, 2025", "strike": null},
                {"expirygroup": "", "strike": "100.00", "c_Bid": "2.00", "c_Ask": "2.20",
                 "c_Last": "2.15", "p_Bid": "--", "p_Ask": "--", "p_Last": "--"}
            ]}
        }"#;

        let data: NasdaqOptionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.rows().len(), 2);
        assert_eq!(data.last_trade_price(), Some(101.25));

        let rows = rows_for_expiration(data.rows(), NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].to_raw_quote(OptionType::Put).normalize().is_err());
    }

    #[test]
    #[ignore] // Requires network
    fn test_fetch_option_data() {
        let client = NasdaqClient::new().unwrap();
        let data = client.option_data("AAPL").unwrap();

        assert!(!expirations_from_rows(data.rows()).is_empty());
        println!("AAPL last trade: {:?}", data.last_trade_price());
    }
}
