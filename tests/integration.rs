//! End-to-end chain pricing over in-memory market data

use std::collections::HashMap;

use american_options::prelude::*;
use approx::assert_relative_eq;
use chrono::NaiveDate;

struct FakeMarket {
    quotes: Vec<RawQuote>,
    listing_spot: Option<f64>,
    fallback_spot: Option<f64>,
    yields: HashMap<&'static str, f64>,
}

impl FakeMarket {
    fn new(quotes: Vec<RawQuote>) -> Self {
        Self {
            quotes,
            listing_spot: Some(100.0),
            fallback_spot: None,
            yields: HashMap::from([("^IRX", 0.05), ("^FVX", 0.04), ("^TNX", 0.042)]),
        }
    }
}

impl MarketData for FakeMarket {
    fn expirations(&self, _ticker: &str) -> PricerResult<Vec<NaiveDate>> {
        Ok(vec![expiry()])
    }

    fn option_chain(
        &self,
        _ticker: &str,
        requested: NaiveDate,
        _option_type: OptionType,
    ) -> PricerResult<ChainListing> {
        if requested != expiry() {
            return Ok(ChainListing::default());
        }
        Ok(ChainListing {
            quotes: self.quotes.clone(),
            underlying_price: self.listing_spot,
        })
    }

    fn spot_price(&self, ticker: &str) -> PricerResult<f64> {
        self.fallback_spot
            .ok_or_else(|| PricerError::data(format!("Could not find current price for {}", ticker)))
    }

    fn treasury_yield(&self, symbol: &str) -> PricerResult<f64> {
        self.yields
            .get(symbol)
            .copied()
            .ok_or_else(|| PricerError::network("Yahoo Finance request failed (404)"))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()
}

fn time() -> f64 {
    181.0 / 365.0
}

fn expected_rate() -> f64 {
    interpolate_rate(
        time(),
        &[
            RateAnchor::new(0.25, 0.05),
            RateAnchor::new(5.0, 0.04),
            RateAnchor::new(10.0, 0.042),
        ],
    )
}

fn put_quotes(vol: f64) -> Vec<RawQuote> {
    let rate = expected_rate();
    [85.0, 95.0, 100.0, 105.0, 115.0]
        .iter()
        .map(|&k| {
            let mid = bs_price(100.0, k, rate, vol, time(), OptionType::Put);
            RawQuote::new(format!("{:.2}", k))
                .with_bid(format!("{}", mid - 0.02))
                .with_ask(format!("{}", mid + 0.02))
                .with_last(format!("{}", mid))
        })
        .collect()
}

fn request(side: OptionType) -> ChainRequest {
    ChainRequest::new("TEST", "2025-07-02", side).unwrap()
}

#[test]
fn test_price_request_end_to_end() {
    let market = FakeMarket::new(put_quotes(0.3));
    let chain = price_request(&market, &request(OptionType::Put), today(), &PricingConfig::default()).unwrap();

    assert_eq!(chain.current_price, 100.0);
    assert_relative_eq!(chain.time_to_maturity, time(), epsilon = 1e-12);
    assert_relative_eq!(chain.risk_free_rate, expected_rate(), epsilon = 1e-12);
    assert_eq!(chain.expiration, "2025-07-02");
    assert_eq!(chain.option_type, OptionType::Put);
    assert_eq!(chain.strikes(), vec![85.0, 95.0, 100.0, 105.0, 115.0]);

    for row in &chain.results {
        assert_eq!(row.vol_source, VolSource::Solved);
        assert!((row.implied_vol - 0.3).abs() < 1e-5);
        assert!(row.american_value >= OptionType::Put.intrinsic(100.0, row.strike));
        // Early exercise premium shows up as a positive deviation from the European last
        assert!(row.percent_difference.unwrap() > -2.0);
    }
}

#[test]
fn test_spot_falls_back_to_secondary_source() {
    let mut market = FakeMarket::new(put_quotes(0.25));
    market.listing_spot = None;
    market.fallback_spot = Some(100.0);

    let chain = price_request(&market, &request(OptionType::Put), today(), &PricingConfig::default()).unwrap();
    assert_eq!(chain.current_price, 100.0);

    market.fallback_spot = None;
    let err = price_request(&market, &request(OptionType::Put), today(), &PricingConfig::default()).unwrap_err();
    assert!(matches!(err, PricerError::Data(_)));
}

#[test]
fn test_default_rate_without_anchors() {
    let mut market = FakeMarket::new(put_quotes(0.25));
    market.yields.clear();

    let inputs = load_inputs(&market, &request(OptionType::Put), today(), &PricingConfig::default()).unwrap();
    assert!(inputs.anchors.is_empty());
    assert_eq!(inputs.context.rate, DEFAULT_RISK_FREE);

    let mut config = PricingConfig::default();
    config.chain.default_rate = 0.045;
    let inputs = load_inputs(&market, &request(OptionType::Put), today(), &config).unwrap();
    assert_eq!(inputs.context.rate, 0.045);
}

#[test]
fn test_unknown_expiration_has_no_contracts() {
    let market = FakeMarket::new(put_quotes(0.25));
    let req = ChainRequest::new("TEST", "2025-08-15", OptionType::Put).unwrap();

    let err = price_request(&market, &req, today(), &PricingConfig::default()).unwrap_err();
    assert!(matches!(err, PricerError::NoUsableData(_)));
}

#[test]
fn test_all_strikes_missing_is_no_usable_data() {
    let quotes = vec![
        RawQuote::default().with_bid("1.00").with_ask("1.10"),
        RawQuote::new("").with_bid("2.00"),
        RawQuote::new("--").with_ask("3.00"),
    ];
    let market = FakeMarket::new(quotes);

    let err = price_request(&market, &request(OptionType::Call), today(), &PricingConfig::default()).unwrap_err();
    assert!(matches!(err, PricerError::NoUsableData(_)));
}

#[test]
fn test_malformed_request_fields() {
    let market = FakeMarket::new(put_quotes(0.25));

    let bad_date = ChainRequest::new("TEST", "07/02/2025", OptionType::Put).unwrap();
    let err = price_request(&market, &bad_date, today(), &PricingConfig::default()).unwrap_err();
    assert!(matches!(err, PricerError::InvalidInput(_)));

    assert!(matches!("strangle".parse::<OptionType>(), Err(PricerError::InvalidInput(_))));
}

#[test]
fn test_chain_result_json_shape() {
    let market = FakeMarket::new(put_quotes(0.3));
    let chain = price_request(&market, &request(OptionType::Put), today(), &PricingConfig::default()).unwrap();

    let json = serde_json::to_value(&chain).unwrap();
    for key in ["currentPrice", "timeToMaturity", "riskFreeRate", "expiration", "optionType", "results"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    let row = &json["results"][0];
    for key in ["strike", "bid", "ask", "midPrice", "impliedVol", "lastPrice", "americanValue", "percentDifference"] {
        assert!(row.get(key).is_some(), "missing row key {}", key);
    }

    let back: ChainResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.strikes(), chain.strikes());
    assert_eq!(back.results[0].vol_source, VolSource::Solved);
}
