//! Chain pricer
//!
//! Per strike: normalize the quote, resolve a volatility (provider value if
//! plausible, otherwise solved from the mid price), value the American option
//! on the lattice and compare against the last traded price.
//!
//! Strikes that cannot be normalized or solved are dropped; the chain only
//! fails when nothing survives.

use rayon::prelude::*;

use super::config::PricingConfig;
use crate::core::{
    normalize, percent_difference, ChainResult, NormalizedQuote, OptionType, PricerError,
    PricerResult, PricingContext, RawQuote, StrikeResult, VolSource,
};
use crate::models::{american_value, implied_volatility_with};

/// Prices every strike of one (expiration, side) chain
#[derive(Debug, Clone, Default)]
pub struct ChainPricer {
    config: PricingConfig,
}

impl ChainPricer {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price a chain of raw quotes.
    ///
    /// Output rows follow input order. Returns `NoUsableData` when no quote
    /// survives normalization, or none survives solving and valuation.
    pub fn price_chain(
        &self,
        ctx: &PricingContext,
        expiration: &str,
        quotes: &[RawQuote],
    ) -> PricerResult<ChainResult> {
        let floor = self.config.chain.provider_iv_floor;
        let normalized: Vec<NormalizedQuote> = quotes
            .iter()
            .filter_map(|raw| match normalize(raw, floor) {
                Ok(q) => Some(q),
                Err(reason) => {
                    tracing::debug!(strike = ?raw.strike, %reason, "skipping quote");
                    None
                }
            })
            .collect();

        if normalized.is_empty() {
            return Err(PricerError::no_usable_data(format!(
                "No usable {} contracts on {} ({} quotes received)",
                ctx.option_type,
                expiration,
                quotes.len()
            )));
        }

        let priced: Vec<Option<StrikeResult>> = if self.config.chain.parallel {
            normalized
                .par_iter()
                .map(|q| self.try_price_strike(ctx, q))
                .collect()
        } else {
            normalized
                .iter()
                .map(|q| self.try_price_strike(ctx, q))
                .collect()
        };
        let results: Vec<StrikeResult> = priced.into_iter().flatten().collect();

        if results.is_empty() {
            return Err(PricerError::no_usable_data(format!(
                "None of the {} {} contracts on {} could be priced",
                normalized.len(),
                ctx.option_type,
                expiration
            )));
        }

        tracing::info!(
            expiration,
            side = %ctx.option_type,
            spot = ctx.spot,
            time = ctx.time,
            rate = ctx.rate,
            quotes = quotes.len(),
            priced = results.len(),
            "priced chain"
        );

        Ok(ChainResult {
            current_price: ctx.spot,
            time_to_maturity: ctx.time,
            risk_free_rate: ctx.rate,
            expiration: expiration.to_string(),
            option_type: ctx.option_type,
            results,
        })
    }

    /// Volatility for one strike, with its provenance
    pub fn resolve_vol(
        &self,
        ctx: &PricingContext,
        quote: &NormalizedQuote,
    ) -> PricerResult<(f64, VolSource)> {
        match quote.provider_iv {
            Some(iv) => Ok((iv, VolSource::Provider)),
            None => {
                let iv = implied_volatility_with(
                    quote.mid,
                    ctx.spot,
                    quote.strike,
                    ctx.rate,
                    ctx.time,
                    ctx.option_type,
                    &self.config.solver,
                )?;
                Ok((iv, VolSource::Solved))
            }
        }
    }

    /// Price one normalized strike
    pub fn price_strike(
        &self,
        ctx: &PricingContext,
        quote: &NormalizedQuote,
    ) -> PricerResult<StrikeResult> {
        let (vol, vol_source) = self.resolve_vol(ctx, quote)?;

        let value = american_value(
            ctx.spot,
            quote.strike,
            ctx.rate,
            vol,
            ctx.time,
            ctx.option_type,
            &self.config.lattice,
        )?;

        Ok(StrikeResult {
            strike: quote.strike,
            bid: quote.bid,
            ask: quote.ask,
            mid_price: quote.mid,
            implied_vol: vol,
            vol_source,
            last_price: quote.last,
            american_value: value,
            percent_difference: percent_difference(value, quote.last),
        })
    }

    fn try_price_strike(&self, ctx: &PricingContext, quote: &NormalizedQuote) -> Option<StrikeResult> {
        match self.price_strike(ctx, quote) {
            Ok(result) => Some(result),
            Err(e) if e.is_per_strike() => {
                tracing::debug!(strike = quote.strike, mid = quote.mid, error = %e, "strike unpriceable");
                None
            }
            Err(e) => {
                tracing::warn!(strike = quote.strike, error = %e, "dropping strike");
                None
            }
        }
    }
}

/// Price a chain with the default configuration.
///
/// Spot and maturity are validated once for the whole chain.
pub fn price_chain(
    spot: f64,
    time: f64,
    rate: f64,
    option_type: OptionType,
    expiration: &str,
    quotes: &[RawQuote],
) -> PricerResult<ChainResult> {
    let ctx = PricingContext::new(spot, time, rate, option_type)?;
    ChainPricer::default().price_chain(&ctx, expiration, quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExerciseStyle;
    use crate::models::{black_scholes, lattice_value, LatticeConfig};

    const EXPIRY: &str = "2025-06-20";

    fn ctx(option_type: OptionType) -> PricingContext {
        PricingContext::new(100.0, 0.5, 0.04, option_type).unwrap()
    }

    /// Quote whose mid is the closed-form price at `vol`
    fn quote_at_vol(strike: f64, vol: f64, option_type: OptionType) -> RawQuote {
        let mid = black_scholes::price(100.0, strike, 0.04, vol, 0.5, option_type);
        RawQuote::new(strike)
            .with_bid(mid - 0.05)
            .with_ask(mid + 0.05)
            .with_last(mid)
    }

    #[test]
    fn test_solves_and_values_each_strike() {
        let quotes: Vec<RawQuote> = [90.0, 100.0, 110.0]
            .iter()
            .map(|&k| quote_at_vol(k, 0.25, OptionType::Put))
            .collect();

        let chain = ChainPricer::default()
            .price_chain(&ctx(OptionType::Put), EXPIRY, &quotes)
            .unwrap();

        assert_eq!(chain.strikes(), vec![90.0, 100.0, 110.0]);
        assert_eq!(chain.expiration, EXPIRY);
        for row in &chain.results {
            assert_eq!(row.vol_source, VolSource::Solved);
            assert!((row.implied_vol - 0.25).abs() < 1e-6);
            // Early exercise only adds value over the same lattice run European
            let steps = LatticeConfig::default().steps_for_maturity(0.5);
            let european = lattice_value(
                100.0,
                row.strike,
                0.04,
                row.implied_vol,
                0.5,
                OptionType::Put,
                ExerciseStyle::European,
                steps,
            )
            .unwrap();
            assert!(row.american_value >= european - 1e-9);
            assert!(row.american_value > european || row.strike < 100.0);
            assert!(row.percent_difference.is_some());
        }
    }

    #[test]
    fn test_prefers_provider_iv() {
        let quotes = vec![RawQuote::new(100.0)
            .with_bid(5.0)
            .with_ask(5.4)
            .with_implied_vol(0.4)];

        let chain = ChainPricer::default()
            .price_chain(&ctx(OptionType::Call), EXPIRY, &quotes)
            .unwrap();

        let row = &chain.results[0];
        assert_eq!(row.vol_source, VolSource::Provider);
        assert_eq!(row.implied_vol, 0.4);
        assert_eq!(row.last_price, None);
        assert_eq!(row.percent_difference, None);
    }

    #[test]
    fn test_drops_unpriceable_strikes() {
        let quotes = vec![
            quote_at_vol(100.0, 0.3, OptionType::Call),
            // No bid or ask
            RawQuote::new(105.0).with_bid("--"),
            // Deep ITM call quoted below intrinsic: no implied vol
            RawQuote::new(60.0).with_bid(1.0).with_ask(1.0),
            quote_at_vol(110.0, 0.3, OptionType::Call),
        ];

        let chain = ChainPricer::default()
            .price_chain(&ctx(OptionType::Call), EXPIRY, &quotes)
            .unwrap();

        assert_eq!(chain.strikes(), vec![100.0, 110.0]);
    }

    #[test]
    fn test_keeps_duplicate_strikes() {
        let q = quote_at_vol(100.0, 0.2, OptionType::Call);
        let chain = ChainPricer::default()
            .price_chain(&ctx(OptionType::Call), EXPIRY, &[q.clone(), q])
            .unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_no_usable_data_after_normalization() {
        let quotes = vec![
            RawQuote::default().with_bid(1.0),
            RawQuote::new("--").with_ask(2.0),
        ];
        let err = ChainPricer::default()
            .price_chain(&ctx(OptionType::Put), EXPIRY, &quotes)
            .unwrap_err();
        assert!(matches!(err, PricerError::NoUsableData(_)));

        let err = ChainPricer::default()
            .price_chain(&ctx(OptionType::Put), EXPIRY, &[])
            .unwrap_err();
        assert!(matches!(err, PricerError::NoUsableData(_)));
    }

    #[test]
    fn test_no_usable_data_after_solving() {
        let quotes = vec![RawQuote::new(50.0).with_bid(0.5).with_ask(0.5)];
        let err = ChainPricer::default()
            .price_chain(&ctx(OptionType::Call), EXPIRY, &quotes)
            .unwrap_err();
        assert!(matches!(err, PricerError::NoUsableData(_)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let quotes: Vec<RawQuote> = (0..12)
            .map(|i| quote_at_vol(80.0 + 4.0 * i as f64, 0.2 + 0.01 * i as f64, OptionType::Put))
            .collect();

        let sequential = ChainPricer::default()
            .price_chain(&ctx(OptionType::Put), EXPIRY, &quotes)
            .unwrap();

        let mut config = PricingConfig::default();
        config.chain.parallel = true;
        let parallel = ChainPricer::new(config)
            .price_chain(&ctx(OptionType::Put), EXPIRY, &quotes)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_free_function_validates_context() {
        let quotes = vec![quote_at_vol(100.0, 0.2, OptionType::Call)];

        let err = price_chain(100.0, 0.0, 0.03, OptionType::Call, EXPIRY, &quotes).unwrap_err();
        assert!(matches!(err, PricerError::InvalidInput(_)));

        let err = price_chain(0.0, 0.5, 0.03, OptionType::Call, EXPIRY, &quotes).unwrap_err();
        assert!(matches!(err, PricerError::InvalidInput(_)));

        assert!(price_chain(100.0, 0.5, 0.04, OptionType::Call, EXPIRY, &quotes).is_ok());
    }
}
