//! Price source registry and validation gate.
//!
//! Two kinds of sources feed the engine. A confidence feed publishes full
//! quotes (price, confidence interval, exponent, timestamp) the way
//! aggregator networks do. A trend oracle is a bare authority-gated value
//! store: a designated publisher pushes a hundredths-of-a-unit price and the
//! adapter stamps it into quote form with zero confidence.
//!
//! [`OracleAdapter::resolve`] is the only way a quote leaves this module, and
//! it enforces positivity, staleness, and confidence bounds on every read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::assets::AccountId;
use crate::error::{Error, Result};
use crate::oracle::quote::{PriceQuote, SourceId};
use crate::utils::constants::{
    DEFAULT_MAX_CONFIDENCE_BPS, DEFAULT_MAX_PRICE_STALENESS_SECS, MAX_PRICE_EXPONENT_MAGNITUDE,
    TREND_FEED_EXPONENT,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validation bounds applied to every resolved quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Maximum quote age in seconds
    pub max_staleness_secs: u64,
    /// Maximum relative confidence interval in basis points of the price
    pub max_confidence_bps: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_staleness_secs: DEFAULT_MAX_PRICE_STALENESS_SECS,
            max_confidence_bps: DEFAULT_MAX_CONFIDENCE_BPS,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCES
// ═══════════════════════════════════════════════════════════════════════════════

/// A full-quote feed in aggregator format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceFeed {
    /// Latest published quote, if any
    latest: Option<PriceQuote>,
}

/// An authority-gated scalar value store; values are hundredths of a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendOracle {
    /// The only account allowed to push values
    publisher: AccountId,
    /// Latest pushed value, hundredths of a unit
    value: Option<u64>,
    /// Unix timestamp of the latest push
    last_update: i64,
}

/// A registered price source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// Full quotes with confidence intervals
    Confidence(ConfidenceFeed),
    /// Publisher-pushed scalar values
    Trend(TrendOracle),
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADAPTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry of price sources plus the validation gate over them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleAdapter {
    config: OracleConfig,
    sources: HashMap<SourceId, PriceSource>,
}

impl OracleAdapter {
    /// Create an adapter with the given validation bounds
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            sources: HashMap::new(),
        }
    }

    /// Validation bounds in effect
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Register an empty confidence feed under `id`
    pub fn register_confidence_feed(&mut self, id: SourceId) -> Result<()> {
        self.register(id, PriceSource::Confidence(ConfidenceFeed { latest: None }))
    }

    /// Register a trend oracle under `id`, writable only by `publisher`
    pub fn register_trend_oracle(&mut self, id: SourceId, publisher: AccountId) -> Result<()> {
        self.register(
            id,
            PriceSource::Trend(TrendOracle {
                publisher,
                value: None,
                last_update: 0,
            }),
        )
    }

    fn register(&mut self, id: SourceId, source: PriceSource) -> Result<()> {
        if self.sources.contains_key(&id) {
            return Err(Error::AlreadyInitialized(format!(
                "price source {} exists",
                id.short()
            )));
        }
        debug!(source = %id.short(), "registered price source");
        self.sources.insert(id, source);
        Ok(())
    }

    /// Publish a full quote to a confidence feed
    pub fn post_update(
        &mut self,
        id: &SourceId,
        price: i64,
        confidence: u64,
        exponent: i32,
        publish_time: i64,
    ) -> Result<()> {
        match self.source_mut(id)? {
            PriceSource::Confidence(feed) => {
                feed.latest = Some(PriceQuote {
                    price,
                    confidence,
                    exponent,
                    publish_time,
                    source: *id,
                });
                Ok(())
            }
            PriceSource::Trend(_) => Err(Error::SourceMismatch {
                expected: "confidence feed".into(),
                got: format!("trend oracle {}", id.short()),
            }),
        }
    }

    /// Push a value to a trend oracle; only its registered publisher may call
    pub fn push_trend_value(
        &mut self,
        id: &SourceId,
        caller: &AccountId,
        value: u64,
        now: i64,
    ) -> Result<()> {
        match self.source_mut(id)? {
            PriceSource::Trend(oracle) => {
                if oracle.publisher != *caller {
                    return Err(Error::Unauthorized(format!(
                        "account {} is not the trend publisher",
                        caller.short()
                    )));
                }
                oracle.value = Some(value);
                oracle.last_update = now;
                Ok(())
            }
            PriceSource::Confidence(_) => Err(Error::SourceMismatch {
                expected: "trend oracle".into(),
                got: format!("confidence feed {}", id.short()),
            }),
        }
    }

    /// Resolve the current quote of `id`, validated against the bounds.
    ///
    /// Rejects unknown sources, non-positive prices, quotes older than
    /// `max_staleness_secs`, and confidence intervals wider than
    /// `max_confidence_bps` of the price.
    pub fn resolve(&self, id: &SourceId, now: i64) -> Result<PriceQuote> {
        let quote = match self.source(id)? {
            PriceSource::Confidence(feed) => feed.latest.ok_or_else(|| Error::StalePrice {
                age: u64::MAX,
                max_age: self.config.max_staleness_secs,
            })?,
            PriceSource::Trend(oracle) => {
                let value = oracle.value.ok_or(Error::StalePrice {
                    age: u64::MAX,
                    max_age: self.config.max_staleness_secs,
                })?;
                PriceQuote {
                    price: i64::try_from(value).map_err(|_| Error::InvalidParameter {
                        name: "trend_value".into(),
                        reason: format!("{} exceeds i64 range", value),
                    })?,
                    confidence: 0,
                    exponent: TREND_FEED_EXPONENT,
                    publish_time: oracle.last_update,
                    source: *id,
                }
            }
        };

        quote.price_magnitude()?;
        if quote.exponent.unsigned_abs() > MAX_PRICE_EXPONENT_MAGNITUDE as u32 {
            return Err(Error::InvalidParameter {
                name: "exponent".into(),
                reason: format!("magnitude of {} exceeds cap", quote.exponent),
            });
        }

        let age = quote.age(now);
        if age > self.config.max_staleness_secs {
            warn!(source = %id.short(), age, "rejecting stale quote");
            return Err(Error::StalePrice {
                age,
                max_age: self.config.max_staleness_secs,
            });
        }

        let confidence_bps = quote.confidence_bps()?;
        if confidence_bps > self.config.max_confidence_bps {
            warn!(source = %id.short(), confidence_bps, "rejecting wide confidence interval");
            return Err(Error::LowConfidence {
                confidence_bps,
                max_bps: self.config.max_confidence_bps,
            });
        }

        Ok(quote)
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &SourceId) -> bool {
        self.sources.contains_key(id)
    }

    fn source(&self, id: &SourceId) -> Result<&PriceSource> {
        self.sources.get(id).ok_or_else(|| Error::SourceMismatch {
            expected: "registered price source".into(),
            got: id.short(),
        })
    }

    fn source_mut(&mut self, id: &SourceId) -> Result<&mut PriceSource> {
        self.sources
            .get_mut(id)
            .ok_or_else(|| Error::SourceMismatch {
                expected: "registered price source".into(),
                got: id.short(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn adapter_with_feed() -> (OracleAdapter, SourceId) {
        let mut adapter = OracleAdapter::new(OracleConfig::default());
        let id = SourceId::from_name("pyth:zbtc-usd");
        adapter.register_confidence_feed(id).unwrap();
        (adapter, id)
    }

    #[test]
    fn test_post_and_resolve() {
        let (mut adapter, id) = adapter_with_feed();
        adapter.post_update(&id, 9_700_000, 5_000, -5, NOW).unwrap();

        let quote = adapter.resolve(&id, NOW + 10).unwrap();
        assert_eq!(quote.price, 9_700_000);
        assert_eq!(quote.exponent, -5);
        assert_eq!(quote.source, id);
    }

    #[test]
    fn test_unknown_source() {
        let (adapter, _) = adapter_with_feed();
        let unknown = SourceId::from_name("nowhere");
        assert!(matches!(
            adapter.resolve(&unknown, NOW).unwrap_err(),
            Error::SourceMismatch { .. }
        ));
    }

    #[test]
    fn test_never_published_is_stale() {
        let (adapter, id) = adapter_with_feed();
        assert!(matches!(
            adapter.resolve(&id, NOW).unwrap_err(),
            Error::StalePrice { .. }
        ));
    }

    #[test]
    fn test_stale_quote_rejected() {
        let (mut adapter, id) = adapter_with_feed();
        adapter.post_update(&id, 100, 0, -2, NOW).unwrap();

        // At the bound is still acceptable
        assert!(adapter.resolve(&id, NOW + 300).is_ok());
        let err = adapter.resolve(&id, NOW + 301).unwrap_err();
        assert_eq!(
            err,
            Error::StalePrice {
                age: 301,
                max_age: 300
            }
        );
    }

    #[test]
    fn test_wide_confidence_rejected() {
        let (mut adapter, id) = adapter_with_feed();
        // conf 6 on price 100 = 6% > 5% bound
        adapter.post_update(&id, 100, 6, -2, NOW).unwrap();
        let err = adapter.resolve(&id, NOW).unwrap_err();
        assert_eq!(
            err,
            Error::LowConfidence {
                confidence_bps: 600,
                max_bps: 500
            }
        );

        // conf 5 = exactly 5% passes
        adapter.post_update(&id, 100, 5, -2, NOW).unwrap();
        assert!(adapter.resolve(&id, NOW).is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let (mut adapter, id) = adapter_with_feed();
        adapter.post_update(&id, 0, 0, -2, NOW).unwrap();
        assert!(adapter.resolve(&id, NOW).is_err());

        adapter.post_update(&id, -100, 0, -2, NOW).unwrap();
        assert!(adapter.resolve(&id, NOW).is_err());
    }

    #[test]
    fn test_trend_oracle_flow() {
        let mut adapter = OracleAdapter::new(OracleConfig::default());
        let id = SourceId::from_name("trend:sbtc");
        let publisher = AccountId::from_label("publisher");
        adapter.register_trend_oracle(id, publisher).unwrap();

        // Stranger cannot push
        let stranger = AccountId::from_label("stranger");
        assert!(matches!(
            adapter.push_trend_value(&id, &stranger, 9_850, NOW).unwrap_err(),
            Error::Unauthorized(_)
        ));

        adapter.push_trend_value(&id, &publisher, 9_850, NOW).unwrap();
        let quote = adapter.resolve(&id, NOW + 5).unwrap();
        assert_eq!(quote.price, 9_850);
        assert_eq!(quote.exponent, TREND_FEED_EXPONENT);
        assert_eq!(quote.confidence, 0);
        assert_eq!(quote.publish_time, NOW);
    }

    #[test]
    fn test_trend_value_goes_stale() {
        let mut adapter = OracleAdapter::new(OracleConfig::default());
        let id = SourceId::from_name("trend:sbtc");
        let publisher = AccountId::from_label("publisher");
        adapter.register_trend_oracle(id, publisher).unwrap();
        adapter.push_trend_value(&id, &publisher, 9_850, NOW).unwrap();

        assert!(matches!(
            adapter.resolve(&id, NOW + 600).unwrap_err(),
            Error::StalePrice { .. }
        ));
    }

    #[test]
    fn test_kind_mismatch() {
        let (mut adapter, feed_id) = adapter_with_feed();
        let publisher = AccountId::from_label("publisher");
        assert!(matches!(
            adapter
                .push_trend_value(&feed_id, &publisher, 100, NOW)
                .unwrap_err(),
            Error::SourceMismatch { .. }
        ));

        let trend_id = SourceId::from_name("trend:x");
        adapter.register_trend_oracle(trend_id, publisher).unwrap();
        assert!(matches!(
            adapter.post_update(&trend_id, 100, 0, -2, NOW).unwrap_err(),
            Error::SourceMismatch { .. }
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let (mut adapter, id) = adapter_with_feed();
        assert!(matches!(
            adapter.register_confidence_feed(id).unwrap_err(),
            Error::AlreadyInitialized(_)
        ));
    }
}
