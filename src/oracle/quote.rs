//! Normalized price quotes.
//!
//! Every price entering the engine is reduced to a [`PriceQuote`]: a signed
//! fixed-point price (`price * 10^exponent`), a confidence interval in the
//! same scale, a publish timestamp, and the identity of the source that
//! produced it. Consumers never see raw feed formats.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::constants::BPS_DIVISOR;
use crate::utils::crypto::Hash;

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE IDENTITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a registered price source
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(Hash);

impl SourceId {
    /// Create from a raw 32-byte hash
    pub const fn new(hash: Hash) -> Self {
        Self(hash)
    }

    /// Deterministic source id from a feed name (e.g. `"pyth:zbtc-usd"`)
    pub fn from_name(name: &str) -> Self {
        Self(Hash::sha256(name.as_bytes()))
    }

    /// Underlying hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Short representation for display
    pub fn short(&self) -> String {
        self.0.short()
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.short())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE QUOTE
// ═══════════════════════════════════════════════════════════════════════════════

/// A normalized price observation: `price * 10^exponent` asset units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Signed fixed-point price mantissa
    pub price: i64,
    /// Confidence interval in the same fixed-point scale (0 = exact)
    pub confidence: u64,
    /// Power-of-ten exponent applied to `price` and `confidence`
    pub exponent: i32,
    /// Unix timestamp of publication
    pub publish_time: i64,
    /// Source that produced this quote
    pub source: SourceId,
}

impl PriceQuote {
    /// Price mantissa as unsigned magnitude; zero and negative prices are
    /// rejected because nothing can be valued against them
    pub fn price_magnitude(&self) -> Result<u64> {
        if self.price <= 0 {
            return Err(Error::InvalidParameter {
                name: "price".into(),
                reason: format!("non-positive price {}", self.price),
            });
        }
        Ok(self.price as u64)
    }

    /// Seconds elapsed since publication; a quote from the future has age 0
    pub fn age(&self, now: i64) -> u64 {
        now.saturating_sub(self.publish_time).max(0) as u64
    }

    /// Relative confidence interval in basis points of the price
    pub fn confidence_bps(&self) -> Result<u64> {
        let price = self.price_magnitude()?;
        let bps = (self.confidence as u128) * (BPS_DIVISOR as u128) / (price as u128);
        Ok(bps.min(u64::MAX as u128) as u64)
    }
}

impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}e{} ±{} @{}",
            self.price, self.exponent, self.confidence, self.publish_time
        )
    }
}
