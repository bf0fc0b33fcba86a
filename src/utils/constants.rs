//! Engine constants and magic numbers.
//!
//! All engine-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// BASIS POINT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10_000;

/// Fee rate upper bound, exclusive (a 100% fee is never valid)
pub const MAX_FEE_RATE_BPS: u64 = 10_000;

/// Collateralization floor: the minimum ratio may never be set below 100%
pub const MIN_COLLATERAL_FLOOR_BPS: u64 = 10_000;

/// Recommended deployment fee rate - 5% (the original deployment cap)
pub const RECOMMENDED_MAX_FEE_RATE_BPS: u64 = 500;

/// Recommended deployment collateral minimum - 200%
pub const RECOMMENDED_MIN_COLLATERAL_BPS: u64 = 20_000;

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default decimals for both the reserve and the synthetic asset
/// (minor units are satoshi-equivalents)
pub const DEFAULT_ASSET_DECIMALS: u8 = 8;

/// Minor units per whole asset at the default decimals
pub const UNITS_PER_ASSET: u64 = 100_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum price staleness in seconds (5 minutes)
pub const DEFAULT_MAX_PRICE_STALENESS_SECS: u64 = 300;

/// Maximum relative confidence interval - 5% of price
pub const DEFAULT_MAX_CONFIDENCE_BPS: u64 = 500;

/// Implicit power-of-ten exponent of trend-feed values (hundredths of a unit)
pub const TREND_FEED_EXPONENT: i32 = -2;

/// Largest tolerated price exponent magnitude; guards pow10 overflow on
/// malformed feed data
pub const MAX_PRICE_EXPONENT_MAGNITUDE: i32 = 38;

// ═══════════════════════════════════════════════════════════════════════════════
// AUTHORITY SEED TAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain-separation tag for the synthetic-asset mint authority
pub const MINT_AUTHORITY_SEED: &str = "mint_authority";

/// Domain-separation tag for the treasury vault authority
pub const TREASURY_AUTHORITY_SEED: &str = "treasury_authority";

/// Domain-separation tag for the fee vault authority
pub const FEE_AUTHORITY_SEED: &str = "fee_authority";

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of a hash / identity in bytes
pub const HASH_LENGTH: usize = 32;
