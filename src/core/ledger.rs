//! Per-deployment collateral ledger.
//!
//! A [`CollateralLedger`] is the durable record of one reserve/synthetic
//! pair: parameters, vault identities, authorized price sources, and the
//! running supply and fee totals. The [`LedgerRegistry`] holds every ledger
//! the engine manages, keyed by the admin account that initialized it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::assets::{AccountId, AssetId};
use crate::core::authority::AuthorityId;
use crate::error::{Error, Result};
use crate::oracle::quote::{PriceQuote, SourceId};
use crate::utils::constants::{BPS_DIVISOR, MAX_FEE_RATE_BPS, MIN_COLLATERAL_FLOOR_BPS};
use crate::utils::math;

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// State of one reserve/synthetic deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralLedger {
    /// Admin account that initialized this ledger and may change parameters
    pub admin: AccountId,
    /// When paused, mint and burn are rejected
    pub paused: bool,
    /// Fee charged on mint and burn, in basis points
    pub fee_rate_bps: u64,
    /// Minimum collateralization ratio, in basis points
    pub min_collateral_bps: u64,

    /// Reserve asset held in the treasury (e.g. zBTC)
    pub reserve_asset: AssetId,
    /// Synthetic asset issued against it (e.g. sBTC)
    pub synthetic_asset: AssetId,
    /// Decimals of the reserve asset's minor unit
    pub reserve_decimals: u8,
    /// Decimals of the synthetic asset's minor unit
    pub synthetic_decimals: u8,

    /// Vault account holding deposited reserve
    pub treasury_vault: AccountId,
    /// Vault account accumulating extracted fees
    pub fee_vault: AccountId,
    /// Authority allowed to mint the synthetic asset
    pub mint_authority: AuthorityId,
    /// Authority controlling the treasury vault
    pub treasury_authority: AuthorityId,
    /// Authority controlling the fee vault
    pub fee_authority: AuthorityId,

    /// Authorized price source for the reserve asset
    pub reserve_source: SourceId,
    /// Authorized price source for the synthetic asset
    pub synthetic_source: SourceId,

    /// Synthetic minor units issued and not yet burned
    pub outstanding_supply: u64,
    /// Lifetime fees extracted, in reserve minor units
    pub total_fees_collected: u64,
    /// Unix timestamp of initialization
    pub created_at: i64,
}

impl CollateralLedger {
    /// Validate a fee rate: any value below 100% is accepted
    pub fn validate_fee_rate(fee_rate_bps: u64) -> Result<()> {
        if fee_rate_bps >= MAX_FEE_RATE_BPS {
            return Err(Error::InvalidParameter {
                name: "fee_rate_bps".into(),
                reason: format!("{} must be below {}", fee_rate_bps, MAX_FEE_RATE_BPS),
            });
        }
        Ok(())
    }

    /// Validate a collateral minimum: must be at least 100%
    pub fn validate_min_collateral(min_collateral_bps: u64) -> Result<()> {
        if min_collateral_bps < MIN_COLLATERAL_FLOOR_BPS {
            return Err(Error::InvalidParameter {
                name: "min_collateral_bps".into(),
                reason: format!(
                    "{} must be at least {}",
                    min_collateral_bps, MIN_COLLATERAL_FLOOR_BPS
                ),
            });
        }
        Ok(())
    }

    /// Reject the call if the ledger is paused
    pub fn ensure_active(&self) -> Result<()> {
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    /// Reject the call unless `caller` is the admin
    pub fn ensure_admin(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.admin {
            return Err(Error::Unauthorized(format!(
                "account {} is not the ledger admin",
                caller.short()
            )));
        }
        Ok(())
    }

    /// Check that `reserve_units` backing `outstanding` synthetic units stays
    /// at or above the collateral minimum, at the given prices.
    ///
    /// Uses exponent-aware cross multiplication in u128; no value is divided
    /// away before the comparison. Zero outstanding supply always passes.
    pub fn check_collateralization(
        &self,
        reserve_units: u64,
        outstanding: u64,
        reserve_quote: &PriceQuote,
        synthetic_quote: &PriceQuote,
    ) -> Result<()> {
        if outstanding == 0 {
            return Ok(());
        }

        let (reserve_side, debt_side) = math::collateral_sides(
            reserve_units,
            reserve_quote.price_magnitude()?,
            reserve_quote.exponent,
            outstanding as u128,
            synthetic_quote.price_magnitude()?,
            synthetic_quote.exponent,
        )?;

        let lhs = reserve_side
            .checked_mul(BPS_DIVISOR as u128)
            .ok_or(Error::Overflow {
                operation: "collateral check lhs".into(),
            })?;
        let rhs = debt_side
            .checked_mul(self.min_collateral_bps as u128)
            .ok_or(Error::Overflow {
                operation: "collateral check rhs".into(),
            })?;

        if lhs < rhs {
            let actual_bps = math::collateralization_bps(
                reserve_units,
                reserve_quote.price_magnitude()?,
                reserve_quote.exponent,
                outstanding as u128,
                synthetic_quote.price_magnitude()?,
                synthetic_quote.exponent,
            )?
            .unwrap_or(u64::MAX);
            return Err(Error::Undercollateralized {
                actual_bps,
                required_bps: self.min_collateral_bps,
            });
        }
        Ok(())
    }

    /// One-line human-readable summary for logs
    pub fn summary(&self) -> String {
        format!(
            "ledger[admin={} paused={} fee={}bps min_coll={}bps supply={} fees={}]",
            self.admin.short(),
            self.paused,
            self.fee_rate_bps,
            self.min_collateral_bps,
            self.outstanding_supply,
            self.total_fees_collected,
        )
    }

    /// Serialize to bytes for persistence
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// All ledgers managed by one engine, keyed by admin account.
///
/// One admin account initializes at most one ledger; re-initialization is an
/// `AlreadyInitialized` error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerRegistry {
    ledgers: HashMap<AccountId, CollateralLedger>,
}

impl LedgerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly initialized ledger
    pub fn insert(&mut self, ledger: CollateralLedger) -> Result<()> {
        if self.ledgers.contains_key(&ledger.admin) {
            return Err(Error::AlreadyInitialized(format!(
                "ledger for admin {} exists",
                ledger.admin.short()
            )));
        }
        self.ledgers.insert(ledger.admin, ledger);
        Ok(())
    }

    /// Look up the ledger initialized by `admin`
    pub fn get(&self, admin: &AccountId) -> Result<&CollateralLedger> {
        self.ledgers
            .get(admin)
            .ok_or_else(|| Error::LedgerNotFound(admin.short()))
    }

    /// Mutable lookup
    pub fn get_mut(&mut self, admin: &AccountId) -> Result<&mut CollateralLedger> {
        self.ledgers
            .get_mut(admin)
            .ok_or_else(|| Error::LedgerNotFound(admin.short()))
    }

    /// Whether a ledger exists for `admin`
    pub fn contains(&self, admin: &AccountId) -> bool {
        self.ledgers.contains_key(admin)
    }

    /// Number of ledgers
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    /// Iterate over all ledgers
    pub fn iter(&self) -> impl Iterator<Item = &CollateralLedger> {
        self.ledgers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{
        FEE_AUTHORITY_SEED, MINT_AUTHORITY_SEED, TREASURY_AUTHORITY_SEED,
    };

    fn sample_ledger() -> CollateralLedger {
        let admin = AccountId::from_label("admin");
        CollateralLedger {
            admin,
            paused: false,
            fee_rate_bps: 500,
            min_collateral_bps: 15_000,
            reserve_asset: AssetId::from_symbol("zBTC"),
            synthetic_asset: AssetId::from_symbol("sBTC"),
            reserve_decimals: 8,
            synthetic_decimals: 8,
            treasury_vault: AccountId::from_label("treasury"),
            fee_vault: AccountId::from_label("fees"),
            mint_authority: AuthorityId::derive(MINT_AUTHORITY_SEED, &admin),
            treasury_authority: AuthorityId::derive(TREASURY_AUTHORITY_SEED, &admin),
            fee_authority: AuthorityId::derive(FEE_AUTHORITY_SEED, &admin),
            reserve_source: SourceId::from_name("pyth:zbtc"),
            synthetic_source: SourceId::from_name("pyth:sbtc"),
            outstanding_supply: 0,
            total_fees_collected: 0,
            created_at: 1_700_000_000,
        }
    }

    fn quote(price: i64, exponent: i32) -> PriceQuote {
        PriceQuote {
            price,
            confidence: 0,
            exponent,
            publish_time: 1_700_000_000,
            source: SourceId::from_name("test"),
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert!(CollateralLedger::validate_fee_rate(0).is_ok());
        assert!(CollateralLedger::validate_fee_rate(9_999).is_ok());
        assert!(CollateralLedger::validate_fee_rate(10_000).is_err());

        assert!(CollateralLedger::validate_min_collateral(10_000).is_ok());
        assert!(CollateralLedger::validate_min_collateral(20_000).is_ok());
        assert!(CollateralLedger::validate_min_collateral(9_999).is_err());
    }

    #[test]
    fn test_ensure_active_and_admin() {
        let mut ledger = sample_ledger();
        assert!(ledger.ensure_active().is_ok());
        ledger.paused = true;
        assert_eq!(ledger.ensure_active().unwrap_err(), Error::Paused);

        assert!(ledger.ensure_admin(&ledger.admin.clone()).is_ok());
        let stranger = AccountId::from_label("stranger");
        assert!(matches!(
            ledger.ensure_admin(&stranger).unwrap_err(),
            Error::Unauthorized(_)
        ));
    }

    #[test]
    fn test_collateralization_passes_at_floor() {
        let ledger = sample_ledger();
        // 150% floor: 150 reserve backing 100 outstanding at equal prices
        assert!(ledger
            .check_collateralization(150, 100, &quote(100, -2), &quote(100, -2))
            .is_ok());
    }

    #[test]
    fn test_collateralization_fails_below_floor() {
        let ledger = sample_ledger();
        let err = ledger
            .check_collateralization(149, 100, &quote(100, -2), &quote(100, -2))
            .unwrap_err();
        match err {
            Error::Undercollateralized {
                actual_bps,
                required_bps,
            } => {
                assert_eq!(actual_bps, 14_900);
                assert_eq!(required_bps, 15_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collateralization_zero_outstanding_always_passes() {
        let ledger = sample_ledger();
        assert!(ledger
            .check_collateralization(0, 0, &quote(100, -2), &quote(100, -2))
            .is_ok());
    }

    #[test]
    fn test_collateralization_mixed_exponents() {
        let ledger = sample_ledger();
        // Same effective prices expressed at different exponents
        assert!(ledger
            .check_collateralization(150, 100, &quote(1_000, -3), &quote(100, -2))
            .is_ok());
        assert!(ledger
            .check_collateralization(149, 100, &quote(1_000, -3), &quote(100, -2))
            .is_err());
    }

    #[test]
    fn test_ledger_bincode_roundtrip() {
        let ledger = sample_ledger();
        let bytes = ledger.to_bytes().unwrap();
        let recovered = CollateralLedger::from_bytes(&bytes).unwrap();
        assert_eq!(ledger, recovered);
    }

    #[test]
    fn test_registry_insert_and_lookup() {
        let mut registry = LedgerRegistry::new();
        let ledger = sample_ledger();
        let admin = ledger.admin;

        registry.insert(ledger.clone()).unwrap();
        assert_eq!(registry.get(&admin).unwrap(), &ledger);
        assert_eq!(registry.len(), 1);

        let err = registry.insert(ledger).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));
    }

    #[test]
    fn test_registry_not_found() {
        let registry = LedgerRegistry::new();
        let admin = AccountId::from_label("nobody");
        assert!(matches!(
            registry.get(&admin).unwrap_err(),
            Error::LedgerNotFound(_)
        ));
    }
}
