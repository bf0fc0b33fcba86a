//! The swap engine: mint, burn, and administration over a generic asset
//! backend.
//!
//! [`SwapEngine`] owns the ledger registry, the oracle adapter, the asset
//! backend, and the event log. Operations follow a validate-then-apply
//! discipline: every balance, supply, and collateralization effect is checked
//! against the hypothetical post-state before any mutation happens, so a
//! failed operation leaves no partial writes behind.

pub mod admin;
pub mod burn;
pub mod mint;
pub mod service;

use crate::core::assets::{AccountId, AssetIssuance, ValueTransfer};
use crate::core::ledger::LedgerRegistry;
use crate::error::Result;
use crate::events::{EventLog, ProtocolEvent};
use crate::oracle::adapter::{OracleAdapter, OracleConfig};
use crate::utils::math;

/// Collateralized swap engine over an asset backend `B`
#[derive(Debug)]
pub struct SwapEngine<B> {
    registry: LedgerRegistry,
    oracle: OracleAdapter,
    bank: B,
    events: EventLog,
}

impl<B: ValueTransfer + AssetIssuance> SwapEngine<B> {
    /// Create an engine over `bank` with the given oracle bounds
    pub fn new(bank: B, oracle_config: OracleConfig) -> Self {
        Self {
            registry: LedgerRegistry::new(),
            oracle: OracleAdapter::new(oracle_config),
            bank,
            events: EventLog::default(),
        }
    }

    /// Ledger registry (read-only)
    pub fn registry(&self) -> &LedgerRegistry {
        &self.registry
    }

    /// Oracle adapter (read-only)
    pub fn oracle(&self) -> &OracleAdapter {
        &self.oracle
    }

    /// Oracle adapter, for source registration and updates
    pub fn oracle_mut(&mut self) -> &mut OracleAdapter {
        &mut self.oracle
    }

    /// Asset backend (read-only)
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Asset backend, for deposits and fixtures
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Recorded protocol events, oldest first
    pub fn events(&self) -> &[ProtocolEvent] {
        self.events.events()
    }

    /// Current collateralization ratio of the ledger under `admin`, in basis
    /// points; `None` when no synthetic is outstanding.
    pub fn collateralization_bps(&self, admin: &AccountId, now: i64) -> Result<Option<u64>> {
        let ledger = self.registry.get(admin)?;
        let reserve_quote = self.oracle.resolve(&ledger.reserve_source, now)?;
        let synthetic_quote = self.oracle.resolve(&ledger.synthetic_source, now)?;
        let treasury_balance = self
            .bank
            .balance_of(&ledger.treasury_vault, &ledger.reserve_asset);

        math::collateralization_bps(
            treasury_balance,
            reserve_quote.price_magnitude()?,
            reserve_quote.exponent,
            ledger.outstanding_supply as u128,
            synthetic_quote.price_magnitude()?,
            synthetic_quote.exponent,
        )
    }
}
