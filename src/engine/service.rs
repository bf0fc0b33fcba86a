//! Shared-engine service facade.
//!
//! [`SwapService`] wraps the engine in `Arc<Mutex<_>>` so concurrent callers
//! observe a single serialized operation stream. This is also where wall
//! clock time enters: the engine itself only ever sees explicit timestamps,
//! which keeps every operation replayable in tests.

use chrono::Utc;
use std::sync::{Arc, Mutex};

use crate::core::assets::{AccountId, AssetBank, AssetId, AssetIssuance, ValueTransfer};
use crate::core::ledger::CollateralLedger;
use crate::engine::admin::InitializeParams;
use crate::engine::SwapEngine;
use crate::error::{Error, Result};
use crate::events::{BurnReceipt, MintReceipt, ProtocolEvent};
use crate::oracle::adapter::OracleConfig;
use crate::oracle::quote::SourceId;

/// Clonable handle to a shared swap engine
#[derive(Debug)]
pub struct SwapService<B = AssetBank> {
    engine: Arc<Mutex<SwapEngine<B>>>,
}

impl<B> Clone for SwapService<B> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl SwapService<AssetBank> {
    /// Service over a fresh in-memory bank
    pub fn in_memory(oracle_config: OracleConfig) -> Self {
        Self::new(SwapEngine::new(AssetBank::new(), oracle_config))
    }
}

impl<B: ValueTransfer + AssetIssuance> SwapService<B> {
    /// Wrap an existing engine
    pub fn new(engine: SwapEngine<B>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` under the engine lock
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut SwapEngine<B>) -> T) -> Result<T> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| Error::InvariantViolation("engine mutex poisoned".into()))?;
        Ok(f(&mut engine))
    }

    /// Initialize a ledger, stamped with the current time
    pub fn initialize(&self, params: InitializeParams) -> Result<CollateralLedger> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| engine.initialize(params, now))?
    }

    /// Deposit reserve and mint synthetic
    pub fn mint(
        &self,
        admin: &AccountId,
        caller: &AccountId,
        amount: u64,
        reserve_feed: &SourceId,
        synthetic_feed: &SourceId,
    ) -> Result<MintReceipt> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| {
            engine.mint(admin, caller, amount, reserve_feed, synthetic_feed, now)
        })?
    }

    /// Burn synthetic and redeem reserve
    pub fn burn(
        &self,
        admin: &AccountId,
        caller: &AccountId,
        amount: u64,
        reserve_feed: &SourceId,
        synthetic_feed: &SourceId,
    ) -> Result<BurnReceipt> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| {
            engine.burn(admin, caller, amount, reserve_feed, synthetic_feed, now)
        })?
    }

    /// Pause or unpause; admin only
    pub fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<()> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| engine.set_paused(caller, paused, now))?
    }

    /// Replace the authorized price sources; admin only
    pub fn update_price_sources(
        &self,
        caller: &AccountId,
        reserve_source: SourceId,
        synthetic_source: SourceId,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| {
            engine.update_price_sources(caller, reserve_source, synthetic_source, now)
        })?
    }

    /// Change fee rate and collateral minimum; admin only
    pub fn update_fee_parameters(
        &self,
        caller: &AccountId,
        fee_rate_bps: u64,
        min_collateral_bps: u64,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| {
            engine.update_fee_parameters(caller, fee_rate_bps, min_collateral_bps, now)
        })?
    }

    /// Withdraw accumulated fees; admin only
    pub fn withdraw_fees(
        &self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: u64,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| engine.withdraw_fees(caller, recipient, amount, now))?
    }

    /// Current collateralization ratio in basis points; `None` when nothing
    /// is outstanding
    pub fn collateralization_bps(&self, admin: &AccountId) -> Result<Option<u64>> {
        let now = Utc::now().timestamp();
        self.with_engine(|engine| engine.collateralization_bps(admin, now))?
    }

    /// Balance of `account` in `asset`
    pub fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Result<u64> {
        self.with_engine(|engine| engine.bank().balance_of(account, asset))
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Result<Vec<ProtocolEvent>> {
        self.with_engine(|engine| engine.events().to_vec())
    }
}
