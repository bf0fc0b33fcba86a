//! Initialization and admin operations.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::assets::{AccountId, AssetId, AssetIssuance, Signer, ValueTransfer};
use crate::core::authority::AuthorityId;
use crate::core::ledger::CollateralLedger;
use crate::engine::SwapEngine;
use crate::error::{Error, Result};
use crate::events::ProtocolEvent;
use crate::oracle::quote::SourceId;
use crate::utils::constants::{
    FEE_AUTHORITY_SEED, MINT_AUTHORITY_SEED, TREASURY_AUTHORITY_SEED,
};
use crate::utils::crypto::tagged_hash;

/// Parameters for initializing a new ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeParams {
    /// Admin account; also the registry key of the new ledger
    pub admin: AccountId,
    /// Reserve asset accepted as collateral
    pub reserve_asset: AssetId,
    /// Synthetic asset to issue
    pub synthetic_asset: AssetId,
    /// Decimals of the reserve asset's minor unit
    pub reserve_decimals: u8,
    /// Decimals of the synthetic asset's minor unit
    pub synthetic_decimals: u8,
    /// Fee on mint and burn, basis points
    pub fee_rate_bps: u64,
    /// Collateralization minimum, basis points
    pub min_collateral_bps: u64,
    /// Authorized price source for the reserve asset
    pub reserve_source: SourceId,
    /// Authorized price source for the synthetic asset
    pub synthetic_source: SourceId,
}

impl<B: ValueTransfer + AssetIssuance> SwapEngine<B> {
    /// Initialize a new ledger: validate parameters, derive the vault
    /// authorities and vault accounts from the admin identity, wire them into
    /// the backend, and record the ledger.
    ///
    /// Both price sources must already be registered with the oracle adapter.
    pub fn initialize(&mut self, params: InitializeParams, now: i64) -> Result<CollateralLedger> {
        CollateralLedger::validate_fee_rate(params.fee_rate_bps)?;
        CollateralLedger::validate_min_collateral(params.min_collateral_bps)?;
        if params.reserve_asset == params.synthetic_asset {
            return Err(Error::InvalidParameter {
                name: "synthetic_asset".into(),
                reason: "reserve and synthetic asset must differ".into(),
            });
        }
        for (name, source) in [
            ("reserve_source", &params.reserve_source),
            ("synthetic_source", &params.synthetic_source),
        ] {
            if !self.oracle.contains(source) {
                return Err(Error::InvalidParameter {
                    name: name.into(),
                    reason: format!("price source {} is not registered", source.short()),
                });
            }
        }
        if self.registry.contains(&params.admin) {
            return Err(Error::AlreadyInitialized(format!(
                "ledger for admin {} exists",
                params.admin.short()
            )));
        }

        let mint_authority = AuthorityId::derive(MINT_AUTHORITY_SEED, &params.admin);
        let treasury_authority = AuthorityId::derive(TREASURY_AUTHORITY_SEED, &params.admin);
        let fee_authority = AuthorityId::derive(FEE_AUTHORITY_SEED, &params.admin);
        let treasury_vault =
            AccountId::new(tagged_hash("treasury_vault", params.admin.as_bytes()));
        let fee_vault = AccountId::new(tagged_hash("fee_vault", params.admin.as_bytes()));

        self.bank.register_vault(treasury_vault, treasury_authority);
        self.bank.register_vault(fee_vault, fee_authority);
        self.bank
            .set_mint_authority(params.synthetic_asset, mint_authority);

        let ledger = CollateralLedger {
            admin: params.admin,
            paused: false,
            fee_rate_bps: params.fee_rate_bps,
            min_collateral_bps: params.min_collateral_bps,
            reserve_asset: params.reserve_asset,
            synthetic_asset: params.synthetic_asset,
            reserve_decimals: params.reserve_decimals,
            synthetic_decimals: params.synthetic_decimals,
            treasury_vault,
            fee_vault,
            mint_authority,
            treasury_authority,
            fee_authority,
            reserve_source: params.reserve_source,
            synthetic_source: params.synthetic_source,
            outstanding_supply: 0,
            total_fees_collected: 0,
            created_at: now,
        };
        self.registry.insert(ledger.clone())?;

        info!(ledger = %ledger.summary(), "initialized ledger");
        self.events.record(ProtocolEvent::Initialized {
            admin: params.admin,
            fee_rate_bps: params.fee_rate_bps,
            min_collateral_bps: params.min_collateral_bps,
            timestamp: now,
        });
        Ok(ledger)
    }

    /// Pause or unpause the ledger; admin only, idempotent
    pub fn set_paused(&mut self, caller: &AccountId, paused: bool, now: i64) -> Result<()> {
        let ledger = self.registry.get_mut(caller)?;
        ledger.ensure_admin(caller)?;
        ledger.paused = paused;

        info!(admin = %caller.short(), paused, "pause flag updated");
        self.events.record(ProtocolEvent::PausedSet {
            admin: *caller,
            paused,
            timestamp: now,
        });
        Ok(())
    }

    /// Replace the authorized price sources; admin only.
    /// Both new sources must be registered with the oracle adapter.
    pub fn update_price_sources(
        &mut self,
        caller: &AccountId,
        reserve_source: SourceId,
        synthetic_source: SourceId,
        now: i64,
    ) -> Result<()> {
        for (name, source) in [
            ("reserve_source", &reserve_source),
            ("synthetic_source", &synthetic_source),
        ] {
            if !self.oracle.contains(source) {
                return Err(Error::InvalidParameter {
                    name: name.into(),
                    reason: format!("price source {} is not registered", source.short()),
                });
            }
        }

        let ledger = self.registry.get_mut(caller)?;
        ledger.ensure_admin(caller)?;
        ledger.reserve_source = reserve_source;
        ledger.synthetic_source = synthetic_source;

        info!(admin = %caller.short(), "price sources updated");
        self.events.record(ProtocolEvent::PriceSourcesUpdated {
            admin: *caller,
            reserve_source,
            synthetic_source,
            timestamp: now,
        });
        Ok(())
    }

    /// Change the fee rate and collateral minimum; admin only.
    /// Applies to future operations; existing positions are not re-checked.
    pub fn update_fee_parameters(
        &mut self,
        caller: &AccountId,
        fee_rate_bps: u64,
        min_collateral_bps: u64,
        now: i64,
    ) -> Result<()> {
        CollateralLedger::validate_fee_rate(fee_rate_bps)?;
        CollateralLedger::validate_min_collateral(min_collateral_bps)?;

        let ledger = self.registry.get_mut(caller)?;
        ledger.ensure_admin(caller)?;
        ledger.fee_rate_bps = fee_rate_bps;
        ledger.min_collateral_bps = min_collateral_bps;

        info!(
            admin = %caller.short(),
            fee_rate_bps,
            min_collateral_bps,
            "fee parameters updated"
        );
        self.events.record(ProtocolEvent::FeeParamsUpdated {
            admin: *caller,
            fee_rate_bps,
            min_collateral_bps,
            timestamp: now,
        });
        Ok(())
    }

    /// Move `amount` of accumulated fees from the fee vault to `recipient`;
    /// admin only. The fee vault never backs outstanding synthetic, so no
    /// collateral check applies.
    pub fn withdraw_fees(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: u64,
        now: i64,
    ) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        let ledger = self.registry.get(caller)?;
        ledger.ensure_admin(caller)?;
        let reserve_asset = ledger.reserve_asset;
        let fee_vault = ledger.fee_vault;
        let fee_authority = ledger.fee_authority;

        let available = self.bank.balance_of(&fee_vault, &reserve_asset);
        if available < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }

        self.bank.transfer(
            &reserve_asset,
            &fee_vault,
            recipient,
            amount,
            &Signer::Authority(fee_authority),
        )?;

        info!(admin = %caller.short(), amount, recipient = %recipient.short(), "fees withdrawn");
        self.events.record(ProtocolEvent::FeesWithdrawn {
            admin: *caller,
            recipient: *recipient,
            amount,
            timestamp: now,
        });
        Ok(())
    }
}
