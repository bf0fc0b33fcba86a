//! Deposit reserve, mint synthetic.
//!
//! The fee comes off the deposit first; only the net amount earns synthetic.
//! Output is priced by the two oracle quotes (reserve value divided by
//! synthetic value, floored) and the post-mint state must clear the
//! collateralization floor counting the net deposit as part of the treasury.

use tracing::info;

use crate::core::assets::{AccountId, AssetIssuance, Signer, ValueTransfer};
use crate::engine::SwapEngine;
use crate::error::{Error, Result};
use crate::events::{MintReceipt, ProtocolEvent};
use crate::oracle::quote::SourceId;
use crate::utils::math;

impl<B: ValueTransfer + AssetIssuance> SwapEngine<B> {
    /// Deposit `amount` reserve minor units and mint synthetic to `caller`.
    ///
    /// `reserve_feed` and `synthetic_feed` must name the ledger's authorized
    /// sources; passing any other source is a `SourceMismatch`. All effects
    /// are validated before any balance moves, so an error leaves the bank
    /// and the ledger untouched.
    pub fn mint(
        &mut self,
        admin: &AccountId,
        caller: &AccountId,
        amount: u64,
        reserve_feed: &SourceId,
        synthetic_feed: &SourceId,
        now: i64,
    ) -> Result<MintReceipt> {
        let ledger = self.registry.get(admin)?;
        ledger.ensure_active()?;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        if *reserve_feed != ledger.reserve_source {
            return Err(Error::SourceMismatch {
                expected: ledger.reserve_source.short(),
                got: reserve_feed.short(),
            });
        }
        if *synthetic_feed != ledger.synthetic_source {
            return Err(Error::SourceMismatch {
                expected: ledger.synthetic_source.short(),
                got: synthetic_feed.short(),
            });
        }

        let reserve_quote = self.oracle.resolve(&ledger.reserve_source, now)?;
        let synthetic_quote = self.oracle.resolve(&ledger.synthetic_source, now)?;

        // Fee off the top, then price the remainder
        let fee = math::fee_amount(amount, ledger.fee_rate_bps)?;
        let net_deposit = math::safe_sub(amount, fee)?;
        let minted = math::convert_amount(
            net_deposit,
            reserve_quote.price_magnitude()?,
            reserve_quote.exponent,
            synthetic_quote.price_magnitude()?,
            synthetic_quote.exponent,
        )?;
        if minted == 0 {
            // Deposit too small to earn a single synthetic unit
            return Err(Error::InvalidAmount);
        }

        // Validate every effect against the hypothetical post-state
        let caller_balance = self.bank.balance_of(caller, &ledger.reserve_asset);
        if caller_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available: caller_balance,
            });
        }
        let new_outstanding = math::safe_add(ledger.outstanding_supply, minted)?;
        let new_fees = math::safe_add(ledger.total_fees_collected, fee)?;
        let treasury_balance = self
            .bank
            .balance_of(&ledger.treasury_vault, &ledger.reserve_asset);
        let new_treasury = math::safe_add(treasury_balance, net_deposit)?;
        ledger.check_collateralization(
            new_treasury,
            new_outstanding,
            &reserve_quote,
            &synthetic_quote,
        )?;

        // Apply
        let reserve_asset = ledger.reserve_asset;
        let synthetic_asset = ledger.synthetic_asset;
        let treasury_vault = ledger.treasury_vault;
        let fee_vault = ledger.fee_vault;
        let mint_authority = ledger.mint_authority;
        let signer = Signer::Account(*caller);

        self.bank
            .transfer(&reserve_asset, caller, &treasury_vault, net_deposit, &signer)?;
        if fee > 0 {
            self.bank
                .transfer(&reserve_asset, caller, &fee_vault, fee, &signer)?;
        }
        self.bank
            .mint_to(&synthetic_asset, caller, minted, &mint_authority)?;

        let ledger = self.registry.get_mut(admin)?;
        ledger.outstanding_supply = new_outstanding;
        ledger.total_fees_collected = new_fees;

        let receipt = MintReceipt {
            caller: *caller,
            deposited: amount,
            fee,
            net_deposit,
            minted,
            outstanding_supply: new_outstanding,
            reserve_quote,
            synthetic_quote,
            timestamp: now,
        };
        info!(
            caller = %caller.short(),
            deposited = amount,
            fee,
            minted,
            outstanding = new_outstanding,
            "mint"
        );
        self.events.record(ProtocolEvent::Minted(receipt));
        Ok(receipt)
    }
}
