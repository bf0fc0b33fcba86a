//! Burn synthetic, redeem reserve.
//!
//! The burned amount is priced into a gross reserve value by the same oracle
//! ratio the mint path uses, just inverted. The fee is carved out of that
//! gross value: the treasury is debited the full gross, the caller receives
//! the net, and the fee lands in the fee vault. No collateral check runs
//! here; retiring debt at the current price cannot take a healthy ledger
//! below its floor, and an unhealthy one only improves.

use tracing::info;

use crate::core::assets::{AccountId, AssetIssuance, Signer, ValueTransfer};
use crate::engine::SwapEngine;
use crate::error::{Error, Result};
use crate::events::{BurnReceipt, ProtocolEvent};
use crate::oracle::quote::SourceId;
use crate::utils::math;

impl<B: ValueTransfer + AssetIssuance> SwapEngine<B> {
    /// Burn `amount` synthetic minor units from `caller` and pay out reserve.
    ///
    /// Fails with `InsufficientBalance` when the treasury cannot cover the
    /// gross redemption value, and with `InvariantViolation` if the burn
    /// would exceed recorded outstanding supply. All effects are validated
    /// before any balance moves.
    pub fn burn(
        &mut self,
        admin: &AccountId,
        caller: &AccountId,
        amount: u64,
        reserve_feed: &SourceId,
        synthetic_feed: &SourceId,
        now: i64,
    ) -> Result<BurnReceipt> {
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

        // Price the burn, then carve the fee out of the gross value
        let gross_reserve = math::convert_amount(
            amount,
            synthetic_quote.price_magnitude()?,
            synthetic_quote.exponent,
            reserve_quote.price_magnitude()?,
            reserve_quote.exponent,
        )?;
        if gross_reserve == 0 {
            // Burn too small to redeem a single reserve unit
            return Err(Error::InvalidAmount);
        }
        let fee = math::fee_amount(gross_reserve, ledger.fee_rate_bps)?;
        let net_reserve = math::safe_sub(gross_reserve, fee)?;

        // Validate every effect against the hypothetical post-state
        let caller_balance = self.bank.balance_of(caller, &ledger.synthetic_asset);
        if caller_balance < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available: caller_balance,
            });
        }
        let treasury_balance = self
            .bank
            .balance_of(&ledger.treasury_vault, &ledger.reserve_asset);
        if treasury_balance < gross_reserve {
            return Err(Error::InsufficientBalance {
                required: gross_reserve,
                available: treasury_balance,
            });
        }
        let new_outstanding = ledger
            .outstanding_supply
            .checked_sub(amount)
            .ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "burn of {} exceeds outstanding supply {}",
                    amount, ledger.outstanding_supply
                ))
            })?;
        let new_fees = math::safe_add(ledger.total_fees_collected, fee)?;

        // Apply
        let reserve_asset = ledger.reserve_asset;
        let synthetic_asset = ledger.synthetic_asset;
        let treasury_vault = ledger.treasury_vault;
        let fee_vault = ledger.fee_vault;
        let treasury_signer = Signer::Authority(ledger.treasury_authority);

        self.bank
            .burn_from(&synthetic_asset, caller, amount, &Signer::Account(*caller))?;
        self.bank.transfer(
            &reserve_asset,
            &treasury_vault,
            caller,
            net_reserve,
            &treasury_signer,
        )?;
        if fee > 0 {
            self.bank.transfer(
                &reserve_asset,
                &treasury_vault,
                &fee_vault,
                fee,
                &treasury_signer,
            )?;
        }

        let ledger = self.registry.get_mut(admin)?;
        ledger.outstanding_supply = new_outstanding;
        ledger.total_fees_collected = new_fees;

        let receipt = BurnReceipt {
            caller: *caller,
            burned: amount,
            gross_reserve,
            fee,
            net_reserve,
            outstanding_supply: new_outstanding,
            reserve_quote,
            synthetic_quote,
            timestamp: now,
        };
        info!(
            caller = %caller.short(),
            burned = amount,
            gross = gross_reserve,
            fee,
            paid_out = net_reserve,
            outstanding = new_outstanding,
            "burn"
        );
        self.events.record(ProtocolEvent::Burned(receipt));
        Ok(receipt)
    }
}
