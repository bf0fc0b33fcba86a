//! Asset identities and the value-transfer capability.
//!
//! The engine does not implement token transfer mechanics; it invokes them
//! through the [`ValueTransfer`] and [`AssetIssuance`] traits defined here.
//! [`AssetBank`] is the in-memory reference implementation used by tests and
//! embedders that have no external ledger: balances per (account, asset),
//! per-account controllers, and per-asset mint authorities.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::authority::AuthorityId;
use crate::error::{Error, Result};
use crate::utils::crypto::Hash;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of an account holding asset balances
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(Hash);

impl AccountId {
    /// Create from a raw 32-byte hash
    pub const fn new(hash: Hash) -> Self {
        Self(hash)
    }

    /// Deterministic account id from a label (useful for fixtures and vaults)
    pub fn from_label(label: &str) -> Self {
        Self(Hash::sha256(label.as_bytes()))
    }

    /// Generate a random account id
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(Hash::new(bytes))
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

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an asset type (e.g. zBTC, sBTC)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(Hash);

impl AssetId {
    /// Create from a raw 32-byte hash
    pub const fn new(hash: Hash) -> Self {
        Self(hash)
    }

    /// Deterministic asset id from a ticker symbol
    pub fn from_symbol(symbol: &str) -> Self {
        Self(Hash::sha256(symbol.as_bytes()))
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

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.short())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIGNERS
// ═══════════════════════════════════════════════════════════════════════════════

/// The identity authorizing an outbound movement of funds: either the account
/// owner themselves, or a derived vault authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signer {
    /// The account's own holder
    Account(AccountId),
    /// A seed-derived vault authority
    Authority(AuthorityId),
}

impl fmt::Display for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signer::Account(id) => write!(f, "account:{}", id.short()),
            Signer::Authority(id) => write!(f, "authority:{}", id.short()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Value-transfer capability the engine invokes but does not implement
pub trait ValueTransfer {
    /// Balance of `account` in `asset` minor units
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> u64;

    /// Register `account` as a vault whose funds only `authority` can move
    fn register_vault(&mut self, account: AccountId, authority: AuthorityId);

    /// Move `amount` of `asset` from one account to another, authorized by
    /// `authority`. Fails with `InsufficientBalance` or `Unauthorized`.
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
        authority: &Signer,
    ) -> Result<()>;
}

/// Issuance capability for the synthetic asset
pub trait AssetIssuance {
    /// Set the authority allowed to mint `asset`
    fn set_mint_authority(&mut self, asset: AssetId, authority: AuthorityId);

    /// Live issued supply of `asset`
    fn supply_of(&self, asset: &AssetId) -> u64;

    /// Mint `amount` of `asset` to `to`, authorized by the asset's mint authority
    fn mint_to(
        &mut self,
        asset: &AssetId,
        to: &AccountId,
        amount: u64,
        authority: &AuthorityId,
    ) -> Result<()>;

    /// Burn `amount` of `asset` from `from`, authorized by the holder or the
    /// account's controlling authority
    fn burn_from(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        amount: u64,
        authority: &Signer,
    ) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET BANK
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory implementation of the transfer and issuance capabilities.
///
/// Accounts are self-controlled by default; vault accounts are registered
/// with a derived authority as their controller, so only the engine (which
/// knows the derivation) can move funds out of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetBank {
    /// Balances by (account, asset)
    balances: HashMap<(AccountId, AssetId), u64>,
    /// Controllers for accounts not controlled by their own holder
    controllers: HashMap<AccountId, Signer>,
    /// Mint authority per asset
    mint_authorities: HashMap<AssetId, AuthorityId>,
    /// Live issued supply per asset
    supplies: HashMap<AssetId, u64>,
}

impl AssetBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account without authorization checks. Setup/faucet only:
    /// this models an external deposit arriving from outside the engine.
    pub fn credit(&mut self, account: &AccountId, asset: &AssetId, amount: u64) -> Result<()> {
        let entry = self.balances.entry((*account, *asset)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(Error::Overflow {
            operation: "credit balance".into(),
        })?;
        Ok(())
    }

    /// The controller that must authorize outbound movement from `account`
    fn controller_of(&self, account: &AccountId) -> Signer {
        self.controllers
            .get(account)
            .copied()
            .unwrap_or(Signer::Account(*account))
    }

    fn debit(&mut self, account: &AccountId, asset: &AssetId, amount: u64) -> Result<()> {
        let available = self.balance_of(account, asset);
        if available < amount {
            return Err(Error::InsufficientBalance {
                required: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&(*account, *asset));
        } else {
            self.balances.insert((*account, *asset), remaining);
        }
        Ok(())
    }

    fn authorize(&self, account: &AccountId, authority: &Signer) -> Result<()> {
        let controller = self.controller_of(account);
        if controller != *authority {
            return Err(Error::Unauthorized(format!(
                "{} cannot move funds of {}",
                authority,
                account.short()
            )));
        }
        Ok(())
    }
}

impl ValueTransfer for AssetBank {
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> u64 {
        self.balances.get(&(*account, *asset)).copied().unwrap_or(0)
    }

    fn register_vault(&mut self, account: AccountId, authority: AuthorityId) {
        self.controllers.insert(account, Signer::Authority(authority));
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
        authority: &Signer,
    ) -> Result<()> {
        self.authorize(from, authority)?;
        if amount == 0 || from == to {
            return Ok(());
        }

        self.debit(from, asset, amount)?;
        // Restore the debit if the recipient balance would overflow
        let to_balance = self.balance_of(to, asset);
        match to_balance.checked_add(amount) {
            Some(new_balance) => {
                self.balances.insert((*to, *asset), new_balance);
                Ok(())
            }
            None => {
                self.credit(from, asset, amount)?;
                Err(Error::Overflow {
                    operation: "transfer recipient balance".into(),
                })
            }
        }
    }
}

impl AssetIssuance for AssetBank {
    fn set_mint_authority(&mut self, asset: AssetId, authority: AuthorityId) {
        self.mint_authorities.insert(asset, authority);
    }

    fn supply_of(&self, asset: &AssetId) -> u64 {
        self.supplies.get(asset).copied().unwrap_or(0)
    }

    fn mint_to(
        &mut self,
        asset: &AssetId,
        to: &AccountId,
        amount: u64,
        authority: &AuthorityId,
    ) -> Result<()> {
        match self.mint_authorities.get(asset) {
            Some(expected) if expected == authority => {}
            Some(_) | None => {
                return Err(Error::Unauthorized(format!(
                    "authority:{} is not the mint authority of {}",
                    authority.short(),
                    asset.short()
                )));
            }
        }

        // Validate both additions before applying either
        let new_supply = self
            .supply_of(asset)
            .checked_add(amount)
            .ok_or(Error::Overflow {
                operation: "mint supply".into(),
            })?;
        let new_balance = self
            .balance_of(to, asset)
            .checked_add(amount)
            .ok_or(Error::Overflow {
                operation: "mint balance".into(),
            })?;

        self.supplies.insert(*asset, new_supply);
        self.balances.insert((*to, *asset), new_balance);
        Ok(())
    }

    fn burn_from(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        amount: u64,
        authority: &Signer,
    ) -> Result<()> {
        self.authorize(from, authority)?;

        // Validate the supply reduction before debiting any balance
        let new_supply = self.supply_of(asset).checked_sub(amount).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "burn of {} exceeds issued supply of {}",
                amount,
                asset.short()
            ))
        })?;

        self.debit(from, asset, amount)?;
        if new_supply == 0 {
            self.supplies.remove(asset);
        } else {
            self.supplies.insert(*asset, new_supply);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::MINT_AUTHORITY_SEED;

    fn setup() -> (AssetBank, AccountId, AccountId, AssetId) {
        let bank = AssetBank::new();
        let alice = AccountId::from_label("alice");
        let bob = AccountId::from_label("bob");
        let zbtc = AssetId::from_symbol("zBTC");
        (bank, alice, bob, zbtc)
    }

    #[test]
    fn test_credit_and_balance() {
        let (mut bank, alice, _, zbtc) = setup();
        bank.credit(&alice, &zbtc, 1_000).unwrap();
        assert_eq!(bank.balance_of(&alice, &zbtc), 1_000);
    }

    #[test]
    fn test_transfer_by_holder() {
        let (mut bank, alice, bob, zbtc) = setup();
        bank.credit(&alice, &zbtc, 1_000).unwrap();

        bank.transfer(&zbtc, &alice, &bob, 400, &Signer::Account(alice))
            .unwrap();
        assert_eq!(bank.balance_of(&alice, &zbtc), 600);
        assert_eq!(bank.balance_of(&bob, &zbtc), 400);
    }

    #[test]
    fn test_transfer_unauthorized() {
        let (mut bank, alice, bob, zbtc) = setup();
        bank.credit(&alice, &zbtc, 1_000).unwrap();

        let err = bank
            .transfer(&zbtc, &alice, &bob, 400, &Signer::Account(bob))
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
        assert_eq!(bank.balance_of(&alice, &zbtc), 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut bank, alice, bob, zbtc) = setup();
        bank.credit(&alice, &zbtc, 100).unwrap();

        let err = bank
            .transfer(&zbtc, &alice, &bob, 400, &Signer::Account(alice))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientBalance {
                required: 400,
                available: 100
            }
        );
    }

    #[test]
    fn test_vault_gated_by_authority() {
        let (mut bank, alice, _, zbtc) = setup();
        let vault = AccountId::from_label("treasury_vault");
        let authority = AuthorityId::derive(MINT_AUTHORITY_SEED, &alice);
        bank.register_vault(vault, authority);
        bank.credit(&vault, &zbtc, 1_000).unwrap();

        // The vault account id itself cannot sign
        assert!(bank
            .transfer(&zbtc, &vault, &alice, 100, &Signer::Account(vault))
            .is_err());

        // The derived authority can
        bank.transfer(&zbtc, &vault, &alice, 100, &Signer::Authority(authority))
            .unwrap();
        assert_eq!(bank.balance_of(&alice, &zbtc), 100);
    }

    #[test]
    fn test_mint_and_burn_track_supply() {
        let (mut bank, alice, _, _) = setup();
        let sbtc = AssetId::from_symbol("sBTC");
        let mint_auth = AuthorityId::derive(MINT_AUTHORITY_SEED, &alice);
        bank.set_mint_authority(sbtc, mint_auth);

        bank.mint_to(&sbtc, &alice, 500, &mint_auth).unwrap();
        assert_eq!(bank.supply_of(&sbtc), 500);
        assert_eq!(bank.balance_of(&alice, &sbtc), 500);

        bank.burn_from(&sbtc, &alice, 200, &Signer::Account(alice))
            .unwrap();
        assert_eq!(bank.supply_of(&sbtc), 300);
        assert_eq!(bank.balance_of(&alice, &sbtc), 300);
    }

    #[test]
    fn test_mint_requires_authority() {
        let (mut bank, alice, _, _) = setup();
        let sbtc = AssetId::from_symbol("sBTC");
        let mint_auth = AuthorityId::derive(MINT_AUTHORITY_SEED, &alice);
        let wrong = AuthorityId::derive("something_else", &alice);
        bank.set_mint_authority(sbtc, mint_auth);

        assert!(bank.mint_to(&sbtc, &alice, 500, &wrong).is_err());
        assert_eq!(bank.supply_of(&sbtc), 0);
    }

    #[test]
    fn test_burn_insufficient_balance() {
        let (mut bank, alice, bob, _) = setup();
        let sbtc = AssetId::from_symbol("sBTC");
        let mint_auth = AuthorityId::derive(MINT_AUTHORITY_SEED, &alice);
        bank.set_mint_authority(sbtc, mint_auth);
        bank.mint_to(&sbtc, &alice, 500, &mint_auth).unwrap();
        bank.transfer(&sbtc, &alice, &bob, 400, &Signer::Account(alice))
            .unwrap();

        // Supply covers the burn but alice's balance does not
        let err = bank
            .burn_from(&sbtc, &alice, 200, &Signer::Account(alice))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientBalance {
                required: 200,
                available: 100
            }
        );
        assert_eq!(bank.supply_of(&sbtc), 500);
    }

    #[test]
    fn test_burn_beyond_supply_is_invariant_violation() {
        let (mut bank, alice, _, _) = setup();
        let sbtc = AssetId::from_symbol("sBTC");
        // Balance credited outside issuance, so supply stays zero
        bank.credit(&alice, &sbtc, 100).unwrap();

        let err = bank
            .burn_from(&sbtc, &alice, 50, &Signer::Account(alice))
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_account_id_deterministic() {
        assert_eq!(AccountId::from_label("x"), AccountId::from_label("x"));
        assert_ne!(AccountId::from_label("x"), AccountId::from_label("y"));
        assert_ne!(AccountId::random(), AccountId::random());
    }
}
