//! Seed-derived vault authorities.
//!
//! Each ledger controls its vaults through authorities derived from the
//! ledger's controlling account and a domain-separation seed tag. Nobody
//! holds a key for these identities; the engine reconstructs them from the
//! same inputs whenever it needs to sign for a vault, so authorization
//! reduces to identity equality.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::assets::AccountId;
use crate::utils::crypto::Hash;

/// A derived authority identity: `blake3::derive_key(seed_tag, owner_bytes)`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorityId(Hash);

impl AuthorityId {
    /// Derive the authority for `seed_tag` under `owner`.
    ///
    /// Deterministic: the same (tag, owner) pair always yields the same
    /// authority, and distinct tags yield unrelated identities.
    pub fn derive(seed_tag: &str, owner: &AccountId) -> Self {
        let key = blake3::derive_key(seed_tag, owner.as_bytes());
        Self(Hash::new(key))
    }

    /// Check that this authority is the one derived from (tag, owner)
    pub fn verify(&self, seed_tag: &str, owner: &AccountId) -> bool {
        *self == Self::derive(seed_tag, owner)
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

impl fmt::Debug for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorityId({})", self.short())
    }
}

impl fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{
        FEE_AUTHORITY_SEED, MINT_AUTHORITY_SEED, TREASURY_AUTHORITY_SEED,
    };

    #[test]
    fn test_derivation_deterministic() {
        let owner = AccountId::from_label("admin");
        let a = AuthorityId::derive(MINT_AUTHORITY_SEED, &owner);
        let b = AuthorityId::derive(MINT_AUTHORITY_SEED, &owner);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_seeds_distinct_authorities() {
        let owner = AccountId::from_label("admin");
        let mint = AuthorityId::derive(MINT_AUTHORITY_SEED, &owner);
        let treasury = AuthorityId::derive(TREASURY_AUTHORITY_SEED, &owner);
        let fee = AuthorityId::derive(FEE_AUTHORITY_SEED, &owner);

        assert_ne!(mint, treasury);
        assert_ne!(treasury, fee);
        assert_ne!(mint, fee);
    }

    #[test]
    fn test_distinct_owners_distinct_authorities() {
        let a = AuthorityId::derive(MINT_AUTHORITY_SEED, &AccountId::from_label("a"));
        let b = AuthorityId::derive(MINT_AUTHORITY_SEED, &AccountId::from_label("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify() {
        let owner = AccountId::from_label("admin");
        let other = AccountId::from_label("stranger");
        let auth = AuthorityId::derive(MINT_AUTHORITY_SEED, &owner);

        assert!(auth.verify(MINT_AUTHORITY_SEED, &owner));
        assert!(!auth.verify(TREASURY_AUTHORITY_SEED, &owner));
        assert!(!auth.verify(MINT_AUTHORITY_SEED, &other));
    }
}
