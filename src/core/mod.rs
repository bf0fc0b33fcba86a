//! Core state: asset bank abstraction, vault authorities, and the
//! collateral ledger.

pub mod assets;
pub mod authority;
pub mod ledger;
