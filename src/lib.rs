//! # sBTC Swap
//!
//! A collateralized synthetic-asset exchange engine. Users deposit a reserve
//! asset (zBTC) to mint a synthetic asset (sBTC) and burn sBTC to redeem zBTC,
//! at an exchange rate derived from two independent price sources.
//!
//! ## Architecture
//!
//! The engine consists of several core modules:
//!
//! - **Core**: the collateral ledger, vault authorities, and the asset bank
//!   abstraction the engine moves value through
//! - **Oracle**: normalization of a confidence-weighted feed and a trend feed
//!   into one price type, with staleness and confidence enforcement
//! - **Engine**: mint, burn, and administrative operations with all-or-nothing
//!   state changes
//!
//! ## Design Principles
//!
//! - Every operation either fully commits or fully fails with one named error
//! - All arithmetic is checked u128 multiply-before-divide; no floats in the
//!   money path
//! - Vault spending rights are gated by deterministically derived authorities,
//!   never by key possession
//!
//! ## Example
//!
//! ```rust,ignore
//! use sbtc_swap::prelude::*;
//!
//! let mut engine = SwapEngine::new(AssetBank::new(), OracleConfig::default());
//! engine.initialize(params, now)?;
//! let receipt = engine.mint(&admin, &caller, 100_000_000, &reserve_feed, &synthetic_feed, now)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod engine;
pub mod error;
pub mod events;
pub mod oracle;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        assets::{AccountId, AssetBank, AssetId, AssetIssuance, Signer, ValueTransfer},
        authority::AuthorityId,
        ledger::{CollateralLedger, LedgerRegistry},
    };
    pub use crate::engine::{admin::InitializeParams, service::SwapService, SwapEngine};
    pub use crate::error::{Error, Result};
    pub use crate::events::{BurnReceipt, MintReceipt, ProtocolEvent};
    pub use crate::oracle::{
        adapter::{OracleAdapter, OracleConfig, PriceSource},
        quote::{PriceQuote, SourceId},
    };
    pub use crate::utils::crypto::Hash;
}

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "sbtc-swap";
