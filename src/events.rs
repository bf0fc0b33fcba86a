//! Operation receipts and the protocol event log.
//!
//! Every state-changing operation emits a [`ProtocolEvent`]. Mint and burn
//! return structured receipts to the caller and log the same data, so an
//! auditor can reconstruct every value movement from the event stream alone.

use serde::{Deserialize, Serialize};

use crate::core::assets::AccountId;
use crate::oracle::quote::{PriceQuote, SourceId};

/// Default cap on retained events before the oldest are pruned
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// RECEIPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of a successful mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Account that deposited reserve
    pub caller: AccountId,
    /// Reserve minor units deposited (gross)
    pub deposited: u64,
    /// Fee extracted from the deposit, in reserve minor units
    pub fee: u64,
    /// Deposit net of fee, credited to the treasury
    pub net_deposit: u64,
    /// Synthetic minor units minted to the caller
    pub minted: u64,
    /// Outstanding synthetic supply after the mint
    pub outstanding_supply: u64,
    /// Reserve quote the operation was priced with
    pub reserve_quote: PriceQuote,
    /// Synthetic quote the operation was priced with
    pub synthetic_quote: PriceQuote,
    /// Unix timestamp of the operation
    pub timestamp: i64,
}

/// Outcome of a successful burn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnReceipt {
    /// Account that burned synthetic
    pub caller: AccountId,
    /// Synthetic minor units burned
    pub burned: u64,
    /// Reserve value of the burn before the fee, debited from the treasury
    pub gross_reserve: u64,
    /// Fee retained from the gross redemption, in reserve minor units
    pub fee: u64,
    /// Reserve minor units paid out to the caller
    pub net_reserve: u64,
    /// Outstanding synthetic supply after the burn
    pub outstanding_supply: u64,
    /// Reserve quote the operation was priced with
    pub reserve_quote: PriceQuote,
    /// Synthetic quote the operation was priced with
    pub synthetic_quote: PriceQuote,
    /// Unix timestamp of the operation
    pub timestamp: i64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A state-changing operation, as recorded in the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// A ledger was initialized
    Initialized {
        /// Admin account the ledger is keyed by
        admin: AccountId,
        /// Initial fee rate in basis points
        fee_rate_bps: u64,
        /// Initial collateral minimum in basis points
        min_collateral_bps: u64,
        /// Unix timestamp of initialization
        timestamp: i64,
    },
    /// Reserve was deposited and synthetic minted
    Minted(MintReceipt),
    /// Synthetic was burned and reserve redeemed
    Burned(BurnReceipt),
    /// The pause flag was flipped
    PausedSet {
        /// Admin that changed the flag
        admin: AccountId,
        /// New flag value
        paused: bool,
        /// Unix timestamp of the change
        timestamp: i64,
    },
    /// The authorized price sources were replaced
    PriceSourcesUpdated {
        /// Admin that replaced the sources
        admin: AccountId,
        /// New reserve price source
        reserve_source: SourceId,
        /// New synthetic price source
        synthetic_source: SourceId,
        /// Unix timestamp of the change
        timestamp: i64,
    },
    /// Fee rate or collateral minimum changed
    FeeParamsUpdated {
        /// Admin that changed the parameters
        admin: AccountId,
        /// New fee rate in basis points
        fee_rate_bps: u64,
        /// New collateral minimum in basis points
        min_collateral_bps: u64,
        /// Unix timestamp of the change
        timestamp: i64,
    },
    /// Accumulated fees were withdrawn from the fee vault
    FeesWithdrawn {
        /// Admin that authorized the withdrawal
        admin: AccountId,
        /// Account the fees were paid to
        recipient: AccountId,
        /// Reserve minor units withdrawn
        amount: u64,
        /// Unix timestamp of the withdrawal
        timestamp: i64,
    },
}

impl ProtocolEvent {
    /// Short event kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProtocolEvent::Initialized { .. } => "initialized",
            ProtocolEvent::Minted(_) => "minted",
            ProtocolEvent::Burned(_) => "burned",
            ProtocolEvent::PausedSet { .. } => "paused_set",
            ProtocolEvent::PriceSourcesUpdated { .. } => "price_sources_updated",
            ProtocolEvent::FeeParamsUpdated { .. } => "fee_params_updated",
            ProtocolEvent::FeesWithdrawn { .. } => "fees_withdrawn",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounded in-memory event history; oldest entries are pruned past the cap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ProtocolEvent>,
    max_events: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }
}

impl EventLog {
    /// Create a log retaining at most `max_events` entries
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, pruning the oldest beyond the cap
    pub fn record(&mut self, event: ProtocolEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(0..excess);
        }
    }

    /// All retained events, oldest first
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
