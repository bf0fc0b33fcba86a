//! Error types for the sBTC swap engine.
//!
//! This module defines all error types used throughout the engine,
//! providing clear and actionable error messages. Every engine operation
//! either fully succeeds or fails with exactly one of these kinds; no
//! partial state change is ever observable.

use thiserror::Error;

/// Result type alias for swap-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the sBTC swap engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Request Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Requested amount is zero (or rounds to zero output)
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Invalid configuration parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Ledger Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A ledger already exists for this controlling authority
    #[error("Ledger already initialized for authority {0}")]
    AlreadyInitialized(String),

    /// No ledger exists for this controlling authority
    #[error("No ledger found for authority {0}")]
    LedgerNotFound(String),

    /// Caller is not permitted to perform this action
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Mint/burn rejected while the ledger is paused
    #[error("Ledger is paused")]
    Paused,

    /// Caller-side or treasury-side balance is insufficient
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the operation needs
        required: u64,
        /// Amount actually held
        available: u64,
    },

    /// Post-operation reserve value would fall below the collateral floor
    #[error("Undercollateralized: ratio {actual_bps} bps below minimum {required_bps} bps")]
    Undercollateralized {
        /// Post-operation collateralization ratio in basis points
        actual_bps: u64,
        /// Required minimum ratio in basis points
        required_bps: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Price quote is older than the staleness bound
    #[error("Price is stale: published {age}s ago, max allowed {max_age}s")]
    StalePrice {
        /// Seconds since the quote was published
        age: u64,
        /// Maximum allowed age in seconds
        max_age: u64,
    },

    /// Quote confidence interval is too wide relative to the price
    #[error("Price confidence too low: {confidence_bps} bps exceeds maximum {max_bps} bps")]
    LowConfidence {
        /// Relative confidence in basis points
        confidence_bps: u64,
        /// Maximum allowed relative confidence in basis points
        max_bps: u64,
    },

    /// Supplied price source does not match the ledger's authorized source
    #[error("Price source mismatch: expected {expected}, got {got}")]
    SourceMismatch {
        /// Authorized source recorded in the ledger
        expected: String,
        /// Source the caller supplied
        got: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Internal consistency failure (e.g. supply underflow) - always fatal
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Arithmetic overflow in a checked computation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if this error is recoverable by the caller
    /// (e.g. by retrying with a fresh price or a smaller amount)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientBalance { .. }
                | Error::Undercollateralized { .. }
                | Error::StalePrice { .. }
                | Error::LowConfidence { .. }
                | Error::Paused
        )
    }

    /// Returns true if this is a critical error signaling a bookkeeping bug
    pub fn is_critical(&self) -> bool {
        matches!(self, Error::InvariantViolation(_) | Error::Overflow { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors: 1xxx
            Error::InvalidAmount => 1001,
            Error::InvalidParameter { .. } => 1002,

            // Ledger errors: 2xxx
            Error::AlreadyInitialized(_) => 2001,
            Error::LedgerNotFound(_) => 2002,
            Error::Unauthorized(_) => 2003,
            Error::Paused => 2004,
            Error::InsufficientBalance { .. } => 2005,
            Error::Undercollateralized { .. } => 2006,

            // Oracle errors: 3xxx
            Error::StalePrice { .. } => 3001,
            Error::LowConfidence { .. } => 3002,
            Error::SourceMismatch { .. } => 3003,

            // Internal errors: 9xxx
            Error::InvariantViolation(_) => 9001,
            Error::Overflow { .. } => 9002,
            Error::Serialization(_) => 9003,
            Error::Deserialization(_) => 9004,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::InvalidAmount.code(),
            Error::InvalidParameter {
                name: "".into(),
                reason: "".into(),
            }
            .code(),
            Error::AlreadyInitialized("".into()).code(),
            Error::LedgerNotFound("".into()).code(),
            Error::Unauthorized("".into()).code(),
            Error::Paused.code(),
            Error::InsufficientBalance {
                required: 0,
                available: 0,
            }
            .code(),
            Error::Undercollateralized {
                actual_bps: 0,
                required_bps: 0,
            }
            .code(),
            Error::StalePrice { age: 0, max_age: 0 }.code(),
            Error::LowConfidence {
                confidence_bps: 0,
                max_bps: 0,
            }
            .code(),
            Error::SourceMismatch {
                expected: "".into(),
                got: "".into(),
            }
            .code(),
            Error::InvariantViolation("".into()).code(),
            Error::Overflow {
                operation: "".into(),
            }
            .code(),
        ];

        let mut unique = codes.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientBalance {
            required: 1000,
            available: 500,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::StalePrice { age: 90, max_age: 60 }.is_recoverable());
        assert!(Error::Paused.is_recoverable());
        assert!(!Error::InvariantViolation("supply underflow".into()).is_recoverable());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::InvariantViolation("test".into()).is_critical());
        assert!(Error::Overflow {
            operation: "test".into()
        }
        .is_critical());
        assert!(!Error::InvalidAmount.is_critical());
    }
}
