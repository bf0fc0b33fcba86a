//! Utility modules: constants, checked math, and hashing primitives.

pub mod constants;
pub mod crypto;
pub mod math;
