//! Price infrastructure: normalized quotes and the adapter that validates
//! raw feed data before the engine prices anything with it.

pub mod adapter;
pub mod quote;
