//! Cryptographic utilities for the Places review service.
//!
//! Keccak-256 commitment hashing matching the on-chain review contract.

mod commitment;

pub use commitment::*;
