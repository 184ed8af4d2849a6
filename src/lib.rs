//! Places Review Service
//!
//! Backend for a barcode product-review mini app. Reviews are accepted only
//! after their on-chain commitment event has been independently verified.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (submissions, reviews, products)
//! - [`crypto`] - Keccak-256 commitment hashing matching the review contract
//! - [`chain`] - Receipt fetching and transaction status lookups
//! - [`verify`] - The review commitment verifier
//! - [`infra`] - SQLite review store and infrastructure errors
//! - [`lookup`] - External barcode product lookup
//! - [`api`] - REST API routes and error codes

pub mod api;
pub mod chain;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod lookup;
pub mod migrations;
pub mod server;
pub mod verify;

// Re-export commonly used types
pub use domain::{
    PersistedReview, Product, ReviewSubmission, VerifiedReview, MAX_STARS, MIN_STARS,
    RATING_SCALE, REVIEW_PLACEHOLDER,
};

pub use chain::{ReceiptLog, ReceiptProvider, RpcError, TxReceipt};
pub use infra::{Result, ReviewStore, ServiceError};
pub use verify::{ReviewVerifier, VerifyError};
