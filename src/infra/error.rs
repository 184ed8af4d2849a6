//! Error types for the Places review service infrastructure.

use thiserror::Error;

/// Errors that can occur in storage and external-service infrastructure.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Product not found in the local catalog
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// External barcode lookup failure
    #[error("barcode lookup error: {0}")]
    Lookup(String),

    /// Developer portal transaction status failure
    #[error("transaction status error: {0}")]
    TxStatus(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for service infrastructure operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
