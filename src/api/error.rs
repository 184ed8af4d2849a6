//! Structured API error responses with error codes.
//!
//! Every failure the review flow can signal maps to a stable,
//! machine-readable code so the mini-app frontend can render a specific
//! message per error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::infra::ServiceError;
use crate::verify::VerifyError;

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses.
///
/// These codes are stable and can be used by clients for programmatic error
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (3xxx)
    /// Required field is missing
    MissingRequiredField,
    /// Field value is invalid
    InvalidFieldValue,
    /// Transaction id does not parse as a 32-byte hash
    InvalidTransactionId,

    // Resource errors (4xxx)
    /// Requested resource not found
    ResourceNotFound,
    /// Product not found locally or via external lookup
    ProductNotFound,
    /// No receipt exists for the claimed transaction
    TransactionNotFound,

    // Verification errors (6xxx)
    /// The claimed transaction reverted on-chain
    TransactionFailed,
    /// No review commitment event in the receipt
    CommitmentEventNotFound,
    /// Commitment event data failed to decode
    EventDecodeFailed,
    /// On-chain content hash does not match the submitted content
    ContentHashMismatch,
    /// On-chain rating does not match the submitted rating
    RatingMismatch,
    /// On-chain barcode hash does not match the submitted product code
    ProductCodeMismatch,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// Chain RPC endpoint unreachable or failing
    ChainUnavailable,
    /// External lookup or portal request failed
    UpstreamError,
    /// Optional subsystem is not configured
    ServiceUnavailable,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn numeric_code(&self) -> u32 {
        match self {
            // Validation (3xxx)
            ErrorCode::MissingRequiredField => 3001,
            ErrorCode::InvalidFieldValue => 3002,
            ErrorCode::InvalidTransactionId => 3003,

            // Resource (4xxx)
            ErrorCode::ResourceNotFound => 4001,
            ErrorCode::ProductNotFound => 4002,
            ErrorCode::TransactionNotFound => 4003,

            // Verification (6xxx)
            ErrorCode::TransactionFailed => 6001,
            ErrorCode::CommitmentEventNotFound => 6002,
            ErrorCode::EventDecodeFailed => 6003,
            ErrorCode::ContentHashMismatch => 6004,
            ErrorCode::RatingMismatch => 6005,
            ErrorCode::ProductCodeMismatch => 6006,

            // Infrastructure (8xxx)
            ErrorCode::DatabaseError => 8001,
            ErrorCode::ChainUnavailable => 8002,
            ErrorCode::UpstreamError => 8003,
            ErrorCode::ServiceUnavailable => 8004,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Validation -> 400
            ErrorCode::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidTransactionId => StatusCode::BAD_REQUEST,

            // Resource -> 404
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProductNotFound => StatusCode::NOT_FOUND,
            ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,

            // Verification -> 422
            ErrorCode::TransactionFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::CommitmentEventNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::EventDecodeFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ContentHashMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::RatingMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::ProductCodeMismatch => StatusCode::UNPROCESSABLE_ENTITY,

            // Infrastructure -> 5xx
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ChainUnavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::InvalidTransactionId => "INVALID_TRANSACTION_ID",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            ErrorCode::TransactionFailed => "TRANSACTION_FAILED",
            ErrorCode::CommitmentEventNotFound => "COMMITMENT_EVENT_NOT_FOUND",
            ErrorCode::EventDecodeFailed => "EVENT_DECODE_FAILED",
            ErrorCode::ContentHashMismatch => "CONTENT_HASH_MISMATCH",
            ErrorCode::RatingMismatch => "RATING_MISMATCH",
            ErrorCode::ProductCodeMismatch => "PRODUCT_CODE_MISMATCH",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ChainUnavailable => "CHAIN_UNAVAILABLE",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Related resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
                resource_id: None,
            },
        }
    }

    /// Set additional details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Set related resource ID.
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.error.resource_id = Some(id.into());
        self
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Add error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::InvalidTransactionId(msg) => ApiError::new(
                ErrorCode::InvalidTransactionId,
                format!("Invalid transaction id: {}", msg),
            ),
            VerifyError::TransactionNotFound => {
                ApiError::new(ErrorCode::TransactionNotFound, "Transaction not found")
            }
            VerifyError::TransactionFailed => {
                ApiError::new(ErrorCode::TransactionFailed, "Transaction failed on-chain")
            }
            VerifyError::EventNotFound => ApiError::new(
                ErrorCode::CommitmentEventNotFound,
                "Review commitment event not found",
            ),
            VerifyError::Decode(msg) => ApiError::new(
                ErrorCode::EventDecodeFailed,
                format!("Failed to decode commitment event: {}", msg),
            ),
            VerifyError::ContentHashMismatch => {
                ApiError::new(ErrorCode::ContentHashMismatch, "Content hash mismatch")
            }
            VerifyError::RatingMismatch { onchain, expected } => ApiError::new(
                ErrorCode::RatingMismatch,
                format!("Rating mismatch: on-chain {}, expected {}", onchain, expected),
            )
            .with_details(serde_json::json!({
                "onchain_rating": onchain,
                "expected_rating": expected,
            })),
            VerifyError::ProductCodeMismatch => {
                ApiError::new(ErrorCode::ProductCodeMismatch, "Product code mismatch")
            }
            VerifyError::Rpc(e) => {
                ApiError::new(ErrorCode::ChainUnavailable, format!("Chain RPC error: {}", e))
            }
            VerifyError::Storage(e) => ApiError::from(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => {
                ApiError::new(ErrorCode::DatabaseError, format!("Database error: {}", e))
            }
            ServiceError::ProductNotFound(code) => {
                ApiError::new(ErrorCode::ProductNotFound, format!("Product not found: {}", code))
                    .with_resource_id(code)
            }
            ServiceError::Lookup(msg) => ApiError::new(ErrorCode::UpstreamError, msg),
            ServiceError::TxStatus(msg) => ApiError::new(ErrorCode::UpstreamError, msg),
            ServiceError::Configuration(msg) => {
                ApiError::new(ErrorCode::InternalError, format!("Configuration error: {}", msg))
            }
            ServiceError::Internal(msg) => ApiError::new(ErrorCode::InternalError, msg),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a validation error with field details.
pub fn validation_error(field: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidFieldValue, message.into()).with_details(serde_json::json!({
        "field": field
    }))
}

/// Create a missing-field error.
pub fn missing_field(field: &str) -> ApiError {
    ApiError::new(
        ErrorCode::MissingRequiredField,
        format!("{} is required", field),
    )
    .with_details(serde_json::json!({ "field": field }))
}

/// Create a service-unavailable error for an unconfigured subsystem.
pub fn not_configured(subsystem: &str) -> ApiError {
    ApiError::new(
        ErrorCode::ServiceUnavailable,
        format!("{} is not configured", subsystem),
    )
}

// ============================================================================
// Tests
// ============================================================================
