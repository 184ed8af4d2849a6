//! On-chain review commitment verification.
//!
//! [`ReviewVerifier`] is the sole gate between "a user claims to have
//! submitted a review on-chain" and "the review appears in storage". It
//! recomputes the commitment hashes from the submitted content and accepts
//! the review only if a `ReviewCommitmentSubmitted` event in the claimed
//! transaction's receipt matches them, so the caller's claim is never
//! trusted.

use std::sync::Arc;

use alloy::primitives::{LogData, B256};
use alloy::sol_types::SolEvent;
use thiserror::Error;
use tracing::{debug, info};

use crate::chain::{ReceiptProvider, RpcError};
use crate::crypto::{barcode_hash, content_hash, ReviewCommitmentSubmitted};
use crate::domain::{ReviewSubmission, VerifiedReview};
use crate::infra::{ReviewStore, ServiceError};

/// Why a review submission was not accepted.
///
/// Every variant is recoverable from the caller's perspective and maps to a
/// distinct user-facing message. Storage failures are surfaced separately so
/// the caller can distinguish "your review was not verified" from "your
/// review was verified but failed to save".
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The transaction id does not parse as a 32-byte hash. Rejected before
    /// any RPC call.
    #[error("invalid transaction id: {0}")]
    InvalidTransactionId(String),

    /// No receipt exists for the claimed transaction.
    #[error("transaction not found")]
    TransactionNotFound,

    /// The claimed transaction reverted on-chain.
    #[error("transaction failed on-chain")]
    TransactionFailed,

    /// No log in the receipt matches the review commitment event signature.
    #[error("review commitment event not found")]
    EventNotFound,

    /// A matching log exists but its data does not decode against the
    /// contract interface.
    #[error("failed to decode commitment event: {0}")]
    Decode(String),

    /// The on-chain content hash does not match the recomputed hash of the
    /// submitted content.
    #[error("content hash mismatch")]
    ContentHashMismatch,

    /// The on-chain rating does not match the submitted rating.
    #[error("rating mismatch: on-chain {onchain}, expected {expected}")]
    RatingMismatch { onchain: u8, expected: u8 },

    /// The on-chain barcode hash does not match the submitted product code.
    #[error("product code mismatch")]
    ProductCodeMismatch,

    /// Transport failure talking to the chain.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The review verified but persisting it failed.
    #[error("storage error: {0}")]
    Storage(#[from] ServiceError),
}

/// Verifies review submissions against their on-chain commitment and
/// persists them on success.
///
/// Each call is independent and stateless: the receipt is fetched fresh, no
/// retries are attempted, and the single storage write happens only after
/// every check has passed.
pub struct ReviewVerifier {
    provider: Arc<dyn ReceiptProvider>,
    store: Arc<ReviewStore>,
}

impl ReviewVerifier {
    pub fn new(provider: Arc<dyn ReceiptProvider>, store: Arc<ReviewStore>) -> Self {
        Self { provider, store }
    }

    /// Verify a claimed review against its on-chain commitment event and, on
    /// success, persist it. Returns the persisted row plus the block number
    /// of the commitment transaction.
    pub async fn verify_and_store(
        &self,
        submission: ReviewSubmission,
    ) -> Result<VerifiedReview, VerifyError> {
        let submission = submission.normalized();
        let tx_hash = parse_transaction_hash(&submission.transaction_id)?;

        let receipt = self
            .provider
            .transaction_receipt(tx_hash)
            .await?
            .ok_or(VerifyError::TransactionNotFound)?;

        if !receipt.success {
            return Err(VerifyError::TransactionFailed);
        }

        let log = receipt
            .logs
            .iter()
            .find(|log| log.topics.first() == Some(&ReviewCommitmentSubmitted::SIGNATURE_HASH))
            .ok_or(VerifyError::EventNotFound)?;

        let log_data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
        let event = ReviewCommitmentSubmitted::decode_log_data(&log_data, true)
            .map_err(|e| VerifyError::Decode(e.to_string()))?;

        let scaled_rating = submission.scaled_rating();

        let expected_content =
            content_hash(&submission.product_code, scaled_rating, &submission.description);
        if event.contentHash != expected_content {
            debug!(
                expected = %expected_content,
                onchain = %event.contentHash,
                "content hash mismatch"
            );
            return Err(VerifyError::ContentHashMismatch);
        }

        if event.rating != scaled_rating {
            return Err(VerifyError::RatingMismatch {
                onchain: event.rating,
                expected: scaled_rating,
            });
        }

        let expected_barcode = format!("0x{}", hex::encode(barcode_hash(&submission.product_code)));
        if !event.barcode.eq_ignore_ascii_case(&expected_barcode) {
            debug!(
                expected = %expected_barcode,
                onchain = %event.barcode,
                "barcode hash mismatch"
            );
            return Err(VerifyError::ProductCodeMismatch);
        }

        // All five checks passed; the single storage write happens here.
        let review = self.store.save_review(&submission).await?;

        info!(
            review_id = review.review_id,
            product_code = %review.product_code,
            tx = %submission.transaction_id,
            block = ?receipt.block_number,
            "review commitment verified and stored"
        );

        Ok(VerifiedReview {
            review,
            block_number: receipt.block_number,
        })
    }
}

fn parse_transaction_hash(transaction_id: &str) -> Result<B256, VerifyError> {
    transaction_id
        .parse::<B256>()
        .map_err(|e| VerifyError::InvalidTransactionId(e.to_string()))
}
