//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use places_reviews::crypto::{barcode_hash, content_hash, ReviewCommitmentSubmitted};
use places_reviews::{
    ReceiptLog, ReceiptProvider, ReviewStore, ReviewSubmission, RpcError, TxReceipt,
};

/// A syntactically valid 32-byte transaction hash.
pub fn test_tx_id() -> String {
    format!("0x{}", "11".repeat(32))
}

/// Test reviewer address.
pub fn test_reviewer() -> String {
    "0x000000000000000000000000000000000000dead".to_string()
}

/// Fresh in-memory review store with migrations applied.
pub async fn memory_store() -> Arc<ReviewStore> {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    let store = ReviewStore::new(pool);
    store.initialize().await.unwrap();
    Arc::new(store)
}

/// A review submission for the demo cola product.
pub fn cola_submission() -> ReviewSubmission {
    ReviewSubmission {
        product_code: "5000112654042".to_string(),
        reviewer: test_reviewer(),
        stars: 4,
        description: "Great soda".to_string(),
        transaction_id: test_tx_id(),
    }
}

/// Build a commitment event log as the review contract would emit it.
///
/// `scaled_rating` is on the contract's 0-10 scale and `description` must be
/// the post-normalization text.
pub fn commitment_log(product_code: &str, scaled_rating: u8, description: &str) -> ReceiptLog {
    commitment_log_with(
        barcode_hash(product_code).to_string(),
        scaled_rating,
        content_hash(product_code, scaled_rating, description),
    )
}

/// Build a commitment event log with explicit on-chain field values, for
/// mismatch scenarios.
pub fn commitment_log_with(barcode: String, scaled_rating: u8, content_hash: B256) -> ReceiptLog {
    let event = ReviewCommitmentSubmitted {
        barcode,
        reviewer: Address::ZERO,
        rating: scaled_rating,
        contentHash: content_hash,
        worldIdNullifierHash: U256::from(7u64),
    };

    let log_data = event.encode_log_data();
    ReceiptLog {
        topics: log_data.topics().to_vec(),
        data: log_data.data,
    }
}

/// A log that no review verifier should care about.
pub fn unrelated_log() -> ReceiptLog {
    ReceiptLog {
        topics: vec![B256::ZERO],
        data: Bytes::from(vec![0u8; 64]),
    }
}

/// Successful receipt wrapping the given logs.
pub fn successful_receipt(logs: Vec<ReceiptLog>) -> TxReceipt {
    TxReceipt {
        success: true,
        block_number: Some(42),
        logs,
    }
}

/// Receipt provider that always serves the same receipt and counts calls.
pub struct StaticReceiptProvider {
    receipt: Option<TxReceipt>,
    calls: AtomicUsize,
}

impl StaticReceiptProvider {
    pub fn new(receipt: Option<TxReceipt>) -> Self {
        Self {
            receipt,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReceiptProvider for StaticReceiptProvider {
    async fn transaction_receipt(&self, _tx_hash: B256) -> Result<Option<TxReceipt>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipt.clone())
    }
}

/// Receipt provider that fails at the transport layer.
pub struct FailingReceiptProvider;

#[async_trait]
impl ReceiptProvider for FailingReceiptProvider {
    async fn transaction_receipt(&self, _tx_hash: B256) -> Result<Option<TxReceipt>, RpcError> {
        Err(RpcError("connection refused".to_string()))
    }
}
