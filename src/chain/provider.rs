//! Transaction receipt access.
//!
//! The verifier consumes receipts through the [`ReceiptProvider`] trait so it
//! can be exercised against hand-built receipts in tests; the production
//! implementation fetches them from an HTTP JSON-RPC endpoint via alloy.

use alloy::primitives::{Bytes, B256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// A single emitted log entry from a transaction receipt.
#[derive(Debug, Clone)]
pub struct ReceiptLog {
    /// Indexed topics; topic 0 is the keccak-256 hash of the event signature.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed event data.
    pub data: Bytes,
}

/// Outcome of a finalized transaction: status flag plus emitted logs.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    /// True if the transaction executed without reverting.
    pub success: bool,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    pub logs: Vec<ReceiptLog>,
}

/// Transport-level RPC failure.
#[derive(Error, Debug)]
#[error("rpc error: {0}")]
pub struct RpcError(pub String);

/// Read-only access to transaction receipts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    /// Fetch the receipt for `tx_hash`, or `None` if the transaction is
    /// unknown to the node.
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, RpcError>;
}

/// Chain endpoint configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC URL of the chain the review contract lives on.
    pub rpc_url: String,
}

impl ChainConfig {
    /// Load configuration from environment variables, defaulting to the
    /// public World Chain mainnet endpoint.
    pub fn from_env() -> Self {
        let rpc_url = std::env::var("CHAIN_RPC_URL")
            .unwrap_or_else(|_| "https://worldchain-mainnet.g.alchemy.com/public".to_string());
        Self { rpc_url }
    }
}

/// [`ReceiptProvider`] backed by an alloy HTTP provider.
pub struct HttpReceiptProvider {
    rpc_url: url::Url,
}

impl HttpReceiptProvider {
    pub fn new(config: &ChainConfig) -> Result<Self, RpcError> {
        let rpc_url = config
            .rpc_url
            .parse()
            .map_err(|e| RpcError(format!("invalid RPC URL {:?}: {}", config.rpc_url, e)))?;
        Ok(Self { rpc_url })
    }
}

#[async_trait]
impl ReceiptProvider for HttpReceiptProvider {
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, RpcError> {
        let provider = ProviderBuilder::new().on_http(self.rpc_url.clone());

        let receipt = provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| RpcError(format!("failed to fetch receipt: {}", e)))?;

        Ok(receipt.map(|r| TxReceipt {
            success: r.status(),
            block_number: r.block_number,
            logs: r
                .inner
                .logs()
                .iter()
                .map(|log| ReceiptLog {
                    topics: log.inner.data.topics().to_vec(),
                    data: log.inner.data.data.clone(),
                })
                .collect(),
        }))
    }
}
