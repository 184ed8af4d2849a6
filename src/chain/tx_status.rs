//! Transaction status lookups against the World developer portal.
//!
//! The mini-app frontend submits the commitment transaction through World
//! App, which returns a portal-side transaction id rather than a chain hash.
//! Callers poll this endpoint until the portal reports the mined hash, then
//! submit the review for verification. Polling cadence is entirely the
//! caller's concern; this client performs a single lookup per call.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infra::ServiceError;

/// Developer portal access configuration.
#[derive(Debug, Clone)]
pub struct TxStatusConfig {
    /// Mini-app identifier registered with the portal.
    pub app_id: String,
    /// Portal API key, sent as a bearer token.
    pub api_key: String,
    /// Portal base URL.
    pub base_url: String,
}

impl TxStatusConfig {
    /// Load configuration from environment variables. Returns `None` when the
    /// portal credentials are not set, in which case the status endpoint is
    /// disabled.
    pub fn from_env() -> Option<Self> {
        let app_id = std::env::var("APP_ID").ok()?;
        let api_key = std::env::var("DEV_PORTAL_API_KEY").ok()?;
        let base_url = std::env::var("DEV_PORTAL_URL")
            .unwrap_or_else(|_| "https://developer.worldcoin.org".to_string());

        Some(Self {
            app_id,
            api_key,
            base_url,
        })
    }
}

/// Portal-reported state of a submitted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    /// e.g. "pending", "mined", "failed".
    #[serde(rename = "transactionStatus")]
    pub transaction_status: Option<String>,
    /// On-chain hash once the transaction is mined.
    #[serde(rename = "transactionHash")]
    pub transaction_hash: Option<String>,
}

/// Client for the portal's minikit transaction endpoint.
pub struct TxStatusClient {
    config: TxStatusConfig,
    client: Client,
}

impl TxStatusClient {
    pub fn new(config: TxStatusConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, transaction_id: &str) -> String {
        format!(
            "{}/api/v2/minikit/transaction/{}?app_id={}&type=transaction",
            self.config.base_url.trim_end_matches('/'),
            transaction_id,
            self.config.app_id
        )
    }

    /// Look up the current status of a portal transaction id.
    pub async fn status(&self, transaction_id: &str) -> Result<TransactionStatus, ServiceError> {
        let url = self.endpoint(transaction_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ServiceError::TxStatus(format!("portal request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::TxStatus(format!(
                "portal returned HTTP status {}",
                status
            )));
        }

        response
            .json::<TransactionStatus>()
            .await
            .map_err(|e| ServiceError::TxStatus(format!("failed to parse portal response: {}", e)))
    }
}
