//! Minimal Solana JSON-RPC 2.0 client.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::RpcError;
use crate::solana::SignatureInfo;

/// Read-only chain queries the provider needs.
///
/// `Ok(None)` means the node answered but had no value for the query.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Balance in lamports.
    async fn get_balance(&self, wallet: &str) -> Result<Option<u64>, RpcError>;

    /// Most recent signatures for `wallet`, newest first, at most `limit`.
    async fn get_signatures(
        &self,
        wallet: &str,
        limit: usize,
    ) -> Result<Option<Vec<SignatureInfo>>, RpcError>;

    /// Node software version, used as a liveness probe.
    async fn get_version(&self) -> Result<Option<String>, RpcError>;
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct VersionResult {
    #[serde(rename = "solana-core")]
    solana_core: String,
}

/// JSON-RPC client over HTTP POST.
///
/// No retries and no timeout beyond reqwest's defaults.
#[derive(Debug)]
pub struct SolanaRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "Solana RPC request");
        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let envelope: RpcEnvelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| RpcError::Decode(format!("{method}: {e}")))?;
        if let Some(error) = envelope.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result)
    }
}

#[async_trait]
impl ChainRpc for SolanaRpcClient {
    async fn get_balance(&self, wallet: &str) -> Result<Option<u64>, RpcError> {
        let result: Option<BalanceResult> = self.call("getBalance", json!([wallet])).await?;
        Ok(result.map(|r| r.value))
    }

    async fn get_signatures(
        &self,
        wallet: &str,
        limit: usize,
    ) -> Result<Option<Vec<SignatureInfo>>, RpcError> {
        self.call(
            "getSignaturesForAddress",
            json!([wallet, { "limit": limit }]),
        )
        .await
    }

    async fn get_version(&self) -> Result<Option<String>, RpcError> {
        let result: Option<VersionResult> = self.call("getVersion", json!([])).await?;
        Ok(result.map(|r| r.solana_core))
    }
}
