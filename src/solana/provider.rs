//! Snapshot provider: live RPC reads with a mock fallback.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{SolanaConfig, redact_url_for_display};
use crate::error::RpcError;
use crate::solana::mock::{mock_signatures, mock_snapshot};
use crate::solana::rpc::{ChainRpc, SolanaRpcClient};
use crate::solana::{LIVE_PLACEHOLDER_PROGRAMS, OnChainSnapshot, SignatureInfo, lamports_to_sol};

/// Page size for signature reads. A wallet with fewer signatures than this
/// has exhausted its history, which is read as "recently active".
pub const SIGNATURE_PAGE_LIMIT: usize = 100;

/// How far back `last_active_at` is placed when recency cannot be inferred.
const STALE_ACTIVITY_DAYS: i64 = 30;

/// Where snapshot data comes from for the lifetime of the provider.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Mock,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
        }
    }
}

/// Resolves on-chain snapshots for agents.
///
/// The mode is fixed at construction: with no RPC client the provider
/// serves mock data for its whole lifetime. No call ever fails; every
/// error degrades to default or mock values.
#[derive(Clone)]
pub struct OnChainProvider {
    rpc: Option<Arc<dyn ChainRpc>>,
}

impl std::fmt::Debug for OnChainProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnChainProvider")
            .field("data_source", &self.data_source())
            .finish()
    }
}

impl OnChainProvider {
    /// Build from config. A configured URL selects live mode.
    pub fn new(config: &SolanaConfig) -> Result<Self, RpcError> {
        match &config.rpc_url {
            Some(url) => {
                let client = SolanaRpcClient::new(url.clone())?;
                tracing::info!(url = %redact_url_for_display(url), "Solana RPC configured");
                Ok(Self::with_rpc(Arc::new(client)))
            }
            None => {
                tracing::warn!("No Solana RPC configured, serving mock on-chain data");
                Ok(Self::mock())
            }
        }
    }

    pub fn mock() -> Self {
        Self { rpc: None }
    }

    pub fn with_rpc(rpc: Arc<dyn ChainRpc>) -> Self {
        Self { rpc: Some(rpc) }
    }

    pub fn is_live(&self) -> bool {
        self.rpc.is_some()
    }

    pub fn data_source(&self) -> DataSource {
        if self.is_live() {
            DataSource::Live
        } else {
            DataSource::Mock
        }
    }

    /// Snapshot for `agent_id`.
    ///
    /// Mock mode or a missing wallet yields the mock record (zeroed for
    /// unknown ids). In live mode, balance and signatures are read
    /// concurrently; a read the node rejects defaults to zero, while an
    /// unreachable or garbled endpoint falls back to the mock record.
    pub async fn fetch_snapshot(&self, agent_id: &str, wallet: Option<&str>) -> OnChainSnapshot {
        let (Some(rpc), Some(wallet)) = (&self.rpc, wallet) else {
            return mock_snapshot(agent_id);
        };

        match fetch_live(rpc.as_ref(), agent_id, wallet).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(agent_id, error = %e, "Live on-chain read failed, using mock data");
                mock_snapshot(agent_id)
            }
        }
    }

    /// Recent signatures for a wallet, newest first.
    ///
    /// Mock mode or a missing wallet yields three fixed mock entries; a
    /// failed live read yields an empty list.
    pub async fn recent_signatures(
        &self,
        wallet: Option<&str>,
        limit: usize,
    ) -> Vec<SignatureInfo> {
        let (Some(rpc), Some(wallet)) = (&self.rpc, wallet) else {
            return mock_signatures(Utc::now());
        };

        let limit = limit.clamp(1, SIGNATURE_PAGE_LIMIT);
        match rpc.get_signatures(wallet, limit).await {
            Ok(signatures) => signatures.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(wallet, error = %e, "Signature read failed");
                Vec::new()
            }
        }
    }

    /// Whether the live endpoint answers `getVersion`. Always `false` in
    /// mock mode.
    pub async fn health_check(&self) -> bool {
        let Some(rpc) = &self.rpc else {
            return false;
        };
        match rpc.get_version().await {
            Ok(version) => version.is_some(),
            Err(e) => {
                tracing::debug!(error = %e, "Solana RPC health probe failed");
                false
            }
        }
    }
}

async fn fetch_live(
    rpc: &dyn ChainRpc,
    agent_id: &str,
    wallet: &str,
) -> Result<OnChainSnapshot, RpcError> {
    let (balance, signatures) = tokio::join!(
        rpc.get_balance(wallet),
        rpc.get_signatures(wallet, SIGNATURE_PAGE_LIMIT)
    );

    let lamports = tolerate_node_error(balance, "getBalance")?.unwrap_or(0);
    let transaction_count = tolerate_node_error(signatures, "getSignaturesForAddress")?
        .map(|s| s.len() as u64)
        .unwrap_or(0);

    let now = Utc::now();
    let last_active_at = if transaction_count > 0 && transaction_count < SIGNATURE_PAGE_LIMIT as u64
    {
        now
    } else {
        now - Duration::days(STALE_ACTIVITY_DAYS)
    };

    let balance: Decimal = lamports_to_sol(lamports);
    Ok(OnChainSnapshot {
        agent_id: agent_id.to_string(),
        wallet_address: wallet.to_string(),
        balance,
        transaction_count,
        programs: LIVE_PLACEHOLDER_PROGRAMS
            .iter()
            .map(|p| p.to_string())
            .collect(),
        last_active_at,
    })
}

/// A node-level rejection of one read counts as "no value"; anything that
/// means the endpoint is unusable is propagated.
fn tolerate_node_error<T>(
    result: Result<Option<T>, RpcError>,
    method: &str,
) -> Result<Option<T>, RpcError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if !e.is_transport_level() => {
            tracing::debug!(method, error = %e, "RPC read rejected by node");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
