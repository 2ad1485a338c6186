//! Solana on-chain data: JSON-RPC client, mock ledger, and the snapshot
//! provider that combines them.

pub mod mock;
pub mod provider;
pub mod rpc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub use self::provider::{DataSource, OnChainProvider, SIGNATURE_PAGE_LIMIT};
pub use self::rpc::{ChainRpc, SolanaRpcClient};

pub const LAMPORTS_PER_SOL: Decimal = dec!(1_000_000_000);

/// Programs reported for live wallets. Signatures are not inspected, so this
/// is a fixed placeholder rather than the wallet's real program set.
pub const LIVE_PLACEHOLDER_PROGRAMS: &[&str] = &["System Program", "Token Program"];

/// Point-in-time view of a wallet's on-chain activity.
///
/// Built fresh for every request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainSnapshot {
    pub agent_id: String,
    pub wallet_address: String,
    /// Native balance in SOL.
    pub balance: Decimal,
    pub transaction_count: u64,
    /// Program identifiers in observation order; duplicates allowed.
    pub programs: Vec<String>,
    pub last_active_at: DateTime<Utc>,
}

impl OnChainSnapshot {
    /// Zero-valued snapshot for wallets nothing is known about.
    pub fn unknown(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            wallet_address: "unknown".to_string(),
            balance: Decimal::ZERO,
            transaction_count: 0,
            programs: Vec::new(),
            last_active_at: Utc::now(),
        }
    }
}

/// Convert a raw lamport amount to SOL.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / LAMPORTS_PER_SOL
}

/// One entry of a `getSignaturesForAddress` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}
