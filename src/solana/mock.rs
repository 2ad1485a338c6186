//! Fixed on-chain data used when no RPC endpoint is configured, and as the
//! fallback when a live read cannot reach the endpoint.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::solana::{OnChainSnapshot, SignatureInfo};

struct MockWallet {
    agent_id: &'static str,
    wallet_address: &'static str,
    balance: Decimal,
    transaction_count: u64,
    programs: &'static [&'static str],
}

const MOCK_WALLETS: &[MockWallet] = &[
    MockWallet {
        agent_id: "shadowbuilder",
        wallet_address: "7nYhS6PaB9hGzLvGmpc8bG2R4Z7j8xK9m4n2p5q8r0s1t",
        balance: dec!(2.5),
        transaction_count: 47,
        programs: &["Token Program", "Associated Token", "System Program"],
    },
    MockWallet {
        agent_id: "said",
        wallet_address: "3mRt5hZ9k8p2b6c7d8e0f1a4b5c6d7e8f9a0b1c2",
        balance: dec!(5.0),
        transaction_count: 56,
        programs: &["System Program", "Token Program"],
    },
];

/// Whether the mock ledger has a dedicated record for `agent_id`.
pub fn has_mock_record(agent_id: &str) -> bool {
    MOCK_WALLETS.iter().any(|w| w.agent_id == agent_id)
}

/// Mock snapshot for `agent_id`, or the zero-valued default for unknown ids.
///
/// `last_active_at` is always "now" because mock wallets are treated as
/// currently active.
pub fn mock_snapshot(agent_id: &str) -> OnChainSnapshot {
    match MOCK_WALLETS.iter().find(|w| w.agent_id == agent_id) {
        Some(wallet) => OnChainSnapshot {
            agent_id: wallet.agent_id.to_string(),
            wallet_address: wallet.wallet_address.to_string(),
            balance: wallet.balance,
            transaction_count: wallet.transaction_count,
            programs: wallet.programs.iter().map(|p| p.to_string()).collect(),
            last_active_at: Utc::now(),
        },
        None => OnChainSnapshot::unknown(agent_id),
    }
}

/// Three recent-looking signatures spaced an hour apart, ending at `now`.
pub fn mock_signatures(now: DateTime<Utc>) -> Vec<SignatureInfo> {
    (0..3)
        .map(|i| SignatureInfo {
            signature: format!("mock{}...", i + 1),
            slot: None,
            block_time: Some((now - Duration::hours(i)).timestamp()),
            err: None,
        })
        .collect()
}
