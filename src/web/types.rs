//! Request and response DTOs for the gateway API.
//!
//! Keys are camelCase to match what the dashboard front-end reads.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::payment::PaymentChallenge;
use crate::registry::Trend;
use crate::reputation::ReputationBreakdown;
use crate::solana::{DataSource, SignatureInfo};

/// Balance with four decimals, rounding half away from zero.
pub fn format_balance(balance: Decimal) -> String {
    let rounded = balance.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.4}", rounded)
}

// --- Health ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub data_source: DataSource,
    pub rpc_healthy: bool,
}

// --- Leaderboard ---

#[derive(Debug, Serialize)]
pub struct LeaderboardOnChain {
    pub balance: String,
    pub transactions: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub score: u8,
    pub trend: Trend,
    pub attestations: u64,
    pub tags: Vec<String>,
    pub on_chain: LeaderboardOnChain,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub agents: Vec<LeaderboardEntry>,
    pub last_updated: String,
    pub total: usize,
    pub data_source: DataSource,
}

// --- Reputation ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainDataView {
    /// e.g. `"2.5000 SOL"`.
    pub balance: String,
    pub transactions: u64,
    pub last_active: String,
    pub programs: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationResponse {
    pub agent_id: String,
    pub name: String,
    pub wallet_address: String,
    pub overall: u8,
    pub breakdown: ReputationBreakdown,
    pub trend: Trend,
    pub attestations: u64,
    pub on_chain_data: OnChainDataView,
    pub last_updated: String,
    pub data_source: DataSource,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub signatures: Vec<SignatureInfo>,
    pub data_source: DataSource,
}

// --- Payment ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChallengeQuery {
    pub agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentChallengeResponse {
    pub challenge: PaymentChallenge,
}

/// Reputation block returned after a verified payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidReputation {
    pub agent_id: String,
    pub overall: u8,
    pub breakdown: ReputationBreakdown,
    pub attestations: u64,
    pub trend: Trend,
}

#[derive(Debug, Serialize)]
pub struct PaymentVerifiedResponse {
    pub verified: bool,
    pub reputation: PaidReputation,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    #[test]
    fn balance_formats_with_four_decimals() {
        assert_eq!(format_balance(dec!(2.5)), "2.5000");
        assert_eq!(format_balance(Decimal::ZERO), "0.0000");
        assert_eq!(format_balance(dec!(0.00005)), "0.0001");
        assert_eq!(format_balance(dec!(1.23454)), "1.2345");
    }

    #[test]
    fn leaderboard_entry_uses_camel_case() {
        let entry = LeaderboardEntry {
            id: "said".to_string(),
            name: "SAID Protocol".to_string(),
            score: 88,
            trend: Trend::Stable,
            attestations: 56,
            tags: vec!["identity".to_string()],
            on_chain: LeaderboardOnChain {
                balance: "5.0000".to_string(),
                transactions: 56,
            },
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["onChain"]["balance"], "5.0000");
        assert_eq!(value["trend"], "stable");
    }
}
