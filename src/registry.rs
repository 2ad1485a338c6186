//! Built-in agent directory.
//!
//! The set of tracked agents is fixed at process start. Lookups for ids
//! that are not registered fall back to neutral defaults rather than errors.

use serde::Serialize;

/// Id of the one agent whose wallet is a real, verified account. Its soft
/// sub-scores are sampled from narrower, higher ranges.
pub const VERIFIED_AGENT_ID: &str = "notagent";

/// Direction a reputation has been moving.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    #[default]
    Stable,
    Down,
}

/// Static description of a tracked agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRecord {
    pub id: &'static str,
    pub name: &'static str,
    pub wallet_address: &'static str,
    pub trend: Trend,
    pub tags: &'static [&'static str],
}

impl AgentRecord {
    pub fn is_verified(&self) -> bool {
        self.id == VERIFIED_AGENT_ID
    }
}

const BUILTIN_AGENTS: &[AgentRecord] = &[
    AgentRecord {
        id: "shadowbuilder",
        name: "ShadowBuilder",
        wallet_address: "7nYhS6PaB9hGzLvGmpc8bG2R4Z7j8xK9m4n2p5q8r0s1t",
        trend: Trend::Up,
        tags: &["founder", "builder"],
    },
    AgentRecord {
        id: "said",
        name: "SAID Protocol",
        wallet_address: "3mRt5hZ9k8p2b6c7d8e0f1a4b5c6d7e8f9a0b1c2",
        trend: Trend::Stable,
        tags: &["identity", "infra"],
    },
    AgentRecord {
        id: "bountyboard",
        name: "BountyBoard",
        wallet_address: "5nXs7Pb8h0gK1jL4m5n6Op7q9r2s3t4u5v6w8x9y0z1a2b3c",
        trend: Trend::Up,
        tags: &["tasks", "payments"],
    },
    AgentRecord {
        id: "sipher",
        name: "Sipher",
        wallet_address: "8mYt9Rc1hB2iK5o7p0s8u2v3w6x7y0z1a2d3e4f5g6h7i8j9k",
        trend: Trend::Up,
        tags: &["privacy", "stealth"],
    },
    AgentRecord {
        id: "level5",
        name: "Level 5",
        wallet_address: "2lNq5Td0kC3jM6r9t1w4x7y0z2a5b8c1d6e2f3g4h5i6j7l8m",
        trend: Trend::Stable,
        tags: &["survival", "metrics"],
    },
    AgentRecord {
        id: "claude",
        name: "ClaudeCraft",
        wallet_address: "6oP8Ve4aE1hB5iK9o2s5u8w1x4z7a0c3d6e9f2g3h5i6j8k1l4",
        trend: Trend::Up,
        tags: &["minecraft", "autonomous"],
    },
    AgentRecord {
        id: VERIFIED_AGENT_ID,
        name: "Not Agent",
        wallet_address: "CFaXxN9fqowBQUa5bjYeHejHu8kUZGoqLJ1zMC1QEsKa",
        trend: Trend::Up,
        tags: &["real-wallet", "verified"],
    },
];

/// Immutable, ordered set of tracked agents.
#[derive(Debug, Clone)]
pub struct AgentDirectory {
    agents: Vec<AgentRecord>,
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AgentDirectory {
    /// The agents shipped with the dashboard, in leaderboard tie-break order.
    pub fn builtin() -> Self {
        Self {
            agents: BUILTIN_AGENTS.to_vec(),
        }
    }

    pub fn from_records(agents: Vec<AgentRecord>) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AgentRecord> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn wallet_for(&self, id: &str) -> Option<&'static str> {
        self.get(id).map(|a| a.wallet_address)
    }

    /// Display name, or the raw id for unregistered agents.
    pub fn name_for<'a>(&self, id: &'a str) -> &'a str {
        self.get(id).map(|a| a.name).unwrap_or(id)
    }

    pub fn trend_for(&self, id: &str) -> Trend {
        self.get(id).map(|a| a.trend).unwrap_or_default()
    }

    pub fn tags_for(&self, id: &str) -> &'static [&'static str] {
        self.get(id).map(|a| a.tags).unwrap_or(&[])
    }
}
