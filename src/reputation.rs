//! Reputation scoring.
//!
//! An overall score is a fixed convex combination of four sub-scores. Only
//! `on_chain_activity` is derived from chain data; the other three are
//! placeholder values sampled through a [`ScoreSource`] until real inputs
//! exist.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::registry::VERIFIED_AGENT_ID;
use crate::solana::OnChainSnapshot;

pub const TASK_COMPLETION_WEIGHT: Decimal = dec!(0.30);
pub const PAYMENT_HISTORY_WEIGHT: Decimal = dec!(0.30);
pub const IDENTITY_VERIFICATION_WEIGHT: Decimal = dec!(0.25);
pub const ON_CHAIN_ACTIVITY_WEIGHT: Decimal = dec!(0.15);

const SCORE_CAP: Decimal = dec!(100);

/// Supplies integers for the placeholder sub-scores.
pub trait ScoreSource: Send + Sync {
    /// A value in `range` (half-open). `range` is never empty.
    fn sample(&self, range: Range<u32>) -> u32;
}

/// Uniform draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl ScoreSource for ThreadRngSource {
    fn sample(&self, range: Range<u32>) -> u32 {
        rand::thread_rng().gen_range(range)
    }
}

/// Deterministic source: replays `values` in order (cycling), clamping each
/// into the requested range.
#[derive(Debug)]
pub struct FixedScoreSource {
    values: Vec<u32>,
    cursor: AtomicUsize,
}

impl FixedScoreSource {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always returns `value` (clamped into the range).
    pub fn constant(value: u32) -> Self {
        Self::new(vec![value])
    }
}

impl ScoreSource for FixedScoreSource {
    fn sample(&self, range: Range<u32>) -> u32 {
        let value = if self.values.is_empty() {
            range.start
        } else {
            let i = self.cursor.fetch_add(1, Ordering::Relaxed);
            self.values[i % self.values.len()]
        };
        value.clamp(range.start, range.end.saturating_sub(1).max(range.start))
    }
}

/// Sampling ranges for the three placeholder sub-scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftScoreRanges {
    pub task_completion: Range<u32>,
    pub payment_history: Range<u32>,
    pub identity_verification: Range<u32>,
}

impl SoftScoreRanges {
    /// Narrower, higher ranges for the verified agent.
    pub fn verified() -> Self {
        Self {
            task_completion: 85..95,
            payment_history: 90..98,
            identity_verification: 95..100,
        }
    }

    pub fn unverified() -> Self {
        Self {
            task_completion: 75..95,
            payment_history: 80..98,
            identity_verification: 85..100,
        }
    }

    pub fn for_agent(agent_id: &str) -> Self {
        if agent_id == VERIFIED_AGENT_ID {
            Self::verified()
        } else {
            Self::unverified()
        }
    }
}

/// Chain-derived components, each already capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMetrics {
    pub tx_score: Decimal,
    pub balance_score: Decimal,
    pub program_score: Decimal,
}

impl ChainMetrics {
    pub fn from_snapshot(snapshot: &OnChainSnapshot) -> Self {
        Self {
            tx_score: (Decimal::from(snapshot.transaction_count) * dec!(2)).min(SCORE_CAP),
            balance_score: (snapshot.balance * dec!(10)).min(SCORE_CAP),
            program_score: (Decimal::from(snapshot.programs.len() as u64) * dec!(15))
                .min(SCORE_CAP),
        }
    }
}

/// How `on_chain_activity` blends the chain metrics.
///
/// The leaderboard and the per-agent detail view intentionally use
/// different formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityBlend {
    /// `0.4 * tx + 0.6 * balance`; program count is ignored.
    Leaderboard,
    /// `0.4 * tx + 0.3 * balance + 0.3 * programs`.
    Detail,
}

impl ActivityBlend {
    pub fn on_chain_activity(self, metrics: &ChainMetrics) -> u8 {
        let blended = match self {
            Self::Leaderboard => metrics.tx_score * dec!(0.4) + metrics.balance_score * dec!(0.6),
            Self::Detail => {
                metrics.tx_score * dec!(0.4)
                    + metrics.balance_score * dec!(0.3)
                    + metrics.program_score * dec!(0.3)
            }
        };
        clamp_score(blended)
    }
}

/// The four sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReputationBreakdown {
    pub task_completion: u8,
    pub payment_history: u8,
    pub identity_verification: u8,
    pub on_chain_activity: u8,
}

impl ReputationBreakdown {
    /// Build a breakdown, capping every component at 100.
    pub fn new(
        task_completion: u8,
        payment_history: u8,
        identity_verification: u8,
        on_chain_activity: u8,
    ) -> Self {
        Self {
            task_completion: task_completion.min(100),
            payment_history: payment_history.min(100),
            identity_verification: identity_verification.min(100),
            on_chain_activity: on_chain_activity.min(100),
        }
    }

    /// `floor(0.30*task + 0.30*payment + 0.25*identity + 0.15*on_chain)`.
    pub fn weighted_overall(&self) -> u8 {
        let sum = Decimal::from(self.task_completion) * TASK_COMPLETION_WEIGHT
            + Decimal::from(self.payment_history) * PAYMENT_HISTORY_WEIGHT
            + Decimal::from(self.identity_verification) * IDENTITY_VERIFICATION_WEIGHT
            + Decimal::from(self.on_chain_activity) * ON_CHAIN_ACTIVITY_WEIGHT;
        clamp_score(sum)
    }
}

/// Overall score plus the breakdown it was derived from.
///
/// `overall` is only ever computed from `breakdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReputationResult {
    overall: u8,
    breakdown: ReputationBreakdown,
}

impl ReputationResult {
    pub fn from_breakdown(breakdown: ReputationBreakdown) -> Self {
        Self {
            overall: breakdown.weighted_overall(),
            breakdown,
        }
    }

    pub fn overall(&self) -> u8 {
        self.overall
    }

    pub fn breakdown(&self) -> &ReputationBreakdown {
        &self.breakdown
    }
}

/// Turns snapshots into reputation results.
#[derive(Clone)]
pub struct ReputationCalculator {
    source: Arc<dyn ScoreSource>,
}

impl std::fmt::Debug for ReputationCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationCalculator").finish_non_exhaustive()
    }
}

impl Default for ReputationCalculator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngSource))
    }
}

impl ReputationCalculator {
    pub fn new(source: Arc<dyn ScoreSource>) -> Self {
        Self { source }
    }

    /// Score `snapshot` for `agent_id`. Each call draws fresh placeholder
    /// sub-scores from the source.
    pub fn calculate(
        &self,
        snapshot: &OnChainSnapshot,
        agent_id: &str,
        blend: ActivityBlend,
    ) -> ReputationResult {
        let metrics = ChainMetrics::from_snapshot(snapshot);
        let ranges = SoftScoreRanges::for_agent(agent_id);

        let breakdown = ReputationBreakdown::new(
            self.draw(&ranges.task_completion),
            self.draw(&ranges.payment_history),
            self.draw(&ranges.identity_verification),
            blend.on_chain_activity(&metrics),
        );
        ReputationResult::from_breakdown(breakdown)
    }

    fn draw(&self, range: &Range<u32>) -> u8 {
        self.source.sample(range.clone()).min(100) as u8
    }
}

/// Floor into `[0, 100]`.
fn clamp_score(value: Decimal) -> u8 {
    value
        .floor()
        .clamp(Decimal::ZERO, SCORE_CAP)
        .to_u8()
        .unwrap_or(0)
}
