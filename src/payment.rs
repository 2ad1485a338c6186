//! x402 payment challenges.
//!
//! Challenges are not stored: a GET issues a fresh, unlinked challenge and a
//! POST is judged on its own. Verification is a mock that accepts roughly
//! nine in ten submissions carrying a signature.

use std::sync::Arc;

use axum::http::{HeaderName, header};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PaymentConfig;
use crate::reputation::{ScoreSource, ThreadRngSource};

/// Agent a challenge is issued for when the caller names none.
pub const DEFAULT_CHALLENGE_AGENT: &str = "shadowbuilder";

/// Share of signed submissions the mock verifier rejects, in percent.
pub const MOCK_REJECTION_PERCENT: u32 = 10;

const CHALLENGE_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Pending,
}

/// Headers advertised with a challenge, mirrored in the response body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct X402Headers {
    #[serde(rename = "WWW-Authenticate")]
    pub www_authenticate: String,
    #[serde(rename = "X-Payment-Required")]
    pub payment_required: String,
    #[serde(rename = "X-Payment-Challenge")]
    pub payment_challenge: String,
    #[serde(rename = "X-Payment-Recipient")]
    pub payment_recipient: String,
}

impl X402Headers {
    pub fn pairs(&self) -> [(HeaderName, &str); 4] {
        [
            (header::WWW_AUTHENTICATE, self.www_authenticate.as_str()),
            (
                HeaderName::from_static("x-payment-required"),
                self.payment_required.as_str(),
            ),
            (
                HeaderName::from_static("x-payment-challenge"),
                self.payment_challenge.as_str(),
            ),
            (
                HeaderName::from_static("x-payment-recipient"),
                self.payment_recipient.as_str(),
            ),
        ]
    }
}

/// A payment request a client must settle before receiving reputation data.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChallenge {
    pub id: String,
    pub agent_id: String,
    /// Amount in lamports.
    pub amount: u64,
    pub recipient: String,
    #[serde(serialize_with = "crate::timefmt::serialize")]
    pub expires_at: DateTime<Utc>,
    pub status: ChallengeStatus,
    pub headers: X402Headers,
}

/// Body of a verification POST. Every field is optional on the wire so a
/// missing signature is answered as a failed payment, not a bad request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    #[serde(default)]
    pub challenge_id: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

impl PaymentSubmission {
    /// Agent the reputation block is returned for.
    pub fn target_agent(&self) -> &str {
        self.agent_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CHALLENGE_AGENT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentVerdict {
    Verified,
    Rejected(&'static str),
}

/// Issues and (mock-)verifies payment challenges.
#[derive(Clone)]
pub struct PaymentDesk {
    config: PaymentConfig,
    source: Arc<dyn ScoreSource>,
}

impl std::fmt::Debug for PaymentDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDesk")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PaymentDesk {
    pub fn new(config: PaymentConfig) -> Self {
        Self::with_source(config, Arc::new(ThreadRngSource))
    }

    /// Use `source` for the accept/reject draw.
    pub fn with_source(config: PaymentConfig, source: Arc<dyn ScoreSource>) -> Self {
        Self { config, source }
    }

    pub fn issue_challenge(&self, agent_id: Option<&str>) -> PaymentChallenge {
        let agent_id = agent_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CHALLENGE_AGENT);

        let now = Utc::now();
        let id = challenge_id(now);
        let expires_at = now
            + chrono::Duration::from_std(self.config.challenge_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(5));

        tracing::debug!(challenge_id = %id, agent_id, "Issued payment challenge");
        PaymentChallenge {
            headers: X402Headers {
                www_authenticate: "x402".to_string(),
                payment_required: self.config.amount_lamports.to_string(),
                payment_challenge: id.clone(),
                payment_recipient: self.config.recipient.clone(),
            },
            id,
            agent_id: agent_id.to_string(),
            amount: self.config.amount_lamports,
            recipient: self.config.recipient.clone(),
            expires_at,
            status: ChallengeStatus::Pending,
        }
    }

    /// Judge a submission. The challenge id is not checked against any
    /// issued challenge.
    pub fn verify(&self, submission: &PaymentSubmission) -> PaymentVerdict {
        let has_signature = submission
            .signature
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_signature {
            return PaymentVerdict::Rejected("Missing payment signature");
        }

        let verdict = if self.source.sample(0..100) < MOCK_REJECTION_PERCENT {
            PaymentVerdict::Rejected("Payment verification failed")
        } else {
            PaymentVerdict::Verified
        };
        tracing::info!(
            challenge_id = submission.challenge_id.as_deref().unwrap_or("-"),
            verified = matches!(verdict, PaymentVerdict::Verified),
            "Payment verification"
        );
        verdict
    }
}

fn challenge_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CHALLENGE_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("chal_{}_{}", now.timestamp_millis(), suffix)
}
