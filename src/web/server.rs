//! Axum HTTP server for the reputation gateway.
//!
//! Handles the leaderboard, per-agent reputation, x402 payment challenge,
//! and health routes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::ServerError;
use crate::payment::{PaymentDesk, PaymentSubmission, PaymentVerdict};
use crate::registry::AgentDirectory;
use crate::reputation::{ActivityBlend, ReputationCalculator};
use crate::solana::OnChainProvider;
use crate::timefmt::iso8601;
use crate::web::types::*;

const DEFAULT_SIGNATURE_LIMIT: usize = 5;

/// Shared state for all gateway handlers.
pub struct AppState {
    /// Registered agents, in leaderboard tie-break order.
    pub directory: AgentDirectory,
    /// On-chain snapshot source (live or mock, fixed at construction).
    pub provider: OnChainProvider,
    pub calculator: ReputationCalculator,
    pub payments: PaymentDesk,
    /// Shutdown signal sender, populated by `start_server`.
    pub shutdown_tx: tokio::sync::RwLock<Option<oneshot::Sender<()>>>,
}

impl AppState {
    pub fn new(
        directory: AgentDirectory,
        provider: OnChainProvider,
        calculator: ReputationCalculator,
        payments: PaymentDesk,
    ) -> Self {
        Self {
            directory,
            provider,
            calculator,
            payments,
            shutdown_tx: tokio::sync::RwLock::new(None),
        }
    }

    /// Production wiring: built-in agents, thread-local randomness.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        Ok(Self::new(
            AgentDirectory::builtin(),
            OnChainProvider::new(&config.solana)?,
            ReputationCalculator::default(),
            PaymentDesk::new(config.payment.clone()),
        ))
    }

    /// Ask a running server to stop. No-op if it was never started.
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.write().await.take() {
            let _ = tx.send(());
        }
    }
}

/// Build the router without binding a listener.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([
            header::WWW_AUTHENTICATE,
            HeaderName::from_static("x-payment-required"),
            HeaderName::from_static("x-payment-challenge"),
            HeaderName::from_static("x-payment-recipient"),
        ]);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .route("/api/reputation/{agent_id}", get(reputation_handler))
        .route(
            "/api/reputation/{agent_id}/transactions",
            get(transactions_handler),
        )
        .route(
            "/api/payment",
            get(payment_challenge_handler).post(payment_verify_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Returns the actual bound `SocketAddr` (useful when binding to port 0).
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
) -> crate::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::StartupFailed {
            reason: format!("Failed to bind to {}: {}", addr, e),
        })?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| ServerError::StartupFailed {
            reason: format!("Failed to get local addr: {}", e),
        })?;

    let app = router(state.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    *state.shutdown_tx.write().await = Some(shutdown_tx);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Reputation gateway shutting down");
            })
            .await
        {
            tracing::error!("Reputation gateway server error: {}", e);
        }
    });

    tracing::info!(addr = %bound_addr, "Reputation gateway listening");
    Ok(bound_addr)
}

// --- Health ---

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        data_source: state.provider.data_source(),
        rpc_healthy: state.provider.health_check().await,
    })
}

// --- Leaderboard ---

async fn leaderboard_handler(State(state): State<Arc<AppState>>) -> Json<LeaderboardResponse> {
    let state = state.as_ref();
    let mut agents = join_all(state.directory.agents().iter().map(|agent| async move {
        let snapshot = state
            .provider
            .fetch_snapshot(agent.id, Some(agent.wallet_address))
            .await;
        let result = state
            .calculator
            .calculate(&snapshot, agent.id, ActivityBlend::Leaderboard);

        LeaderboardEntry {
            id: agent.id.to_string(),
            name: agent.name.to_string(),
            score: result.overall(),
            trend: agent.trend,
            attestations: snapshot.transaction_count,
            tags: agent.tags.iter().map(|t| t.to_string()).collect(),
            on_chain: LeaderboardOnChain {
                balance: format_balance(snapshot.balance),
                transactions: snapshot.transaction_count,
            },
        }
    }))
    .await;

    // Stable: equal scores keep directory order.
    agents.sort_by(|a, b| b.score.cmp(&a.score));

    Json(LeaderboardResponse {
        total: agents.len(),
        agents,
        last_updated: iso8601(&Utc::now()),
        data_source: state.provider.data_source(),
    })
}

// --- Reputation ---

async fn reputation_handler(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Json<ReputationResponse> {
    let wallet = state.directory.wallet_for(&agent_id);
    let snapshot = state.provider.fetch_snapshot(&agent_id, wallet).await;
    let result = state
        .calculator
        .calculate(&snapshot, &agent_id, ActivityBlend::Detail);

    Json(ReputationResponse {
        name: state.directory.name_for(&agent_id).to_string(),
        wallet_address: snapshot.wallet_address.clone(),
        overall: result.overall(),
        breakdown: *result.breakdown(),
        trend: state.directory.trend_for(&agent_id),
        attestations: snapshot.transaction_count,
        on_chain_data: OnChainDataView {
            balance: format!("{} SOL", format_balance(snapshot.balance)),
            transactions: snapshot.transaction_count,
            last_active: iso8601(&snapshot.last_active_at),
            programs: snapshot.programs,
        },
        last_updated: iso8601(&Utc::now()),
        data_source: state.provider.data_source(),
        agent_id,
    })
}

async fn transactions_handler(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Json<TransactionsResponse> {
    let wallet = state.directory.wallet_for(&agent_id);
    let signatures = state
        .provider
        .recent_signatures(wallet, query.limit.unwrap_or(DEFAULT_SIGNATURE_LIMIT))
        .await;

    Json(TransactionsResponse {
        agent_id,
        wallet_address: wallet.map(str::to_string),
        signatures,
        data_source: state.provider.data_source(),
    })
}

// --- Payment ---

async fn payment_challenge_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentChallengeQuery>,
) -> Response {
    let challenge = state.payments.issue_challenge(query.agent_id.as_deref());

    let mut headers = HeaderMap::new();
    for (name, value) in challenge.headers.pairs() {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => tracing::warn!(header = %name, "Skipping non-ASCII payment header"),
        }
    }

    (
        StatusCode::PAYMENT_REQUIRED,
        headers,
        Json(PaymentChallengeResponse { challenge }),
    )
        .into_response()
}

async fn payment_verify_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PaymentSubmission>, JsonRejection>,
) -> Response {
    let submission = match body {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable payment body");
            return payment_failed("Invalid payment submission");
        }
    };

    match state.payments.verify(&submission) {
        PaymentVerdict::Rejected(reason) => payment_failed(reason),
        PaymentVerdict::Verified => {
            let agent_id = submission.target_agent();
            let wallet = state.directory.wallet_for(agent_id);
            let snapshot = state.provider.fetch_snapshot(agent_id, wallet).await;
            let result = state
                .calculator
                .calculate(&snapshot, agent_id, ActivityBlend::Detail);

            Json(PaymentVerifiedResponse {
                verified: true,
                reputation: PaidReputation {
                    agent_id: agent_id.to_string(),
                    overall: result.overall(),
                    breakdown: *result.breakdown(),
                    attestations: snapshot.transaction_count,
                    trend: state.directory.trend_for(agent_id),
                },
            })
            .into_response()
        }
    }
}

fn payment_failed(reason: &str) -> Response {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(ErrorResponse {
            error: reason.to_string(),
        }),
    )
        .into_response()
}
