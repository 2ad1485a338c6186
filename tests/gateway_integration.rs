//! End-to-end tests for the reputation gateway.
//!
//! These start the real Axum server on a random port and drive it over HTTP.
//! Live-mode tests point the provider at a second Axum app that speaks just
//! enough Solana JSON-RPC to answer `getBalance`, `getSignaturesForAddress`
//! and `getVersion`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use shadowtrust::config::{PaymentConfig, SolanaConfig};
use shadowtrust::payment::PaymentDesk;
use shadowtrust::registry::AgentDirectory;
use shadowtrust::reputation::{FixedScoreSource, ReputationCalculator};
use shadowtrust::solana::OnChainProvider;
use shadowtrust::web::{AppState, start_server};

const LIVE_LAMPORTS: u64 = 1_500_000_000;
const LIVE_SIGNATURES: usize = 20;

fn is_bind_permission_error<E: std::fmt::Display>(err: &E) -> bool {
    err.to_string().contains("Operation not permitted")
        || err.to_string().contains("Failed to bind")
}

#[derive(Clone, Copy)]
enum RpcBehavior {
    Healthy,
    ServerError,
    RejectBalance,
}

async fn start_fake_rpc(behavior: RpcBehavior) -> Option<String> {
    let app = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| async move {
            let id = request["id"].clone();
            let method = request["method"].as_str().unwrap_or_default().to_string();
            match (behavior, method.as_str()) {
                (RpcBehavior::ServerError, _) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response()
                }
                (RpcBehavior::RejectBalance, "getBalance") => Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32602, "message": "Invalid param: WrongSize" }
                }))
                .into_response(),
                (_, "getBalance") => Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": { "context": { "slot": 1 }, "value": LIVE_LAMPORTS }
                }))
                .into_response(),
                (_, "getSignaturesForAddress") => {
                    let limit = request["params"][1]["limit"].as_u64().unwrap_or(1000) as usize;
                    let signatures: Vec<Value> = (0..LIVE_SIGNATURES.min(limit))
                        .map(|i| {
                            json!({
                                "signature": format!("sig{i}"),
                                "slot": 1000 - i,
                                "err": null,
                                "memo": null,
                                "blockTime": 1_700_000_000 - i as i64,
                                "confirmationStatus": "finalized"
                            })
                        })
                        .collect();
                    Json(json!({ "jsonrpc": "2.0", "id": id, "result": signatures }))
                        .into_response()
                }
                (_, "getVersion") => Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": { "feature-set": 2891131721u64, "solana-core": "1.18.22" }
                }))
                .into_response(),
                _ => Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": "Method not found" }
                }))
                .into_response(),
            }
        }),
    );

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(e) if is_bind_permission_error(&e) => return None,
        Err(e) => panic!("Failed to bind fake RPC: {e}"),
    };
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Some(format!("http://{addr}/"))
}

async fn start_gateway(
    provider: OnChainProvider,
    draw: u32,
) -> Option<(SocketAddr, Arc<AppState>)> {
    let source = Arc::new(FixedScoreSource::constant(draw));
    let state = Arc::new(AppState::new(
        AgentDirectory::builtin(),
        provider,
        ReputationCalculator::new(source.clone()),
        PaymentDesk::with_source(PaymentConfig::default(), source),
    ));

    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    match start_server(addr, state.clone()).await {
        Ok(bound_addr) => Some((bound_addr, state)),
        Err(e) if is_bind_permission_error(&e) => None,
        Err(e) => panic!("Failed to start test server: {e:?}"),
    }
}

fn live_provider(url: &str) -> OnChainProvider {
    OnChainProvider::new(&SolanaConfig::from_url(Some(url)).unwrap()).unwrap()
}

async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}{path}"))
        .send()
        .await
        .expect("request");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}

// ============================================================================
// Mock mode
// ============================================================================

#[tokio::test]
async fn test_ghost_agent_resolves_to_unknown_wallet() {
    let Some((addr, state)) = start_gateway(OnChainProvider::mock(), 90).await else {
        return;
    };

    let (status, body) = get_json(addr, "/api/reputation/ghost").await;
    assert_eq!(status, 200);
    assert_eq!(body["walletAddress"], "unknown");
    assert_eq!(body["onChainData"]["transactions"], 0);
    assert_eq!(body["onChainData"]["balance"], "0.0000 SOL");
    assert_eq!(body["onChainData"]["programs"], json!([]));
    assert_eq!(body["dataSource"], "mock");

    state.shutdown().await;
}

#[tokio::test]
async fn test_leaderboard_is_sorted_and_complete() {
    let Some((addr, state)) = start_gateway(OnChainProvider::mock(), 90).await else {
        return;
    };

    let (status, body) = get_json(addr, "/api/leaderboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["total"], 7);
    assert!(body["lastUpdated"].as_str().unwrap().ends_with('Z'));

    let agents = body["agents"].as_array().unwrap();
    let scores: Vec<u64> = agents.iter().map(|a| a["score"].as_u64().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "scores: {scores:?}");
    assert!(scores.iter().all(|s| *s <= 100));

    let said = agents.iter().find(|a| a["id"] == "said").unwrap();
    assert_eq!(said["name"], "SAID Protocol");
    assert_eq!(said["tags"], json!(["identity", "infra"]));
    assert_eq!(said["onChain"], json!({ "balance": "5.0000", "transactions": 56 }));

    state.shutdown().await;
}

#[tokio::test]
async fn test_payment_round_trip_outcomes() {
    let Some((addr, state)) = start_gateway(OnChainProvider::mock(), 50).await else {
        return;
    };
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/api/payment?agentId=claude"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 402);
    assert_eq!(resp.headers()["www-authenticate"], "x402");
    assert_eq!(resp.headers()["x-payment-required"], "1000");
    let body: Value = resp.json().await.unwrap();
    let challenge_id = body["challenge"]["id"].as_str().unwrap().to_string();
    assert!(challenge_id.starts_with("chal_"));

    let resp = client
        .post(format!("http://{addr}/api/payment"))
        .json(&json!({
            "challengeId": challenge_id,
            "signature": "5VERv8NMvz",
            "agentId": "claude",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["verified"], true);
    assert_eq!(body["reputation"]["agentId"], "claude");
    assert_eq!(body["reputation"]["trend"], "up");

    let resp = client
        .post(format!("http://{addr}/api/payment"))
        .json(&json!({ "challengeId": challenge_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 402);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing payment signature");

    state.shutdown().await;
}

// ============================================================================
// Live mode
// ============================================================================

#[tokio::test]
async fn test_live_reputation_reads_rpc() {
    let Some(url) = start_fake_rpc(RpcBehavior::Healthy).await else {
        return;
    };
    let Some((addr, state)) = start_gateway(live_provider(&url), 90).await else {
        return;
    };

    let (_, body) = get_json(addr, "/api/reputation/said").await;
    assert_eq!(body["dataSource"], "live");
    assert_eq!(body["walletAddress"], "3mRt5hZ9k8p2b6c7d8e0f1a4b5c6d7e8f9a0b1c2");
    assert_eq!(body["onChainData"]["balance"], "1.5000 SOL");
    assert_eq!(body["onChainData"]["transactions"], 20);
    assert_eq!(
        body["onChainData"]["programs"],
        json!(["System Program", "Token Program"])
    );
    // tx 40, balance 15, programs 30: 16 + 4.5 + 9 = 29.5
    assert_eq!(body["breakdown"]["onChainActivity"], 29);

    let (_, health) = get_json(addr, "/api/health").await;
    assert_eq!(health["rpcHealthy"], true);

    let (_, txs) = get_json(addr, "/api/reputation/said/transactions?limit=3").await;
    assert_eq!(txs["signatures"].as_array().unwrap().len(), 3);
    assert_eq!(txs["signatures"][0]["signature"], "sig0");

    state.shutdown().await;
}

#[tokio::test]
async fn test_live_failure_matches_mock_shape() {
    let Some(url) = start_fake_rpc(RpcBehavior::ServerError).await else {
        return;
    };
    let Some((live_addr, live_state)) = start_gateway(live_provider(&url), 90).await else {
        return;
    };
    let Some((mock_addr, mock_state)) = start_gateway(OnChainProvider::mock(), 90).await else {
        return;
    };

    let (live_status, live) = get_json(live_addr, "/api/reputation/shadowbuilder").await;
    let (_, mock) = get_json(mock_addr, "/api/reputation/shadowbuilder").await;

    assert_eq!(live_status, 200);
    assert_eq!(sorted_keys(&live), sorted_keys(&mock));
    assert_eq!(sorted_keys(&live["onChainData"]), sorted_keys(&mock["onChainData"]));
    assert_eq!(live["dataSource"], "live");
    assert_eq!(mock["dataSource"], "mock");
    // Fallback data is the mock record.
    assert_eq!(live["onChainData"]["transactions"], 47);
    assert_eq!(live["walletAddress"], mock["walletAddress"]);
    assert_eq!(live["breakdown"], mock["breakdown"]);

    let (_, health) = get_json(live_addr, "/api/health").await;
    assert_eq!(health["rpcHealthy"], false);

    live_state.shutdown().await;
    mock_state.shutdown().await;
}

#[tokio::test]
async fn test_live_node_rejection_defaults_balance() {
    let Some(url) = start_fake_rpc(RpcBehavior::RejectBalance).await else {
        return;
    };
    let Some((addr, state)) = start_gateway(live_provider(&url), 90).await else {
        return;
    };

    let (_, body) = get_json(addr, "/api/reputation/sipher").await;
    assert_eq!(body["onChainData"]["balance"], "0.0000 SOL");
    assert_eq!(body["onChainData"]["transactions"], 20);
    assert_eq!(body["walletAddress"], "8mYt9Rc1hB2iK5o7p0s8u2v3w6x7y0z1a2d3e4f5g6h7i8j9k");

    state.shutdown().await;
}
