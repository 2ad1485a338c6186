//! `shadowtrust doctor` - active health diagnostics.
//!
//! Validates configuration and probes the Solana RPC endpoint so problems
//! surface before the gateway starts serving mock data unexpectedly.

use std::time::Duration;

use crate::config::{Config, redact_url_for_display};
use crate::registry::AgentDirectory;
use crate::solana::mock::has_mock_record;
use crate::solana::{ChainRpc, SolanaRpcClient};

const RPC_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run diagnostic checks and print results.
pub async fn run_doctor_command(strict: bool) -> anyhow::Result<()> {
    println!("ShadowTrust Doctor");
    println!("==================\n");

    let mut passed = 0u32;
    let mut failed = 0u32;

    let config = Config::from_env();
    check(
        "Configuration",
        match &config {
            Ok(_) => CheckResult::Pass("environment parsed".to_string()),
            Err(e) => CheckResult::Fail(e.to_string()),
        },
        &mut passed,
        &mut failed,
    );

    match &config {
        Ok(config) => {
            check(
                "Solana RPC",
                check_solana_rpc(config.solana.rpc_url.as_deref()).await,
                &mut passed,
                &mut failed,
            );
            check(
                "Gateway bind port",
                check_bind(config),
                &mut passed,
                &mut failed,
            );
        }
        Err(_) => {
            check(
                "Solana RPC",
                CheckResult::Skip("configuration invalid".to_string()),
                &mut passed,
                &mut failed,
            );
        }
    }

    check(
        "Agent directory",
        check_directory(&AgentDirectory::builtin()),
        &mut passed,
        &mut failed,
    );

    println!();
    println!("  {passed} passed, {failed} failed");

    if failed > 0 && strict {
        anyhow::bail!("doctor strict mode failed with {failed} check(s)");
    }

    Ok(())
}

fn check(name: &str, result: CheckResult, passed: &mut u32, failed: &mut u32) {
    match result {
        CheckResult::Pass(detail) => {
            *passed += 1;
            println!("  [pass] {name}: {detail}");
        }
        CheckResult::Fail(detail) => {
            *failed += 1;
            println!("  [FAIL] {name}: {detail}");
        }
        CheckResult::Skip(reason) => {
            println!("  [skip] {name}: {reason}");
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CheckResult {
    Pass(String),
    Fail(String),
    Skip(String),
}

async fn check_solana_rpc(rpc_url: Option<&str>) -> CheckResult {
    let Some(url) = rpc_url else {
        return CheckResult::Skip("SOLANA_RPC_URL unset, gateway will serve mock data".to_string());
    };

    let client = match SolanaRpcClient::new(url) {
        Ok(client) => client,
        Err(e) => return CheckResult::Fail(format!("cannot construct RPC client: {e}")),
    };

    match tokio::time::timeout(RPC_PROBE_TIMEOUT, client.get_version()).await {
        Ok(Ok(Some(version))) => CheckResult::Pass(format!(
            "{} (solana-core {version})",
            redact_url_for_display(url)
        )),
        Ok(Ok(None)) => CheckResult::Fail(format!(
            "{} answered getVersion without a result",
            redact_url_for_display(url)
        )),
        Ok(Err(e)) => CheckResult::Fail(format!(
            "{} unreachable: {e}",
            redact_url_for_display(url)
        )),
        Err(_) => CheckResult::Fail(format!(
            "{} did not answer within {}s",
            redact_url_for_display(url),
            RPC_PROBE_TIMEOUT.as_secs()
        )),
    }
}

fn check_bind(config: &Config) -> CheckResult {
    let addr = config.server.socket_addr();
    match std::net::TcpListener::bind(addr) {
        Ok(_) => CheckResult::Pass(format!("{addr} available")),
        Err(e) => CheckResult::Fail(format!("cannot bind {addr}: {e}")),
    }
}

fn check_directory(directory: &AgentDirectory) -> CheckResult {
    if directory.is_empty() {
        return CheckResult::Fail("no agents registered".to_string());
    }
    let with_mock = directory
        .agents()
        .iter()
        .filter(|a| has_mock_record(a.id))
        .count();
    CheckResult::Pass(format!(
        "{} agents, {with_mock} with mock wallet data",
        directory.len()
    ))
}
