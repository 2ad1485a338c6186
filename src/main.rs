use std::sync::Arc;

use clap::Parser;

use shadowtrust::bootstrap;
use shadowtrust::cli::{Cli, Command, run_doctor_command};
use shadowtrust::config::Config;
use shadowtrust::web::{AppState, start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Doctor { strict } => run_doctor_command(strict).await,
        Command::Serve { host, port } => serve(host, port).await,
    }
}

async fn serve(host: Option<std::net::IpAddr>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    bootstrap::init_tracing(config.log_format);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let addr = start_server(config.server.socket_addr(), state.clone()).await?;
    tracing::info!(
        "ShadowTrust gateway ready at http://{} ({} data)",
        addr,
        state.provider.data_source().as_str()
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    state.shutdown().await;
    Ok(())
}
