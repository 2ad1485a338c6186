//! Command-line interface.

pub mod doctor;

use std::net::IpAddr;

use clap::{Parser, Subcommand};

pub use self::doctor::run_doctor_command;

#[derive(Parser, Debug)]
#[command(name = "shadowtrust", version, about = "Agent reputation gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP gateway (default).
    Serve {
        /// Bind host; overrides SHADOWTRUST_HOST.
        #[arg(long)]
        host: Option<IpAddr>,
        /// Bind port; overrides SHADOWTRUST_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Probe configuration and the Solana RPC endpoint.
    Doctor {
        /// Exit non-zero if any check fails.
        #[arg(long)]
        strict: bool,
    },
}
