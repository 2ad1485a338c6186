//! ShadowTrust: agent reputation gateway.
//!
//! Blends a wallet's Solana activity (balance, signature count, programs)
//! with placeholder trust sub-scores into a single weighted reputation, and
//! serves it over HTTP alongside an x402 payment challenge flow.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod payment;
pub mod registry;
pub mod reputation;
pub mod solana;
pub mod timefmt;
pub mod web;

pub use error::{Error, Result};
