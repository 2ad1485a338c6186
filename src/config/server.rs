use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

pub const DEFAULT_PAYMENT_RECIPIENT: &str = "ShadowTrustTreasury";
pub const DEFAULT_PAYMENT_AMOUNT_LAMPORTS: u64 = 1000;
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 5 * 60;

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: parse_optional_env("SHADOWTRUST_HOST", defaults.host)?,
            port: parse_optional_env("SHADOWTRUST_PORT", defaults.port)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// x402 payment challenge parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfig {
    pub recipient: String,
    pub amount_lamports: u64,
    pub challenge_ttl: Duration,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_PAYMENT_RECIPIENT.to_string(),
            amount_lamports: DEFAULT_PAYMENT_AMOUNT_LAMPORTS,
            challenge_ttl: Duration::from_secs(DEFAULT_CHALLENGE_TTL_SECS),
        }
    }
}

impl PaymentConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let ttl_secs: u64 =
            parse_optional_env("PAYMENT_CHALLENGE_TTL_SECS", DEFAULT_CHALLENGE_TTL_SECS)?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PAYMENT_CHALLENGE_TTL_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            recipient: optional_env("PAYMENT_RECIPIENT")?
                .unwrap_or_else(|| DEFAULT_PAYMENT_RECIPIENT.to_string()),
            amount_lamports: parse_optional_env(
                "PAYMENT_AMOUNT_LAMPORTS",
                DEFAULT_PAYMENT_AMOUNT_LAMPORTS,
            )?,
            challenge_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_binds_loopback() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn default_payment_matches_x402_demo_values() {
        let config = PaymentConfig::default();
        assert_eq!(config.recipient, "ShadowTrustTreasury");
        assert_eq!(config.amount_lamports, 1000);
        assert_eq!(config.challenge_ttl, Duration::from_secs(300));
    }
}
