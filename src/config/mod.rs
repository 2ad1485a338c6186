//! Configuration for ShadowTrust.
//!
//! Everything comes from env vars. `./.env` is loaded via dotenvy early in
//! startup and never overrides variables that are already set.

pub(crate) mod helpers;
mod server;
mod solana;

use crate::error::ConfigError;

pub use self::server::{PaymentConfig, ServerConfig};
pub use self::solana::{SolanaConfig, redact_url_for_display};

use self::helpers::{normalize_variant, optional_env};

/// Main configuration for the service.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub solana: SolanaConfig,
    pub server: ServerConfig,
    pub payment: PaymentConfig,
    pub log_format: LogFormat,
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub(crate) fn parse(value: &str, key: &str) -> Result<Self, ConfigError> {
        match normalize_variant(value).as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected 'pretty' or 'json', got '{value}'"),
            }),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        crate::bootstrap::load_dotenv();

        let log_format = optional_env("SHADOWTRUST_LOG_FORMAT")?
            .map(|v| LogFormat::parse(&v, "SHADOWTRUST_LOG_FORMAT"))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            solana: SolanaConfig::resolve()?,
            server: ServerConfig::resolve()?,
            payment: PaymentConfig::resolve()?,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_accepts_known_variants() {
        assert_eq!(LogFormat::parse("JSON", "K").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse(" pretty ", "K").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("text", "K").unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn log_format_rejects_unknown_variant() {
        let err = LogFormat::parse("xml", "SHADOWTRUST_LOG_FORMAT").unwrap_err();
        assert!(err.to_string().contains("SHADOWTRUST_LOG_FORMAT"));
    }
}
