//! Error types for ShadowTrust.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Environment variable {key} is not valid unicode")]
    NotUnicode { key: String },
}

/// Solana JSON-RPC failures.
///
/// `Transport`, `Status` and `Decode` mean the endpoint could not be
/// talked to; `Node` means the node answered with a JSON-RPC error object.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("RPC transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("RPC response could not be decoded: {0}")]
    Decode(String),

    #[error("RPC node error {code}: {message}")]
    Node { code: i64, message: String },
}

impl RpcError {
    /// Whether this failure means the endpoint itself is unusable, as opposed
    /// to a single read being rejected by the node.
    pub fn is_transport_level(&self) -> bool {
        !matches!(self, Self::Node { .. })
    }
}

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to start server: {reason}")]
    StartupFailed { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
