//! Process bootstrap: `.env` loading and tracing setup.
//!
//! dotenvy never overwrites existing env vars, so the effective priority is:
//!
//!   explicit env vars > `./.env`

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

const DEFAULT_LOG_FILTER: &str = "shadowtrust=info,tower_http=info";

/// Path of the loaded `.env`, or `None` if there was none. Set once.
static DOTENV: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Load `./.env` once per process. A missing file is not an error.
///
/// Config loading runs before the subscriber exists, so the outcome is
/// recorded here and reported by [`init_tracing`].
pub fn load_dotenv() -> Option<&'static PathBuf> {
    DOTENV.get_or_init(|| dotenvy::dotenv().ok()).as_ref()
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the built-in filter. Calling this twice is harmless;
/// the second install attempt is ignored.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    match DOTENV.get() {
        Some(Some(path)) => tracing::debug!("Loaded environment from {}", path.display()),
        Some(None) => tracing::debug!("No .env file found; using process environment"),
        None => {}
    }
}
