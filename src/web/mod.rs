//! HTTP gateway for the reputation dashboard.

pub mod server;
pub mod types;

pub use self::server::{AppState, router, start_server};
