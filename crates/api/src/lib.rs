//! HTTP surface for the agent router.
//!
//! One [`user_proxy::UserProxy`] per session id, created on first use. All
//! endpoints except `/` and `/health` answer 503 until startup has finished.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
