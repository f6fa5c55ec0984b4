//! Server configuration from the environment.

use std::env;
use std::net::SocketAddr;

use orchestrator::{OrchestratorError, StrategyKind};
use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:8989";
const DEFAULT_SERVICE_NAME: &str = "agent-router";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API_ADDR '{0}'")]
    InvalidAddr(String),

    #[error(transparent)]
    Strategy(#[from] OrchestratorError),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub addr: SocketAddr,
    pub service_name: String,
    pub service_version: String,
    /// Strategy for sessions that do not ask for one.
    pub default_kind: StrategyKind,
    /// Trace delegation in every new session.
    pub debug: bool,
}

impl ApiConfig {
    /// Load from the environment.
    ///
    /// - `API_ADDR` (default `0.0.0.0:8989`)
    /// - `SERVICE_NAME`, `SERVICE_VERSION`
    /// - `ORCHESTRATOR_TYPE` (default `keyword`)
    /// - `PROXY_DEBUG` (`true`/`1` to enable)
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("API_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.clone()))?;

        Ok(Self {
            addr,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            default_kind: StrategyKind::from_env()?,
            debug: env::var("PROXY_DEBUG")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8989)),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            default_kind: StrategyKind::Keyword,
            debug: false,
        }
    }
}
