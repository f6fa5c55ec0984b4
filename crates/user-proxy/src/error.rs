//! Error types for the user proxy.

use orchestrator::OrchestratorError;
use thiserror::Error;

/// Errors surfaced by [`crate::UserProxy`].
///
/// Clarifications, unknown commands and unknown switch targets are not
/// errors; they come back as text.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Routing or the specialist failed.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}
