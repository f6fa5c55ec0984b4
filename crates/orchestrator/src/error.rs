//! Error types for orchestrator operations.

use brain_core::BrainError;
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Required settings are missing or invalid. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configured routing strategy name is not recognised.
    #[error("unknown routing strategy '{0}' (expected keyword, llm or rule)")]
    UnknownStrategy(String),

    /// A specialist could not be built.
    #[error("failed to create {specialist} agent: {reason}")]
    AgentCreation { specialist: String, reason: String },

    /// Brain processing failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),
}
