//! Errors raised by the GitHub and math tools.
//!
//! A `ToolError` never reaches the router as a failure: the executor turns it
//! into an error result the model can read and react to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// The model asked for a tool this agent does not carry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing argument '{0}'")]
    MissingParameter(String),

    /// An argument is present but has the wrong shape, e.g. text where a number belongs.
    #[error("argument '{name}' {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The model's argument payload is not a JSON object.
    #[error("malformed tool arguments: {0}")]
    MalformedArguments(#[from] serde_json::Error),

    /// Could not reach GitHub or read its response.
    #[error("request to GitHub failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    GitHub { status: u16, message: String },

    /// Division by zero, or an expression meval rejects.
    #[error("math error: {0}")]
    Math(String),

    #[error("{0}")]
    Failed(String),
}
