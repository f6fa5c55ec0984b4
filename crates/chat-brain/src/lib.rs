//! Chat-completions brain implementation.
//!
//! [`ChatBrain`] talks to any OpenAI-compatible `/v1/chat/completions`
//! endpoint. A brain built with [`ChatBrain::with_tools`] advertises the
//! executor's tools to the model and runs the function-calling loop until
//! the model answers in text.
//!
//! # Features
//!
//! - Per-thread conversation history
//! - Bounded tool-calling rounds
//! - Lazy streaming: each round is requested only when the caller polls
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use chat_brain::{ChatBrain, ChatBrainConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChatBrainConfig::from_env()?;
//!     let brain = ChatBrain::new(config)?;
//!     // Use the brain...
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use api_types::{ChatMessage, FunctionDefinition, ToolDefinition};
pub use brain::ChatBrain;
pub use config::{ChatBrainConfig, ChatBrainConfigBuilder};

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, ConversationHistory, InboundMessage, OutboundMessage,
    ToolExecutor,
};
