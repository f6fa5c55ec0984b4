//! Core trait and types for specialist agent adapters.
//!
//! Every specialist the router can dispatch to is a [`Brain`]: a hosted
//! model bound to a fixed toolset, or a test double standing in for one.
//! This crate defines:
//!
//! - [`Brain`] - The adapter contract (`process` and `process_stream`)
//! - [`InboundMessage`] / [`OutboundMessage`] - Message types for input/output
//! - [`BrainChunk`] / [`BrainStream`] - Streaming output with tool-call records
//! - [`BrainError`] - Error types for brain operations
//! - [`ToolExecutor`] - Trait for tool execution during a model turn
//! - [`ConversationHistory`] - Per-thread turn history
//!
//! # Example
//!
//! ```rust
//! use brain_core::{Brain, BrainError, InboundMessage, OutboundMessage};
//! use async_trait::async_trait;
//!
//! struct MyBrain;
//!
//! #[async_trait]
//! impl Brain for MyBrain {
//!     async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
//!         Ok(OutboundMessage::reply_to(&message, "Hello!"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBrain"
//!     }
//! }
//! ```

mod error;
mod history;
mod message;
mod prompt;
mod stream;
mod tools;
mod trait_def;

pub use error::BrainError;
pub use history::{ConversationHistory, HistoryMessage};
pub use message::{InboundMessage, OutboundMessage};
pub use prompt::hash_prompt;
pub use stream::{BrainChunk, BrainStream, ToolCallRecord};
pub use tools::{ToolExecutor, ToolRequest, ToolResult, ToolSpec};
pub use trait_def::Brain;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
