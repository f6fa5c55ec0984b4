//! Mock brain implementations for exercising the router without a model.
//!
//! - `EchoBrain` - Echoes messages back
//! - `ScriptedBrain` - Replays a fixed script of chunks and records what it received
//! - `FailingBrain` - Always fails
//!
//! For a hosted model, use the `chat-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, EchoBrain, InboundMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!
//!     let message = InboundMessage::new("thread-1", "Hello!");
//!
//!     let response = brain.process(message).await?;
//!     println!("Response: {}", response.text);
//!     Ok(())
//! }
//! ```

mod echo;
mod failing;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainChunk, BrainError, BrainStream, InboundMessage, OutboundMessage,
    ToolCallRecord,
};

pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use scripted::ScriptedBrain;
