//! The Brain trait definition.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::BrainError;
use crate::message::{InboundMessage, OutboundMessage};
use crate::stream::{BrainChunk, BrainStream};

/// A specialist agent adapter.
///
/// Implementations can range from simple echo bots to hosted models bound
/// to a toolset. This trait is object-safe and can be used with
/// `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Process an inbound message and generate a complete response.
    ///
    /// # Arguments
    ///
    /// * `message` - The incoming message to process.
    ///
    /// # Returns
    ///
    /// An `OutboundMessage` containing the response, or an error if
    /// processing failed.
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError>;

    /// Process an inbound message, yielding the response as it is produced.
    ///
    /// The default implementation runs [`Brain::process`] and yields a
    /// single chunk holding the tool calls and the full text.
    fn process_stream<'a>(&'a self, message: InboundMessage) -> BrainStream<'a> {
        stream::once(async move {
            let outbound = self.process(message).await?;
            Ok(BrainChunk {
                text: Some(outbound.text),
                tool_calls: outbound.tool_calls,
            })
        })
        .boxed()
    }

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process messages.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }

    /// Gracefully shut down the brain.
    ///
    /// Default implementation does nothing.
    async fn shutdown(&self) -> Result<(), BrainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ToolCallRecord;

    struct Fixed;

    #[async_trait]
    impl Brain for Fixed {
        async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
            Ok(OutboundMessage::reply_to(&message, "42")
                .with_tool_calls(vec![ToolCallRecord::new("add")]))
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_default_stream_wraps_process() {
        let brain = Fixed;
        let chunks: Vec<_> = brain
            .process_stream(InboundMessage::new("t", "2 + 40"))
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().unwrap();
        assert_eq!(chunk.text.as_deref(), Some("42"));
        assert_eq!(chunk.tool_calls, vec![ToolCallRecord::new("add")]);
    }
}
