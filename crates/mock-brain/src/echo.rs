//! Echo brain implementation - echoes messages back.

use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

/// A simple brain that echoes messages back.
///
/// Useful for testing the message flow without any model.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("math: ");
    /// // Will respond with "math: <original message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        let response_text = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, message.text),
            None => message.text.clone(),
        };

        Ok(OutboundMessage::reply_to(&message, response_text))
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let brain = EchoBrain::new();
        let msg = InboundMessage::new("thread-1", "Hello!");

        let response = brain.process(msg).await.unwrap();
        assert_eq!(response.text, "Hello!");
        assert_eq!(response.thread_id, "thread-1");
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let brain = EchoBrain::with_prefix("Echo: ");
        let msg = InboundMessage::new("thread-1", "Hello!");

        let response = brain.process(msg).await.unwrap();
        assert_eq!(response.text, "Echo: Hello!");
    }

    #[tokio::test]
    async fn test_echo_stream_single_chunk() {
        let brain = EchoBrain::new();
        let chunks: Vec<_> = brain
            .process_stream(InboundMessage::new("t", "ping"))
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().text.as_deref(), Some("ping"));
    }

    #[tokio::test]
    async fn test_brain_is_ready() {
        let brain = EchoBrain::new();
        assert_eq!(brain.name(), "EchoBrain");
        assert!(brain.is_ready().await);
    }
}
