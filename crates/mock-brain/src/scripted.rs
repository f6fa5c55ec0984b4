//! Scripted brain implementation - replays a fixed sequence of chunks.

use std::sync::Mutex;

use brain_core::{
    async_trait, Brain, BrainChunk, BrainError, BrainStream, InboundMessage, OutboundMessage,
};
use futures::stream::{self, StreamExt};

#[derive(Debug, Clone)]
enum Step {
    Chunk(BrainChunk),
    Fail(String),
}

/// A brain that answers every message with the same script.
///
/// The script is a list of chunks, optionally ending in a failure. Every
/// inbound message is recorded so tests can assert on what was dispatched
/// and on which thread.
///
/// # Example
///
/// ```rust
/// use mock_brain::ScriptedBrain;
///
/// let brain = ScriptedBrain::new("math")
///     .tools(["add"])
///     .text("The answer is 8");
/// ```
#[derive(Debug)]
pub struct ScriptedBrain {
    name: String,
    script: Vec<Step>,
    received: Mutex<Vec<InboundMessage>>,
}

impl ScriptedBrain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Vec::new(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a brain that answers with a single text chunk.
    pub fn replying(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    /// Append a text chunk.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.chunk(BrainChunk::text(text))
    }

    /// Append a chunk announcing tool calls.
    pub fn tools<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chunk(BrainChunk::tools(names))
    }

    /// Append an arbitrary chunk.
    pub fn chunk(mut self, chunk: BrainChunk) -> Self {
        self.script.push(Step::Chunk(chunk));
        self
    }

    /// End the script with an error.
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        self.script.push(Step::Fail(reason.into()));
        self
    }

    /// Messages received so far, in arrival order.
    pub fn received(&self) -> Vec<InboundMessage> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Texts of the messages received so far.
    pub fn received_texts(&self) -> Vec<String> {
        self.received().into_iter().map(|m| m.text).collect()
    }

    fn record(&self, message: &InboundMessage) {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        self.record(&message);

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for step in &self.script {
            match step {
                Step::Chunk(chunk) => {
                    tool_calls.extend(chunk.tool_calls.iter().cloned());
                    if let Some(t) = &chunk.text {
                        text.push_str(t);
                    }
                }
                Step::Fail(reason) => return Err(BrainError::ProcessingFailed(reason.clone())),
            }
        }

        Ok(OutboundMessage::reply_to(&message, text).with_tool_calls(tool_calls))
    }

    fn process_stream<'a>(&'a self, message: InboundMessage) -> BrainStream<'a> {
        self.record(&message);

        stream::iter(self.script.iter().cloned())
            .map(|step| match step {
                Step::Chunk(chunk) => Ok(chunk),
                Step::Fail(reason) => Err(BrainError::ProcessingFailed(reason)),
            })
            .boxed()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::ToolCallRecord;

    #[tokio::test]
    async fn test_process_concatenates_script() {
        let brain = ScriptedBrain::new("math")
            .tools(["add"])
            .text("5 + 3 ")
            .text("= 8");

        let reply = brain.process(InboundMessage::new("t1", "5 + 3")).await.unwrap();

        assert_eq!(reply.text, "5 + 3 = 8");
        assert_eq!(reply.tool_calls, vec![ToolCallRecord::new("add")]);
        assert_eq!(brain.received_texts(), vec!["5 + 3"]);
    }

    #[tokio::test]
    async fn test_stream_yields_chunks_in_order() {
        let brain = ScriptedBrain::new("github").text("a").tools(["x"]).text("b");

        let chunks: Vec<_> = brain
            .process_stream(InboundMessage::new("t1", "go"))
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].as_ref().unwrap().text.as_deref(), Some("a"));
        assert_eq!(chunks[1].as_ref().unwrap().tool_calls[0].name, "x");
        assert_eq!(brain.received()[0].thread_id, "t1");
    }

    #[tokio::test]
    async fn test_failure_step() {
        let brain = ScriptedBrain::new("github").text("partial").fail("rate limited");

        let err = brain.process(InboundMessage::new("t", "q")).await.unwrap_err();
        assert!(matches!(err, BrainError::ProcessingFailed(_)));

        let chunks: Vec<_> = brain
            .process_stream(InboundMessage::new("t", "q"))
            .collect()
            .await;
        assert!(chunks[0].is_ok());
        assert!(chunks[1].is_err());
    }
}
