//! Message types passed into and out of a brain.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::stream::ToolCallRecord;

/// A message addressed to a specialist.
///
/// `thread_id` is an opaque conversation handle. Brains that keep history
/// key it by this id, so a fresh id starts a fresh conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Conversation thread this message belongs to.
    pub thread_id: String,
    /// Message text.
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl InboundMessage {
    /// Create a message on a thread, stamped with the current time.
    pub fn new(thread_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Create a message with an explicit timestamp.
    pub fn with_timestamp(
        thread_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// A brain's complete answer to one inbound message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Thread the answer belongs to.
    pub thread_id: String,
    /// Answer text.
    pub text: String,
    /// Tools invoked while producing the answer, in call order.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
}

impl OutboundMessage {
    /// Create a reply on the same thread as `message`.
    pub fn reply_to(message: &InboundMessage, text: impl Into<String>) -> Self {
        Self {
            thread_id: message.thread_id.clone(),
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Attach the tools invoked while producing this reply.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCallRecord>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_keeps_thread() {
        let inbound = InboundMessage::with_timestamp("thread-1", "hi", 42);
        let reply = OutboundMessage::reply_to(&inbound, "hello");

        assert_eq!(reply.thread_id, "thread-1");
        assert_eq!(reply.text, "hello");
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_new_stamps_time() {
        let inbound = InboundMessage::new("t", "x");
        assert!(inbound.timestamp > 0);
    }
}
