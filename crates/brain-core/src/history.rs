//! Conversation history management.
//!
//! Per-thread turn history with automatic trimming and LRU eviction of
//! threads. A specialist that is handed a fresh thread id starts with an
//! empty history, which is how the router resets a conversation.

use indexmap::IndexMap;
use tokio::sync::RwLock;

/// Default maximum number of threads to track before LRU eviction.
const DEFAULT_MAX_THREADS: usize = 1000;

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl HistoryMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-thread conversation history with LRU eviction.
///
/// # Example
///
/// ```rust
/// use brain_core::ConversationHistory;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let history = ConversationHistory::new(5); // Keep 5 turns
///
///     history.add_exchange("thread-a", "2 + 2?", "4").await;
///     history.add_exchange("thread-a", "times 3?", "12").await;
///
///     let messages = history.get("thread-a").await;
///     assert_eq!(messages.len(), 4); // 2 turns = 4 messages
/// }
/// ```
#[derive(Debug)]
pub struct ConversationHistory {
    /// Insertion order doubles as recency order.
    threads: RwLock<IndexMap<String, Vec<HistoryMessage>>>,
    /// Maximum number of turns (user + assistant pairs) kept per thread.
    max_turns: usize,
    max_threads: usize,
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ConversationHistory {
    /// Create a new conversation history with the given max turns.
    pub fn new(max_turns: usize) -> Self {
        Self::with_limits(max_turns, DEFAULT_MAX_THREADS)
    }

    /// Create a new conversation history with custom limits.
    pub fn with_limits(max_turns: usize, max_threads: usize) -> Self {
        Self {
            threads: RwLock::new(IndexMap::new()),
            max_turns,
            max_threads,
        }
    }

    /// Get the conversation history for a thread, marking it recently used.
    pub async fn get(&self, thread_id: &str) -> Vec<HistoryMessage> {
        let mut threads = self.threads.write().await;

        match threads.shift_remove(thread_id) {
            Some(entry) => {
                let result = entry.clone();
                threads.insert(thread_id.to_string(), entry);
                result
            }
            None => Vec::new(),
        }
    }

    /// Add a user message and assistant response to a thread.
    pub async fn add_exchange(&self, thread_id: &str, user_msg: &str, assistant_msg: &str) {
        let mut threads = self.threads.write().await;

        let mut history = threads.shift_remove(thread_id).unwrap_or_default();
        history.push(HistoryMessage::user(user_msg));
        history.push(HistoryMessage::assistant(assistant_msg));

        let max_messages = self.max_turns * 2;
        if history.len() > max_messages {
            let to_remove = history.len() - max_messages;
            history.drain(0..to_remove);
        }

        threads.insert(thread_id.to_string(), history);

        while threads.len() > self.max_threads {
            threads.shift_remove_index(0);
        }
    }

    /// Clear history for one thread.
    pub async fn clear(&self, thread_id: &str) {
        self.threads.write().await.shift_remove(thread_id);
    }

    /// Clear all conversation histories.
    pub async fn clear_all(&self) {
        self.threads.write().await.clear();
    }

    /// Number of tracked threads.
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_get_history() {
        let history = ConversationHistory::new(5);

        history.add_exchange("t1", "list repos for octocat", "Found 8 repositories").await;
        history.add_exchange("t1", "show the first", "Hello-World").await;

        let messages = history.get("t1").await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], HistoryMessage::user("list repos for octocat"));
        assert_eq!(messages[1], HistoryMessage::assistant("Found 8 repositories"));
    }

    #[tokio::test]
    async fn test_history_trimming() {
        let history = ConversationHistory::new(2);

        history.add_exchange("t1", "First", "Response 1").await;
        history.add_exchange("t1", "Second", "Response 2").await;
        history.add_exchange("t1", "Third", "Response 3").await;

        let messages = history.get("t1").await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "Second");
        assert_eq!(messages[3].content, "Response 3");
    }

    #[tokio::test]
    async fn test_fresh_thread_is_empty() {
        let history = ConversationHistory::new(5);
        history.add_exchange("old", "Hello", "Hi!").await;

        assert!(history.get("new").await.is_empty());
        assert_eq!(history.get("old").await.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_thread_and_all() {
        let history = ConversationHistory::new(5);
        history.add_exchange("a", "Hello", "Hi!").await;
        history.add_exchange("b", "Hey", "Hello!").await;

        history.clear("a").await;
        assert!(history.get("a").await.is_empty());
        assert_eq!(history.get("b").await.len(), 2);

        history.clear_all().await;
        assert_eq!(history.thread_count().await, 0);
    }

    #[tokio::test]
    async fn test_lru_access_order() {
        let history = ConversationHistory::with_limits(5, 3);

        history.add_exchange("a", "Hello", "Hi!").await;
        history.add_exchange("b", "Hello", "Hi!").await;
        history.add_exchange("c", "Hello", "Hi!").await;

        let _ = history.get("a").await;
        history.add_exchange("d", "Hello", "Hi!").await;

        assert_eq!(history.thread_count().await, 3);
        assert!(history.get("b").await.is_empty());
        assert!(!history.get("a").await.is_empty());
        assert!(!history.get("d").await.is_empty());
    }
}
