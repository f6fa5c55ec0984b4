//! Per-session conversation state: history, preferences and counters.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Number of history entries kept per session.
pub const MAX_HISTORY: usize = 20;

/// Preference key naming the repository used when none is given.
pub const DEFAULT_REPO_KEY: &str = "default_repo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the proxy's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded conversation history, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, dropping the oldest ones past capacity.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push_back(HistoryEntry {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// User preferences in insertion order.
pub type Preferences = IndexMap<String, String>;

/// How many interactions the proxy handled itself versus delegated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DelegationStats {
    pub proxy_handled: u64,
    pub agent_delegated: u64,
    pub clarifications: u64,
}

impl DelegationStats {
    pub fn total(&self) -> u64 {
        self.proxy_handled + self.agent_delegated + self.clarifications
    }
}
