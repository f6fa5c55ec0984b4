//! Per-request record of which tools a specialist invoked.

use indexmap::IndexSet;

/// Tool names in first-invocation order, without duplicates.
#[derive(Debug, Default, Clone)]
pub struct ToolTracker {
    seen: IndexSet<String>,
}

impl ToolTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call. Returns `true` the first time a name is seen.
    pub fn observe(&mut self, name: &str) -> bool {
        self.seen.insert(name.to_string())
    }

    pub fn names(&self) -> Vec<String> {
        self.seen.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Trailer appended to a reply, or `None` when no tool ran.
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let joined = self.seen.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        Some(format!("\n\n📋 Tools used: {}", joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupes_in_first_seen_order() {
        let mut tracker = ToolTracker::new();
        assert!(tracker.observe("multiply"));
        assert!(tracker.observe("add"));
        assert!(!tracker.observe("multiply"));

        assert_eq!(tracker.names(), vec!["multiply", "add"]);
        assert_eq!(
            tracker.summary().as_deref(),
            Some("\n\n📋 Tools used: multiply, add")
        );
    }

    #[test]
    fn test_empty_has_no_summary() {
        assert!(ToolTracker::new().summary().is_none());
    }
}
