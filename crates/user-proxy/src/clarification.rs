//! Detection of inputs that need a follow-up question before routing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::context::{Preferences, DEFAULT_REPO_KEY};

static AMBIGUOUS_PRONOUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(it|that|this|there)\b").expect("valid pronoun regex"));

/// An explicit `owner/repo` token.
pub(crate) static OWNER_REPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w-]+/[\w-]+").expect("valid owner/repo regex"));

static REPO_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"repo|repository|[\w-]+/[\w-]+").expect("valid repository mention regex")
});

static VAGUE_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((help|info|tell me|show me|what)(\s+about)?|yes|no|ok|okay|sure)$")
        .expect("valid vague request regex")
});

const REPOSITORY_KEYWORDS: [&str; 5] = ["file", "commit", "branch", "pull request", "issue"];

/// Inputs accepted as "yes, use the suggestion".
const AFFIRMATIVE: [&str; 6] = ["yes", "y", "ok", "sure", "default", "suggested"];

/// Repository offered when a repository question has no answer yet.
pub const SUGGESTED_REPOSITORY: &str = "octocat/Hello-World";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    AmbiguousReference,
    MissingRepository,
    VagueRequest,
}

/// A follow-up question put to the user instead of routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clarification {
    pub kind: ClarificationKind,
    pub message: &'static str,
    pub examples: &'static [&'static str],
    /// Value applied if the user answers affirmatively.
    pub suggestion: Option<String>,
}

impl Clarification {
    fn ambiguous_reference() -> Self {
        Self {
            kind: ClarificationKind::AmbiguousReference,
            message: "I need more context. What specifically are you referring to?",
            examples: &[
                "A specific repository?",
                "A particular file or function?",
                "A mathematical expression?",
            ],
            suggestion: None,
        }
    }

    fn missing_repository() -> Self {
        Self {
            kind: ClarificationKind::MissingRepository,
            message: "Which repository would you like to work with?",
            examples: &[
                "Provide a repo name (e.g., 'octocat/Hello-World')",
                "Set a default repo for this session",
                "Use the default suggested repo",
            ],
            suggestion: Some(SUGGESTED_REPOSITORY.to_string()),
        }
    }

    fn vague_request() -> Self {
        Self {
            kind: ClarificationKind::VagueRequest,
            message: "I'd be happy to help! Could you be more specific?",
            examples: &[
                "Ask about GitHub repositories",
                "Request a mathematical calculation",
                "Get help with available commands",
            ],
            suggestion: None,
        }
    }

    /// The prompt shown to the user.
    pub fn render(&self) -> String {
        let mut out = format!("🤔 **Clarification Needed**\n\n{}\n", self.message);
        if !self.examples.is_empty() {
            out.push_str("\n**Examples:**\n");
            for example in self.examples {
                out.push_str(&format!("  • {}\n", example));
            }
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str(&format!("\n💡 **Suggestion:** {}", suggestion));
        }
        out
    }
}

/// Check `input` against the clarification triggers, in priority order.
///
/// `history_len` counts the history entries including this input.
pub fn detect(input: &str, history_len: usize, preferences: &Preferences) -> Option<Clarification> {
    let lowered = input.to_lowercase();

    if history_len < 2 && AMBIGUOUS_PRONOUN.is_match(&lowered) {
        return Some(Clarification::ambiguous_reference());
    }

    if REPOSITORY_KEYWORDS.iter().any(|k| lowered.contains(k))
        && !REPO_MENTION.is_match(&lowered)
        && !preferences.contains_key(DEFAULT_REPO_KEY)
    {
        return Some(Clarification::missing_repository());
    }

    if VAGUE_REQUEST.is_match(lowered.trim()) {
        return Some(Clarification::vague_request());
    }

    None
}

pub fn is_affirmative(input: &str) -> bool {
    let answer = input.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_prefs() -> Preferences {
        Preferences::new()
    }

    #[test]
    fn test_pronoun_only_on_first_turn() {
        let found = detect("fix it", 1, &no_prefs()).unwrap();
        assert_eq!(found.kind, ClarificationKind::AmbiguousReference);
        assert!(detect("fix it", 3, &no_prefs()).is_none());
        // word boundaries: "iteration" is not "it"
        assert!(detect("iteration count", 1, &no_prefs()).is_none());
    }

    #[test]
    fn test_missing_repository() {
        let found = detect("show me the latest commits", 3, &no_prefs()).unwrap();
        assert_eq!(found.kind, ClarificationKind::MissingRepository);
        assert_eq!(found.suggestion.as_deref(), Some(SUGGESTED_REPOSITORY));

        assert!(detect("show commits in acme/widgets", 3, &no_prefs()).is_none());
        assert!(detect("list branches of my repo", 3, &no_prefs()).is_none());

        let mut prefs = no_prefs();
        prefs.insert(DEFAULT_REPO_KEY.to_string(), "acme/widgets".to_string());
        assert!(detect("show me the latest commits", 3, &prefs).is_none());
    }

    #[test]
    fn test_vague_requests() {
        for input in ["help", "tell me about", " ok ", "What", "no"] {
            let found = detect(input, 3, &no_prefs()).unwrap();
            assert_eq!(found.kind, ClarificationKind::VagueRequest, "input {:?}", input);
        }
        assert!(detect("help me add 2 and 3", 3, &no_prefs()).is_none());
    }

    #[test]
    fn test_first_trigger_wins() {
        // pronoun and repository keyword both present
        let found = detect("open an issue for this", 1, &no_prefs()).unwrap();
        assert_eq!(found.kind, ClarificationKind::AmbiguousReference);
    }

    #[test]
    fn test_render() {
        let rendered = Clarification::missing_repository().render();
        assert!(rendered.starts_with("🤔 **Clarification Needed**\n\nWhich repository"));
        assert!(rendered.contains("\n**Examples:**\n  • Provide a repo name"));
        assert!(rendered.ends_with("💡 **Suggestion:** octocat/Hello-World"));
    }

    #[test]
    fn test_affirmative() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative(" suggested "));
        assert!(!is_affirmative("nope"));
    }
}
