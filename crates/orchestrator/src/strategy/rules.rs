//! Priority-ordered routing rules.

use std::fmt;
use std::fmt::Write as _;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{RoutingStrategy, StrategyKind};
use crate::specialist::Specialist;

static ARITHMETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[+\-*/^%]\s*\d+").expect("valid arithmetic regex"));

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A named condition that routes matching text to a specialist.
pub struct RoutingRule {
    pub name: String,
    pub target: Specialist,
    pub priority: i32,
    predicate: Predicate,
}

impl RoutingRule {
    pub fn new(
        name: impl Into<String>,
        target: Specialist,
        priority: i32,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            priority,
            predicate: Box::new(predicate),
        }
    }

    /// Rule that fires when the lowercased text contains any of `words`.
    pub fn any_of(
        name: impl Into<String>,
        target: Specialist,
        priority: i32,
        words: &'static [&'static str],
    ) -> Self {
        Self::new(name, target, priority, move |text| contains_any(text, words))
    }

    pub fn matches(&self, text: &str) -> bool {
        (self.predicate)(text)
    }
}

impl fmt::Debug for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingRule")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    words.iter().any(|word| lowered.contains(word))
}

/// Evaluates rules in descending priority; the first match wins.
#[derive(Debug)]
pub struct RuleStrategy {
    rules: Vec<RoutingRule>,
}

impl RuleStrategy {
    /// Build from an arbitrary rule set. Equal priorities keep their given order.
    pub fn new(mut rules: Vec<RoutingRule>) -> Self {
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { rules }
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    /// The first matching rule, if any.
    pub fn matching_rule(&self, text: &str) -> Option<&RoutingRule> {
        self.rules.iter().find(|rule| rule.matches(text))
    }

    /// Numbered listing of the rules in evaluation order.
    pub fn list_rules(&self) -> String {
        let mut out = String::from("Active Routing Rules (in priority order):\n\n");
        for (i, rule) in self.rules.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. **{}** (Priority: {}) → {}",
                i + 1,
                rule.name,
                rule.priority,
                rule.target
            );
        }
        out
    }
}

impl Default for RuleStrategy {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new("Complex Math Expression", Specialist::Math, 95, |text| {
            ARITHMETIC.is_match(text)
        }),
        RoutingRule::new("Code Analysis Rule", Specialist::GitHub, 90, |text| {
            contains_any(text, &["analyze", "review", "check", "show", "browse"])
                && contains_any(text, &["code", "repository", "file", "function", "class"])
        }),
        RoutingRule::any_of(
            "Repository Operations",
            Specialist::GitHub,
            85,
            &["repository", "repo", "commit", "branch", "pull request", "fork"],
        ),
        RoutingRule::any_of(
            "Math with Keywords",
            Specialist::Math,
            80,
            &["calculate", "compute", "math", "equation"],
        ),
        RoutingRule::any_of(
            "GitHub File Operations",
            Specialist::GitHub,
            50,
            &["show me", "get file", "browse", "list repos", "github"],
        ),
        RoutingRule::any_of(
            "Math Operations",
            Specialist::Math,
            50,
            &["add", "subtract", "multiply", "divide", "power", "modulo"],
        ),
        RoutingRule::any_of(
            "GitHub Fallback",
            Specialist::GitHub,
            10,
            &["github", "git", "repo", "code", "file"],
        ),
        RoutingRule::any_of(
            "Math Fallback",
            Specialist::Math,
            10,
            &["math", "number", "expression"],
        ),
    ]
}

#[async_trait]
impl RoutingStrategy for RuleStrategy {
    async fn select(&self, text: &str) -> Option<Specialist> {
        let rule = self.matching_rule(text)?;
        debug!(rule = %rule.name, priority = rule.priority, target = %rule.target, "RULE_MATCHED");
        Some(rule.target)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Rule
    }

    fn describe_rules(&self) -> Option<String> {
        Some(self.list_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_priority_ordered() {
        let strategy = RuleStrategy::default();
        let priorities: Vec<_> = strategy.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![95, 90, 85, 80, 50, 50, 10, 10]);
        assert_eq!(strategy.rules()[4].name, "GitHub File Operations");
        assert_eq!(strategy.rules()[5].name, "Math Operations");
    }

    #[test]
    fn test_arithmetic_beats_everything() {
        let strategy = RuleStrategy::default();
        let rule = strategy.matching_rule("show me the repo and 2+2").unwrap();
        assert_eq!(rule.name, "Complex Math Expression");
    }

    #[test]
    fn test_code_analysis_needs_both_word_sets() {
        let strategy = RuleStrategy::default();
        let rule = strategy.matching_rule("Please review this function").unwrap();
        assert_eq!(rule.name, "Code Analysis Rule");
        assert_eq!(rule.target, Specialist::GitHub);

        assert!(strategy.matching_rule("please review my essay").is_none());
    }

    #[test]
    fn test_no_rule_matches() {
        let strategy = RuleStrategy::default();
        assert!(strategy.matching_rule("tell me a joke").is_none());
    }

    #[test]
    fn test_list_rules_format() {
        let listing = RuleStrategy::default().list_rules();
        assert!(listing.starts_with("Active Routing Rules (in priority order):\n\n"));
        assert!(listing.contains("1. **Complex Math Expression** (Priority: 95) → math\n"));
        assert!(listing.contains("8. **Math Fallback** (Priority: 10) → math\n"));
    }

    #[test]
    fn test_higher_priority_wins_when_both_match() {
        let strategy = RuleStrategy::new(vec![
            RoutingRule::any_of("low", Specialist::GitHub, 10, &["sum"]),
            RoutingRule::any_of("high", Specialist::Math, 80, &["sum"]),
        ]);
        let rule = strategy.matching_rule("sum these").unwrap();
        assert_eq!(rule.name, "high");
        assert_eq!(rule.target, Specialist::Math);
    }

    #[test]
    fn test_custom_rules_keep_insertion_order_on_ties() {
        let strategy = RuleStrategy::new(vec![
            RoutingRule::new("first", Specialist::Math, 1, |_| true),
            RoutingRule::new("second", Specialist::GitHub, 1, |_| true),
        ]);
        assert_eq!(strategy.matching_rule("anything").unwrap().name, "first");
    }

    #[tokio::test]
    async fn test_strategy_select() {
        let strategy = RuleStrategy::default();
        assert_eq!(strategy.select("list repos for octocat").await, Some(Specialist::GitHub));
        assert_eq!(strategy.select("what is the power of two").await, Some(Specialist::Math));
        assert_eq!(strategy.select("hello there").await, None);
        assert!(strategy.describe_rules().is_some());
    }
}
