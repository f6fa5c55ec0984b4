//! Keyword scoring.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::{RoutingStrategy, StrategyKind};
use crate::specialist::Specialist;

/// Two numbers joined by an arithmetic operator, e.g. "12 * 4".
static NUMERIC_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[+\-*/^%]\s*\d+").expect("valid numeric expression regex"));

/// Questions of the form "what is 7 ...".
static WHAT_IS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"what\s+is\s+\d+").expect("valid what-is regex"));

const NUMERIC_EXPRESSION_BOOST: usize = 5;
const WHAT_IS_BOOST: usize = 3;

/// Score every specialist against `text`.
///
/// Each keyword found as a substring of the lowercased text scores one point.
/// The math specialist also gets a boost for numeric expressions and
/// "what is N" questions.
pub fn keyword_scores(text: &str) -> [(Specialist, usize); 2] {
    let lowered = text.to_lowercase();

    Specialist::ALL.map(|specialist| {
        let mut score = specialist
            .keywords()
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();

        if specialist == Specialist::Math {
            if NUMERIC_EXPRESSION.is_match(&lowered) {
                score += NUMERIC_EXPRESSION_BOOST;
            }
            if WHAT_IS_NUMBER.is_match(&lowered) {
                score += WHAT_IS_BOOST;
            }
        }

        (specialist, score)
    })
}

/// Highest-scoring specialist, or `None` if nothing scored.
///
/// Ties go to the lexically smallest identifier.
pub fn select_by_keywords(text: &str) -> Option<Specialist> {
    let mut best: Option<(Specialist, usize)> = None;
    for (specialist, score) in keyword_scores(text) {
        if score == 0 {
            continue;
        }
        match best {
            Some((_, top)) if top >= score => {}
            _ => best = Some((specialist, score)),
        }
    }
    best.map(|(specialist, _)| specialist)
}

/// Routes by keyword scores alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RoutingStrategy for KeywordStrategy {
    async fn select(&self, text: &str) -> Option<Specialist> {
        let selected = select_by_keywords(text);
        debug!(selected = ?selected, "KEYWORD_ROUTE");
        selected
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(text: &str, specialist: Specialist) -> usize {
        keyword_scores(text)
            .into_iter()
            .find(|(s, _)| *s == specialist)
            .map(|(_, score)| score)
            .unwrap()
    }

    #[test]
    fn test_numeric_expression_routes_to_math() {
        assert_eq!(score_of("What is 15 * 23?", Specialist::Math), 8);
        assert_eq!(select_by_keywords("What is 15 * 23?"), Some(Specialist::Math));
    }

    #[test]
    fn test_numeric_boost_outweighs_github_keywords() {
        // one github keyword ("file") against the +5 boost
        assert_eq!(score_of("show file 5 + 3", Specialist::GitHub), 1);
        assert_eq!(select_by_keywords("show file 5 + 3"), Some(Specialist::Math));
    }

    #[test]
    fn test_github_keywords() {
        let text = "Show me the files in the octocat/Hello-World repository";
        assert_eq!(score_of(text, Specialist::GitHub), 3);
        assert_eq!(select_by_keywords(text), Some(Specialist::GitHub));
    }

    #[test]
    fn test_keywords_match_as_substrings() {
        // "address" contains "add"
        assert_eq!(score_of("my address", Specialist::Math), 1);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(select_by_keywords("tell me a joke"), None);
    }

    #[test]
    fn test_tie_goes_to_lexically_smallest() {
        // one github keyword, one math keyword
        assert_eq!(select_by_keywords("code math"), Some(Specialist::GitHub));
    }

    #[tokio::test]
    async fn test_strategy_select() {
        let strategy = KeywordStrategy::new();
        assert_eq!(strategy.select("calculate this").await, Some(Specialist::Math));
        assert_eq!(strategy.kind(), StrategyKind::Keyword);
        assert!(strategy.describe_rules().is_none());
    }
}
