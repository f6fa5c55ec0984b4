//! Routing strategies.
//!
//! A strategy looks at the user's text and picks at most one specialist.
//! Three interchangeable strategies exist; which one an orchestrator uses is
//! fixed at construction by a [`StrategyKind`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;
use crate::specialist::Specialist;

mod keyword;
mod llm;
mod rules;

pub use keyword::{keyword_scores, select_by_keywords, KeywordStrategy};
pub use llm::{LlmStrategy, ROUTING_PROMPT_TEMPLATE};
pub use rules::{RoutingRule, RuleStrategy};

/// Selects the specialist for a piece of text.
#[async_trait]
pub trait RoutingStrategy: Send + Sync {
    /// Pick a specialist, or `None` when nothing fits.
    async fn select(&self, text: &str) -> Option<Specialist>;

    fn kind(&self) -> StrategyKind;

    /// Priority-ordered rule listing, for strategies that have rules.
    fn describe_rules(&self) -> Option<String> {
        None
    }
}

/// Which routing strategy an orchestrator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Keyword,
    Llm,
    Rule,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Keyword => "keyword",
            StrategyKind::Llm => "llm",
            StrategyKind::Rule => "rule",
        }
    }

    /// Read `ORCHESTRATOR_TYPE`, defaulting to keyword routing when unset.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        match std::env::var("ORCHESTRATOR_TYPE") {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(StrategyKind::default()),
        }
    }

    /// Side-channel notice shown when routing moves to a new specialist.
    pub fn switch_notice(self, specialist: Specialist) -> String {
        let verb = match self {
            StrategyKind::Keyword => "Routed to",
            StrategyKind::Llm => "LLM routed to",
            StrategyKind::Rule => "Rule-based routing to",
        };
        format!("🤖 {}: {}", verb, specialist.display_name())
    }

    /// Heading of the agent listing.
    pub fn list_heading(self) -> &'static str {
        match self {
            StrategyKind::Keyword => "Available Specialized Agents:",
            StrategyKind::Llm => "Available Specialized Agents (LLM-Powered Routing):",
            StrategyKind::Rule => "Available Specialized Agents (Rule-Based Routing):",
        }
    }

    /// Guidance returned when no specialist is selected.
    pub fn help_text(self) -> String {
        match self {
            StrategyKind::Keyword => {
                let mut help = String::from(
                    "I'm not sure which specialist can help you best. Here are your options:\n\n",
                );
                for specialist in Specialist::ALL {
                    push_keyword_block(&mut help, specialist);
                    if specialist == Specialist::Math {
                        help.push_str("Also detects: numeric expressions (e.g., 5 + 3, 12 * 4)\n");
                    }
                    help.push('\n');
                }
                help.push_str(
                    "Try using specific keywords in your question to help me route you correctly.",
                );
                help
            }
            StrategyKind::Llm => {
                let mut help = String::from(
                    "I couldn't determine which specialist can help you best. Here are your options:\n\n",
                );
                for specialist in Specialist::ALL {
                    push_keyword_block(&mut help, specialist);
                    help.push('\n');
                }
                help.push_str("Example queries:\n");
                help.push_str("- 'Show me the latest commits in my repository' → GitHub\n");
                help.push_str("- 'Calculate 25 * 4 + 10' → Math\n\n");
                help.push_str("Try being more specific about what you want to accomplish.");
                help
            }
            StrategyKind::Rule => concat!(
                "No routing rule matched your query. Here's what I can help with:\n\n",
                "**GitHub Agent**: Repository management and code analysis\n",
                "**Math Agent**: Mathematical calculations and expressions\n\n",
                "Example queries:\n",
                "- 'Show me the repositories for octocat'\n",
                "- 'Analyze the code in main.py'\n",
                "- 'Calculate 25 * 4 + 10'\n",
                "- 'What is 156 divided by 12?'\n\n",
                "Try being more specific about what you want to accomplish."
            )
            .to_string(),
        }
    }
}

fn push_keyword_block(help: &mut String, specialist: Specialist) {
    help.push_str(&format!("**{}**\n", specialist.display_name()));
    help.push_str(&format!(
        "Keywords: {}\n",
        specialist.keywords()[..5].join(", ")
    ));
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(StrategyKind::Keyword),
            "llm" => Ok(StrategyKind::Llm),
            "rule" | "rules" | "rule_based" => Ok(StrategyKind::Rule),
            other => Err(OrchestratorError::UnknownStrategy(other.to_string())),
        }
    }
}
