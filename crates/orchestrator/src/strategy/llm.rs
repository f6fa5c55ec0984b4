//! Classifier-backed routing.

use std::sync::Arc;

use async_trait::async_trait;
use brain_core::{hash_prompt, Brain, InboundMessage};
use tracing::{info, warn};
use uuid::Uuid;

use super::keyword::select_by_keywords;
use super::{RoutingStrategy, StrategyKind};
use crate::specialist::Specialist;

/// Routing prompt. `{user_input}` is replaced with the user's text.
pub const ROUTING_PROMPT_TEMPLATE: &str = r#"You are an intelligent agent router. Analyze the user's request and determine which specialist agent should handle it.

Available Agents:
1. **github**: Code repository management, file browsing, code analysis, repository operations
   - Use for: repository queries, file content, code structure, GitHub operations, code review, browsing files

2. **math**: Mathematical calculations and expression evaluation
   - Use for: arithmetic, algebra, calculations, math problems, numeric operations

User Request: "{user_input}"

Instructions:
- Analyze the user's intent and context
- Consider which agent's capabilities best match the request
- If it's about code/repositories/files, respond with: github
- If it's about math/calculations/numbers, respond with: math
- If unclear or neither, respond with: none

Respond with ONLY ONE WORD: github, math, or none"#;

/// Asks a classifier model for a one-word decision.
///
/// Answers other than a specialist id or `none`, and classifier failures,
/// fall back to keyword scoring.
pub struct LlmStrategy {
    router: Arc<dyn Brain>,
    prompt_hash: String,
}

impl LlmStrategy {
    pub fn new(router: Arc<dyn Brain>) -> Self {
        Self {
            router,
            prompt_hash: hash_prompt(ROUTING_PROMPT_TEMPLATE),
        }
    }

    pub fn routing_prompt(text: &str) -> String {
        ROUTING_PROMPT_TEMPLATE.replace("{user_input}", text)
    }

    /// Map a normalized classifier answer to a decision.
    ///
    /// `Err(())` means the answer was not understood.
    fn interpret(decision: &str) -> Result<Option<Specialist>, ()> {
        if decision == "none" {
            return Ok(None);
        }
        decision.parse::<Specialist>().map(Some)
    }
}

#[async_trait]
impl RoutingStrategy for LlmStrategy {
    async fn select(&self, text: &str) -> Option<Specialist> {
        // Fresh thread per decision so earlier classifications never leak in.
        let thread_id = format!("router-{}", Uuid::new_v4());
        let message = InboundMessage::new(thread_id, Self::routing_prompt(text));

        let answer = match self.router.process(message).await {
            Ok(outbound) => outbound.text,
            Err(e) => {
                warn!(error = %e, router = self.router.name(), "ROUTER_BRAIN_ERROR");
                return select_by_keywords(text);
            }
        };

        let decision = answer.trim().to_lowercase();
        info!(decision = %decision, prompt_hash = %self.prompt_hash, "LLM_ROUTING_DECISION");

        match Self::interpret(&decision) {
            Ok(selected) => selected,
            Err(()) => {
                warn!(decision = %decision, "ROUTER_UNEXPECTED_ANSWER");
                select_by_keywords(text)
            }
        }
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_brain::{FailingBrain, ScriptedBrain};

    #[tokio::test]
    async fn test_exact_answer_is_used() {
        let router = Arc::new(ScriptedBrain::replying("router", "  Math\n"));
        let strategy = LlmStrategy::new(router.clone());

        assert_eq!(strategy.select("anything at all").await, Some(Specialist::Math));

        let received = router.received();
        assert_eq!(received.len(), 1);
        assert!(received[0].thread_id.starts_with("router-"));
        assert!(received[0].text.contains("User Request: \"anything at all\""));
        assert!(received[0]
            .text
            .ends_with("Respond with ONLY ONE WORD: github, math, or none"));
    }

    #[tokio::test]
    async fn test_none_means_no_selection() {
        let router = Arc::new(ScriptedBrain::replying("router", "none"));
        let strategy = LlmStrategy::new(router);

        // keywords would pick github, but the classifier said none
        assert_eq!(strategy.select("show me the repo").await, None);
    }

    #[tokio::test]
    async fn test_unexpected_answer_falls_back_to_keywords() {
        let router = Arc::new(ScriptedBrain::replying("router", "probably github"));
        let strategy = LlmStrategy::new(router);

        assert_eq!(strategy.select("What is 12 * 4").await, Some(Specialist::Math));
    }

    #[tokio::test]
    async fn test_router_failure_falls_back_to_keywords() {
        let strategy = LlmStrategy::new(Arc::new(FailingBrain::default()));

        assert_eq!(strategy.select("list the repo branches").await, Some(Specialist::GitHub));
        assert_eq!(strategy.select("hello").await, None);
    }

    #[tokio::test]
    async fn test_each_decision_uses_a_new_thread() {
        let router = Arc::new(ScriptedBrain::replying("router", "github"));
        let strategy = LlmStrategy::new(router.clone());

        strategy.select("one").await;
        strategy.select("two").await;

        let received = router.received();
        assert_ne!(received[0].thread_id, received[1].thread_id);
    }
}
