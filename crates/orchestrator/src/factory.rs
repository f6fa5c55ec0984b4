//! Construction of specialist agents and the routing classifier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_tools::{github_registry, math_registry, GitHubConfig, RegistryToolExecutor, ToolPolicy};
use async_trait::async_trait;
use brain_core::Brain;
use chat_brain::{ChatBrain, ChatBrainConfig};
use tracing::info;

use crate::error::OrchestratorError;
use crate::specialist::Specialist;

const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

const GITHUB_INSTRUCTIONS: &str = "You are a GitHub assistant. You can list a user's \
repositories, browse repository files, read file contents and open issues.

- Stay on GitHub and code topics; steer other questions back politely.
- Ask which repository to use when the user has not named one.
- When explaining code, describe its structure and point to specific files or functions.
- Give clear, actionable answers.";

const MATH_INSTRUCTIONS: &str = "You are a math assistant. Use the arithmetic tools \
(add, subtract, multiply, divide, power, modulo) for single operations and \
evaluate_expression for anything with parentheses or several operators.

- Always show the calculation in your answer.
- Report division by zero plainly instead of guessing.
- Stay on math topics; steer other questions back politely.";

/// Builds the brains an orchestrator routes to.
#[async_trait]
pub trait SpecialistFactory: Send + Sync {
    /// Create the agent for one specialist.
    async fn create_agent(&self, specialist: Specialist)
        -> Result<Arc<dyn Brain>, OrchestratorError>;

    /// Create the classifier used by LLM routing.
    async fn create_router(&self) -> Result<Arc<dyn Brain>, OrchestratorError>;
}

/// Builds every specialist as a [`ChatBrain`] bound to its toolset.
#[derive(Debug, Clone)]
pub struct ModelSpecialistFactory {
    chat: ChatBrainConfig,
    github: GitHubConfig,
}

impl ModelSpecialistFactory {
    pub fn new(chat: ChatBrainConfig, github: GitHubConfig) -> Self {
        Self { chat, github }
    }

    /// Read model and GitHub settings from the environment.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let chat = ChatBrainConfig::from_env()
            .map_err(|e| OrchestratorError::Configuration(e.to_string()))?;
        Ok(Self::new(chat, GitHubConfig::from_env()))
    }

    fn policy() -> ToolPolicy {
        ToolPolicy::default().with_timeout(TOOL_TIMEOUT)
    }
}

#[async_trait]
impl SpecialistFactory for ModelSpecialistFactory {
    async fn create_agent(
        &self,
        specialist: Specialist,
    ) -> Result<Arc<dyn Brain>, OrchestratorError> {
        let creation_error = |reason: String| OrchestratorError::AgentCreation {
            specialist: specialist.to_string(),
            reason,
        };

        let (instructions, registry) = match specialist {
            Specialist::GitHub => (
                GITHUB_INSTRUCTIONS,
                github_registry(self.github.clone()).map_err(|e| creation_error(e.to_string()))?,
            ),
            Specialist::Math => (MATH_INSTRUCTIONS, math_registry()),
        };

        let config = self.chat.with_system_prompt(instructions);
        let executor = RegistryToolExecutor::with_policy(registry, Self::policy());
        let brain = ChatBrain::with_tools(config, executor)
            .map_err(|e| creation_error(e.to_string()))?
            .named(specialist.display_name());

        info!(specialist = %specialist, model = %self.chat.model, "SPECIALIST_CREATED");
        Ok(Arc::new(brain))
    }

    async fn create_router(&self) -> Result<Arc<dyn Brain>, OrchestratorError> {
        let mut config = self.chat.clone();
        config.system_prompt = None;
        config.temperature = Some(0.1);
        config.max_tokens = Some(10);
        config.max_history_turns = 0;

        let brain = ChatBrain::new(config)
            .map_err(|e| OrchestratorError::AgentCreation {
                specialist: "router".to_string(),
                reason: e.to_string(),
            })?
            .named("Router");
        Ok(Arc::new(brain))
    }
}

/// Hands out pre-built brains. Useful for tests and offline demos.
#[derive(Default, Clone)]
pub struct StaticSpecialistFactory {
    agents: HashMap<Specialist, Arc<dyn Brain>>,
    router: Option<Arc<dyn Brain>>,
    created: Arc<AtomicUsize>,
}

impl StaticSpecialistFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, specialist: Specialist, brain: Arc<dyn Brain>) -> Self {
        self.agents.insert(specialist, brain);
        self
    }

    pub fn with_router(mut self, brain: Arc<dyn Brain>) -> Self {
        self.router = Some(brain);
        self
    }

    /// Agents handed out so far, shared between clones.
    pub fn agents_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecialistFactory for StaticSpecialistFactory {
    async fn create_agent(
        &self,
        specialist: Specialist,
    ) -> Result<Arc<dyn Brain>, OrchestratorError> {
        let agent = self.agents.get(&specialist).cloned().ok_or_else(|| {
            OrchestratorError::Configuration(format!("no agent configured for {}", specialist))
        })?;
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(agent)
    }

    async fn create_router(&self) -> Result<Arc<dyn Brain>, OrchestratorError> {
        self.router
            .clone()
            .ok_or_else(|| OrchestratorError::Configuration("no router configured".to_string()))
    }
}
