//! The orchestrator: strategy selection plus dispatch to specialists.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use brain_core::{Brain, InboundMessage};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::factory::{ModelSpecialistFactory, SpecialistFactory};
use crate::specialist::Specialist;
use crate::strategy::{KeywordStrategy, LlmStrategy, RoutingStrategy, RuleStrategy, StrategyKind};
use crate::stream::{dispatch, static_reply, RouteResponse, RouteStream};

/// Outcome of a manual switch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchResult {
    pub success: bool,
    pub message: String,
}

/// Routes each query to one specialist agent.
///
/// Agents are created lazily on first use. The orchestrator remembers the
/// specialist that handled the previous query so it can announce switches,
/// and keeps one conversation thread per specialist.
pub struct Orchestrator {
    kind: StrategyKind,
    factory: Arc<dyn SpecialistFactory>,
    strategy: Option<Box<dyn RoutingStrategy>>,
    agents: IndexMap<Specialist, Arc<dyn Brain>>,
    threads: HashMap<Specialist, String>,
    current: Option<Specialist>,
    initialized: bool,
}

impl Orchestrator {
    /// Create an orchestrator for `kind`. Nothing is contacted until
    /// [`Orchestrator::initialize`] runs.
    pub fn new(kind: StrategyKind, factory: Arc<dyn SpecialistFactory>) -> Self {
        let strategy: Option<Box<dyn RoutingStrategy>> = match kind {
            StrategyKind::Keyword => Some(Box::new(KeywordStrategy::new())),
            StrategyKind::Rule => Some(Box::new(RuleStrategy::default())),
            // needs the classifier, built during initialization
            StrategyKind::Llm => None,
        };
        Self::build(kind, strategy, factory)
    }

    /// Create an orchestrator around a ready-made strategy.
    pub fn with_strategy(
        strategy: Box<dyn RoutingStrategy>,
        factory: Arc<dyn SpecialistFactory>,
    ) -> Self {
        Self::build(strategy.kind(), Some(strategy), factory)
    }

    /// Strategy from `ORCHESTRATOR_TYPE`, agents from the model settings.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let kind = StrategyKind::from_env()?;
        let factory = ModelSpecialistFactory::from_env()?;
        Ok(Self::new(kind, Arc::new(factory)))
    }

    fn build(
        kind: StrategyKind,
        strategy: Option<Box<dyn RoutingStrategy>>,
        factory: Arc<dyn SpecialistFactory>,
    ) -> Self {
        Self {
            kind,
            factory,
            strategy,
            agents: IndexMap::new(),
            threads: HashMap::new(),
            current: None,
            initialized: false,
        }
    }

    /// Create every specialist (and the classifier for LLM routing).
    ///
    /// Idempotent. A failure here is fatal for the caller.
    pub async fn initialize(&mut self) -> Result<(), OrchestratorError> {
        if self.initialized {
            return Ok(());
        }

        let mut agents = IndexMap::new();
        for specialist in Specialist::ALL {
            let agent = self.factory.create_agent(specialist).await?;
            agents.insert(specialist, agent);
        }

        if self.strategy.is_none() {
            let router = self.factory.create_router().await?;
            self.strategy = Some(Box::new(LlmStrategy::new(router)));
        }

        self.agents = agents;
        self.threads = Specialist::ALL
            .into_iter()
            .map(|specialist| (specialist, new_thread_id(specialist)))
            .collect();
        self.initialized = true;

        info!(strategy = %self.kind, agents = self.agents.len(), "ORCHESTRATOR_INITIALIZED");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of specialist agents held.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.kind
    }

    /// Specialist that handled the most recent routed query.
    pub fn current_agent(&self) -> Option<Specialist> {
        self.current
    }

    /// Route `text` and stream the reply.
    ///
    /// With no selection the stream holds the strategy's help text and the
    /// current specialist is left unchanged.
    pub async fn route_query_stream(
        &mut self,
        text: &str,
    ) -> Result<RouteStream<'_>, OrchestratorError> {
        self.initialize().await?;

        let strategy = self
            .strategy
            .as_ref()
            .ok_or_else(|| OrchestratorError::Configuration("no routing strategy".to_string()))?;

        let Some(specialist) = strategy.select(text).await else {
            debug!(strategy = %self.kind, "NO_SPECIALIST_SELECTED");
            return Ok(static_reply(self.kind.help_text()));
        };

        let switch_notice = if self.current != Some(specialist) {
            info!(from = ?self.current, to = %specialist, "SPECIALIST_SWITCH");
            self.current = Some(specialist);
            Some(self.kind.switch_notice(specialist))
        } else {
            None
        };

        let thread_id = self
            .threads
            .get(&specialist)
            .cloned()
            .unwrap_or_else(|| new_thread_id(specialist));
        let agent = self.agents.get(&specialist).ok_or_else(|| {
            OrchestratorError::Configuration(format!("{} agent not initialized", specialist))
        })?;

        let message = InboundMessage::new(thread_id, text);
        Ok(dispatch(agent.process_stream(message), switch_notice, specialist))
    }

    /// Route `text` and collect the whole reply.
    pub async fn route_query(&mut self, text: &str) -> Result<RouteResponse, OrchestratorError> {
        let stream = self.route_query_stream(text).await?;
        RouteResponse::collect(stream).await
    }

    /// Make `name` (an id or alias) the current specialist.
    pub fn switch_agent(&mut self, name: &str) -> SwitchResult {
        match Specialist::from_alias(name) {
            Some(specialist) => {
                self.current = Some(specialist);
                SwitchResult {
                    success: true,
                    message: format!("✅ Switched to {}", specialist.display_name()),
                }
            }
            None => SwitchResult {
                success: false,
                message: format!(
                    "❌ Unknown agent: {}. Available: {}",
                    name,
                    Specialist::alias_list()
                ),
            },
        }
    }

    /// Numbered specialist listing with the active one marked.
    pub fn list_agents(&self) -> String {
        let mut out = format!("{}\n\n", self.kind.list_heading());
        for (i, specialist) in Specialist::ALL.into_iter().enumerate() {
            let status = if self.current == Some(specialist) {
                "🟢 ACTIVE"
            } else {
                "⚪ Available"
            };
            let _ = writeln!(out, "{}. **{}** {}", i + 1, specialist.display_name(), status);
        }
        out
    }

    /// Rule listing, for strategies that route by rules.
    pub fn list_rules(&self) -> Option<String> {
        self.strategy.as_ref().and_then(|s| s.describe_rules())
    }

    /// Start fresh threads for every specialist and forget the current one.
    pub fn clear_all_history(&mut self) {
        for (specialist, thread) in self.threads.iter_mut() {
            *thread = new_thread_id(*specialist);
        }
        self.current = None;
        info!("ORCHESTRATOR_HISTORY_CLEARED");
    }
}

fn new_thread_id(specialist: Specialist) -> String {
    format!("{}-{}", specialist, Uuid::new_v4())
}
