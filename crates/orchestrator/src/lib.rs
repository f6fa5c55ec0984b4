//! Query routing across specialist agents.
//!
//! This crate provides the [`Orchestrator`] type, which decides for each
//! user query which specialist agent should answer and dispatches it.
//!
//! # Features
//!
//! - Three interchangeable strategies: keyword scoring, classifier model, priority rules
//! - Switch notices when routing moves to another specialist
//! - Streamed replies with tool-call announcements and a terminal sentinel
//! - One conversation thread per specialist
//!
//! # Architecture
//!
//! ```text
//! User text
//!     ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Initialize agents on first use (SpecialistFactory)      │
//! │         ↓                                                   │
//! │  2. RoutingStrategy::select                                 │
//! │     • keyword → substring scores + numeric boosts           │
//! │     • llm     → one-word classifier, keyword fallback       │
//! │     • rule    → first matching rule by priority             │
//! │         ↓                                                   │
//! │  3. No selection → help text, state unchanged               │
//! │     Selection changed → switch notice                       │
//! │         ↓                                                   │
//! │  4. Stream the specialist's reply as RouteEvents            │
//! │     Text | ToolCall | End { switch_notice }                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut orchestrator = Orchestrator::from_env()?;
//!
//!     let response = orchestrator.route_query("What is 15 * 23?").await?;
//!     if let Some(notice) = &response.switch_notice {
//!         println!("{}", notice);
//!     }
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```

mod error;
mod factory;
mod orchestrator;
mod specialist;
mod strategy;
mod stream;
mod tracker;

pub use error::OrchestratorError;
pub use factory::{ModelSpecialistFactory, SpecialistFactory, StaticSpecialistFactory};
pub use orchestrator::{Orchestrator, SwitchResult};
pub use specialist::{Specialist, SWITCH_ALIASES};
pub use strategy::{
    keyword_scores, select_by_keywords, KeywordStrategy, LlmStrategy, RoutingRule,
    RoutingStrategy, RuleStrategy, StrategyKind, ROUTING_PROMPT_TEMPLATE,
};
pub use stream::{RouteEvent, RouteResponse, RouteStream};
pub use tracker::ToolTracker;

// Re-export commonly used types from dependencies
pub use brain_core::{Brain, BrainError, InboundMessage, OutboundMessage};
