//! Conversation manager in front of the orchestrator.
//!
//! [`UserProxy`] owns one user's conversation: it records history, asks for
//! clarification when a query is too vague to route, applies preferences
//! such as a default repository, delegates to the [`Orchestrator`] and
//! decorates replies with switch notices and follow-up suggestions.
//! [`SessionRegistry`] keeps one proxy per session for servers.
//!
//! ```text
//! user text ─→ handle_command ─→ (proxy command | list agents | switch)
//!          └─→ process_message
//!                 ├─ pending clarification? answer it
//!                 ├─ needs clarification?   ask
//!                 └─ apply preferences ─→ Orchestrator::route_query ─→ format
//! ```

mod clarification;
mod commands;
mod context;
mod error;
mod formatting;
mod proxy;
mod sessions;

pub use clarification::{Clarification, ClarificationKind, SUGGESTED_REPOSITORY};
pub use commands::{Command, HELP_TEXT};
pub use context::{
    ConversationLog, DelegationStats, HistoryEntry, Preferences, Role, DEFAULT_REPO_KEY,
    MAX_HISTORY,
};
pub use error::ProxyError;
pub use formatting::{follow_up_suggestions, format_response};
pub use proxy::{ProxyStream, UserProxy};
pub use sessions::{SessionHandle, SessionRegistry};

pub use orchestrator::{Orchestrator, Specialist, StrategyKind};
