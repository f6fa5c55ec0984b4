//! The conversation manager sitting in front of the orchestrator.

use std::collections::VecDeque;

use futures::stream::{self, BoxStream, StreamExt};
use orchestrator::{Orchestrator, RouteEvent, RouteStream, Specialist};
use tracing::{debug, info};

use crate::clarification::{self, Clarification, ClarificationKind, OWNER_REPO};
use crate::commands::{Command, HELP_TEXT};
use crate::context::{ConversationLog, DelegationStats, Preferences, Role, DEFAULT_REPO_KEY};
use crate::error::ProxyError;
use crate::formatting::{follow_up_suggestions, format_response, format_stats, format_status, on_off};

/// Keywords that make a query eligible for the default repository.
const REPOSITORY_CONTEXT_KEYWORDS: [&str; 5] = ["file", "commit", "branch", "repo", "code"];

/// Formatted reply fragments, in display order.
pub type ProxyStream<'a> = BoxStream<'a, Result<String, ProxyError>>;

#[derive(Debug, Default)]
struct SessionState {
    history: ConversationLog,
    preferences: Preferences,
    pending: Option<Clarification>,
    stats: DelegationStats,
    debug: bool,
}

/// What to do with a message after the proxy's own checks.
enum Step {
    /// Answered by the proxy; already recorded in history.
    Reply(String),
    /// Send this text to the orchestrator.
    Delegate(String),
}

/// Manages one user's conversation.
///
/// Each message is recorded, checked for a pending or needed clarification,
/// enriched with preferences and then delegated. Replies are decorated with
/// the switch notice and follow-up suggestions.
///
/// A proxy serves one caller at a time; every entry point takes `&mut self`.
pub struct UserProxy {
    orchestrator: Orchestrator,
    state: SessionState,
}

impl UserProxy {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            state: SessionState::default(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.state.debug = debug;
        self
    }

    /// Initialize the underlying orchestrator.
    pub async fn initialize(&mut self) -> Result<(), ProxyError> {
        self.orchestrator.initialize().await?;
        if self.state.debug {
            info!(target: "proxy_debug", strategy = %self.orchestrator.strategy_kind(), "PROXY_READY");
        }
        Ok(())
    }

    /// Process a user message and return the formatted reply.
    pub async fn process_message(&mut self, input: &str) -> Result<String, ProxyError> {
        let processed = match self.prepare(input) {
            Step::Reply(reply) => return Ok(reply),
            Step::Delegate(processed) => processed,
        };

        let response = self.orchestrator.route_query(&processed).await?;
        if self.state.debug {
            if let Some(notice) = &response.switch_notice {
                info!(target: "proxy_debug", notice = %notice, "ORCHESTRATOR_ROUTED");
            }
        }

        let formatted = format_response(
            &response.text,
            response.switch_notice.as_deref(),
            response.specialist,
        );
        self.state.history.push(Role::Assistant, formatted.clone());
        Ok(formatted)
    }

    /// Process a user message, streaming the reply as it is produced.
    ///
    /// Agent text and tool announcements arrive first, then the switch
    /// notice (if any) and the suggestions. The reassembled formatted reply
    /// is recorded in history once the stream is exhausted.
    pub async fn process_message_stream(
        &mut self,
        input: &str,
    ) -> Result<ProxyStream<'_>, ProxyError> {
        let processed = match self.prepare(input) {
            Step::Reply(reply) => return Ok(stream::once(async move { Ok(reply) }).boxed()),
            Step::Delegate(processed) => processed,
        };

        let Self {
            orchestrator,
            state,
        } = self;
        let inner = orchestrator.route_query_stream(&processed).await?;
        Ok(reassemble(inner, &mut state.history))
    }

    /// Handle an out-of-band command.
    ///
    /// Returns `None` when `input` is not a command and should go through
    /// [`UserProxy::process_message`] instead.
    pub fn handle_command(&mut self, input: &str) -> Option<String> {
        let command = Command::parse(input)?;
        if self.state.debug {
            let handler = if command.is_proxy_local() { "proxy" } else { "orchestrator" };
            info!(target: "proxy_debug", command = ?command, handler, "COMMAND");
        }

        let reply = match command {
            Command::Help => {
                self.state.stats.proxy_handled += 1;
                HELP_TEXT.to_string()
            }
            Command::Status => {
                self.state.stats.proxy_handled += 1;
                self.status()
            }
            Command::Clear => {
                self.state.stats.proxy_handled += 1;
                self.clear_history()
            }
            Command::ClearContext => {
                self.state.stats.proxy_handled += 1;
                self.clear_context()
            }
            Command::SetPreference { key, value } => {
                self.state.stats.proxy_handled += 1;
                self.set_preference(key, value)
            }
            Command::ToggleDebug => {
                self.state.debug = !self.state.debug;
                format!("✅ Debug mode: {}", on_off(self.state.debug))
            }
            Command::Stats => format_stats(&self.state.stats),
            Command::ListAgents => self.orchestrator.list_agents(),
            Command::Switch(name) => self.orchestrator.switch_agent(&name).message,
        };
        Some(reply)
    }

    pub fn set_preference(&mut self, key: impl Into<String>, value: impl Into<String>) -> String {
        let (key, value) = (key.into(), value.into());
        let reply = format!("✅ Preference set: {} = {}", key, value);
        self.state.preferences.insert(key, value);
        reply
    }

    pub fn preference(&self, key: &str) -> Option<&str> {
        self.state.preferences.get(key).map(String::as_str)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.state.preferences
    }

    /// Clear this conversation and every specialist thread.
    pub fn clear_history(&mut self) -> String {
        self.state.history.clear();
        self.state.pending = None;
        self.orchestrator.clear_all_history();
        "✅ Conversation history cleared".to_string()
    }

    pub fn clear_context(&mut self) -> String {
        self.state.preferences.clear();
        "✅ User context cleared".to_string()
    }

    pub fn status(&self) -> String {
        format_status(
            self.orchestrator.current_agent(),
            self.state.history.len(),
            &self.state.preferences,
            self.state.debug,
        )
    }

    pub fn history(&self) -> &ConversationLog {
        &self.state.history
    }

    pub fn stats(&self) -> DelegationStats {
        self.state.stats
    }

    pub fn is_debug(&self) -> bool {
        self.state.debug
    }

    pub fn is_waiting_for_clarification(&self) -> bool {
        self.state.pending.is_some()
    }

    pub fn current_agent(&self) -> Option<Specialist> {
        self.orchestrator.current_agent()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// The proxy-side part of message handling, up to delegation.
    fn prepare(&mut self, input: &str) -> Step {
        let state = &mut self.state;
        state.history.push(Role::User, input);

        if let Some(pending) = state.pending.take() {
            if let Some(reply) = apply_suggestion(state, &pending, input) {
                state.history.push(Role::Assistant, reply.clone());
                return Step::Reply(reply);
            }
            debug!(kind = ?pending.kind, "CLARIFICATION_ANSWERED");
        }

        // an unaccepted answer goes through the pipeline as a fresh query
        if let Some(found) = clarification::detect(input, state.history.len(), &state.preferences) {
            if state.debug {
                info!(target: "proxy_debug", kind = ?found.kind, "CLARIFICATION_REQUESTED");
            }
            state.stats.clarifications += 1;
            let reply = found.render();
            state.pending = Some(found);
            state.history.push(Role::Assistant, reply.clone());
            return Step::Reply(reply);
        }

        let processed = apply_default_repository(input, &state.preferences);
        state.stats.agent_delegated += 1;
        if state.debug {
            if processed != input {
                info!(target: "proxy_debug", original = %input, processed = %processed, "CONTEXT_APPLIED");
            }
            info!(target: "proxy_debug", "DELEGATING");
        }
        Step::Delegate(processed)
    }
}

/// Apply an accepted clarification suggestion, returning the confirmation.
fn apply_suggestion(
    state: &mut SessionState,
    pending: &Clarification,
    answer: &str,
) -> Option<String> {
    if pending.kind != ClarificationKind::MissingRepository || !clarification::is_affirmative(answer) {
        return None;
    }
    let repository = pending.suggestion.clone()?;
    state
        .preferences
        .insert(DEFAULT_REPO_KEY.to_string(), repository.clone());
    Some(format!(
        "✅ Set default repository to: {}\n\nWhat would you like to do with this repository?",
        repository
    ))
}

/// Annotate repository-flavoured queries with the default repository.
fn apply_default_repository(input: &str, preferences: &Preferences) -> String {
    let Some(repository) = preferences.get(DEFAULT_REPO_KEY) else {
        return input.to_string();
    };
    let lowered = input.to_lowercase();
    let relevant = REPOSITORY_CONTEXT_KEYWORDS.iter().any(|k| lowered.contains(k));
    if relevant && !OWNER_REPO.is_match(input) {
        format!("{} (using repository: {})", input, repository)
    } else {
        input.to_string()
    }
}

struct Reassembly<'a> {
    inner: RouteStream<'a>,
    history: &'a mut ConversationLog,
    body: String,
    pending: VecDeque<String>,
    finished: bool,
}

fn reassemble<'a>(inner: RouteStream<'a>, history: &'a mut ConversationLog) -> ProxyStream<'a> {
    let state = Reassembly {
        inner,
        history,
        body: String::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(RouteEvent::Text(text))) => {
                    state.body.push_str(&text);
                    return Some((Ok(text), state));
                }
                Some(Ok(event @ RouteEvent::ToolCall { .. })) => {
                    if let Some(rendered) = event.render() {
                        return Some((Ok(rendered), state));
                    }
                }
                Some(Ok(RouteEvent::End {
                    switch_notice,
                    specialist,
                })) => {
                    state.finished = true;
                    if let Some(notice) = &switch_notice {
                        state.pending.push_back(format!("\n\n{}", notice));
                    }
                    state
                        .pending
                        .push_back(format!("\n\n{}", follow_up_suggestions(&state.body, specialist)));
                    let formatted =
                        format_response(&state.body, switch_notice.as_deref(), specialist);
                    state.history.push(Role::Assistant, formatted);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(ProxyError::from(e)), state));
                }
                None => state.finished = true,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_repository_annotation() {
        let mut prefs = Preferences::new();
        assert_eq!(apply_default_repository("show me the commits", &prefs), "show me the commits");

        prefs.insert(DEFAULT_REPO_KEY.into(), "acme/widgets".into());
        assert_eq!(
            apply_default_repository("show me the commits", &prefs),
            "show me the commits (using repository: acme/widgets)"
        );
        assert_eq!(
            apply_default_repository("show commits in foo/bar", &prefs),
            "show commits in foo/bar"
        );
        assert_eq!(apply_default_repository("what is 2 + 2", &prefs), "what is 2 + 2");
    }

    #[test]
    fn test_suggestion_only_for_missing_repository() {
        let mut state = SessionState::default();
        let pending = clarification::detect("show the latest commits", 3, &Preferences::new())
            .unwrap();

        assert!(apply_suggestion(&mut state, &pending, "no").is_none());
        let reply = apply_suggestion(&mut state, &pending, "yes").unwrap();
        assert!(reply.starts_with("✅ Set default repository to: octocat/Hello-World"));
        assert_eq!(
            state.preferences.get(DEFAULT_REPO_KEY).map(String::as_str),
            Some("octocat/Hello-World")
        );
    }
}
