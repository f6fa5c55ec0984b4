//! Streamed routing output.
//!
//! A routed reply is a forward-only sequence of [`RouteEvent`]s that always
//! ends with [`RouteEvent::End`] unless the specialist fails midway, in which
//! case the error is the last item.

use std::collections::VecDeque;

use brain_core::BrainStream;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;

use crate::error::OrchestratorError;
use crate::specialist::Specialist;
use crate::tracker::ToolTracker;

/// One element of a routed reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RouteEvent {
    /// A fragment of reply text, in generation order.
    Text(String),
    /// First invocation of a tool within this reply.
    ToolCall { name: String },
    /// Terminal element, carrying the routing outcome.
    End {
        switch_notice: Option<String>,
        specialist: Option<Specialist>,
    },
}

impl RouteEvent {
    /// Text a live display should print for this event, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            RouteEvent::Text(text) => Some(text.clone()),
            RouteEvent::ToolCall { name } => Some(format!("\n🔧 Calling tool: {}\n", name)),
            RouteEvent::End { .. } => None,
        }
    }
}

pub type RouteStream<'a> = BoxStream<'a, Result<RouteEvent, OrchestratorError>>;

/// A fully collected routed reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteResponse {
    /// Reply text including the tools-used trailer.
    pub text: String,
    pub switch_notice: Option<String>,
    pub specialist: Option<Specialist>,
    pub tools_used: Vec<String>,
}

impl RouteResponse {
    /// Drain a stream into a single response.
    ///
    /// Tool announcements are recorded in `tools_used` rather than inlined.
    pub async fn collect(mut stream: RouteStream<'_>) -> Result<Self, OrchestratorError> {
        let mut response = RouteResponse::default();
        while let Some(event) = stream.next().await {
            match event? {
                RouteEvent::Text(text) => response.text.push_str(&text),
                RouteEvent::ToolCall { name } => response.tools_used.push(name),
                RouteEvent::End {
                    switch_notice,
                    specialist,
                } => {
                    response.switch_notice = switch_notice;
                    response.specialist = specialist;
                }
            }
        }
        Ok(response)
    }
}

/// A stream holding only the given text, ended without a routing outcome.
pub fn static_reply<'a>(text: String) -> RouteStream<'a> {
    stream::iter([
        Ok(RouteEvent::Text(text)),
        Ok(RouteEvent::End {
            switch_notice: None,
            specialist: None,
        }),
    ])
    .boxed()
}

struct DispatchState<'a> {
    inner: BrainStream<'a>,
    tracker: ToolTracker,
    pending: VecDeque<RouteEvent>,
    switch_notice: Option<String>,
    specialist: Specialist,
    finished: bool,
}

/// Translate a specialist's chunk stream into route events.
pub fn dispatch<'a>(
    inner: BrainStream<'a>,
    switch_notice: Option<String>,
    specialist: Specialist,
) -> RouteStream<'a> {
    let state = DispatchState {
        inner,
        tracker: ToolTracker::new(),
        pending: VecDeque::new(),
        switch_notice,
        specialist,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event), state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    for call in chunk.tool_calls {
                        if state.tracker.observe(&call.name) {
                            state.pending.push_back(RouteEvent::ToolCall { name: call.name });
                        }
                    }
                    if let Some(text) = chunk.text.filter(|t| !t.is_empty()) {
                        state.pending.push_back(RouteEvent::Text(text));
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(OrchestratorError::from(e)), state));
                }
                None => {
                    state.finished = true;
                    if let Some(summary) = state.tracker.summary() {
                        state.pending.push_back(RouteEvent::Text(summary));
                    }
                    state.pending.push_back(RouteEvent::End {
                        switch_notice: state.switch_notice.take(),
                        specialist: Some(state.specialist),
                    });
                }
            }
        }
    })
    .boxed()
}
