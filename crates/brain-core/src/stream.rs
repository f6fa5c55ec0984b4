//! Streaming output of a brain.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::BrainError;

/// Record of a single tool invocation made by a brain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the invoked tool.
    pub name: String,
}

impl ToolCallRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One element of a brain's streamed answer.
///
/// A chunk may carry text, tool-call records, or both. Tool calls in a
/// chunk happened before the text in the same chunk was generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrainChunk {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl BrainChunk {
    /// A chunk carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A chunk carrying only tool-call records.
    pub fn tools<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: None,
            tool_calls: names.into_iter().map(ToolCallRecord::new).collect(),
        }
    }
}

/// Forward-only, single-pass stream of chunks.
pub type BrainStream<'a> = BoxStream<'a, Result<BrainChunk, BrainError>>;
