//! Failing brain implementation - every call returns an error.

use brain_core::{async_trait, Brain, BrainError, InboundMessage, OutboundMessage};

/// A brain whose every call fails with `ProcessingFailed`.
///
/// Useful for testing fallback paths such as classifier failure.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    reason: String,
}

impl FailingBrain {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingBrain {
    fn default() -> Self {
        Self::new("model unavailable")
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn process(&self, _message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        Err(BrainError::ProcessingFailed(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}
