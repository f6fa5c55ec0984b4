//! ToolExecutor implementation backed by ToolRegistry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use brain_core::{ToolExecutor, ToolRequest, ToolResult, ToolSpec};
use tokio::time::timeout;
use tracing::warn;

use crate::ToolRegistry;

/// Limits applied to every tool call routed through the executor.
#[derive(Debug, Clone, Default)]
pub struct ToolPolicy {
    /// When set, only these tools may run.
    pub allowlist: Option<HashSet<String>>,
    pub timeout: Option<Duration>,
}

impl ToolPolicy {
    pub fn allow_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowlist = self.allowlist.get_or_insert_with(HashSet::new);
        for tool in tools {
            allowlist.insert(tool.into());
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn is_allowed(&self, tool: &str) -> bool {
        self.allowlist
            .as_ref()
            .map_or(true, |allowed| allowed.contains(tool))
    }
}

/// Exposes a [`ToolRegistry`] to a brain.
///
/// Tool failures are turned into error results for the model to read,
/// never into brain errors.
pub struct RegistryToolExecutor {
    registry: Arc<ToolRegistry>,
    policy: ToolPolicy,
}

impl RegistryToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::with_policy(registry, ToolPolicy::default())
    }

    pub fn with_policy(registry: ToolRegistry, policy: ToolPolicy) -> Self {
        Self {
            registry: Arc::new(registry),
            policy,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.registry.as_ref()
    }
}

#[async_trait::async_trait]
impl ToolExecutor for RegistryToolExecutor {
    async fn execute(&self, request: ToolRequest) -> ToolResult {
        if !self.policy.is_allowed(&request.name) {
            return ToolResult::error(&request.id, "Tool not allowed");
        }

        let execute_future = self
            .registry
            .execute(&request.name, request.arguments.clone());

        let result = match self.policy.timeout {
            Some(limit) => match timeout(limit, execute_future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(tool = %request.name, "TOOL_TIMEOUT");
                    return ToolResult::error(&request.id, "Tool execution timed out");
                }
            },
            None => execute_future.await,
        };

        match result {
            Ok(output) if output.success => ToolResult::success(&request.id, output.content),
            Ok(output) => ToolResult::error(&request.id, output.content),
            Err(error) => {
                warn!(tool = %request.name, error = %error, "TOOL_FAILED");
                ToolResult::error(&request.id, error.to_string())
            }
        }
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        self.registry
            .specs()
            .into_iter()
            .filter(|spec| self.policy.is_allowed(&spec.name))
            .collect()
    }
}
