//! Session registry for multi-user servers.

use std::collections::HashMap;
use std::sync::Arc;

use orchestrator::{Orchestrator, SpecialistFactory, StrategyKind};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::error::ProxyError;
use crate::proxy::UserProxy;

/// Shared handle to one session's proxy.
pub type SessionHandle = Arc<Mutex<UserProxy>>;

/// Maps session ids to their proxies.
///
/// Sessions are created on first use, each with its own orchestrator, and
/// live until removed or the registry is cleared. The per-session mutex
/// serialises calls against one proxy.
pub struct SessionRegistry {
    factory: Arc<dyn SpecialistFactory>,
    default_kind: StrategyKind,
    debug: bool,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn SpecialistFactory>, default_kind: StrategyKind) -> Self {
        Self {
            factory,
            default_kind,
            debug: false,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create new sessions with debug tracing switched on.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn default_kind(&self) -> StrategyKind {
        self.default_kind
    }

    /// Fetch a session, creating and initializing it if needed.
    ///
    /// `kind` only applies when the session is created.
    pub async fn get_or_create(
        &self,
        session_id: &str,
        kind: Option<StrategyKind>,
    ) -> Result<SessionHandle, ProxyError> {
        if let Some(existing) = self.get(session_id).await {
            return Ok(existing);
        }

        let kind = kind.unwrap_or(self.default_kind);
        let orchestrator = Orchestrator::new(kind, self.factory.clone());
        let mut proxy = UserProxy::new(orchestrator).with_debug(self.debug);
        proxy.initialize().await?;

        let mut sessions = self.sessions.write().await;
        // another request may have created it while we were initializing
        let handle = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!(session_id = %session_id, strategy = %kind, "SESSION_CREATED");
                Arc::new(Mutex::new(proxy))
            })
            .clone();
        Ok(handle)
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Drop a session. Returns `false` if it did not exist.
    pub async fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            info!(session_id = %session_id, "SESSION_REMOVED");
        }
        removed
    }

    /// Drop every session.
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        info!(count, "SESSIONS_CLEARED");
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
