//! Shared server state.

use std::sync::Arc;

use tokio::sync::OnceCell;
use user_proxy::SessionRegistry;

use crate::config::ApiConfig;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    sessions: Arc<OnceCell<Arc<SessionRegistry>>>,
}

impl AppState {
    /// State that answers 503 until [`AppState::mark_ready`] is called.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(OnceCell::new()),
        }
    }

    /// Finish startup. Later calls are ignored.
    pub fn mark_ready(&self, sessions: SessionRegistry) {
        let _ = self.sessions.set(Arc::new(sessions));
    }

    pub fn is_ready(&self) -> bool {
        self.sessions.initialized()
    }

    pub fn sessions(&self) -> Result<Arc<SessionRegistry>, ApiError> {
        self.sessions.get().cloned().ok_or(ApiError::NotReady)
    }

    pub async fn active_sessions(&self) -> usize {
        match self.sessions.get() {
            Some(sessions) => sessions.len().await,
            None => 0,
        }
    }
}
