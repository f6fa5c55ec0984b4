//! HTTP handlers.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use orchestrator::{Specialist, StrategyKind};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use user_proxy::SessionHandle;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub orchestrator_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub session_id: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub session_id: String,
    pub command: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/agent_chat", post(agent_chat))
        .route("/session_status/:session_id", get(session_status))
        .route("/set_preference", post(set_preference))
        .route("/execute_command", post(execute_command))
        .route("/agent_status", get(agent_status))
        .route("/clear_session/:session_id", post(clear_session))
        .route("/clear_chat_history", post(clear_chat_history))
        .with_state(state)
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": state.config.service_name,
        "version": state.config.service_version,
        "health": "/health",
        "endpoints": {
            "chat": "POST /agent_chat",
            "session_status": "GET /session_status/{session_id}",
            "agent_status": "GET /agent_status",
            "set_preference": "POST /set_preference",
            "execute_command": "POST /execute_command",
            "clear_history": "POST /clear_chat_history",
            "clear_session": "POST /clear_session/{session_id}"
        },
        "orchestrator_types": ["keyword", "llm", "rule"],
        "active_sessions": state.active_sessions().await,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": if state.is_ready() { "healthy" } else { "starting" },
        "service": state.config.service_name,
        "version": state.config.service_version,
    }))
}

pub async fn agent_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let kind = request
        .orchestrator_type
        .as_deref()
        .map(str::parse::<StrategyKind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let session = session_for(&state, &request.session_id, kind).await?;

    // commands answer with the JSON envelope even when streaming was asked for
    let mut proxy = session.lock().await;
    if let Some(reply) = proxy.handle_command(&request.message) {
        return Ok(Json(json!({
            "status": "success",
            "session_id": request.session_id,
            "response": reply,
            "type": "command",
        }))
        .into_response());
    }

    if request.stream {
        drop(proxy);
        return Ok(stream_reply(session, request.message));
    }

    let reply = proxy.process_message(&request.message).await?;
    let agent_used = proxy
        .current_agent()
        .map_or("auto-routed", Specialist::as_str);
    Ok(Json(json!({
        "status": "success",
        "session_id": request.session_id,
        "response": reply,
        "type": "message",
        "agent_used": agent_used,
    }))
    .into_response())
}

/// Stream a reply as `text/plain`.
///
/// The session stays locked until the reply is complete. Failures after the
/// body has started are written into the body.
fn stream_reply(session: SessionHandle, message: String) -> Response {
    let (tx, rx) = mpsc::channel::<Result<String, Infallible>>(32);

    tokio::spawn(async move {
        let mut proxy = session.lock_owned().await;
        let mut fragments = match proxy.process_message_stream(&message).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(error = %e, "STREAM_FAILED");
                let _ = tx.send(Ok(format!("Error: {}", e))).await;
                return;
            }
        };

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment.unwrap_or_else(|e| {
                warn!(error = %e, "STREAM_FAILED");
                format!("\n\nError: {}", e)
            });
            if tx.send(Ok(fragment)).await.is_err() {
                // client went away
                break;
            }
        }
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = existing_session(&state, &session_id).await?;
    let proxy = session.lock().await;

    Ok(Json(json!({
        "status": "success",
        "session_id": session_id,
        "details": proxy.status(),
        "current_agent": proxy.current_agent(),
        "message_count": proxy.history().len(),
        "preferences": proxy.preferences(),
    })))
}

pub async fn set_preference(
    State(state): State<AppState>,
    Json(request): Json<PreferenceRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = session_for(&state, &request.session_id, None).await?;
    let mut proxy = session.lock().await;
    let message = proxy.set_preference(request.key, request.value);

    Ok(Json(json!({
        "status": "success",
        "session_id": request.session_id,
        "message": message,
        "preferences": proxy.preferences(),
    })))
}

pub async fn execute_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = session_for(&state, &request.session_id, None).await?;
    let reply = session
        .lock()
        .await
        .handle_command(&request.command)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown command: {}", request.command)))?;

    Ok(Json(json!({
        "status": "success",
        "session_id": request.session_id,
        "response": reply,
    })))
}

pub async fn agent_status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sessions = state.sessions()?;

    let agents: serde_json::Map<String, Value> = Specialist::ALL
        .into_iter()
        .map(|specialist| {
            (
                format!("{}_agent", specialist.as_str()),
                json!({
                    "name": specialist.display_name(),
                    "status": "ready",
                    "capabilities": capabilities(specialist),
                    "keywords": specialist.keywords(),
                }),
            )
        })
        .collect();

    Ok(Json(json!({
        "status": "operational",
        "architecture": "User Proxy → Orchestrator → Specialized Agents",
        "default_orchestrator": sessions.default_kind(),
        "orchestrator_types": {
            "keyword": {
                "description": "Fast keyword-based routing",
                "best_for": "High-volume, predictable queries"
            },
            "llm": {
                "description": "Classifier model routing with keyword fallback",
                "best_for": "Complex, ambiguous queries"
            },
            "rule": {
                "description": "Priority-ordered business rules",
                "best_for": "Auditable routing policies"
            }
        },
        "agents": agents,
        "proxy_features": [
            "Clarification requests",
            "User context management",
            "Response formatting",
            "Follow-up suggestions",
            "Command handling",
            "Session persistence"
        ],
        "active_sessions": sessions.len().await,
    })))
}

fn capabilities(specialist: Specialist) -> &'static [&'static str] {
    match specialist {
        Specialist::GitHub => &[
            "list_repositories",
            "view_files",
            "read_content",
            "create_issues",
        ],
        Specialist::Math => &["arithmetic", "expression_evaluation"],
    }
}

pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.sessions()?.remove(&session_id).await {
        return Err(ApiError::NotFound(format!("Session not found: {}", session_id)));
    }
    Ok(Json(json!({
        "status": "success",
        "message": format!("Session {} cleared completely", session_id),
    })))
}

pub async fn clear_chat_history(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(session) = state.sessions()?.get(&request.session_id).await else {
        return Ok(Json(json!({
            "status": "success",
            "message": format!("No history found for session {}", request.session_id),
        })));
    };

    let message = session.lock().await.clear_history();
    Ok(Json(json!({
        "status": "success",
        "session_id": request.session_id,
        "message": message,
    })))
}

async fn session_for(
    state: &AppState,
    session_id: &str,
    kind: Option<StrategyKind>,
) -> Result<SessionHandle, ApiError> {
    let sessions = state.sessions()?;
    let handle = sessions.get_or_create(session_id, kind).await?;
    info!(session_id = %session_id, "SESSION_REQUEST");
    Ok(handle)
}

async fn existing_session(state: &AppState, session_id: &str) -> Result<SessionHandle, ApiError> {
    state
        .sessions()?
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", session_id)))
}
