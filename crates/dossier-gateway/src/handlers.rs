// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use dossier_core::{DossierError, HealthStatus};
use dossier_ledger::{ConversationSession, ExportOutcome, SessionSummary};
use serde::{Deserialize, Serialize};

use crate::caller::CallerIdentity;
use crate::server::GatewayState;

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for client compatibility; not used.
    #[serde(default)]
    pub history: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub qa_pairs_loaded: usize,
    pub embeddings_ready: bool,
    pub llm_ready: bool,
    /// Provider health check result, or `unavailable` without a provider.
    pub llm_status: String,
    pub model: String,
    pub retrieval_strategy: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub service: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub total_sessions: usize,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub session_id: String,
    pub removed_from_memory: bool,
    pub removed_from_disk: bool,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: &DossierError) -> Response {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        tracing::error!(error = %err, "inspection request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// GET /
pub async fn get_index(
    State(state): State<GatewayState>,
    CallerIdentity(caller): CallerIdentity,
) -> Json<IndexResponse> {
    state.engine.analytics().record_page_view(&caller);
    Json(IndexResponse {
        service: "dossier".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
    })
}

/// POST /chat
///
/// Always answers 200 with a reply, including for bodies that fail to parse.
pub async fn post_chat(
    State(state): State<GatewayState>,
    CallerIdentity(caller): CallerIdentity,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatResponse> {
    let engine = &state.engine;
    match body {
        Ok(Json(request)) => {
            tracing::debug!(
                ip = %caller.ip_address,
                history = request.history.is_some(),
                "chat request"
            );
            let reply = engine.handle(&caller, &request.message).await;
            Json(ChatResponse { reply: reply.reply })
        }
        Err(rejection) => {
            tracing::warn!(ip = %caller.ip_address, error = %rejection.body_text(), "unreadable chat request");
            let reply = engine.composer().replies().unreadable_request.clone();
            engine.log_turn(&caller, "", &reply).await;
            Json(ChatResponse { reply })
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let engine = &state.engine;
    let provider_health = engine.provider_health().await;
    let status = match provider_health {
        Some(HealthStatus::Degraded(_) | HealthStatus::Unhealthy(_)) => "degraded",
        _ => "healthy",
    };
    let llm_status = provider_health.map_or_else(|| "unavailable".to_string(), |h| h.to_string());
    Json(HealthResponse {
        status: status.to_string(),
        qa_pairs_loaded: state.knowledge.len(),
        embeddings_ready: engine.retriever().embeddings_ready(),
        llm_ready: engine.composer().is_available(),
        llm_status,
        model: engine.composer().model().to_string(),
        retrieval_strategy: engine.retriever().strategy().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /resume
pub async fn get_resume(
    State(state): State<GatewayState>,
    CallerIdentity(caller): CallerIdentity,
) -> Response {
    let Some(resume) = state.knowledge.resume() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no resume is configured".to_string(),
            }),
        )
            .into_response();
    };

    state.engine.analytics().record_resume_download(&caller);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resume.txt\""),
        ],
        resume.to_string(),
    )
        .into_response()
}

/// GET /analytics
pub async fn get_analytics(State(state): State<GatewayState>) -> Response {
    Json(state.engine.analytics().snapshot()).into_response()
}

/// GET /conversations
pub async fn list_conversations(State(state): State<GatewayState>) -> Json<SessionListResponse> {
    let sessions = state.engine.ledger().list().await;
    Json(SessionListResponse {
        total_sessions: sessions.len(),
        sessions,
    })
}

/// GET /conversations/export
pub async fn export_conversations(State(state): State<GatewayState>) -> Response {
    match state.engine.ledger().export_all().await {
        Ok(outcome) => {
            tracing::info!(file = %outcome.file.display(), sessions = outcome.export.total_sessions, "conversations exported");
            Json::<ExportOutcome>(outcome).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /conversations/{session_id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.engine.ledger().get(&session_id).await {
        Ok(Some(session)) => Json::<ConversationSession>(session).into_response(),
        Ok(None) => error_response(&DossierError::NotFound {
            kind: "session".to_string(),
            id: session_id,
        }),
        Err(e) => error_response(&e),
    }
}

/// DELETE /conversations/{session_id}
pub async fn delete_conversation(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.engine.ledger().delete(&session_id).await {
        Ok(outcome) => {
            tracing::info!(%session_id, "conversation deleted");
            Json(DeleteResponse {
                session_id,
                removed_from_memory: outcome.removed_from_memory,
                removed_from_disk: outcome.removed_from_disk,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}
