// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use dossier_agent::ChatEngine;
use dossier_config::model::GatewayConfig;
use dossier_core::DossierError;
use dossier_knowledge::KnowledgeStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The chat pipeline; also owns the ledger and analytics stores.
    pub engine: Arc<ChatEngine>,
    /// Loaded knowledge base (for `/health` and `/resume`).
    pub knowledge: KnowledgeStore,
    /// Authentication for the inspection routes.
    pub auth: AuthConfig,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(engine: Arc<ChatEngine>, knowledge: KnowledgeStore, auth: AuthConfig) -> Self {
        Self {
            engine,
            knowledge,
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Address the gateway binds to.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Build the full router.
///
/// Public: `POST /chat`, `GET /health`, `GET /`, `GET /resume`.
/// Bearer-protected: `/analytics` and `/conversations/...`.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/", get(handlers::get_index))
        .route("/chat", post(handlers::post_chat))
        .route("/health", get(handlers::get_health))
        .route("/resume", get(handlers::get_resume))
        .with_state(state.clone());

    let inspection_routes = Router::new()
        .route("/analytics", get(handlers::get_analytics))
        .route("/conversations", get(handlers::list_conversations))
        .route("/conversations/export", get(handlers::export_conversations))
        .route(
            "/conversations/{session_id}",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(inspection_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), DossierError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DossierError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| DossierError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
