//! Replica endpoint: accepts writes forwarded by remote coordinators

use crate::common::{ReplicaConfig, Result, WriteMetrics};
use crate::coordinator::remote::INTERNAL_WRITE_PATH;
use crate::coordinator::{LocalWriter, PointsWriter, WriteRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct ReplicaState {
    pub node_id: String,
    pub store: Arc<LocalWriter>,
    pub metrics: Arc<WriteMetrics>,
}

impl ReplicaState {
    pub fn new(node_id: impl Into<String>, store: Arc<LocalWriter>) -> Self {
        Self {
            node_id: node_id.into(),
            store,
            metrics: Arc::new(WriteMetrics::new()),
        }
    }
}

pub fn create_router(state: ReplicaState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route(INTERNAL_WRITE_PATH, post(internal_write))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<ReplicaState>) -> impl IntoResponse {
    let points = state.store.point_count().unwrap_or(0);
    Json(json!({
        "status": "healthy",
        "node_id": state.node_id,
        "points": points,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Prometheus text exposition of replica write outcomes.
async fn metrics(State(state): State<ReplicaState>) -> impl IntoResponse {
    let mut out = state.metrics.to_prometheus();
    let points = state.store.point_count().unwrap_or(0);
    out += "# TYPE minits_stored_points gauge\n";
    out += &format!("minits_stored_points {}\n", points);
    (StatusCode::OK, out)
}

async fn internal_write(
    State(state): State<ReplicaState>,
    Json(request): Json<WriteRequest>,
) -> Response {
    let request_id = request.id();
    let level = request.consistency();
    let result = state.store.write(Arc::new(request)).await;
    state.metrics.record(level, &result);
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "rejected replicated write");
            (e.to_http_status(), e.to_string()).into_response()
        }
    }
}

pub struct ReplicaServer {
    config: ReplicaConfig,
    node_id: String,
    store: Arc<LocalWriter>,
}

impl ReplicaServer {
    pub fn new(config: ReplicaConfig, node_id: String) -> Self {
        Self {
            config,
            node_id,
            store: Arc::new(LocalWriter::new()),
        }
    }

    pub fn store(&self) -> Arc<LocalWriter> {
        Arc::clone(&self.store)
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting replica: {}", self.node_id);
        tracing::info!("  Write API: {}", self.config.bind_addr);

        let router = create_router(ReplicaState::new(self.node_id.clone(), self.store));
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!("✓ Replica ready");

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down replica");
            })
            .await?;

        Ok(())
    }
}
