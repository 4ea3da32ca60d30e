//! HTTP/JSON surface over the knowledge store.
//!
//! Routes live under `/api`, plus `/health`. Handlers run store operations on
//! the blocking pool. Validation failures map to 422 and everything else to
//! 500, both with a `{"detail": ...}` body.

pub mod routes;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::knowledge::{KnowledgeError, KnowledgeStore};

pub type AppState = Arc<KnowledgeStore>;

/// The API routes with state applied and no middleware.
pub fn routes(store: AppState) -> Router {
    Router::new()
        .route("/api/write", post(routes::write))
        .route("/api/search", post(routes::search))
        .route("/api/list", get(routes::list))
        .route("/api/update/{id}", put(routes::update))
        .route("/api/delete/{id}", delete(routes::remove))
        .route("/api/stats", get(routes::stats))
        .route("/health", get(routes::health))
        .with_state(store)
}

/// Apply CORS and request tracing to `router`.
pub fn with_layers(router: Router) -> Router {
    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// The complete HTTP API.
pub fn router(store: AppState) -> Router {
    with_layers(routes(store))
}

#[derive(Debug)]
pub struct ApiError(KnowledgeError);

impl From<KnowledgeError> for ApiError {
    fn from(err: KnowledgeError) -> Self {
        Self(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self(KnowledgeError::Operational(anyhow::anyhow!("store task failed: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            tracing::error!(error = %self.0, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(serde_json::json!({ "detail": self.0.to_string() }))).into_response()
    }
}
