//! Error types for the HTTP boundary.

use apiscribe_engine::DiscoveryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Failures surfaced by the plain HTTP endpoints.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("discovery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServerError {
    fn kind(&self) -> &'static str {
        match self {
            ServerError::Discovery(_) => "discovery",
            ServerError::Task(_) => "task",
            ServerError::Serialization(_) => "serialization",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        warn!(error = %self, "request failed");
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
