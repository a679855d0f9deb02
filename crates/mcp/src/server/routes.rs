//! Axum routes for the discovery endpoint.

use crate::error::ServerError;
use crate::jsonrpc::{self, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use apiscribe_engine::DiscoveryService;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

const SERVER_NAME: &str = "apiscribe";

/// Builds the router serving the discovery document under `/mcp`.
pub fn router(service: Arc<DiscoveryService>) -> Router {
    Router::new()
        .route("/mcp", get(document).post(rpc))
        .route("/mcp/tools", get(tools))
        .route("/mcp/invalidate", post(invalidate))
        .layer(middleware::from_fn(log_request))
        .with_state(service)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(%method, %path, status = response.status().as_u16(), "handled request");
    response
}

/// Runs a discovery call off the async workers; generation is CPU-bound and
/// holds a blocking lock.
async fn run_blocking<T, F>(service: Arc<DiscoveryService>, task: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&DiscoveryService) -> Result<T, ServerError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || task(&service)).await?
}

async fn document(State(service): State<Arc<DiscoveryService>>) -> Result<Json<Value>, ServerError> {
    let value = run_blocking(service, |service| {
        let document = service.generate_document()?;
        Ok(serde_json::to_value(&*document)?)
    })
    .await?;
    Ok(Json(value))
}

async fn tools(State(service): State<Arc<DiscoveryService>>) -> Result<Json<Value>, ServerError> {
    let listing = run_blocking(service, |service| Ok(service.tools_listing()?)).await?;
    Ok(Json(listing))
}

async fn invalidate(State(service): State<Arc<DiscoveryService>>) -> Result<StatusCode, ServerError> {
    run_blocking(service, |service| {
        service.invalidate_cache();
        Ok(())
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn rpc(State(service): State<Arc<DiscoveryService>>, body: Bytes) -> Response {
    let request = match jsonrpc::parse_request(&body) {
        Ok(request) => request,
        Err((id, error)) => return rpc_failure(id, error),
    };
    if request.is_notification() {
        debug!(method = %request.method, "notification acknowledged");
        return StatusCode::ACCEPTED.into_response();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    match dispatch(service, &request).await {
        Ok(result) => (StatusCode::OK, Json(JsonRpcResponse::success(id, result))).into_response(),
        Err(error) => rpc_failure(id, error),
    }
}

async fn dispatch(service: Arc<DiscoveryService>, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(initialize_result(&service)),
        "ping" => Ok(json!({})),
        "tools/list" => run_blocking(service, |service| Ok(service.tools_listing()?))
            .await
            .map_err(|error| JsonRpcError::Internal(error.to_string())),
        other => Err(JsonRpcError::MethodNotFound(other.to_string())),
    }
}

fn initialize_result(service: &DiscoveryService) -> Value {
    let info = &service.options().info;
    let mut result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": info.title.as_deref().unwrap_or(SERVER_NAME),
            "version": env!("CARGO_PKG_VERSION"),
        },
    });
    if let Some(description) = &info.description {
        result["instructions"] = Value::from(description.as_str());
    }
    result
}

fn rpc_failure(id: Value, error: JsonRpcError) -> Response {
    debug!(code = error.code(), %error, "json-rpc request failed");
    let status = match error {
        JsonRpcError::Internal(_) => StatusCode::OK,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(JsonRpcResponse::failure(id, &error))).into_response()
}
