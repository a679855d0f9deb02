//! Minimal JSON-RPC 2.0 envelope used by the MCP endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

/// Incoming JSON-RPC request payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Notifications carry no id and expect no response body.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: &JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcErrorObject {
                code: error.code(),
                message: error.to_string(),
            }),
        }
    }
}

/// Wire form of a JSON-RPC error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Failures reported through the JSON-RPC error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonRpcError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl JsonRpcError {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcError::Parse(_) => PARSE_ERROR,
            JsonRpcError::InvalidRequest(_) => INVALID_REQUEST,
            JsonRpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            JsonRpcError::Internal(_) => INTERNAL_ERROR,
        }
    }
}

/// Parses a request body, separating malformed JSON from malformed envelopes.
///
/// On failure the returned id is the request's id when one could be read.
pub fn parse_request(bytes: &[u8]) -> Result<JsonRpcRequest, (Value, JsonRpcError)> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|error| (Value::Null, JsonRpcError::Parse(error.to_string())))?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|error| (id.clone(), JsonRpcError::InvalidRequest(error.to_string())))?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err((
            id,
            JsonRpcError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
        ));
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_json_is_a_parse_error() {
        let (id, error) = parse_request(b"{not json").expect_err("parse error");
        assert_eq!(id, Value::Null);
        assert_eq!(error.code(), PARSE_ERROR);
    }

    #[test]
    fn missing_method_is_an_invalid_request() {
        let (id, error) = parse_request(br#"{"jsonrpc":"2.0","id":7}"#).expect_err("invalid request");
        assert_eq!(id, json!(7));
        assert_eq!(error.code(), INVALID_REQUEST);
    }

    #[test]
    fn wrong_version_is_an_invalid_request() {
        let (_, error) = parse_request(br#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#).expect_err("invalid version");
        assert!(matches!(error, JsonRpcError::InvalidRequest(message) if message.contains("1.0")));
    }

    #[test]
    fn notification_has_no_id() {
        let request =
            parse_request(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).expect("parse notification");
        assert!(request.is_notification());
    }

    #[test]
    fn failure_serializes_without_result() {
        let response = JsonRpcResponse::failure(json!(3), &JsonRpcError::MethodNotFound("tools/call".to_string()));
        assert_eq!(
            serde_json::to_value(response).expect("serialize response"),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "error": { "code": -32601, "message": "method not found: tools/call" }
            })
        );
    }
}
