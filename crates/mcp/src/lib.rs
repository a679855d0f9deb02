//! HTTP boundary for the discovery document.
//!
//! Serves the document built by [`apiscribe_engine::DiscoveryService`] under
//! `/mcp`, together with a tools-only listing, a cache invalidation hook and a
//! minimal JSON-RPC envelope for MCP clients (`initialize`, `tools/list`,
//! `ping`).

pub mod error;
pub mod jsonrpc;
pub mod server;

pub use error::ServerError;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::{McpHttpServer, PROTOCOL_VERSION, RunningMcpHttpServer, resolve_bind_address, router};
