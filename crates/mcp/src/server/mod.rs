mod http;
mod routes;

pub use http::{McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
pub use routes::{PROTOCOL_VERSION, router};
