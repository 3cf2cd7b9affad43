//! Docwarden MCP - Model Context Protocol server
//!
//! Exposes the maintenance passes and the basic collection operations as
//! MCP tools over stdio, or over HTTP with SSE when the `sse` feature is on.

pub mod handlers;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(feature = "sse")]
pub mod sse;

pub use server::McpServer;

#[cfg(feature = "sse")]
pub use sse::run_sse_server;
