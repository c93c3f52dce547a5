//! MCP (Model Context Protocol) integration
//!
//! This module provides the transport layer that exposes the Zoekt tools.

pub mod server;

pub use server::{MCP_PATH, SSE_PATH, http_router, serve, shutdown_signal};
