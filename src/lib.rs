//! Zoekt MCP - code search tools backed by a Zoekt web server
//!
//! Library modules for the MCP server

pub mod backend;
pub mod config;
pub mod guide;
pub mod mcp;
pub mod tools;
