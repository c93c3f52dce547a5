//! Zoekt tool router module
//!
//! This module provides the MCP tool routing layer. It registers the three
//! tools with their descriptions and hands every call to the [`ToolAdapter`],
//! converting the resulting envelope into an MCP result.
//!
//! ## Architecture
//!
//! ```text
//! MCP Client
//!     ↓
//! ZoektToolRouter (this module)
//!     ↓
//! ToolAdapter
//!     ├─→ SearchBackend  (search, fetch_content)
//!     └─→ GuideBuilder   (search_prompt_guide)
//! ```
//!
//! ## Exposed MCP Tools
//!
//! 1. **search** - Run a Zoekt query
//! 2. **search_prompt_guide** - Advice on writing a Zoekt query for an objective
//! 3. **fetch_content** - Read a file or list a directory of an indexed repository
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use zoekt_mcp::backend::ZoektClient;
//! use zoekt_mcp::tools::{ToolAdapter, ZoektToolRouter};
//!
//! let client = ZoektClient::new("http://localhost:6070", Duration::from_secs(30)).unwrap();
//! let router = ZoektToolRouter::new(ToolAdapter::new(Arc::new(client)));
//! ```

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::tools::adapter::ToolAdapter;
use crate::tools::params::{FetchContentParams, SearchParams, SearchPromptGuideParams};

/// Main tool router struct
#[derive(Clone)]
pub struct ZoektToolRouter {
    tool_router: ToolRouter<Self>,
    adapter: Arc<ToolAdapter>,
}

impl ZoektToolRouter {
    pub fn new(adapter: ToolAdapter) -> Self {
        Self::from_shared(Arc::new(adapter))
    }

    /// Create a router over an adapter shared with other sessions
    pub fn from_shared(adapter: Arc<ToolAdapter>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            adapter,
        }
    }
}

#[tool_router]
impl ZoektToolRouter {
    /// Run a Zoekt query
    #[tool(
        description = "Search indexed source code with a Zoekt query. The query is passed to Zoekt verbatim: \
combine content terms with filters such as `r:<repo>`, `f:<path regex>`, `lang:<language>`, `sym:<symbol>`, \
`case:yes`, `-` for negation and `or` for alternatives. Returns matching lines with line numbers and context, \
grouped by repository and file. Call search_prompt_guide first if unsure how to phrase the query."
    )]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.adapter.search(params).await.into_call_tool_result())
    }

    /// Build query-writing advice for an objective
    #[tool(
        description = "Get guidance for writing a Zoekt query. Describe what you are \
looking for in plain language; the result suggests a query skeleton, explains each proposed filter and \
includes a Zoekt syntax reference. Does not search."
    )]
    async fn search_prompt_guide(
        &self,
        Parameters(params): Parameters<SearchPromptGuideParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.adapter.search_prompt_guide(params).into_call_tool_result())
    }

    /// Read a file or list a directory
    #[tool(
        description = "Read a file or list a directory of an indexed repository. Use the \
repository name and path shown in search results. Directory listings tag each entry as [dir] or [file]; \
large files are truncated with a marker."
    )]
    async fn fetch_content(
        &self,
        Parameters(params): Parameters<FetchContentParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.adapter.fetch_content(params).await.into_call_tool_result())
    }
}

#[tool_handler]
impl ServerHandler for ZoektToolRouter {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server searches source code indexed by Zoekt: 1) search_prompt_guide - advice on writing a Zoekt query for an objective, 2) search - run a Zoekt query, 3) fetch_content - read a file or list a directory from a search result"
                    .into(),
            ),
        }
    }
}
