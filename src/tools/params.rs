//! Tool parameter types
//!
//! Every field is optional at the wire level so that a missing argument
//! reaches the adapter and comes back as an `invalid_argument` envelope
//! instead of a protocol error. Integer fields accept any JSON value for the
//! same reason: `"50"` or `10.5` are judged by the adapter, not by serde.

use rmcp::schemars;
use serde_json::Value;

#[derive(Debug, Clone, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(
        description = "Zoekt query, forwarded verbatim. Example: `r:payments lang:go f:handler \"connection refused\"`"
    )]
    pub query: Option<String>,
    #[schemars(description = "Maximum number of matching lines to return (default 30, capped at 500)")]
    #[schemars(with = "Option<i64>")]
    pub limit: Option<Value>,
    #[schemars(description = "Lines of context around each match (default 5, capped at 20)")]
    #[schemars(with = "Option<i64>")]
    pub context_lines: Option<Value>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchPromptGuideParams {
    #[schemars(description = "What you are trying to find, in plain language")]
    pub objective: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct FetchContentParams {
    #[schemars(description = "Repository name as shown in search results, e.g. `github.com/example/project`")]
    pub repo: Option<String>,
    #[schemars(description = "File or directory path inside the repository; `.` or empty for the root")]
    pub path: Option<String>,
    #[schemars(description = "Optional branch name used to filter directory listings")]
    pub revision: Option<String>,
    #[schemars(description = "Depth of directory listings (default 2, capped at 10)")]
    #[schemars(with = "Option<i64>")]
    pub depth: Option<Value>,
}
