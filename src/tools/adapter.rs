//! Tool adapter
//!
//! Validates tool parameters, delegates to the search backend or the guide
//! builder, and shapes the outcome into a [`ToolEnvelope`]. This is the
//! boundary where every failure becomes a value: nothing raised below it
//! reaches the MCP transport.
//!
//! ```text
//! tool call → validate → SearchBackend (search / fetch_content) → shape → envelope
//!                      ↘ GuideBuilder  (search_prompt_guide)   ↗
//! ```

use serde_json::Value;
use std::sync::Arc;

use crate::backend::{ContentPayload, ContentRequest, SearchBackend, SearchRequest};
use crate::guide::GuideBuilder;
use crate::tools::envelope::{ToolEnvelope, ToolFailure};
use crate::tools::params::{FetchContentParams, SearchParams, SearchPromptGuideParams};
use crate::tools::shaping::{
    ShapingLimits, cap_matches, render_directory, render_file, render_search,
};

/// Longest accepted query, in characters
pub const MAX_QUERY_LENGTH: usize = 2048;
/// Matches returned when `limit` is absent
pub const DEFAULT_NUM_RESULTS: usize = 30;
/// Ceiling `limit` is clamped to
pub const MAX_NUM_RESULTS: usize = 500;
/// Context lines when `context_lines` is absent
pub const DEFAULT_CONTEXT_LINES: usize = 5;
/// Ceiling `context_lines` is clamped to
pub const MAX_CONTEXT_LINES: usize = 20;
/// Directory listing depth when `depth` is absent
pub const DEFAULT_TREE_DEPTH: usize = 2;
/// Ceiling `depth` is clamped to
pub const MAX_TREE_DEPTH: usize = 10;

/// Stateless adapter shared by all tool calls
#[derive(Clone)]
pub struct ToolAdapter {
    backend: Arc<dyn SearchBackend>,
    guide: GuideBuilder,
    limits: ShapingLimits,
}

impl ToolAdapter {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            guide: GuideBuilder::new(),
            limits: ShapingLimits::default(),
        }
    }

    pub fn with_guide(mut self, guide: GuideBuilder) -> Self {
        self.guide = guide;
        self
    }

    pub fn with_limits(mut self, limits: ShapingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run a Zoekt query and render its matches
    pub async fn search(&self, params: SearchParams) -> ToolEnvelope {
        let request = match validate_search(params) {
            Ok(request) => request,
            Err(failure) => {
                tracing::info!("Rejected search: {}", failure.message);
                return failure.into();
            }
        };

        tracing::info!(
            query = %request.query,
            limit = request.num_results,
            "Searching"
        );

        let result = match self.backend.search(&request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Search failed for query '{}': {}", request.query, e);
                return e.into();
            }
        };

        let total = result.match_count().max(result.repositories.len());
        let more_available = total >= request.num_results;
        let result = cap_matches(result, request.num_results);
        let shaped = render_search(&request.query, &result, more_available, &self.limits);

        tracing::debug!(
            matches = result.match_count(),
            files = result.files.len(),
            truncated = shaped.truncated,
            "Search complete"
        );

        ToolEnvelope::Success {
            text: shaped.text,
            truncated: shaped.truncated,
        }
    }

    /// Produce query-writing advice for an objective; never calls the backend
    pub fn search_prompt_guide(&self, params: SearchPromptGuideParams) -> ToolEnvelope {
        let objective = params.objective.unwrap_or_default();
        if objective.trim().is_empty() {
            return ToolFailure::invalid_argument("objective must not be empty").into();
        }

        ToolEnvelope::success(self.guide.build(&objective).text)
    }

    /// Fetch a file or a directory listing from a repository
    pub async fn fetch_content(&self, params: FetchContentParams) -> ToolEnvelope {
        let request = match validate_fetch(params) {
            Ok(request) => request,
            Err(failure) => {
                tracing::info!("Rejected fetch_content: {}", failure.message);
                return failure.into();
            }
        };

        tracing::info!(
            repository = %request.repository,
            path = %request.path,
            "Fetching content"
        );

        match self.backend.fetch_content(&request).await {
            Ok(ContentPayload::File { path, content }) => {
                // File reads always come from the indexed default branch
                let shaped = render_file(
                    &request.repository,
                    &path,
                    &content,
                    request.revision.as_deref(),
                    &self.limits,
                );
                ToolEnvelope::Success {
                    text: shaped.text,
                    truncated: shaped.truncated,
                }
            }
            Ok(ContentPayload::Directory {
                path,
                entries,
                truncated,
            }) => {
                let shaped = render_directory(&request.repository, &path, &entries, truncated);
                ToolEnvelope::Success {
                    text: shaped.text,
                    truncated: shaped.truncated,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Error fetching content from {}:{}: {}",
                    request.repository,
                    request.path,
                    e
                );
                e.into()
            }
        }
    }
}

fn validate_search(params: SearchParams) -> Result<SearchRequest, ToolFailure> {
    let query = params.query.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(ToolFailure::invalid_argument("query must not be empty"));
    }
    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ToolFailure::invalid_argument(format!(
            "query exceeds {} characters",
            MAX_QUERY_LENGTH
        )));
    }

    let num_results = positive_clamped(
        "limit",
        integer_arg("limit", params.limit)?,
        DEFAULT_NUM_RESULTS,
        MAX_NUM_RESULTS,
    )?;

    let context_lines = match integer_arg("context_lines", params.context_lines)? {
        None => DEFAULT_CONTEXT_LINES,
        Some(n) if n < 0 => {
            return Err(ToolFailure::invalid_argument(
                "context_lines must not be negative",
            ));
        }
        Some(n) => (n as u64).min(MAX_CONTEXT_LINES as u64) as usize,
    };

    Ok(SearchRequest {
        query: query.to_string(),
        num_results,
        context_lines,
    })
}

fn validate_fetch(params: FetchContentParams) -> Result<ContentRequest, ToolFailure> {
    let repository = params.repo.unwrap_or_default().trim().to_string();
    if repository.is_empty() {
        return Err(ToolFailure::invalid_argument("repo must not be empty"));
    }

    let Some(path) = params.path else {
        return Err(ToolFailure::invalid_argument(
            "path is required; use \".\" for the repository root",
        ));
    };

    let depth = positive_clamped(
        "depth",
        integer_arg("depth", params.depth)?,
        DEFAULT_TREE_DEPTH,
        MAX_TREE_DEPTH,
    )?;

    let revision = params
        .revision
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    // Git ref names never contain whitespace
    if revision.as_deref().is_some_and(|r| r.contains(char::is_whitespace)) {
        return Err(ToolFailure::invalid_argument(
            "revision must be a branch name without whitespace",
        ));
    }

    Ok(ContentRequest {
        repository,
        path: path.trim().to_string(),
        revision,
        depth,
    })
}

/// Read an integer argument sent as a JSON number or a numeric string
///
/// `null` counts as absent. Fractions and anything else are rejected.
fn integer_arg(name: &str, value: Option<Value>) -> Result<Option<i64>, ToolFailure> {
    let invalid = || ToolFailure::invalid_argument(format!("{} must be an integer", name));

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Absent → `default`, non-positive → error, above `max` → `max`
fn positive_clamped(
    name: &str,
    value: Option<i64>,
    default: usize,
    max: usize,
) -> Result<usize, ToolFailure> {
    match value {
        None => Ok(default),
        Some(n) if n <= 0 => Err(ToolFailure::invalid_argument(format!(
            "{} must be a positive integer",
            name
        ))),
        Some(n) => Ok((n as u64).min(max as u64) as usize),
    }
}
