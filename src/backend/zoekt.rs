//! Zoekt web API client
//!
//! Talks to a `zoekt-webserver` over its JSON search endpoint and its HTML
//! `/print` endpoint. Queries are forwarded verbatim: Zoekt owns its grammar
//! and reports syntax errors itself.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::error::BackendError;
use super::listing::build_entries;
use super::print::extract_file_content;
use super::traits::SearchBackend;
use super::{
    ContentPayload, ContentRequest, FileMatch, LineMatch, RepositoryMatch, SearchRequest,
    SearchResult,
};
use crate::config::Config;

/// Number of files requested when rebuilding a directory listing
pub const LISTING_NUM_RESULTS: usize = 1000;

/// HTTP client for a Zoekt web server
#[derive(Debug, Clone)]
pub struct ZoektClient {
    http: reqwest::Client,
    base_url: String,
}

impl ZoektClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zoekt-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the server configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(&config.zoekt_api_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and return the body of a successful response
    async fn get_text(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, BackendError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, ?params, "Zoekt request");

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "Zoekt returned an error status");
            return Err(BackendError::status(status.as_u16(), body));
        }

        Ok(response.text().await?)
    }

    /// Run a raw search and decode the JSON response
    async fn search_raw(
        &self,
        query: &str,
        num_results: usize,
        context_lines: Option<usize>,
    ) -> Result<ZoektSearchResponse, BackendError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("num", num_results.to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(ctx) = context_lines {
            params.push(("ctx", ctx.to_string()));
        }

        let body = self.get_text("search", &params).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::decode(e.to_string()))
    }

    /// Fetch a single file, or `None` when the path is not a file
    async fn fetch_file(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<Option<String>, BackendError> {
        let params = [("r", repository.to_string()), ("f", path.to_string())];

        match self.get_text("print", &params).await {
            Ok(html) => Ok(extract_file_content(&html)),
            Err(BackendError::Status { status, .. }) => {
                tracing::debug!(
                    repository,
                    path,
                    status,
                    "Path is not a printable file, trying directory listing"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Rebuild a directory listing from the files indexed under `dir`
    async fn list_directory(
        &self,
        repository: &str,
        dir: &str,
        revision: Option<&str>,
        depth: usize,
    ) -> Result<ContentPayload, BackendError> {
        let query = listing_query(repository, dir, revision);
        let response = self.search_raw(&query, LISTING_NUM_RESULTS, None).await?;

        let file_matches = response
            .result
            .and_then(|r| r.file_matches)
            .unwrap_or_default();
        let truncated = file_matches.len() >= LISTING_NUM_RESULTS;
        if truncated {
            tracing::warn!(
                repository,
                dir,
                limit = LISTING_NUM_RESULTS,
                "Directory listing hit the file cap"
            );
        }
        let entries = build_entries(
            file_matches.iter().map(|f| f.file_name.as_str()),
            dir,
            depth,
        );

        if entries.is_empty() {
            return Err(BackendError::not_found(format!(
                "the given path or repository does not exist: {}/{}",
                repository, dir
            )));
        }

        Ok(ContentPayload::Directory {
            path: if dir.is_empty() { ".".to_string() } else { dir.to_string() },
            entries,
            truncated,
        })
    }
}

#[async_trait]
impl SearchBackend for ZoektClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, BackendError> {
        let response = self
            .search_raw(&request.query, request.num_results, Some(request.context_lines))
            .await?;
        Ok(response.into_search_result(request.context_lines))
    }

    async fn fetch_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentPayload, BackendError> {
        let repository = normalize_repository(&request.repository);
        let path = request.path.trim().trim_start_matches('/');
        let is_root = path.is_empty() || path == ".";

        if !is_root && !path.ends_with('/') {
            if let Some(content) = self.fetch_file(&repository, path).await? {
                return Ok(ContentPayload::File {
                    path: path.to_string(),
                    content,
                });
            }
        }

        let dir = if is_root { "" } else { path.trim_end_matches('/') };
        self.list_directory(&repository, dir, request.revision.as_deref(), request.depth)
            .await
    }
}

/// Strip the URL scheme callers often paste in front of repository names
pub fn normalize_repository(repository: &str) -> String {
    let trimmed = repository.trim();
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Query listing every file of `repository` below `dir`
fn listing_query(repository: &str, dir: &str, revision: Option<&str>) -> String {
    let mut query = format!("r:^{}$", query_regex(repository));
    if dir.is_empty() {
        query.push_str(" f:.*");
    } else {
        query.push_str(&format!(" file:^{}/", query_regex(dir)));
    }
    if let Some(revision) = revision.map(str::trim).filter(|r| !r.is_empty()) {
        query.push_str(&format!(" branch:{}", revision));
    }
    query
}

/// Regex matching `literal`, written as a single Zoekt query token
///
/// Zoekt splits unquoted field values on whitespace, so whitespace is written
/// as a hex escape.
fn query_regex(literal: &str) -> String {
    regex::escape(literal)
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                format!("\\x{{{:x}}}", c as u32)
            } else {
                c.to_string()
            }
        })
        .collect()
}

// Zoekt JSON wire format

#[derive(Debug, Deserialize)]
struct ZoektSearchResponse {
    #[serde(default)]
    result: Option<ZoektResult>,
    #[serde(default)]
    repos: Option<ZoektRepos>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektResult {
    #[serde(default)]
    file_matches: Option<Vec<ZoektFileMatch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektFileMatch {
    file_name: String,
    repo: String,
    #[serde(default)]
    matches: Option<Vec<ZoektLineMatch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektLineMatch {
    line_num: u64,
    #[serde(default)]
    fragments: Option<Vec<ZoektFragment>>,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    after: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektFragment {
    #[serde(default)]
    pre: String,
    #[serde(default)]
    r#match: String,
    #[serde(default)]
    post: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektRepos {
    #[serde(default)]
    repos: Option<Vec<ZoektRepo>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ZoektRepo {
    name: String,
    #[serde(rename = "URL", default)]
    url: Option<String>,
}

impl ZoektSearchResponse {
    fn into_search_result(self, context_lines: usize) -> SearchResult {
        // Repository-only queries answer with a repository list instead of files
        if let Some(repos) = self.repos.and_then(|r| r.repos) {
            return SearchResult {
                files: Vec::new(),
                repositories: repos
                    .into_iter()
                    .map(|repo| RepositoryMatch {
                        url: repo
                            .url
                            .filter(|u| !u.is_empty())
                            .unwrap_or_else(|| format!("https://{}", repo.name)),
                        name: repo.name,
                    })
                    .collect(),
            };
        }

        let files = self
            .result
            .and_then(|r| r.file_matches)
            .unwrap_or_default()
            .into_iter()
            .map(|file| file.into_file_match(context_lines))
            .collect();

        SearchResult {
            files,
            repositories: Vec::new(),
        }
    }
}

impl ZoektFileMatch {
    fn into_file_match(self, context_lines: usize) -> FileMatch {
        let matches = self.matches.unwrap_or_default();
        let url = matches
            .first()
            .and_then(|m| m.url.as_deref())
            .map(|u| u.split("#L").next().unwrap_or(u).to_string());

        FileMatch {
            repository: self.repo,
            file_name: self.file_name,
            url,
            matches: matches
                .into_iter()
                .map(|m| m.into_line_match(context_lines))
                .collect(),
        }
    }
}

impl ZoektLineMatch {
    fn into_line_match(self, context_lines: usize) -> LineMatch {
        let line: String = self
            .fragments
            .unwrap_or_default()
            .iter()
            .map(|f| format!("{}{}{}", f.pre, f.r#match, f.post))
            .collect();

        let mut before = context_to_lines(self.before.as_deref());
        if before.len() > context_lines {
            before.drain(..before.len() - context_lines);
        }
        let mut after = context_to_lines(self.after.as_deref());
        after.truncate(context_lines);

        LineMatch {
            line_number: self.line_num,
            line: line.trim_end().to_string(),
            before,
            after,
        }
    }
}

fn context_to_lines(context: Option<&str>) -> Vec<String> {
    match context {
        Some(text) if !text.is_empty() => text
            .trim_end_matches(['\n', '\r'])
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect(),
        _ => Vec::new(),
    }
}
