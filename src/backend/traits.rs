//! Search backend trait definition
//!
//! Defines the interface that all code search backends must implement.

use async_trait::async_trait;

use super::error::BackendError;
use super::{ContentPayload, ContentRequest, SearchRequest, SearchResult};

/// Trait for code search backends
///
/// Implementations must be Send + Sync: one instance is shared by every
/// concurrent tool call. Each call is independent and must not keep
/// request-affinity state.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query and return the matches in backend order
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, BackendError>;

    /// Fetch a file's content or a directory listing
    async fn fetch_content(&self, request: &ContentRequest)
    -> Result<ContentPayload, BackendError>;
}
