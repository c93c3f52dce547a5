//! Code search backend integration
//!
//! The adapter talks to the search engine only through [`SearchBackend`].
//! [`ZoektClient`] is the production implementation over Zoekt's web API;
//! tests swap in stubs.

pub mod error;
pub mod listing;
pub mod print;
pub mod traits;
pub mod zoekt;

// Re-exports
pub use error::BackendError;
pub use traits::SearchBackend;
pub use zoekt::ZoektClient;

use serde::Serialize;

/// A search to run against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query in the backend's own grammar, forwarded verbatim
    pub query: String,
    /// Maximum number of matches requested
    pub num_results: usize,
    /// Lines of context requested around each match
    pub context_lines: usize,
}

/// A single matching line with its surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMatch {
    pub line_number: u64,
    pub line: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// All matches within one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    pub repository: String,
    pub file_name: String,
    /// Browse URL of the file, when the backend knows one
    pub url: Option<String>,
    pub matches: Vec<LineMatch>,
}

/// A repository returned by a repository-only query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryMatch {
    pub name: String,
    pub url: String,
}

/// Search results, in backend order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub files: Vec<FileMatch>,
    pub repositories: Vec<RepositoryMatch>,
}

impl SearchResult {
    /// Total number of line matches across all files
    pub fn match_count(&self) -> usize {
        self.files.iter().map(|f| f.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.repositories.is_empty()
    }
}

/// A file or directory to fetch from a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    /// Repository name, e.g. `github.com/example/project`
    pub repository: String,
    /// File or directory path; empty or `.` is the repository root
    pub path: String,
    /// Optional branch or revision
    pub revision: Option<String>,
    /// Depth of directory listings
    pub depth: usize,
}

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    /// Path relative to the listed directory
    pub path: String,
    pub kind: EntryKind,
    /// Nesting level below the listed directory, starting at 0
    pub depth: usize,
}

impl DirEntry {
    /// Last path component
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// What the backend returned for a [`ContentRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    File { path: String, content: String },
    Directory {
        path: String,
        entries: Vec<DirEntry>,
        /// The backend hit its file cap, so entries may be missing
        truncated: bool,
    },
}
