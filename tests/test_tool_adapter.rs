//! Integration tests for the tool adapter
//!
//! Tests verify:
//! 1. Validation failures never reach the backend
//! 2. Limit clamping and match capping
//! 3. Backend failures map onto the envelope's error kinds
//! 4. Size truncation sets the truncated flag
//! 5. File vs directory tagging of fetch_content
//! 6. Guide determinism

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use zoekt_mcp::backend::{
    BackendError, ContentPayload, ContentRequest, DirEntry, EntryKind, FileMatch, LineMatch,
    SearchBackend, SearchRequest, SearchResult,
};
use zoekt_mcp::tools::{
    FetchContentParams, SearchParams, SearchPromptGuideParams, ShapingLimits, ToolAdapter,
    ToolEnvelope, ToolErrorKind,
};

type SearchFn = Box<dyn Fn(&SearchRequest) -> Result<SearchResult, BackendError> + Send + Sync>;
type ContentFn = Box<dyn Fn(&ContentRequest) -> Result<ContentPayload, BackendError> + Send + Sync>;

/// Backend stub that counts calls and remembers the last search request
struct StubBackend {
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    last_search: Mutex<Option<SearchRequest>>,
    on_search: SearchFn,
    on_fetch: ContentFn,
}

impl StubBackend {
    fn new(on_search: SearchFn, on_fetch: ContentFn) -> Arc<Self> {
        Arc::new(Self {
            search_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
            on_search,
            on_fetch,
        })
    }

    fn searching(on_search: SearchFn) -> Arc<Self> {
        Self::new(on_search, Box::new(|_| Err(BackendError::not_found("unused"))))
    }

    fn fetching(on_fetch: ContentFn) -> Arc<Self> {
        Self::new(Box::new(|_| Ok(SearchResult::default())), on_fetch)
    }

    fn total_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResult, BackendError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some(request.clone());
        (self.on_search)(request)
    }

    async fn fetch_content(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentPayload, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        (self.on_fetch)(request)
    }
}

fn many_matches(files: usize, per_file: usize) -> SearchResult {
    SearchResult {
        files: (0..files)
            .map(|f| FileMatch {
                repository: "github.com/example/project".to_string(),
                file_name: format!("src/file_{}.rs", f),
                url: None,
                matches: (0..per_file)
                    .map(|l| LineMatch {
                        line_number: l as u64 + 1,
                        line: format!("let value_{} = compute();", l),
                        before: vec![],
                        after: vec![],
                    })
                    .collect(),
            })
            .collect(),
        repositories: vec![],
    }
}

fn search_params(query: &str) -> SearchParams {
    SearchParams {
        query: Some(query.to_string()),
        ..Default::default()
    }
}

fn expect_failure(envelope: &ToolEnvelope, kind: ToolErrorKind) {
    let failure = envelope
        .failure()
        .unwrap_or_else(|| panic!("expected {:?} failure, got {:?}", kind, envelope));
    assert_eq!(failure.kind, kind);
}

#[tokio::test]
async fn test_empty_query_makes_no_backend_call() {
    let backend = StubBackend::searching(Box::new(|_| Ok(many_matches(1, 1))));
    let adapter = ToolAdapter::new(backend.clone());

    for params in [SearchParams::default(), search_params(""), search_params("   ")] {
        let envelope = adapter.search(params).await;
        expect_failure(&envelope, ToolErrorKind::InvalidArgument);
    }

    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_invalid_limit_makes_no_backend_call() {
    let backend = StubBackend::searching(Box::new(|_| Ok(many_matches(1, 1))));
    let adapter = ToolAdapter::new(backend.clone());

    let envelope = adapter
        .search(SearchParams {
            query: Some("foo".to_string()),
            limit: Some(json!(0)),
            context_lines: None,
        })
        .await;

    expect_failure(&envelope, ToolErrorKind::InvalidArgument);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_limit_is_clamped_not_rejected() {
    // The backend ignores the requested limit and returns 600 matches
    let backend = StubBackend::searching(Box::new(|_| Ok(many_matches(60, 10))));
    let adapter = ToolAdapter::new(backend.clone()).with_limits(ShapingLimits {
        max_response_bytes: 10_000_000,
        ..ShapingLimits::default()
    });

    let envelope = adapter
        .search(SearchParams {
            query: Some("compute".to_string()),
            limit: Some(json!(100_000)),
            context_lines: None,
        })
        .await;

    assert!(envelope.is_success(), "{:?}", envelope);
    assert!(envelope.text().unwrap().starts_with("500 matches in 50 files"));
    assert!(!envelope.is_truncated());

    let sent = backend.last_search.lock().unwrap().clone().unwrap();
    assert_eq!(sent.num_results, 500);
    assert_eq!(sent.query, "compute");
}

#[tokio::test]
async fn test_query_is_forwarded_verbatim() {
    let backend = StubBackend::searching(Box::new(|_| Ok(SearchResult::default())));
    let adapter = ToolAdapter::new(backend.clone());

    let query = r#"r:github\.com/example lang:go -f:_test\.go$ "unbalanced ( paren""#;
    let envelope = adapter.search(search_params(query)).await;

    assert_eq!(
        envelope.text(),
        Some(format!("No results found for query: {}", query).as_str())
    );
    let sent = backend.last_search.lock().unwrap().clone().unwrap();
    assert_eq!(sent.query, query);
    assert_eq!(sent.num_results, 30);
    assert_eq!(sent.context_lines, 5);
}

#[tokio::test]
async fn test_backend_503_is_backend_error_with_status() {
    let backend = StubBackend::searching(Box::new(|_| {
        Err(BackendError::status(503, "Service Unavailable"))
    }));
    let adapter = ToolAdapter::new(backend.clone());

    let envelope = adapter.search(search_params("foo")).await;

    expect_failure(&envelope, ToolErrorKind::BackendError);
    let failure = envelope.failure().unwrap();
    assert_eq!(failure.status, Some(503));
    assert_eq!(failure.body.as_deref(), Some("Service Unavailable"));
    assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);

    let result = envelope.into_call_tool_result();
    assert_eq!(result.is_error, Some(true));
}

#[tokio::test]
async fn test_transport_failures_keep_their_kind() {
    let timeout = ToolAdapter::new(StubBackend::searching(Box::new(|_| {
        Err(BackendError::timeout("deadline exceeded"))
    })));
    expect_failure(
        &timeout.search(search_params("foo")).await,
        ToolErrorKind::Timeout,
    );

    let unreachable = ToolAdapter::new(StubBackend::searching(Box::new(|_| {
        Err(BackendError::unreachable("connection refused"))
    })));
    expect_failure(
        &unreachable.search(search_params("foo")).await,
        ToolErrorKind::BackendUnreachable,
    );
}

#[tokio::test]
async fn test_oversized_response_is_truncated() {
    let backend = StubBackend::searching(Box::new(|_| Ok(many_matches(30, 10))));
    let adapter = ToolAdapter::new(backend).with_limits(ShapingLimits {
        max_response_bytes: 1_000,
        ..ShapingLimits::default()
    });

    let envelope = adapter
        .search(SearchParams {
            query: Some("compute".to_string()),
            limit: Some(json!(500)),
            context_lines: Some(json!(0)),
        })
        .await;

    assert!(envelope.is_success());
    assert!(envelope.is_truncated());
    assert!(envelope.text().unwrap().contains("[results truncated"));

    let result = envelope.into_call_tool_result();
    assert_eq!(result.is_error, Some(false));
    assert_eq!(result.structured_content.unwrap()["truncated"], true);
}

#[tokio::test]
async fn test_string_limit_reaches_the_adapter() {
    let backend = StubBackend::searching(Box::new(|_| Ok(many_matches(1, 1))));
    let adapter = ToolAdapter::new(backend.clone());

    let params: SearchParams =
        serde_json::from_value(json!({"query": "compute", "limit": "50"})).unwrap();
    let envelope = adapter.search(params).await;
    assert!(envelope.is_success(), "{:?}", envelope);
    assert_eq!(backend.last_search.lock().unwrap().clone().unwrap().num_results, 50);

    let params: SearchParams =
        serde_json::from_value(json!({"query": "compute", "limit": 10.5})).unwrap();
    expect_failure(&adapter.search(params).await, ToolErrorKind::InvalidArgument);
    assert_eq!(backend.total_calls(), 1);
}

#[tokio::test]
async fn test_fetch_directory_entries_are_tagged() {
    let backend = StubBackend::fetching(Box::new(|request| {
        assert_eq!(request.path, "src");
        assert_eq!(request.depth, 2);
        Ok(ContentPayload::Directory {
            path: "src".to_string(),
            entries: vec![
                DirEntry {
                    path: "backend".to_string(),
                    kind: EntryKind::Directory,
                    depth: 0,
                },
                DirEntry {
                    path: "backend/zoekt.rs".to_string(),
                    kind: EntryKind::File,
                    depth: 1,
                },
                DirEntry {
                    path: "main.rs".to_string(),
                    kind: EntryKind::File,
                    depth: 0,
                },
            ],
            truncated: false,
        })
    }));
    let adapter = ToolAdapter::new(backend);

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("github.com/example/project".to_string()),
            path: Some("src".to_string()),
            ..Default::default()
        })
        .await;

    let text = envelope.text().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "[dir] github.com/example/project:src",
            "[dir] backend/",
            "  [file] zoekt.rs",
            "[file] main.rs",
        ]
    );
    for line in &lines[1..] {
        let tagged_dir = line.trim_start().starts_with("[dir] ");
        let tagged_file = line.trim_start().starts_with("[file] ");
        assert!(tagged_dir ^ tagged_file, "entry not tagged exactly once: {}", line);
    }
    assert!(!envelope.is_truncated());
}

#[tokio::test]
async fn test_capped_directory_listing_is_marked_truncated() {
    let backend = StubBackend::fetching(Box::new(|_| {
        Ok(ContentPayload::Directory {
            path: ".".to_string(),
            entries: vec![DirEntry {
                path: "a".to_string(),
                kind: EntryKind::Directory,
                depth: 0,
            }],
            truncated: true,
        })
    }));
    let adapter = ToolAdapter::new(backend);

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("github.com/example/project".to_string()),
            path: Some(".".to_string()),
            ..Default::default()
        })
        .await;

    assert!(envelope.is_success());
    assert!(envelope.is_truncated());
    assert!(envelope.text().unwrap().contains("[listing truncated:"));
}

#[tokio::test]
async fn test_file_fetch_with_revision_notes_default_branch() {
    let backend = StubBackend::fetching(Box::new(|request| {
        assert_eq!(request.revision.as_deref(), Some("release"));
        Ok(ContentPayload::File {
            path: request.path.clone(),
            content: "fn main() {}\n".to_string(),
        })
    }));
    let adapter = ToolAdapter::new(backend);

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("github.com/example/project".to_string()),
            path: Some("src/main.rs".to_string()),
            revision: Some("release".to_string()),
            ..Default::default()
        })
        .await;

    let text = envelope.text().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "[file] github.com/example/project:src/main.rs");
    assert!(lines[1].starts_with("[note: revision 'release' is not applied"));
    assert_eq!(lines[2], "fn main() {}");
}

#[tokio::test]
async fn test_fetch_file_is_tagged_and_capped() {
    let backend = StubBackend::fetching(Box::new(|request| {
        Ok(ContentPayload::File {
            path: request.path.clone(),
            content: "line\n".repeat(100),
        })
    }));
    let adapter = ToolAdapter::new(backend).with_limits(ShapingLimits {
        max_file_bytes: 52,
        ..ShapingLimits::default()
    });

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("github.com/example/project".to_string()),
            path: Some("README.md".to_string()),
            ..Default::default()
        })
        .await;

    let text = envelope.text().unwrap();
    assert!(text.starts_with("[file] github.com/example/project:README.md\n"));
    assert!(!text.contains("[dir]"));
    assert!(envelope.is_truncated());
    assert!(text.contains("[FILE TRUNCATED: File too large (500 bytes, 100 lines). Showing first 49 bytes]"));
}

#[tokio::test]
async fn test_fetch_missing_path_is_not_found() {
    let backend = StubBackend::fetching(Box::new(|_| {
        Err(BackendError::not_found("the given path or repository does not exist"))
    }));
    let adapter = ToolAdapter::new(backend.clone());

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("github.com/example/project".to_string()),
            path: Some("nope".to_string()),
            ..Default::default()
        })
        .await;

    expect_failure(&envelope, ToolErrorKind::NotFound);
    assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_validation_makes_no_backend_call() {
    let backend = StubBackend::fetching(Box::new(|_| {
        Ok(ContentPayload::File {
            path: "x".to_string(),
            content: "x".to_string(),
        })
    }));
    let adapter = ToolAdapter::new(backend.clone());

    let envelope = adapter
        .fetch_content(FetchContentParams {
            repo: Some("  ".to_string()),
            path: Some("README.md".to_string()),
            ..Default::default()
        })
        .await;

    expect_failure(&envelope, ToolErrorKind::InvalidArgument);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_guide_is_deterministic_and_offline() {
    let backend = StubBackend::searching(Box::new(|_| Ok(SearchResult::default())));
    let adapter = ToolAdapter::new(backend.clone());
    let params = || SearchPromptGuideParams {
        objective: Some("find where the Python importer raises a KeyError".to_string()),
    };

    let first = adapter.search_prompt_guide(params());
    let second = adapter.search_prompt_guide(params());

    assert!(first.is_success());
    assert_eq!(first.text().unwrap().as_bytes(), second.text().unwrap().as_bytes());
    assert!(first.text().unwrap().contains("lang:python"));
    assert_eq!(backend.total_calls(), 0);

    let empty = adapter.search_prompt_guide(SearchPromptGuideParams { objective: None });
    expect_failure(&empty, ToolErrorKind::InvalidArgument);
}
