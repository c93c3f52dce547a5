//! Response shaping
//!
//! Renders backend results into compact text for a calling agent: long lines
//! are shortened, whole responses are capped, and every cut is announced with
//! an explicit marker.

use crate::backend::{DirEntry, EntryKind, SearchResult};
use crate::config::{Config, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_RESPONSE_BYTES};

/// Longest rendered line, in characters, before it is shortened
pub const MAX_LINE_LENGTH: usize = 300;

/// Size limits applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapingLimits {
    pub max_line_length: usize,
    pub max_response_bytes: usize,
    pub max_file_bytes: usize,
}

impl Default for ShapingLimits {
    fn default() -> Self {
        Self {
            max_line_length: MAX_LINE_LENGTH,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl ShapingLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_line_length: MAX_LINE_LENGTH,
            max_response_bytes: config.max_response_bytes,
            max_file_bytes: config.max_file_bytes,
        }
    }
}

/// Rendered text plus whether anything was cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaped {
    pub text: String,
    pub truncated: bool,
}

/// Keep at most `limit` line matches (and repositories), in backend order
///
/// Files left without matches are dropped.
pub fn cap_matches(mut result: SearchResult, limit: usize) -> SearchResult {
    let mut remaining = limit;
    result.files.retain_mut(|file| {
        file.matches.truncate(remaining);
        remaining -= file.matches.len();
        !file.matches.is_empty()
    });
    result.repositories.truncate(limit);
    result
}

/// Render search results
///
/// `more_available` adds a hint that the backend may hold further matches.
pub fn render_search(
    query: &str,
    result: &SearchResult,
    more_available: bool,
    limits: &ShapingLimits,
) -> Shaped {
    if result.is_empty() {
        return Shaped {
            text: format!("No results found for query: {}", query),
            truncated: false,
        };
    }

    let mut blocks: Vec<String> = Vec::new();
    let summary = if result.repositories.is_empty() {
        format!(
            "{} matches in {} files\n",
            result.match_count(),
            result.files.len()
        )
    } else {
        format!("{} repositories\n", result.repositories.len())
    };

    for repo in &result.repositories {
        blocks.push(format!("Repository: {} ({})\n", repo.name, repo.url));
    }

    for file in &result.files {
        let mut block = format!("\n{}/{}", file.repository, file.file_name);
        if let Some(url) = &file.url {
            block.push_str(&format!(" ({})", url));
        }
        block.push('\n');

        for (i, m) in file.matches.iter().enumerate() {
            if i > 0 {
                block.push_str("  --\n");
            }
            let first = m.line_number.saturating_sub(m.before.len() as u64);
            for (offset, line) in m.before.iter().enumerate() {
                push_numbered(&mut block, first + offset as u64, ':', line, limits);
            }
            push_numbered(&mut block, m.line_number, '>', &m.line, limits);
            for (offset, line) in m.after.iter().enumerate() {
                push_numbered(&mut block, m.line_number + 1 + offset as u64, ':', line, limits);
            }
        }
        blocks.push(block);
    }

    let total_blocks = blocks.len();
    let mut text = summary;
    let mut shown = 0;
    let mut truncated = false;

    for block in &blocks {
        if text.len() + block.len() <= limits.max_response_bytes {
            text.push_str(block);
            shown += 1;
            continue;
        }

        let room = limits.max_response_bytes.saturating_sub(text.len());
        text.push_str(cut_at_line_boundary(block, room));
        truncated = true;
        break;
    }

    if truncated {
        text.push_str(&format!(
            "\n[results truncated: response exceeded {} bytes, {} of {} entries shown in full. Narrow the query or lower the limit]\n",
            limits.max_response_bytes, shown, total_blocks
        ));
    } else if more_available {
        text.push_str("\n[more results may be available: raise `limit` or narrow the query]\n");
    }

    Shaped { text, truncated }
}

fn push_numbered(block: &mut String, number: u64, marker: char, line: &str, limits: &ShapingLimits) {
    block.push_str(&format!(
        "{:>6}{} {}\n",
        number,
        marker,
        truncate_line(line, limits.max_line_length)
    ));
}

/// Render a directory listing; every entry is tagged `[dir]` or `[file]`
///
/// `truncated` marks a listing rebuilt from an incomplete set of files.
pub fn render_directory(
    repository: &str,
    path: &str,
    entries: &[DirEntry],
    truncated: bool,
) -> Shaped {
    let mut text = format!("[dir] {}:{}\n", repository, path);
    for entry in entries {
        let indent = "  ".repeat(entry.depth);
        match entry.kind {
            EntryKind::Directory => {
                text.push_str(&format!("{}[dir] {}/\n", indent, entry.name()));
            }
            EntryKind::File => {
                text.push_str(&format!("{}[file] {}\n", indent, entry.name()));
            }
        }
    }
    if truncated {
        text.push_str(
            "\n[listing truncated: the backend returned its maximum number of files, entries may be missing. Fetch a subdirectory to list it in full]\n",
        );
    }
    Shaped { text, truncated }
}

/// Render file content, capped at `max_file_bytes` on a line boundary
///
/// `ignored_revision` is a requested revision the content does not reflect.
pub fn render_file(
    repository: &str,
    path: &str,
    content: &str,
    ignored_revision: Option<&str>,
    limits: &ShapingLimits,
) -> Shaped {
    let mut header = format!("[file] {}:{}\n", repository, path);
    if let Some(revision) = ignored_revision {
        header.push_str(&format!(
            "[note: revision '{}' is not applied to file reads, showing the indexed default branch]\n",
            revision
        ));
    }

    if content.is_empty() {
        return Shaped {
            text: format!("{}File is empty.", header),
            truncated: false,
        };
    }

    if content.len() <= limits.max_file_bytes {
        return Shaped {
            text: format!("{}{}", header, content),
            truncated: false,
        };
    }

    let shown = cut_at_line_boundary(content, limits.max_file_bytes);
    let line_count = content.lines().count();
    Shaped {
        text: format!(
            "{}{}\n\n[FILE TRUNCATED: File too large ({} bytes, {} lines). Showing first {} bytes]",
            header,
            shown,
            content.len(),
            line_count,
            shown.len()
        ),
        truncated: true,
    }
}

/// Shorten a line to `max` characters, ending in `...`
pub fn truncate_line(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut shortened: String = line.chars().take(keep).collect();
    shortened.push_str("...");
    shortened
}

/// Longest prefix of `text` within `max_bytes`, ending at a newline if any
fn cut_at_line_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let prefix = &text[..end];
    match prefix.rfind('\n') {
        Some(pos) if pos > 0 => &prefix[..pos],
        _ => prefix,
    }
}
