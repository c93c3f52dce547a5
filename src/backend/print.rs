//! Extraction of file content from Zoekt's `/print` page
//!
//! The page renders one `<pre class="inline-pre">` per source line, each
//! prefixed by a `noselect` span carrying the line number.

use regex::Regex;
use std::sync::LazyLock;

static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<pre[^>]*class="inline-pre"[^>]*>(.*?)</pre>"#).unwrap());

static LINE_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<span[^>]*class="noselect"[^>]*>.*?</span>"#).unwrap());

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extract the source lines of a printed file
///
/// Returns `None` when the page holds no source lines, which is how Zoekt
/// answers for paths that are not files.
pub fn extract_file_content(html: &str) -> Option<String> {
    let lines: Vec<String> = LINE_PATTERN
        .captures_iter(html)
        .map(|caps| {
            let raw = caps.get(1).map_or("", |m| m.as_str());
            let without_numbers = LINE_NUMBER_PATTERN.replace_all(raw, "");
            let text = TAG_PATTERN.replace_all(&without_numbers, "");
            html_escape::decode_html_entities(&text).into_owned()
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
