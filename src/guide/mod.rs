//! Zoekt query guide generation
//!
//! Turns a natural-language objective into advisory text on how to phrase a
//! Zoekt query. Detection is a fixed ordered table of keyword signals; table
//! order decides both the output order and which placeholder wins the content
//! clause. No I/O and no backend access: the same objective always yields the
//! same text.

mod signals;

pub use signals::{AMBIGUOUS_LANGUAGE_NAMES, CODE_WORDS, LANGUAGES, SIGNALS, Signal};

use regex::Regex;
use std::sync::LazyLock;

/// Extensions written as `.ext` in the objective, e.g. "in .yaml files"
static EXTENSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(*,])\.([A-Za-z][A-Za-z0-9]{0,7})\b").unwrap());

/// Placeholder used when no signal proposes a content clause
pub const DEFAULT_TERM: &str = "<search term>";

/// Syntax reference appended to every guide
pub const SYNTAX_REFERENCE: &str = "\
## Zoekt syntax reference
- Terms separated by spaces must all match (implicit AND): `foo bar`
- `or` combines alternatives: `foo or bar`
- Parentheses group clauses: `(foo or bar) baz`
- A leading `-` negates a clause: `-f:_test\\.go$`
- Double quotes match a phrase literally, spaces included: `\"connection refused\"`
- Field values are regular expressions; escape `. ( ) [ ] { } * + ? ^ $ | \\` with a backslash
- Filters: `r:`/`repo:` repository, `f:`/`file:` file path, `lang:` language, `sym:` symbol definitions, `case:yes` case sensitive, `branch:` branch name
- Keep queries specific: combine a content term with at least one filter on large indexes
";

/// One filter proposed for the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideClause {
    /// Clause text to place in the query
    pub clause: String,
    /// What the clause does
    pub explanation: String,
    /// Whether the clause matches file content rather than filtering
    pub is_content: bool,
}

/// Generated guide for one objective
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideResponse {
    /// Suggested query skeleton with placeholders
    pub skeleton: String,
    /// Clauses in table order
    pub clauses: Vec<GuideClause>,
    /// Full advisory text
    pub text: String,
}

/// Builds guides, optionally prefixed by an organization-specific guide
#[derive(Debug, Clone, Default)]
pub struct GuideBuilder {
    org_guide: Option<String>,
}

impl GuideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every guide with organization-specific text
    pub fn with_org_guide(org_guide: Option<String>) -> Self {
        Self {
            org_guide: org_guide.filter(|g| !g.trim().is_empty()),
        }
    }

    /// Build the guide for `objective`
    pub fn build(&self, objective: &str) -> GuideResponse {
        let objective = objective.trim();
        let clauses = detect_clauses(objective);
        let skeleton = compose_skeleton(&clauses);

        let mut text = String::new();
        if let Some(org_guide) = &self.org_guide {
            text.push_str(org_guide.trim_end());
            text.push_str("\n\n");
        }

        text.push_str("# Zoekt query guide\n\n");
        text.push_str(&format!("Objective: {}\n\n", objective));
        text.push_str("## Suggested query\n");
        text.push_str(&format!("`{}`\n\n", skeleton));

        text.push_str("## Filters\n");
        if clauses.is_empty() {
            text.push_str(&format!(
                "- `{}`: no specific intent detected; start with a distinctive literal from the code you expect to find\n",
                DEFAULT_TERM
            ));
        }
        for clause in &clauses {
            text.push_str(&format!("- `{}`: {}\n", clause.clause, clause.explanation));
        }
        text.push('\n');

        text.push_str(SYNTAX_REFERENCE);
        text.push_str(&format!(
            "\nGiven this guide create a Zoekt query for {} and call the search tool accordingly.\n",
            objective
        ));

        GuideResponse {
            skeleton,
            clauses,
            text,
        }
    }
}

/// Build a guide without an organization prefix
pub fn build_guide(objective: &str) -> GuideResponse {
    GuideBuilder::new().build(objective)
}

/// Word tokens, keeping characters that occur in language names
fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn detect_clauses(objective: &str) -> Vec<GuideClause> {
    let lowered = objective.to_lowercase();
    let raw_tokens = words(objective);
    let tokens: Vec<String> = raw_tokens.iter().map(|t| t.to_lowercase()).collect();
    let mut clauses: Vec<GuideClause> = Vec::new();

    let mut push = |clause: GuideClause| {
        if !clauses.iter().any(|c| c.clause == clause.clause) {
            clauses.push(clause);
        }
    };

    for signal in SIGNALS {
        match signal {
            Signal::Keywords {
                keywords,
                clause,
                explanation,
                is_content,
            } => {
                if keywords.iter().any(|k| keyword_matches(k, &lowered, &tokens)) {
                    push(GuideClause {
                        clause: clause.to_string(),
                        explanation: explanation.to_string(),
                        is_content: *is_content,
                    });
                }
            }
            Signal::Languages => {
                for (names, lang) in LANGUAGES {
                    if names
                        .iter()
                        .any(|name| language_mentioned(name, &raw_tokens, &tokens))
                    {
                        push(GuideClause {
                            clause: format!("lang:{}", lang),
                            explanation: format!("restricts results to files detected as {}", lang),
                            is_content: false,
                        });
                    }
                }
            }
            Signal::Extensions => {
                for caps in EXTENSION_PATTERN.captures_iter(objective) {
                    let ext = caps[1].to_lowercase();
                    push(GuideClause {
                        clause: format!("f:\\.{}$", ext),
                        explanation: format!(
                            "restricts results to file paths ending in .{} (the dot is escaped, `$` anchors the end)",
                            ext
                        ),
                        is_content: false,
                    });
                }
            }
        }
    }

    clauses
}

/// Phrases match as substrings, `stem*` as a token prefix, anything else as a whole token
fn keyword_matches(keyword: &str, lowered: &str, tokens: &[String]) -> bool {
    if keyword.contains(' ') {
        lowered.contains(keyword)
    } else if let Some(stem) = keyword.strip_suffix('*') {
        tokens.iter().any(|t| t.starts_with(stem))
    } else {
        tokens.iter().any(|t| t == keyword)
    }
}

/// Whether `name` is used as a language name in the objective
///
/// Ambiguous names need a capital letter past the first word or a code word
/// right next to them.
fn language_mentioned(name: &str, raw_tokens: &[&str], tokens: &[String]) -> bool {
    let ambiguous = AMBIGUOUS_LANGUAGE_NAMES.contains(&name);

    tokens.iter().enumerate().any(|(i, token)| {
        if token != name {
            return false;
        }
        if !ambiguous {
            return true;
        }
        let capitalized = i > 0 && raw_tokens[i].starts_with(|c: char| c.is_uppercase());
        let near_code_word = [i.checked_sub(1), Some(i + 1)]
            .into_iter()
            .flatten()
            .filter_map(|j| tokens.get(j))
            .any(|t| CODE_WORDS.contains(&t.as_str()));
        capitalized || near_code_word
    })
}

/// Filters first, then the first content clause (or the default term)
fn compose_skeleton(clauses: &[GuideClause]) -> String {
    let mut parts: Vec<&str> = clauses
        .iter()
        .filter(|c| !c.is_content)
        .map(|c| c.clause.as_str())
        .collect();

    let content = clauses
        .iter()
        .find(|c| c.is_content)
        .map_or(DEFAULT_TERM, |c| c.clause.as_str());
    parts.push(content);

    parts.join(" ")
}
