//! Intent signal tables
//!
//! Rows are evaluated top to bottom. Earlier rows appear first in the guide,
//! and the first content row that fires supplies the query's content clause.
//!
//! Keywords match whole words. A trailing `*` makes a keyword a word prefix
//! (`error*` matches "errors"), and a keyword with a space is a phrase.

/// One row of the signal table
#[derive(Debug)]
pub enum Signal {
    /// Fires when any keyword occurs in the objective
    Keywords {
        keywords: &'static [&'static str],
        clause: &'static str,
        explanation: &'static str,
        is_content: bool,
    },
    /// Fires once per language named in [`LANGUAGES`]
    Languages,
    /// Fires once per `.ext` file extension mentioned
    Extensions,
}

pub const SIGNALS: &[Signal] = &[
    Signal::Keywords {
        keywords: &["repo", "repos", "repository", "repositories", "project*", "codebase*"],
        clause: "r:<repository>",
        explanation: "limits the search to repositories whose name matches the regex; use a unique fragment such as `r:payments-api`",
        is_content: false,
    },
    Signal::Languages,
    Signal::Extensions,
    Signal::Keywords {
        keywords: &["test*", "fixture*", "mock*"],
        clause: "f:test",
        explanation: "keeps only paths containing `test`; write `-f:test` instead to exclude test code",
        is_content: false,
    },
    Signal::Keywords {
        keywords: &["case sensitive", "case-sensitive", "exact case", "match case"],
        clause: "case:yes",
        explanation: "makes every content and file pattern case sensitive",
        is_content: false,
    },
    Signal::Keywords {
        keywords: &[
            "error*",
            "exception*",
            "panic*",
            "traceback*",
            "stack trace",
            "fail*",
            "throw*",
            "raise",
            "raises",
            "raised",
            "raising",
            "crash*",
        ],
        clause: "\"<error message>\"",
        explanation: "matches the message text as a phrase; copy a stable fragment without variable parts (ids, paths, numbers) and escape regex metacharacters such as `(` `[` `.`",
        is_content: true,
    },
    Signal::Keywords {
        keywords: &[
            "function*",
            "method*",
            "class",
            "classes",
            "struct*",
            "symbol*",
            "definition*",
            "defined",
            "interface*",
            "trait*",
        ],
        clause: "sym:<name>",
        explanation: "matches symbol definitions only; fall back to `\\b<name>\\b` to find every use of the identifier as a whole word",
        is_content: true,
    },
    Signal::Keywords {
        keywords: &["import*", "dependenc*", "require*", "include*", "package*", "module*"],
        clause: "\"import <module>\"",
        explanation: "finds import statements; for other languages adapt the keyword, e.g. `^use <module>` in Rust or `require\\(\"<module>\"\\)` in JavaScript",
        is_content: true,
    },
];

/// Language names as they appear in objectives, mapped to Zoekt `lang:` values
pub const LANGUAGES: &[(&[&str], &str)] = &[
    (&["rust"], "rust"),
    (&["go", "golang"], "go"),
    (&["python"], "python"),
    (&["java"], "java"),
    (&["kotlin"], "kotlin"),
    (&["scala"], "scala"),
    (&["typescript"], "typescript"),
    (&["javascript"], "javascript"),
    (&["ruby"], "ruby"),
    (&["c++", "cpp"], "c++"),
    (&["c#", "csharp"], "c#"),
    (&["swift"], "swift"),
    (&["php"], "php"),
    (&["shell", "bash"], "shell"),
    (&["sql"], "sql"),
];

/// Language names that are also common English words
///
/// These only count when capitalized mid-sentence ("the Go handler") or next
/// to one of [`CODE_WORDS`] ("go code").
pub const AMBIGUOUS_LANGUAGE_NAMES: &[&str] = &["go"];

/// Words that mark a neighbouring ambiguous name as a language
pub const CODE_WORDS: &[&str] = &[
    "code", "file", "files", "source", "service", "services", "module", "modules", "package",
    "packages", "program", "programs", "project", "projects", "repo", "handler", "handlers",
    "function", "functions", "struct", "structs", "library", "test", "tests", "binary",
];
