//! Deprecated-syntax scanner.
//!
//! Each registered [`Rule`] is a regular expression run over every line of
//! the raw text. Matches become diagnostics, optionally paired with the
//! edit that rewrites the construct into its current form. Scanning works
//! on raw lines rather than tokens so ranges map straight onto editor
//! positions.

use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range, TextEdit};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::edit::position;

/// Value of `Diagnostic::source` for everything this crate reports.
pub const SOURCE: &str = "supersql";

const COMMENT_MARKER: &str = "--";

const COMMENT_SLASH: &str = "deprecated-comment-slash";

/// Builds replacement text from the captures of a rule match.
pub type Rewrite = fn(&Captures<'_>) -> String;

/// How a rule repairs a match.
#[derive(Debug, Clone, Copy)]
pub enum Fix {
    /// The construct was removed; report only.
    None,
    /// Replace the whole match with fixed text.
    Replace(&'static str),
    /// Compute the replacement from the match.
    Rewrite(Rewrite),
}

/// One deprecated construct and how to migrate it.
#[derive(Debug)]
pub struct Rule {
    pub code: &'static str,
    pub pattern: Regex,
    pub message: &'static str,
    pub severity: DiagnosticSeverity,
    /// Old form, for listings.
    pub before: &'static str,
    /// New form, for listings. `None` for removals.
    pub after: Option<&'static str>,
    pub fix: Fix,
}

impl Rule {
    fn replace(
        code: &'static str,
        pattern: &str,
        message: &'static str,
        before: &'static str,
        after: &'static str,
    ) -> Self {
        Self {
            code,
            pattern: compile(pattern),
            message,
            severity: DiagnosticSeverity::WARNING,
            before,
            after: Some(after),
            fix: Fix::Replace(after),
        }
    }

    fn rewrite(
        code: &'static str,
        pattern: &str,
        message: &'static str,
        before: &'static str,
        after: &'static str,
        rewrite: Rewrite,
    ) -> Self {
        Self {
            code,
            pattern: compile(pattern),
            message,
            severity: DiagnosticSeverity::WARNING,
            before,
            after: Some(after),
            fix: Fix::Rewrite(rewrite),
        }
    }

    fn removed(
        code: &'static str,
        pattern: &str,
        message: &'static str,
        before: &'static str,
    ) -> Self {
        Self {
            code,
            pattern: compile(pattern),
            message,
            severity: DiagnosticSeverity::ERROR,
            before,
            after: None,
            fix: Fix::None,
        }
    }

    #[must_use]
    pub const fn has_fix(&self) -> bool {
        !matches!(self.fix, Fix::None)
    }

    fn replacement(&self, caps: &Captures<'_>) -> Option<String> {
        match self.fix {
            Fix::None => None,
            Fix::Replace(text) => Some(text.to_string()),
            Fix::Rewrite(rewrite) => Some(rewrite(caps)),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("migration rule patterns are valid")
}

fn cast_pattern(type_name: &str) -> String {
    format!(r#"\b({type_name})\s*\(\s*('[^']*'|"[^"]*")\s*\)"#)
}

fn rewrite_comment(caps: &Captures<'_>) -> String {
    format!("{}--", &caps[1])
}

fn rewrite_grep(caps: &Captures<'_>) -> String {
    let pattern = &caps[1];
    pattern
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .map_or_else(
            || format!("grep({pattern}, this)"),
            |inner| format!("grep('{}', this)", inner.replace('\'', "\\'")),
        )
}

fn rewrite_is(caps: &Captures<'_>) -> String {
    format!("is(this, {})", &caps[1])
}

fn rewrite_cast(caps: &Captures<'_>) -> String {
    format!("{}::{}", &caps[2], &caps[1])
}

#[allow(clippy::non_std_lazy_statics)]
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::replace(
            "deprecated-yield",
            r"\byield\b",
            "'yield' is deprecated, use 'values'",
            "yield",
            "values",
        ),
        Rule::replace(
            "deprecated-func",
            r"\bfunc\b",
            "'func' is deprecated, use 'fn'",
            "func",
            "fn",
        ),
        Rule::replace(
            "deprecated-arrow",
            r"=>",
            "'=>' is deprecated, use 'into'",
            "=>",
            "into",
        ),
        Rule::rewrite(
            COMMENT_SLASH,
            r"(^|[^:])//",
            "'//' comments are deprecated, use '--'",
            "//",
            "--",
            rewrite_comment,
        ),
        Rule::replace(
            "deprecated-parse-zson",
            r"\bparse_zson\s*\(",
            "'parse_zson' is deprecated, use 'parse_sup'",
            "parse_zson",
            "parse_sup(",
        ),
        Rule::rewrite(
            "implicit-this-grep",
            r#"\bgrep\s*\(\s*(/[^/]*/|'[^']*'|"[^"]*")\s*\)"#,
            "grep() requires explicit 'this' argument",
            "grep(pattern)",
            "grep(pattern, this)",
            rewrite_grep,
        ),
        Rule::rewrite(
            "implicit-this-is",
            r"\bis\s*\(\s*(<[^>]+>)\s*\)",
            "is() requires explicit 'this' argument",
            "is(<type>)",
            "is(this, <type>)",
            rewrite_is,
        ),
        Rule::replace(
            "implicit-this-nest-dotted",
            r"\bnest_dotted\s*\(\s*\)",
            "nest_dotted() requires explicit 'this' argument",
            "nest_dotted()",
            "nest_dotted(this)",
        ),
        Rule::rewrite(
            "deprecated-cast-time",
            &cast_pattern("time"),
            "Function-style cast deprecated, use '::time'",
            "time('...')",
            "'...'::time",
            rewrite_cast,
        ),
        Rule::rewrite(
            "deprecated-cast-duration",
            &cast_pattern("duration"),
            "Function-style cast deprecated, use '::duration'",
            "duration('...')",
            "'...'::duration",
            rewrite_cast,
        ),
        Rule::rewrite(
            "deprecated-cast-ip",
            &cast_pattern("ip"),
            "Function-style cast deprecated, use '::ip'",
            "ip('...')",
            "'...'::ip",
            rewrite_cast,
        ),
        Rule::rewrite(
            "deprecated-cast-net",
            &cast_pattern("net"),
            "Function-style cast deprecated, use '::net'",
            "net('...')",
            "'...'::net",
            rewrite_cast,
        ),
        Rule::removed(
            "removed-crop",
            r"\bcrop\s*\(",
            "'crop()' was removed, use explicit casting",
            "crop()",
        ),
        Rule::removed(
            "removed-fill",
            r"\bfill\s*\(",
            "'fill()' was removed, use explicit casting",
            "fill()",
        ),
        Rule::removed(
            "removed-fit",
            r"\bfit\s*\(",
            "'fit()' was removed, use explicit casting",
            "fit()",
        ),
        Rule::removed(
            "removed-order",
            r"\border\s*\(",
            "'order()' was removed, use explicit casting",
            "order()",
        ),
        Rule::removed(
            "removed-shape",
            r"\bshape\s*\(",
            "'shape()' was removed, use explicit casting",
            "shape()",
        ),
    ]
});

/// The rule registry, in scan order.
#[must_use]
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// A deprecated-syntax finding and, when the rule has one, its fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDiagnostic {
    pub diagnostic: Diagnostic,
    pub fix: Option<TextEdit>,
}

/// Scan `text` for deprecated constructs.
///
/// Lines are scanned rule by rule in registry order. A match starting
/// after the line's first `--` is treated as comment text and skipped.
#[must_use]
pub fn scan_migrations(text: &str) -> Vec<MigrationDiagnostic> {
    let mut found = Vec::new();
    let mut lines = 0;

    for (line_no, line) in text.split('\n').enumerate() {
        lines += 1;
        let comment_at = line.find(COMMENT_MARKER);

        for rule in rules() {
            for caps in rule.pattern.captures_iter(line) {
                let Some(m) = caps.get(0) else {
                    continue;
                };
                if comment_at.is_some_and(|at| m.start() > at) {
                    continue;
                }

                let is_slash_comment = rule.code == COMMENT_SLASH;
                // URLs such as https://host
                if is_slash_comment && m.as_str().contains("://") {
                    continue;
                }
                let start = if is_slash_comment {
                    m.end() - 2
                } else {
                    m.start()
                };

                let diagnostic = Diagnostic {
                    range: Range {
                        start: position(line_no, start),
                        end: position(line_no, m.end()),
                    },
                    severity: Some(rule.severity),
                    code: Some(NumberOrString::String(rule.code.to_string())),
                    source: Some(SOURCE.to_string()),
                    message: rule.message.to_string(),
                    ..Diagnostic::default()
                };
                let fix = rule.replacement(&caps).map(|new_text| TextEdit {
                    range: Range {
                        start: position(line_no, m.start()),
                        end: position(line_no, m.end()),
                    },
                    new_text,
                });

                found.push(MigrationDiagnostic { diagnostic, fix });
            }
        }
    }

    debug!(
        lines,
        diagnostics = found.len(),
        "scanned for deprecated syntax"
    );
    found
}

/// Just the diagnostics of [`scan_migrations`], as published to an editor.
#[must_use]
pub fn migration_diagnostics(text: &str) -> Vec<Diagnostic> {
    scan_migrations(text)
        .into_iter()
        .map(|found| found.diagnostic)
        .collect()
}
