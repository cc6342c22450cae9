//! Token-driven pretty-printer for pipeline queries.
//!
//! Every pipe starts its own line, brackets drive indentation, and
//! whitespace between tokens collapses to at most one space. Spacing
//! decisions look only at token kinds and immediate neighbours, never at
//! the width of the source whitespace. String, comment, and regex
//! literals are copied verbatim.

use lsp_types::{Range, TextEdit};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::Error;
use crate::edit::{document_end, position};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Layout options for [`format`].
///
/// Deserializes from the camelCase shape editors send, accepting the
/// protocol names `tabSize` and `insertSpaces` as aliases.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    #[serde(alias = "tabSize")]
    pub indent_width: usize,
    #[serde(alias = "insertSpaces")]
    pub use_spaces: bool,
    pub trim_trailing_whitespace: bool,
    pub insert_final_newline: bool,
    pub trim_final_newlines: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            use_spaces: true,
            trim_trailing_whitespace: false,
            insert_final_newline: false,
            trim_final_newlines: false,
        }
    }
}

impl FormatOptions {
    /// Parse options from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub const fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    #[must_use]
    pub const fn with_tabs(mut self) -> Self {
        self.use_spaces = false;
        self
    }

    #[must_use]
    pub const fn with_trim_trailing_whitespace(mut self, trim: bool) -> Self {
        self.trim_trailing_whitespace = trim;
        self
    }

    #[must_use]
    pub const fn with_insert_final_newline(mut self, insert: bool) -> Self {
        self.insert_final_newline = insert;
        self
    }

    #[must_use]
    pub const fn with_trim_final_newlines(mut self, trim: bool) -> Self {
        self.trim_final_newlines = trim;
        self
    }

    fn indent_unit(&self) -> String {
        if self.use_spaces {
            " ".repeat(self.indent_width.min(MAX_INDENT_WIDTH))
        } else {
            "\t".to_string()
        }
    }
}

impl From<&lsp_types::FormattingOptions> for FormatOptions {
    fn from(options: &lsp_types::FormattingOptions) -> Self {
        Self {
            indent_width: usize::try_from(options.tab_size).unwrap_or(usize::MAX),
            use_spaces: options.insert_spaces,
            trim_trailing_whitespace: options.trim_trailing_whitespace.unwrap_or(false),
            insert_final_newline: options.insert_final_newline.unwrap_or(false),
            trim_final_newlines: options.trim_final_newlines.unwrap_or(false),
        }
    }
}

/// Format query source text.
#[must_use]
pub fn format(input: &str, options: &FormatOptions) -> String {
    format_tokens(&tokenize(input), options)
}

/// Format an already tokenized document.
#[must_use]
pub fn format_tokens(tokens: &[Token], options: &FormatOptions) -> String {
    let mut printer = Printer::new(options.indent_unit());
    let mut raw_prev = None;
    for token in tokens {
        printer.token(token, raw_prev);
        raw_prev = Some(token);
    }
    trace!(
        tokens = tokens.len(),
        bytes = printer.out.len(),
        "formatted token stream"
    );
    finish(printer.out, options)
}

/// Edits turning `input` into its formatted form: nothing when already
/// formatted, otherwise a single edit replacing the whole document.
#[must_use]
pub fn format_edits(input: &str, options: &FormatOptions) -> Vec<TextEdit> {
    let formatted = format(input, options);
    if formatted == input {
        return Vec::new();
    }
    vec![TextEdit {
        range: Range {
            start: position(0, 0),
            end: document_end(input),
        },
        new_text: formatted,
    }]
}

/// Widths past this are clamped.
const MAX_INDENT_WIDTH: usize = 64;

const TIGHT_OPERATORS: &[&str] = &["...", "::", "->"];

const UNARY_OPERATORS: &[&str] = &["-", "+", "!", "~"];

/// Operators that get a space on both sides. `/` is left alone so a
/// division never turns into the start of a regex literal on re-lexing.
fn is_spacing_operator(token: &Token) -> bool {
    token.kind == TokenKind::Operator
        && token.text != "/"
        && !TIGHT_OPERATORS.contains(&token.text.as_str())
}

/// Record keys: the token before a `: ` colon.
const fn is_record_key(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::String)
}

/// How the last printed token affects spacing after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Plain,
    Unary,
    RecordColon,
}

struct Printer<'a> {
    out: String,
    indent_unit: String,
    depth: usize,
    line_start: bool,
    pending_space: bool,
    /// Last non-whitespace token on the current line.
    prev: Option<&'a Token>,
    prev_role: Role,
}

impl<'a> Printer<'a> {
    const fn new(indent_unit: String) -> Self {
        Self {
            out: String::new(),
            indent_unit,
            depth: 0,
            line_start: true,
            pending_space: false,
            prev: None,
            prev_role: Role::Plain,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(&self.indent_unit);
        }
    }

    fn token(&mut self, token: &'a Token, raw_prev: Option<&Token>) {
        match token.kind {
            TokenKind::Whitespace => {
                if !self.line_start {
                    self.pending_space = true;
                }
            }
            TokenKind::Newline => {
                self.out.push('\n');
                self.line_start = true;
                self.pending_space = false;
                self.prev = None;
            }
            TokenKind::Pipe => {
                if !self.line_start {
                    self.out.push('\n');
                }
                self.write_indent();
                self.out.push_str(&token.text);
                self.after(token, Role::Plain);
            }
            _ => {
                if token.is_closing_bracket() {
                    self.depth = self.depth.saturating_sub(1);
                }

                if self.line_start {
                    self.write_indent();
                } else if self.pending_space
                    || self.prev.is_some_and(|p| self.needs_space(p, token))
                {
                    self.out.push(' ');
                }

                let role = self.role_of(token, raw_prev);
                self.out.push_str(&token.text);

                if token.is_opening_bracket() {
                    self.depth += 1;
                }
                self.after(token, role);
            }
        }
    }

    const fn after(&mut self, token: &'a Token, role: Role) {
        self.line_start = false;
        self.pending_space = false;
        self.prev = Some(token);
        self.prev_role = role;
    }

    fn role_of(&self, token: &Token, raw_prev: Option<&Token>) -> Role {
        if self.is_unary(token) {
            Role::Unary
        } else if token.is(TokenKind::Punctuation, ":") && raw_prev.is_some_and(is_record_key) {
            Role::RecordColon
        } else {
            Role::Plain
        }
    }

    /// Prefix operators: no space after them.
    fn is_unary(&self, token: &Token) -> bool {
        if token.kind != TokenKind::Operator || !UNARY_OPERATORS.contains(&token.text.as_str()) {
            return false;
        }
        self.prev.is_none_or(|prev| match prev.kind {
            TokenKind::Operator | TokenKind::Pipe | TokenKind::Keyword => true,
            TokenKind::Punctuation => {
                prev.is_opening_bracket() || matches!(prev.text.as_str(), "," | ":")
            }
            _ => false,
        })
    }

    /// Whether a space is required between `prev` and `cur` even when the
    /// source had none.
    fn needs_space(&self, prev: &Token, cur: &Token) -> bool {
        let cur_is_closer = cur.is_closing_bracket() || cur.is(TokenKind::Punctuation, ",");
        let prev_unary = self.prev_role == Role::Unary;

        match prev.kind {
            TokenKind::Pipe => return true,
            TokenKind::Punctuation if prev.text == "," => return !cur.is_closing_bracket(),
            TokenKind::Punctuation if prev.text == ":" && self.prev_role == Role::RecordColon => {
                return !cur.is_closing_bracket();
            }
            TokenKind::Operator if is_spacing_operator(prev) && !prev_unary && !cur_is_closer => {
                return true;
            }
            _ => {}
        }

        if is_spacing_operator(cur) {
            return !prev.is_opening_bracket();
        }

        if cur.kind.is_value() {
            let tight_prev = prev.is_opening_bracket()
                || (prev.kind == TokenKind::Punctuation && matches!(prev.text.as_str(), "." | ":"))
                || (prev.kind == TokenKind::Operator && !is_spacing_operator(prev))
                || prev_unary;
            return !tight_prev;
        }

        false
    }
}

fn finish(mut out: String, options: &FormatOptions) -> String {
    if options.trim_trailing_whitespace {
        out = out
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
    }
    if options.trim_final_newlines {
        let len = out.trim_end_matches('\n').len();
        out.truncate(len);
    }
    if options.insert_final_newline && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
