//! Lossless tokenizer for the query language.
//!
//! Every byte of the input ends up in exactly one token, so joining the
//! token texts reproduces the input. Malformed input never produces an
//! error: unterminated strings, comments, and backtick names simply run
//! to the end of the input.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::token::{Span, Token, TokenKind};

/// Words tagged as keywords. Only affects formatter spacing.
const KEYWORDS: &[&str] = &[
    "select", "from", "where", "group", "by", "having", "order", "limit", "offset", "with", "join",
    "inner", "left", "right", "outer", "full", "cross", "anti", "on", "using", "and", "or", "not",
    "in", "like", "is", "between", "case", "when", "then", "else", "end", "as", "distinct", "all",
    "union", "const", "fn", "op", "type", "let", "true", "false", "null", "asc", "desc",
];

#[allow(clippy::non_std_lazy_statics)]
static KEYWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| KEYWORDS.iter().copied().collect());

const TWO_CHAR_OPERATORS: &[&str] = &[":=", "::", "->", "=>", "==", "!=", "<>", "<=", ">=", "!~"];

const OPERATOR_CHARS: &[u8] = b"+-*/%<>=!~";

const PUNCTUATION_CHARS: &[u8] = b"()[]{},:;.?";

/// Case-insensitive keyword lookup.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word.to_ascii_lowercase().as_str())
}

/// Tokenize query source into a lossless token sequence.
///
/// Never fails. Concatenating the `text` of the returned tokens yields
/// `input` byte for byte.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 0,
            col: 0,
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let kind = self.scan();
            debug_assert!(self.pos > start, "lexer must always make progress");
            self.emit(kind, start);
        }
        self.tokens
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn peek_is(&self, pred: impl Fn(u8) -> bool) -> bool {
        self.peek_at(0).is_some_and(pred)
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn emit(&mut self, kind: TokenKind, start: usize) {
        let text = &self.input[start..self.pos];
        let span = Span {
            offset: start,
            line: self.line,
            column: self.col,
        };
        for byte in text.bytes() {
            if byte == b'\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            span,
        });
    }

    fn at_crlf(&self) -> bool {
        self.peek_at(0) == Some(b'\r') && self.peek_at(1) == Some(b'\n')
    }

    /// Consume one token starting at `self.pos` and return its kind.
    fn scan(&mut self) -> TokenKind {
        let ch = self.bytes[self.pos];

        match ch {
            b'\n' => {
                self.pos += 1;
                TokenKind::Newline
            }
            b'\r' if self.peek_at(1) == Some(b'\n') => {
                self.pos += 2;
                TokenKind::Newline
            }
            b' ' | b'\t' | b'\r' => {
                while matches!(self.peek_at(0), Some(b' ' | b'\t' | b'\r')) && !self.at_crlf() {
                    self.pos += 1;
                }
                TokenKind::Whitespace
            }
            b'-' if self.peek_at(1) == Some(b'-') => {
                let rest = &self.input[self.pos..];
                let line = rest.find('\n').map_or(rest, |end| &rest[..end]);
                // trailing carriage returns lex as whitespace
                self.pos += line.trim_end_matches('\r').len();
                TokenKind::LineComment
            }
            b'/' if self.peek_at(1) == Some(b'*') => {
                self.read_block_comment();
                TokenKind::BlockComment
            }
            b'"' | b'\'' => {
                self.read_string(0);
                TokenKind::String
            }
            b'f' | b'r' if matches!(self.peek_at(1), Some(b'"' | b'\'')) => {
                self.read_string(1);
                TokenKind::String
            }
            b'/' if self.regex_allowed() && self.try_read_regex() => TokenKind::Regex,
            b'|' => {
                if self.peek_at(1) == Some(b'|') {
                    self.pos += 2;
                    TokenKind::Operator
                } else {
                    self.pos += if self.peek_at(1) == Some(b'>') { 2 } else { 1 };
                    TokenKind::Pipe
                }
            }
            _ => self.scan_other(ch),
        }
    }

    fn scan_other(&mut self, ch: u8) -> TokenKind {
        if self.input[self.pos..].starts_with("...") {
            self.pos += 3;
            return TokenKind::Operator;
        }
        if let Some(op) = TWO_CHAR_OPERATORS
            .iter()
            .find(|op| self.input[self.pos..].starts_with(**op))
        {
            self.pos += op.len();
            return TokenKind::Operator;
        }
        if OPERATOR_CHARS.contains(&ch) {
            self.pos += 1;
            return TokenKind::Operator;
        }
        if PUNCTUATION_CHARS.contains(&ch) {
            self.pos += 1;
            return TokenKind::Punctuation;
        }
        if ch.is_ascii_digit() {
            self.read_number();
            return TokenKind::Number;
        }
        if ch == b'`' {
            self.read_backtick_identifier();
            return TokenKind::Identifier;
        }

        // Advance a whole character so tokens never split a code point.
        let Some(c) = self.current_char() else {
            self.pos = self.bytes.len();
            return TokenKind::Punctuation;
        };
        if c == '_' || c.is_alphabetic() {
            let start = self.pos;
            self.read_word();
            if is_keyword(&self.input[start..self.pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else {
            self.pos += c.len_utf8();
            TokenKind::Punctuation
        }
    }

    fn regex_allowed(&self) -> bool {
        self.tokens.last().is_none_or(Token::can_precede_regex)
    }

    fn read_block_comment(&mut self) {
        self.pos += 2; // skip /*
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.peek_at(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Read a quoted string whose opening quote sits `prefix` bytes ahead.
    fn read_string(&mut self, prefix: usize) {
        self.pos += prefix;
        let quote = self.bytes[self.pos];
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' if self.pos + 1 < self.bytes.len() => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.bytes.len();
    }

    /// Try to read `/.../` on the current line. On failure the position is
    /// left untouched so the slash lexes as an operator instead.
    fn try_read_regex(&mut self) -> bool {
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\n' => return false,
                b'\\' if i + 1 < self.bytes.len() && self.bytes[i + 1] != b'\n' => i += 2,
                b'/' => {
                    self.pos = i + 1;
                    return true;
                }
                _ => i += 1,
            }
        }
        false
    }

    fn read_number(&mut self) {
        if self.bytes[self.pos] == b'0' && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.pos += 2;
            while self.peek_is(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
        } else {
            while self.peek_is(|b| b.is_ascii_digit() || b == b'.') {
                self.pos += 1;
            }
            if matches!(self.peek_at(0), Some(b'e' | b'E')) {
                self.pos += 1;
                if matches!(self.peek_at(0), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                while self.peek_is(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        // unit suffix: 10ms, 2h, 1KB
        while self.peek_is(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
    }

    fn read_backtick_identifier(&mut self) {
        self.pos += 1;
        match self.input[self.pos..].find('`') {
            Some(close) => self.pos += close + 1,
            None => self.pos = self.bytes.len(),
        }
    }

    fn read_word(&mut self) {
        while let Some(c) = self.current_char() {
            if c == '_' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }
}
