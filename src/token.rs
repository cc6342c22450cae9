/// Source location of a token start.
///
/// `line` and `column` are zero-based; `column` counts UTF-8 bytes
/// from the start of the line, matching editor protocol positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of spaces, tabs, or lone carriage returns.
    Whitespace,
    /// `\n` or `\r\n`.
    Newline,
    /// `-- ...` up to (not including) the line break.
    LineComment,
    /// `/* ... */`, possibly unterminated.
    BlockComment,
    /// Quoted string, optionally `f`- or `r`-prefixed.
    String,
    /// `/pattern/` literal.
    Regex,
    /// Bare or backtick-quoted name.
    Identifier,
    /// Identifier found in the keyword set.
    Keyword,
    /// Decimal or hex number with optional unit suffix.
    Number,
    /// `|` or `|>`.
    Pipe,
    /// Operator, one to three characters.
    Operator,
    /// Brackets, separators, and any unrecognized character.
    Punctuation,
}

impl TokenKind {
    /// Whitespace and comments.
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineComment | Self::BlockComment
        )
    }

    /// Kinds whose text the formatter must never touch.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::String | Self::Regex | Self::LineComment | Self::BlockComment
        )
    }

    /// Identifiers, keywords, numbers, strings, and regexes.
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(
            self,
            Self::Identifier | Self::Keyword | Self::Number | Self::String | Self::Regex
        )
    }
}

/// A single token with its kind, literal text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    #[must_use]
    pub fn is_opening_bracket(&self) -> bool {
        self.kind == TokenKind::Punctuation && matches!(self.text.as_str(), "(" | "[" | "{")
    }

    #[must_use]
    pub fn is_closing_bracket(&self) -> bool {
        self.kind == TokenKind::Punctuation && matches!(self.text.as_str(), ")" | "]" | "}")
    }

    /// Whether a `/` right after this token may open a regex literal.
    #[must_use]
    pub fn can_precede_regex(&self) -> bool {
        match self.kind {
            TokenKind::Whitespace
            | TokenKind::Newline
            | TokenKind::Pipe
            | TokenKind::Operator
            | TokenKind::Keyword => true,
            TokenKind::Punctuation => matches!(self.text.as_str(), "(" | "[" | "," | ":"),
            _ => false,
        }
    }
}
