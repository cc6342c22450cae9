//! Lexical engine for pipeline query editor tooling.
//!
//! Three independent, pure pieces:
//!
//! - a lossless tokenizer ([`tokenize`]),
//! - a token-driven, idempotent pretty-printer ([`format`]),
//! - a deprecated-syntax scanner ([`scan_migrations`]) with quick-fix
//!   and fix-all code actions ([`build_code_actions`]).
//!
//! None of them parse the full grammar or keep state between calls.
//!
//! # Quick start
//!
//! ## Format a query
//!
//! ```
//! use supersql_tools::{FormatOptions, format};
//!
//! let output = format("from   test  |   count()", &FormatOptions::default());
//! assert_eq!(output, "from test\n| count()");
//! ```
//!
//! ## Find and fix deprecated syntax
//!
//! ```
//! use supersql_tools::{apply_edits, fix_all_edits, scan_migrations};
//!
//! let found = scan_migrations("yield x");
//! assert_eq!(found[0].fix.as_ref().unwrap().new_text, "values");
//!
//! let fixed = apply_edits("yield grep(/err/)", &fix_all_edits("yield grep(/err/)")).unwrap();
//! assert_eq!(fixed, "values grep('err', this)");
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use std::path::PathBuf;

pub mod actions;
pub mod edit;
pub mod formatter;
pub mod lexer;
pub mod migration;
pub mod token;

pub use actions::{FIX_ALL_TITLE, build_code_actions, fix_all_edits};
pub use edit::apply_edits;
pub use formatter::{FormatOptions, format, format_edits, format_tokens};
pub use lexer::tokenize;
pub use migration::{MigrationDiagnostic, Rule, migration_diagnostics, rules, scan_migrations};
pub use token::{Span, Token, TokenKind};

/// Errors from the fallible edges of the crate: configuration, file
/// access, and edit application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a source file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Formatter options could not be deserialized.
    #[error("invalid format options: {0}")]
    Config(#[from] serde_json::Error),
    /// An edit range does not exist in the text it was applied to.
    #[error("edit out of bounds at line {line}, character {character}")]
    EditOutOfBounds { line: u32, character: u32 },
}
