//! Property-based tests with proptest.
//!
//! Random query-like text goes through the lexer, the formatter, and the
//! migration fixer. The lexer must be lossless, formatting must reach a
//! fixed point after one pass, and a fix-all batch must always apply.

mod common;

use common::{assert_idempotent, relex};
use proptest::prelude::*;
use supersql_tools::{
    FormatOptions, TokenKind, apply_edits, fix_all_edits, format, scan_migrations, tokenize,
};

// -- Strategies --

/// Text built from the characters that drive lexing and layout decisions.
fn query_text() -> impl Strategy<Value = String> {
    r#"[a-z0-9 \t\r\n|()\[\]{},:;?.+*/%<>=!~'"`\\é→-]{0,40}"#
}

fn format_options() -> impl Strategy<Value = FormatOptions> {
    (0usize..8, any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(width, tabs, trim_trailing, insert_final, trim_final)| {
            let options = FormatOptions::default()
                .with_indent_width(width)
                .with_trim_trailing_whitespace(trim_trailing)
                .with_insert_final_newline(insert_final)
                .with_trim_final_newlines(trim_final);
            if tabs { options.with_tabs() } else { options }
        },
    )
}

/// Fragments mixing deprecated constructs with ordinary text.
fn migration_fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "yield ",
        "func ",
        " => ",
        "//",
        "://",
        "grep(/a/)",
        "grep('b')",
        "is(<int64>)",
        "time('1')",
        "ip(\"10.0.0.1\")",
        "crop(",
        "nest_dotted()",
        "parse_zson(",
        "--",
        "x",
        " ",
        "\n",
        "'é'",
    ])
}

fn migration_text() -> impl Strategy<Value = String> {
    prop::collection::vec(migration_fragment(), 0..16)
        .prop_map(|parts| parts.concat())
}

/// Pipe tokens in `input` and pipe-led lines in `output`.
fn pipe_counts(input: &str, output: &str) -> (usize, usize) {
    let pipes = tokenize(input)
        .iter()
        .filter(|t| t.kind == TokenKind::Pipe)
        .count();
    let pipe_lines = output
        .split('\n')
        .filter(|line| line.trim_start().starts_with('|'))
        .count();
    (pipes, pipe_lines)
}

// -- Properties --

proptest! {
    #[test]
    fn tokenize_is_lossless(input in any::<String>()) {
        prop_assert_eq!(relex(&input), input);
    }

    #[test]
    fn tokenize_is_lossless_on_query_text(input in query_text()) {
        prop_assert_eq!(relex(&input), input);
    }

    #[test]
    fn format_is_idempotent(input in query_text(), options in format_options()) {
        assert_idempotent(&input, &options);
    }

    #[test]
    fn unmatched_closers_never_indent(closers in 0usize..10, name in "[a-z]{1,8}") {
        let input = format!("{}\n{name}", ")".repeat(closers));
        let output = format(&input, &FormatOptions::default());
        let expected_suffix = format!("\n{name}");
        prop_assert!(output.ends_with(&expected_suffix));
    }

    #[test]
    fn every_pipe_starts_a_line(input in query_text()) {
        let output = format(&input, &FormatOptions::default());
        let (pipes, pipe_lines) = pipe_counts(&input, &output);
        prop_assert!(
            pipe_lines >= pipes,
            "{pipe_lines} < {pipes} in {output:?}"
        );
    }

    #[test]
    fn pipes_start_lines_with_any_options(
        input in query_text(),
        options in format_options(),
    ) {
        let output = format(&input, &options);
        let (pipes, pipe_lines) = pipe_counts(&input, &output);
        prop_assert!(
            pipe_lines >= pipes,
            "{pipe_lines} < {pipes} in {output:?}"
        );
    }

    #[test]
    fn literals_survive_verbatim(input in query_text()) {
        let output = format(&input, &FormatOptions::default());
        for token in tokenize(&input).iter().filter(|t| t.kind.is_literal()) {
            prop_assert!(
                output.contains(&token.text),
                "{:?} lost from {output:?}",
                token.text
            );
        }
    }

    #[test]
    fn fix_all_always_applies(text in migration_text()) {
        let result = apply_edits(&text, &fix_all_edits(&text));
        if let Err(e) = result {
            let message = format!("{e} applying fixes to {text:?}");
            return Err(TestCaseError::fail(message));
        }
    }

    #[test]
    fn diagnostics_stay_within_their_line(text in migration_text()) {
        let lines: Vec<&str> = text.split('\n').collect();
        for found in scan_migrations(&text) {
            let range = found.diagnostic.range;
            prop_assert_eq!(range.start.line, range.end.line);
            let line = lines[range.start.line as usize];
            prop_assert!(range.start.character <= range.end.character);
            prop_assert!(range.end.character as usize <= line.len());
        }
    }
}
