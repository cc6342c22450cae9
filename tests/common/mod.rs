#![allow(dead_code)]

use lsp_types::NumberOrString;
use supersql_tools::{FormatOptions, MigrationDiagnostic, format, tokenize};

/// Format with the default options: two spaces, no newline policy.
pub fn fmt(input: &str) -> String {
    format(input, &FormatOptions::default())
}

/// Helper: format twice and assert the second pass changes nothing.
pub fn assert_idempotent(input: &str, options: &FormatOptions) {
    let once = format(input, options);
    let twice = format(&once, options);
    assert_eq!(
        once, twice,
        "format is not idempotent\n--- input ---\n{input:?}\n--- once ---\n{once:?}"
    );
}

/// Concatenated token texts.
pub fn relex(input: &str) -> String {
    tokenize(input).into_iter().map(|t| t.text).collect()
}

/// The string code of a finding.
pub fn code(found: &MigrationDiagnostic) -> &str {
    match &found.diagnostic.code {
        Some(NumberOrString::String(code)) => code,
        _ => "",
    }
}

/// Codes of every finding, in scan order.
pub fn codes(found: &[MigrationDiagnostic]) -> Vec<&str> {
    found.iter().map(code).collect()
}
