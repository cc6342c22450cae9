//! Deprecated-syntax scanner tests.

mod common;

use common::{code, codes};
use lsp_types::{DiagnosticSeverity, Position};
use supersql_tools::migration::SOURCE;
use supersql_tools::{migration_diagnostics, rules, scan_migrations};

fn fix_text(input: &str) -> Vec<String> {
    scan_migrations(input)
        .into_iter()
        .filter_map(|found| found.fix.map(|edit| edit.new_text))
        .collect()
}

// -----------------------------------------------------------
// Registry.
// -----------------------------------------------------------

#[test]
fn registry_has_every_rule() {
    assert_eq!(rules().len(), 17);
    assert_eq!(rules()[0].code, "deprecated-yield");
    let removals = rules().iter().filter(|r| !r.has_fix());
    assert!(removals.clone().count() > 0);
    for rule in removals {
        assert!(rule.after.is_none(), "{}", rule.code);
    }
}

// -----------------------------------------------------------
// Renames and rewrites.
// -----------------------------------------------------------

#[test]
fn yield_becomes_values() {
    let found = scan_migrations("yield x");
    assert_eq!(codes(&found), vec!["deprecated-yield"]);
    let diagnostic = &found[0].diagnostic;
    assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(diagnostic.source.as_deref(), Some(SOURCE));
    assert_eq!(fix_text("yield x"), vec!["values"]);
}

#[test]
fn grep_gets_explicit_this() {
    let found = scan_migrations("grep(/error/)");
    assert_eq!(codes(&found), vec!["implicit-this-grep"]);
    assert_eq!(fix_text("grep(/error/)"), vec!["grep('error', this)"]);
}

#[test]
fn url_is_not_a_comment() {
    assert!(scan_migrations("https://example.com").is_empty());
}

#[test]
fn simple_renames() {
    assert_eq!(fix_text("func f(): (1)"), vec!["fn"]);
    assert_eq!(fix_text("a => b"), vec!["into"]);
    assert_eq!(fix_text("parse_zson(s)"), vec!["parse_sup("]);
    assert_eq!(fix_text("nest_dotted( )"), vec!["nest_dotted(this)"]);
}

#[test]
fn type_check_gets_explicit_this() {
    assert_eq!(fix_text("is(<int64>)"), vec!["is(this, <int64>)"]);
}

#[test]
fn function_casts_become_suffix_casts() {
    assert_eq!(fix_text(r#"duration("1h")"#), vec![r#""1h"::duration"#]);
    assert_eq!(fix_text("ip('10.0.0.1')"), vec!["'10.0.0.1'::ip"]);
    assert_eq!(fix_text("net( '10.0.0.0/8' )"), vec!["'10.0.0.0/8'::net"]);
}

#[test]
fn slash_comment_at_line_start() {
    let found = scan_migrations("// old note");
    assert_eq!(codes(&found), vec!["deprecated-comment-slash"]);
    let fix = found[0].fix.as_ref().expect("fixable");
    assert_eq!(fix.range.start, Position::new(0, 0));
    assert_eq!(fix.new_text, "--");
}

// -----------------------------------------------------------
// Removed functions.
// -----------------------------------------------------------

#[test]
fn removed_functions_report_without_fix() {
    for input in ["crop(x)", "fill (x)", "fit(x)", "order(x)", "shape(x)"] {
        let found = scan_migrations(input);
        assert_eq!(found.len(), 1, "{input}");
        let severity = found[0].diagnostic.severity;
        assert_eq!(severity, Some(DiagnosticSeverity::ERROR));
        assert!(found[0].fix.is_none());
    }
}

// -----------------------------------------------------------
// Positions and ordering.
// -----------------------------------------------------------

#[test]
fn findings_are_in_line_then_registry_order() {
    let found = scan_migrations("func f() => x\nyield crop(y)");
    assert_eq!(
        codes(&found),
        vec!["deprecated-func", "deprecated-arrow", "deprecated-yield", "removed-crop"]
    );
    assert_eq!(found[2].diagnostic.range.start, Position::new(1, 0));
    assert_eq!(found[3].diagnostic.range.start, Position::new(1, 6));
}

#[test]
fn columns_are_byte_offsets() {
    let found = scan_migrations("values 'é' | yield x");
    assert_eq!(code(&found[0]), "deprecated-yield");
    assert_eq!(found[0].diagnostic.range.start, Position::new(0, 14));
}

#[test]
fn matches_after_dashes_are_skipped() {
    assert!(scan_migrations("from x -- yield y").is_empty());
    let found = scan_migrations("yield x -- yield y");
    assert_eq!(found.len(), 1);
}

#[test]
fn dashes_inside_strings_still_suppress() {
    // The comment check is line-local and does not look at tokens.
    assert!(scan_migrations("values '--' | yield x").is_empty());
}

#[test]
fn diagnostics_match_scan() {
    let text = "yield grep('a')\ncrop(x)";
    let diagnostics = migration_diagnostics(text);
    let found = scan_migrations(text);
    assert_eq!(diagnostics.len(), found.len());
    for (diagnostic, finding) in diagnostics.iter().zip(&found) {
        assert_eq!(*diagnostic, finding.diagnostic);
    }
}
