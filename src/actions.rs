//! Quick-fix and fix-all code actions for deprecated syntax.

use std::collections::HashMap;

use lsp_types::{
    CodeAction, CodeActionKind, Diagnostic, NumberOrString, Position, TextEdit, Url,
    WorkspaceEdit,
};
use tracing::debug;

use crate::migration::scan_migrations;

/// Title of the action that applies every available fix at once.
pub const FIX_ALL_TITLE: &str = "Fix all deprecated syntax";

/// Identity of a diagnostic across requests: code plus exact range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DiagnosticKey {
    code: String,
    start: (u32, u32),
    end: (u32, u32),
}

impl DiagnosticKey {
    fn of(diagnostic: &Diagnostic) -> Self {
        let code = match &diagnostic.code {
            Some(NumberOrString::String(code)) => code.clone(),
            Some(NumberOrString::Number(code)) => code.to_string(),
            None => String::new(),
        };
        let range = diagnostic.range;
        Self {
            code,
            start: (range.start.line, range.start.character),
            end: (range.end.line, range.end.character),
        }
    }
}

const fn key(pos: Position) -> (u32, u32) {
    (pos.line, pos.character)
}

/// Code actions for the diagnostics an editor asked about.
///
/// `requested` is matched against a fresh scan of `text` by code and
/// range. Each match yields a preferred quick-fix. When the document has
/// more than one fixable diagnostic, a fix-all action is appended whose
/// edits are ordered back to front and never overlap.
#[must_use]
pub fn build_code_actions(uri: &Url, text: &str, requested: &[Diagnostic]) -> Vec<CodeAction> {
    let fixable: Vec<(Diagnostic, TextEdit)> = scan_migrations(text)
        .into_iter()
        .filter_map(|found| found.fix.map(|fix| (found.diagnostic, fix)))
        .collect();

    let mut actions: Vec<CodeAction> = {
        let by_key: HashMap<DiagnosticKey, &(Diagnostic, TextEdit)> = fixable
            .iter()
            .map(|entry| (DiagnosticKey::of(&entry.0), entry))
            .collect();

        requested
            .iter()
            .filter_map(|diagnostic| by_key.get(&DiagnosticKey::of(diagnostic)))
            .map(|(diagnostic, fix)| CodeAction {
                title: format!("Replace with '{}'", fix.new_text),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![diagnostic.clone()]),
                edit: Some(workspace_edit(uri, vec![fix.clone()])),
                is_preferred: Some(true),
                ..CodeAction::default()
            })
            .collect()
    };

    if fixable.len() > 1 {
        let (diagnostics, edits) = compose_fix_all(fixable);
        actions.push(CodeAction {
            title: FIX_ALL_TITLE.to_string(),
            kind: Some(CodeActionKind::SOURCE_FIX_ALL),
            diagnostics: Some(diagnostics),
            edit: Some(workspace_edit(uri, edits)),
            ..CodeAction::default()
        });
    }

    debug!(
        requested = requested.len(),
        actions = actions.len(),
        "built code actions"
    );
    actions
}

/// Every fix for `text` as one batch, ordered for in-order application.
#[must_use]
pub fn fix_all_edits(text: &str) -> Vec<TextEdit> {
    let fixable = scan_migrations(text)
        .into_iter()
        .filter_map(|found| found.fix.map(|fix| (found.diagnostic, fix)))
        .collect();
    compose_fix_all(fixable).1
}

/// Sort fixes back to front and drop any that overlap a later one. A
/// dropped fix shows up again on the next scan once the document changes.
fn compose_fix_all(mut fixable: Vec<(Diagnostic, TextEdit)>) -> (Vec<Diagnostic>, Vec<TextEdit>) {
    fixable.sort_by(|(_, a), (_, b)| {
        key(b.range.start)
            .cmp(&key(a.range.start))
            .then_with(|| key(b.range.end).cmp(&key(a.range.end)))
    });

    let mut diagnostics = Vec::with_capacity(fixable.len());
    let mut edits: Vec<TextEdit> = Vec::with_capacity(fixable.len());
    for (diagnostic, edit) in fixable {
        let overlaps = edits
            .last()
            .is_some_and(|later| key(edit.range.end) > key(later.range.start));
        if overlaps {
            debug!(start = ?edit.range.start, "skipping overlapping fix");
            continue;
        }
        diagnostics.push(diagnostic);
        edits.push(edit);
    }
    (diagnostics, edits)
}

fn workspace_edit(uri: &Url, edits: Vec<TextEdit>) -> WorkspaceEdit {
    WorkspaceEdit::new(HashMap::from([(uri.clone(), edits)]))
}

#[cfg(test)]
mod tests {
    use lsp_types::Range;

    use super::*;
    use crate::edit::position;

    fn edit(line: usize, start: usize, end: usize) -> (Diagnostic, TextEdit) {
        let range = Range {
            start: position(line, start),
            end: position(line, end),
        };
        (
            Diagnostic {
                range,
                ..Diagnostic::default()
            },
            TextEdit {
                range,
                new_text: String::new(),
            },
        )
    }

    #[test]
    fn fix_all_is_back_to_front() {
        let (_, edits) = compose_fix_all(vec![edit(0, 0, 2), edit(1, 0, 2), edit(0, 4, 6)]);
        let starts: Vec<_> = edits.iter().map(|e| key(e.range.start)).collect();
        assert_eq!(starts, vec![(1, 0), (0, 4), (0, 0)]);
    }

    #[test]
    fn overlapping_fix_is_deferred() {
        let (diagnostics, edits) = compose_fix_all(vec![edit(0, 0, 12), edit(0, 7, 10)]);
        assert_eq!(edits.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(key(edits[0].range.start), (0, 7));
    }

    #[test]
    fn touching_fixes_both_apply() {
        let (_, edits) = compose_fix_all(vec![edit(0, 0, 3), edit(0, 3, 5)]);
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn numeric_codes_have_keys() {
        let diagnostic = Diagnostic {
            code: Some(NumberOrString::Number(7)),
            ..Diagnostic::default()
        };
        assert_eq!(DiagnosticKey::of(&diagnostic).code, "7");
    }
}
