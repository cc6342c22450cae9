//! Position conversion and edit application over UTF-8 text.

use lsp_types::{Position, TextEdit};

use crate::Error;

/// Protocol position from zero-based line and byte column. Values past
/// `u32::MAX` saturate.
#[must_use]
pub fn position(line: usize, column: usize) -> Position {
    Position {
        line: u32::try_from(line).unwrap_or(u32::MAX),
        character: u32::try_from(column).unwrap_or(u32::MAX),
    }
}

/// Position just past the last byte of `text`.
#[must_use]
pub fn document_end(text: &str) -> Position {
    let line = text.matches('\n').count();
    let last_line = text.rfind('\n').map_or(text, |i| &text[i + 1..]);
    position(line, last_line.len())
}

/// Byte offset of `pos` in `text`, if it names a character boundary on an
/// existing line.
#[must_use]
pub fn offset_of(text: &str, pos: Position) -> Option<usize> {
    let line = usize::try_from(pos.line).ok()?;
    let column = usize::try_from(pos.character).ok()?;

    let line_start = if line == 0 {
        0
    } else {
        text.match_indices('\n').nth(line - 1)?.0 + 1
    };
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);

    let offset = line_start.checked_add(column)?;
    let in_line = offset <= line_end && text.is_char_boundary(offset);
    in_line.then_some(offset)
}

/// Apply `edits` one after another, resolving each range against the text
/// produced by the edits before it.
///
/// Batches from [`crate::build_code_actions`] are ordered back to front,
/// so every range still matches the original document.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, Error> {
    let mut out = text.to_string();
    for edit in edits {
        let out_of_bounds = || Error::EditOutOfBounds {
            line: edit.range.start.line,
            character: edit.range.start.character,
        };
        let start = offset_of(&out, edit.range.start).ok_or_else(out_of_bounds)?;
        let end = offset_of(&out, edit.range.end).ok_or_else(out_of_bounds)?;
        if end < start {
            return Err(out_of_bounds());
        }
        out.replace_range(start..end, &edit.new_text);
    }
    Ok(out)
}
