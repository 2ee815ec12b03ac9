//! Bracket matching.
//!
//! Matching walks the document line by line with a depth counter for the bracket kind under the
//! caret. Only chars the [`Scanner`] classifies as code take part, so brackets inside comments,
//! strings and markup tag spans never produce false matches.

use crate::document::{DocumentSource, Position};
use crate::lexer::{CharClass, Scanner};

/// Line budget for each search in [`enclosing_pair`]; the caret highlight is painted every
/// frame and must not walk a huge document.
pub const ENCLOSING_SCAN_LINES: usize = 2_000;

/// `(char, is_code)` for every char of `line`.
fn code_chars<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    line: usize,
) -> Vec<(char, bool)> {
    let classes = scanner.classify(doc, line);
    let text = doc.line_text(line).unwrap_or_default();
    text.chars()
        .zip(classes)
        .map(|(ch, class)| (ch, class == CharClass::Code))
        .collect()
}

/// Find the `close` matching the `open` at `start`, scanning forward.
pub(crate) fn forward_match<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    start: Position,
    open: char,
    close: char,
    max_lines: Option<usize>,
) -> Option<Position> {
    let line_count = doc.line_count();
    let last_line = match max_lines {
        Some(n) => start.line.saturating_add(n).min(line_count),
        None => line_count,
    };

    let mut depth = 0usize;
    for line in start.line..last_line {
        let chars = code_chars(doc, scanner, line);
        let from = if line == start.line { start.column } else { 0 };
        for (column, &(ch, is_code)) in chars.iter().enumerate().skip(from) {
            if !is_code {
                continue;
            }
            if ch == open {
                depth += 1;
            } else if ch == close {
                if depth <= 1 {
                    return (depth == 1).then_some(Position::new(line, column));
                }
                depth -= 1;
            }
        }
    }
    None
}

/// Find the `open` matching the `close` at `start`, scanning backward.
pub(crate) fn backward_match<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    start: Position,
    open: char,
    close: char,
    max_lines: Option<usize>,
) -> Option<Position> {
    let first_line = max_lines.map_or(0, |n| start.line.saturating_sub(n));

    let mut depth = 0usize;
    for line in (first_line..=start.line).rev() {
        let chars = code_chars(doc, scanner, line);
        let upto = if line == start.line {
            (start.column + 1).min(chars.len())
        } else {
            chars.len()
        };
        for column in (0..upto).rev() {
            let (ch, is_code) = chars[column];
            if !is_code {
                continue;
            }
            if ch == close {
                depth += 1;
            } else if ch == open {
                if depth <= 1 {
                    return (depth == 1).then_some(Position::new(line, column));
                }
                depth -= 1;
            }
        }
    }
    None
}

/// Offset of the bracket matching the one at `offset`, if `offset` holds a bracket in code.
pub fn match_bracket<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    offset: usize,
) -> Option<usize> {
    match_bracket_within(doc, scanner, offset, None)
}

fn match_bracket_within<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    offset: usize,
    max_lines: Option<usize>,
) -> Option<usize> {
    let pos = doc.offset_to_position(offset);
    let chars = code_chars(doc, scanner, pos.line);
    let &(ch, is_code) = chars.get(pos.column)?;
    if !is_code {
        return None;
    }

    let lang = scanner.language();
    let found = if let Some(close) = lang.closing_for(ch) {
        forward_match(doc, scanner, pos, ch, close, max_lines)
    } else if let Some(open) = lang.opening_for(ch) {
        backward_match(doc, scanner, pos, open, ch, max_lines)
    } else {
        None
    }?;
    Some(doc.position_to_offset(found))
}

/// The bracket pair to highlight for a caret at `caret`, as `(open_offset, close_offset)`.
///
/// A bracket directly at or directly before the caret wins; otherwise the innermost pair
/// enclosing the caret is returned. Every search is limited to [`ENCLOSING_SCAN_LINES`]
/// lines, so a pair spanning more than that is not highlighted.
pub fn enclosing_pair<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    caret: usize,
) -> Option<(usize, usize)> {
    let caret = caret.min(doc.char_count());
    for candidate in [Some(caret), caret.checked_sub(1)].into_iter().flatten() {
        if let Some(other) =
            match_bracket_within(doc, scanner, candidate, Some(ENCLOSING_SCAN_LINES))
        {
            return Some((candidate.min(other), candidate.max(other)));
        }
    }

    let open = unmatched_open_before(doc, scanner, caret)?;
    let open_offset = doc.position_to_offset(open.0);
    let close = forward_match(
        doc,
        scanner,
        open.0,
        open.1,
        open.2,
        Some(ENCLOSING_SCAN_LINES),
    )?;
    let close_offset = doc.position_to_offset(close);
    (close_offset >= caret).then_some((open_offset, close_offset))
}

/// Nearest unbalanced opening bracket before `caret`: `(position, open, close)`.
fn unmatched_open_before<D: DocumentSource + ?Sized>(
    doc: &D,
    scanner: &mut Scanner,
    caret: usize,
) -> Option<(Position, char, char)> {
    let pos = doc.offset_to_position(caret);
    let first_line = pos.line.saturating_sub(ENCLOSING_SCAN_LINES);
    let mut pending_closes: Vec<char> = Vec::new();

    for line in (first_line..=pos.line).rev() {
        let chars = code_chars(doc, scanner, line);
        let upto = if line == pos.line {
            pos.column.min(chars.len())
        } else {
            chars.len()
        };
        for column in (0..upto).rev() {
            let (ch, is_code) = chars[column];
            if !is_code {
                continue;
            }
            let lang = scanner.language();
            if lang.opening_for(ch).is_some() {
                pending_closes.push(ch);
            } else if let Some(close) = lang.closing_for(ch) {
                if pending_closes.pop().is_none() {
                    return Some((Position::new(line, column), ch, close));
                }
            }
        }
    }
    None
}
