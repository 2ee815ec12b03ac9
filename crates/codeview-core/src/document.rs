//! The document collaborator interface.
//!
//! The engine never owns text. It reads lines through [`DocumentSource`] and learns about edits
//! through [`DirtyRegion`] notifications. [`RopeDocument`] is a small ropey-backed store that
//! implements the interface for tests, benches and hosts without a store of their own.
//!
//! All offsets are in Unicode scalar values (`char`), with each line break counted as one char.

use ropey::Rope;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A logical (line, column) position. Columns count `char`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A selection expressed as char offsets. `head` is where the caret is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Fixed end of the selection.
    pub anchor: usize,
    /// Moving end of the selection (caret).
    pub head: usize,
}

impl Selection {
    /// A collapsed selection (caret only).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// A selection from `anchor` to `head`.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Lower bound.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound (exclusive).
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// Change notification from the document: the minimal offset range touched by an edit.
///
/// Offsets refer to the document *after* the edit. `dirty_line` is set when the document
/// knows the edit stayed within one line; `line_delta` when it knows how many lines the edit
/// added (positive) or removed (negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRegion {
    /// First changed char offset.
    pub start_offset: usize,
    /// End of the changed range (exclusive).
    pub end_offset_exclusive: usize,
    /// Single affected line, if known.
    pub dirty_line: Option<usize>,
    /// Change in line count caused by the edit, if known.
    pub line_delta: Option<isize>,
}

impl DirtyRegion {
    /// A dirty region without a line hint.
    pub fn new(start_offset: usize, end_offset_exclusive: usize) -> Self {
        Self {
            start_offset,
            end_offset_exclusive: end_offset_exclusive.max(start_offset),
            dirty_line: None,
            line_delta: None,
        }
    }

    /// Attach a single-line hint.
    pub fn with_dirty_line(mut self, line: usize) -> Self {
        self.dirty_line = Some(line);
        self
    }

    /// Attach the line-count change.
    pub fn with_line_delta(mut self, delta: isize) -> Self {
        self.line_delta = Some(delta);
        self
    }
}

/// Read-only, line-addressable view of a document.
///
/// Implementations must report at least one line (an empty document has one empty line).
pub trait DocumentSource {
    /// Number of logical lines (`>= 1`).
    fn line_count(&self) -> usize;

    /// Text of `line` without its line break, or `None` if out of range.
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;

    /// Char offset of the first character of `line` (clamped to the last line).
    fn line_start_offset(&self, line: usize) -> usize;

    /// Total number of chars, line breaks included.
    fn char_count(&self) -> usize;

    /// Document-wide version, bumped whenever shaping inputs other than text change
    /// (theme, language).
    fn document_version(&self) -> u64;

    /// Full document text.
    fn text(&self) -> String {
        let mut out = String::new();
        for line in 0..self.line_count() {
            if line > 0 {
                out.push('\n');
            }
            if let Some(text) = self.line_text(line) {
                out.push_str(&text);
            }
        }
        out
    }

    /// Length of `line` in chars (0 when out of range).
    fn line_len(&self, line: usize) -> usize {
        self.line_text(line).map_or(0, |t| t.chars().count())
    }

    /// Line containing `offset` (clamped).
    fn offset_to_line(&self, offset: usize) -> usize {
        let count = self.line_count().max(1);
        // Last line whose start is <= offset.
        let (mut lo, mut hi) = (0usize, count);
        while lo + 1 < hi {
            let mid = (lo + hi) / 2;
            if self.line_start_offset(mid) <= offset {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Convert a char offset into a clamped logical position.
    fn offset_to_position(&self, offset: usize) -> Position {
        let line = self.offset_to_line(offset);
        let column = offset.saturating_sub(self.line_start_offset(line));
        Position::new(line, column.min(self.line_len(line)))
    }

    /// Convert a logical position into a char offset, clamping line and column.
    fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line.min(self.line_count().saturating_sub(1));
        self.line_start_offset(line) + position.column.min(self.line_len(line))
    }

    /// Character at `offset`; line breaks read as `'\n'`.
    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.char_count() {
            return None;
        }
        let line = self.offset_to_line(offset);
        let column = offset - self.line_start_offset(line);
        let text = self.line_text(line)?;
        Some(text.chars().nth(column).unwrap_or('\n'))
    }

    /// Chars in `[start, end)`, line breaks included.
    fn slice(&self, start: usize, end: usize) -> String {
        (start..end.min(self.char_count()))
            .filter_map(|offset| self.char_at(offset))
            .collect()
    }
}

/// Ropey-backed document store.
///
/// Line breaks are normalized to `\n` on load so that every break is exactly one char.
pub struct RopeDocument {
    rope: Rope,
    document_version: u64,
}

impl RopeDocument {
    /// Build a document from text.
    pub fn from_text(text: &str) -> Self {
        let normalized = if text.contains('\r') {
            Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Cow::Borrowed(text)
        };
        Self {
            rope: Rope::from_str(&normalized),
            document_version: 0,
        }
    }

    /// An empty document (one empty line).
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Bump the document version (call on theme or language change).
    pub fn bump_document_version(&mut self) -> u64 {
        self.document_version = self.document_version.wrapping_add(1);
        self.document_version
    }

    /// Insert `text` at `offset` (clamped) and report the dirty region.
    pub fn insert(&mut self, offset: usize, text: &str) -> DirtyRegion {
        self.replace(offset, 0, text)
    }

    /// Delete `len` chars starting at `start` (clamped) and report the dirty region.
    pub fn delete(&mut self, start: usize, len: usize) -> DirtyRegion {
        self.replace(start, len, "")
    }

    /// Replace `len` chars at `start` with `text` and report the dirty region.
    pub fn replace(&mut self, start: usize, len: usize, text: &str) -> DirtyRegion {
        let total = self.rope.len_chars();
        let start = start.min(total);
        let end = start.saturating_add(len).min(total);

        let removed_break = self.rope.slice(start..end).chars().any(|c| c == '\n');
        let start_line = self.rope.char_to_line(start);
        let lines_before = self.rope.len_lines() as isize;

        if end > start {
            self.rope.remove(start..end);
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        if !normalized.is_empty() {
            self.rope.insert(start, &normalized);
        }

        let inserted = normalized.chars().count();
        let region = DirtyRegion::new(start, start + inserted)
            .with_line_delta(self.rope.len_lines() as isize - lines_before);
        if removed_break || normalized.contains('\n') {
            region
        } else {
            region.with_dirty_line(start_line)
        }
    }

    /// Underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }
}

impl Default for RopeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for RopeDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let mut text: String = slice.chars().collect();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        Some(Cow::Owned(text))
    }

    fn line_start_offset(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    fn document_version(&self) -> u64 {
        self.document_version
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn offset_to_line(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_chars();
        let end = end.min(total);
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }
}
