//! Externally supplied decorations: line decorations, gutter decorations and search matches.
//!
//! Decoration kinds are a small closed set, modelled as enums and dispatched in the paint loop.
//! Containers index decorations by line (or offset) so painting only touches the visible range.

use crate::intervals::{Interval, IntervalIndex};
use crate::primitives::Color;
use std::collections::BTreeMap;
use std::ops::Range;

/// How a line decoration is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineDecorationStyle {
    /// Filled background behind the text.
    Background(Color),
    /// Vertical bar at the left edge of the text area.
    LeftBorder {
        /// Bar color.
        color: Color,
        /// Bar width in pixels.
        width: f32,
    },
    /// Straight underline.
    Underline(Color),
    /// Wavy underline.
    WavyUnderline(Color),
}

/// A decoration attached to one logical line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDecoration {
    /// Logical line (zero-based).
    pub line: usize,
    /// Char columns covered; `None` covers the whole line.
    pub columns: Option<Range<usize>>,
    /// Appearance.
    pub style: LineDecorationStyle,
}

impl LineDecoration {
    /// Decoration spanning the whole line.
    pub fn whole_line(line: usize, style: LineDecorationStyle) -> Self {
        Self {
            line,
            columns: None,
            style,
        }
    }

    /// Decoration covering `columns` of the line.
    pub fn columns(line: usize, columns: Range<usize>, style: LineDecorationStyle) -> Self {
        Self {
            line,
            columns: Some(columns),
            style,
        }
    }
}

/// Gutter decoration kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum GutterDecorationKind {
    /// Thin vertical bar (e.g. VCS change markers).
    Bar(Color),
    /// Small dot.
    Dot(Color),
    /// Short text glyph.
    Glyph {
        /// Glyph text.
        text: String,
        /// Glyph color.
        color: Color,
    },
}

/// A decoration attached to a gutter line.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterDecoration {
    /// Logical line (zero-based).
    pub line: usize,
    /// Appearance.
    pub kind: GutterDecorationKind,
}

/// Decorations grouped by line.
#[derive(Debug, Clone, Default)]
pub struct LineIndexed<T> {
    by_line: BTreeMap<usize, Vec<T>>,
}

impl<T> LineIndexed<T> {
    /// Create an empty container.
    pub fn new() -> Self {
        Self {
            by_line: BTreeMap::new(),
        }
    }

    /// Add `item` to `line`.
    pub fn push(&mut self, line: usize, item: T) {
        self.by_line.entry(line).or_default().push(item);
    }

    /// Items on `line`.
    pub fn on_line(&self, line: usize) -> &[T] {
        self.by_line.get(&line).map_or(&[], Vec::as_slice)
    }

    /// `(line, items)` for every decorated line in `lines`.
    pub fn in_lines(&self, lines: Range<usize>) -> impl Iterator<Item = (usize, &[T])> {
        self.by_line
            .range(lines)
            .map(|(line, items)| (*line, items.as_slice()))
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

impl FromIterator<LineDecoration> for LineIndexed<LineDecoration> {
    fn from_iter<I: IntoIterator<Item = LineDecoration>>(iter: I) -> Self {
        let mut out = Self::new();
        for decoration in iter {
            out.push(decoration.line, decoration);
        }
        out
    }
}

impl FromIterator<GutterDecoration> for LineIndexed<GutterDecoration> {
    fn from_iter<I: IntoIterator<Item = GutterDecoration>>(iter: I) -> Self {
        let mut out = Self::new();
        for decoration in iter {
            out.push(decoration.line, decoration);
        }
        out
    }
}

/// One search match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHighlight {
    /// Match start (char offset).
    pub start: usize,
    /// Match end (char offset, exclusive).
    pub end: usize,
    /// The match the host's "find next" cursor is on.
    pub is_current: bool,
}

impl SearchHighlight {
    /// Create a non-current match.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            is_current: false,
        }
    }

    /// Mark as the current match.
    pub fn current(mut self) -> Self {
        self.is_current = true;
        self
    }
}

/// Search matches indexed by offset.
#[derive(Debug, Clone, Default)]
pub struct SearchHighlights {
    index: IntervalIndex<bool>,
}

impl SearchHighlights {
    /// Index `matches`.
    pub fn new(matches: impl IntoIterator<Item = SearchHighlight>) -> Self {
        Self {
            index: matches
                .into_iter()
                .map(|m| Interval::new(m.start, m.end, m.is_current))
                .collect(),
        }
    }

    /// Matches overlapping `[start, end)`.
    pub fn in_range(&self, start: usize, end: usize) -> Vec<SearchHighlight> {
        self.index
            .query_range(start, end)
            .into_iter()
            .map(|i| SearchHighlight {
                start: i.start,
                end: i.end,
                is_current: i.value,
            })
            .collect()
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
