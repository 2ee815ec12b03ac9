//! Shaped (laid-out, style-annotated) line blocks and the highlighting collaborator traits.
//!
//! Producing a [`ShapedBlock`] is the expensive step the line cache exists to avoid. The engine
//! talks to shaping through [`LineShaper`]; [`MonospaceShaper`] is the built-in implementation,
//! which asks a [`Highlighter`] for style runs and lays text out on a fixed cell grid.

use crate::primitives::{Point, Rect};
use crate::text_metrics::{
    WrapIndent, WrapMode, cell_width_at, str_width_with_tab_width, wrap_indent_cells, wrap_points,
};
use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// Style identifier; hosts map ids to colors/fonts.
pub type StyleId = u32;

/// A styled run over char columns `[start, end)` of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun {
    /// First column (inclusive).
    pub start: usize,
    /// Last column (exclusive).
    pub end: usize,
    /// Style applied to the run.
    pub style: StyleId,
}

impl StyledRun {
    /// Create a run.
    pub fn new(start: usize, end: usize, style: StyleId) -> Self {
        Self { start, end, style }
    }
}

/// One visual row of a shaped block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedRow {
    /// First column of the row.
    pub start_column: usize,
    /// End column of the row (exclusive).
    pub end_column: usize,
    /// Continuation indent in pixels (0 for the first row).
    pub indent: f32,
}

/// A laid-out line: text, style runs, row breaks and per-column x positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedBlock {
    text: String,
    runs: Vec<StyledRun>,
    rows: Vec<ShapedRow>,
    /// Unwrapped x of every column boundary, `len + 1` entries.
    column_x: Vec<f32>,
    /// Column indices that start a grapheme cluster, plus `len`.
    grapheme_starts: Vec<usize>,
    line_height: f32,
}

impl ShapedBlock {
    /// Assemble a block from pre-computed parts. `column_x` must have `len + 1` entries and
    /// `rows` must cover `[0, len]` contiguously.
    pub fn from_parts(
        text: String,
        mut runs: Vec<StyledRun>,
        column_x: Vec<f32>,
        rows: Vec<ShapedRow>,
        line_height: f32,
    ) -> Self {
        let len = column_x.len().saturating_sub(1);
        runs.retain_mut(|run| {
            run.end = run.end.min(len);
            run.start < run.end
        });
        runs.sort_by_key(|run| (run.start, run.end));

        let mut grapheme_starts: Vec<usize> = Vec::new();
        let mut column = 0usize;
        for grapheme in text.graphemes(true) {
            grapheme_starts.push(column);
            column += grapheme.chars().count();
        }
        grapheme_starts.push(len);

        let rows = if rows.is_empty() {
            vec![ShapedRow {
                start_column: 0,
                end_column: len,
                indent: 0.0,
            }]
        } else {
            rows
        };

        Self {
            text,
            runs,
            rows,
            column_x,
            grapheme_starts,
            line_height,
        }
    }

    /// Line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Style runs, sorted by start column.
    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Visual rows.
    pub fn rows(&self) -> &[ShapedRow] {
        &self.rows
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.column_x.len().saturating_sub(1)
    }

    /// Returns `true` for an empty line.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intrinsic (unwrapped) width in pixels.
    pub fn width(&self) -> f32 {
        self.column_x.last().copied().unwrap_or(0.0)
    }

    /// Height in pixels (rows × line height).
    pub fn height(&self) -> f32 {
        self.rows.len() as f32 * self.line_height
    }

    /// Row containing `column`. A column on a row boundary belongs to the later row.
    pub fn row_for_column(&self, column: usize) -> usize {
        let column = column.min(self.len());
        self.rows
            .iter()
            .rposition(|row| row.start_column <= column)
            .unwrap_or(0)
    }

    fn x_in_row(&self, row: usize, column: usize) -> f32 {
        let r = &self.rows[row];
        let column = column.clamp(r.start_column, r.end_column);
        r.indent + self.column_x[column] - self.column_x[r.start_column]
    }

    /// Caret position of `column`, relative to the block's top-left corner.
    pub fn caret_position(&self, column: usize) -> Point {
        let row = self.row_for_column(column);
        Point::new(
            self.x_in_row(row, column),
            row as f32 * self.line_height,
        )
    }

    /// Caret rectangle of `column` with the given width.
    pub fn caret_rect(&self, column: usize, caret_width: f32) -> Rect {
        let p = self.caret_position(column);
        Rect::new(p.x, p.y, caret_width, self.line_height)
    }

    /// Nearest column to `point` (block-relative), snapped to a grapheme boundary and
    /// clamped to `[0, len]`.
    pub fn column_at(&self, point: Point) -> usize {
        let row = if point.y <= 0.0 {
            0
        } else {
            ((point.y / self.line_height) as usize).min(self.rows.len() - 1)
        };
        let r = self.rows[row];

        let mut best = r.start_column;
        for column in r.start_column..=r.end_column {
            let x = self.x_in_row(row, column);
            if x > point.x {
                let prev = self.x_in_row(row, best);
                if (x - point.x) < (point.x - prev) {
                    best = column;
                }
                break;
            }
            best = column;
        }

        // The end of a non-final row is the start of the next one; keep the caret on this row.
        if best == r.end_column && row + 1 < self.rows.len() && best > r.start_column {
            best -= 1;
        }
        self.snap_to_grapheme(best)
    }

    /// Round `column` down to the nearest grapheme boundary.
    pub fn snap_to_grapheme(&self, column: usize) -> usize {
        let column = column.min(self.len());
        match self.grapheme_starts.binary_search(&column) {
            Ok(_) => column,
            Err(idx) => self.grapheme_starts[idx.saturating_sub(1)],
        }
    }

    /// Rectangles covering columns `[start, end)`, one per intersected row.
    pub fn boxes_for_range(&self, start: usize, end: usize) -> Vec<Rect> {
        let len = self.len();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return Vec::new();
        }

        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.start_column < end && r.end_column > start)
            .map(|(row, r)| {
                let x0 = self.x_in_row(row, start.max(r.start_column));
                let x1 = self.x_in_row(row, end.min(r.end_column));
                Rect::new(x0, row as f32 * self.line_height, x1 - x0, self.line_height)
            })
            .collect()
    }
}

/// The syntax-highlighting collaborator: produces style runs for one line.
pub trait Highlighter {
    /// Style runs for `text` (line `line`), in char columns.
    fn highlight_line(&self, line: usize, text: &str) -> Vec<StyledRun>;

    /// Drop any per-line state the highlighter keeps for `lines`.
    fn invalidate_lines(&mut self, _lines: &BTreeSet<usize>) {}
}

/// A highlighter that applies no styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight_line(&self, _line: usize, _text: &str) -> Vec<StyledRun> {
        Vec::new()
    }
}

/// Builds shaped blocks; the engine's only path to text layout.
pub trait LineShaper {
    /// Shape `text` (line `line`). `wrap_width` is `Some` only when wrapping is enabled.
    fn build_highlighted_block(&self, line: usize, text: &str, wrap_width: Option<f32>)
    -> ShapedBlock;

    /// Unwrapped pixel width of `text`, without building a block when the shaper can avoid it.
    fn measure_width(&self, text: &str) -> f32 {
        self.build_highlighted_block(0, text, None).width()
    }

    /// Invalidate shaping state keyed by line index.
    fn invalidate_lines(&mut self, _lines: &BTreeSet<usize>) {}
}

/// Fixed-pitch shaper: every cell is `char_width` pixels wide.
#[derive(Debug, Clone)]
pub struct MonospaceShaper<H = PlainHighlighter> {
    highlighter: H,
    char_width: f32,
    line_height: f32,
    tab_width: usize,
    wrap_mode: WrapMode,
    wrap_indent: WrapIndent,
}

impl<H: Highlighter> MonospaceShaper<H> {
    /// Create a shaper.
    pub fn new(highlighter: H, char_width: f32, line_height: f32, tab_width: usize) -> Self {
        Self {
            highlighter,
            char_width: char_width.max(f32::EPSILON),
            line_height,
            tab_width: tab_width.max(1),
            wrap_mode: WrapMode::Char,
            wrap_indent: WrapIndent::None,
        }
    }

    /// Set the wrap mode used when a wrap width is supplied.
    pub fn with_wrap(mut self, wrap_mode: WrapMode, wrap_indent: WrapIndent) -> Self {
        self.wrap_mode = wrap_mode;
        self.wrap_indent = wrap_indent;
        self
    }

    /// Borrow the highlighter.
    pub fn highlighter(&self) -> &H {
        &self.highlighter
    }

    /// Mutably borrow the highlighter.
    pub fn highlighter_mut(&mut self) -> &mut H {
        &mut self.highlighter
    }
}

impl<H: Highlighter> LineShaper for MonospaceShaper<H> {
    fn build_highlighted_block(
        &self,
        line: usize,
        text: &str,
        wrap_width: Option<f32>,
    ) -> ShapedBlock {
        let mut column_x = Vec::with_capacity(text.len() + 1);
        let mut cells = 0usize;
        column_x.push(0.0);
        for ch in text.chars() {
            cells += cell_width_at(ch, cells, self.tab_width);
            column_x.push(cells as f32 * self.char_width);
        }
        let len = column_x.len() - 1;

        let mut rows = Vec::new();
        if let Some(width) = wrap_width
            && self.wrap_mode.is_enabled()
        {
            let wrap_cells = ((width / self.char_width).floor() as usize).max(1);
            let indent = wrap_indent_cells(text, self.wrap_indent, wrap_cells, self.tab_width)
                as f32
                * self.char_width;
            let mut start = 0usize;
            let points = wrap_points(
                text,
                wrap_cells,
                self.tab_width,
                self.wrap_mode,
                self.wrap_indent,
            );
            for point in points {
                rows.push(ShapedRow {
                    start_column: start,
                    end_column: point.char_index,
                    indent: if start == 0 { 0.0 } else { indent },
                });
                start = point.char_index;
            }
            rows.push(ShapedRow {
                start_column: start,
                end_column: len,
                indent: if start == 0 { 0.0 } else { indent },
            });
        }

        let runs = self.highlighter.highlight_line(line, text);
        ShapedBlock::from_parts(text.to_string(), runs, column_x, rows, self.line_height)
    }

    fn measure_width(&self, text: &str) -> f32 {
        str_width_with_tab_width(text, self.tab_width) as f32 * self.char_width
    }

    fn invalidate_lines(&mut self, lines: &BTreeSet<usize>) {
        self.highlighter.invalidate_lines(lines);
    }
}
