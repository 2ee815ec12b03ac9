//! Cell metrics and soft-wrap computation.
//!
//! Widths are measured in cells following UAX #11 (narrow = 1, wide = 2, combining = 0), with
//! `'\t'` advancing to the next tab stop. The monospace shaper converts cells to pixels.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells).
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Soft wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// No soft wrapping (each logical line is a single visual row).
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Prefer wrapping after whitespace, falling back to character wrap.
    Word,
}

impl WrapMode {
    /// Returns `true` unless wrapping is disabled.
    pub fn is_enabled(self) -> bool {
        self != WrapMode::None
    }
}

/// Indentation applied to wrapped continuation rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapIndent {
    /// Continuations start at column zero.
    #[default]
    None,
    /// Continuations are indented like the logical line's leading whitespace.
    SameAsLineIndent,
    /// Continuations are indented by a fixed number of cells.
    FixedCells(usize),
}

/// Where a logical line breaks into a new visual row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapPoint {
    /// Char index at which the next row starts.
    pub char_index: usize,
    /// Byte offset at which the next row starts.
    pub byte_offset: usize,
}

/// Visual width of a character in cells.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of `ch` when it starts at `cell_offset_in_line`; tabs advance to the next stop.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - cell_offset_in_line % tab_width
    } else {
        char_width(ch)
    }
}

/// Total width of `s` in cells, expanding tabs.
pub fn str_width_with_tab_width(s: &str, tab_width: usize) -> usize {
    s.chars().fold(0usize, |x, ch| {
        x.saturating_add(cell_width_at(ch, x, tab_width))
    })
}

/// Cell offset of char `column` from the start of `line`.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    line.chars().take(column).fold(0usize, |x, ch| {
        x.saturating_add(cell_width_at(ch, x, tab_width))
    })
}

/// Width in cells of the leading spaces/tabs of `line`.
pub fn indentation_width(line: &str, tab_width: usize) -> usize {
    let end = line
        .bytes()
        .position(|b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    str_width_with_tab_width(&line[..end], tab_width)
}

/// Returns `true` if the line contains only whitespace.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

/// Continuation indent (in cells) for `line_text`, capped so at least one cell remains.
pub fn wrap_indent_cells(
    line_text: &str,
    wrap_indent: WrapIndent,
    wrap_cells: usize,
    tab_width: usize,
) -> usize {
    if wrap_cells <= 1 {
        return 0;
    }

    let raw = match wrap_indent {
        WrapIndent::None => 0,
        WrapIndent::FixedCells(n) => n,
        WrapIndent::SameAsLineIndent => indentation_width(line_text, tab_width),
    };

    raw.min(wrap_cells.saturating_sub(1))
}

/// Compute wrap points for `text` given a row width of `wrap_cells`.
pub fn wrap_points(
    text: &str,
    wrap_cells: usize,
    tab_width: usize,
    wrap_mode: WrapMode,
    wrap_indent: WrapIndent,
) -> Vec<WrapPoint> {
    if wrap_cells == 0 {
        return Vec::new();
    }

    let indent = wrap_indent_cells(text, wrap_indent, wrap_cells, tab_width);
    match wrap_mode {
        WrapMode::None => Vec::new(),
        WrapMode::Char => char_wrap_points(text, wrap_cells, tab_width, indent),
        WrapMode::Word => word_wrap_points(text, wrap_cells, tab_width, indent),
    }
}

fn char_wrap_points(
    text: &str,
    wrap_cells: usize,
    tab_width: usize,
    indent: usize,
) -> Vec<WrapPoint> {
    let mut points = Vec::new();
    let mut x_in_row = 0usize;
    let mut x_in_line = 0usize;

    for (char_index, (byte_offset, ch)) in text.char_indices().enumerate() {
        let w = cell_width_at(ch, x_in_line, tab_width);

        // Wide characters are never split across rows.
        if x_in_row + w > wrap_cells && x_in_row > indent {
            points.push(WrapPoint {
                char_index,
                byte_offset,
            });
            x_in_row = indent;
        }

        x_in_row = x_in_row.saturating_add(w);
        x_in_line = x_in_line.saturating_add(w);

        if x_in_row >= wrap_cells && byte_offset + ch.len_utf8() < text.len() {
            points.push(WrapPoint {
                char_index: char_index + 1,
                byte_offset: byte_offset + ch.len_utf8(),
            });
            x_in_row = indent;
        }
    }

    points
}

fn word_wrap_points(
    text: &str,
    wrap_cells: usize,
    tab_width: usize,
    indent: usize,
) -> Vec<WrapPoint> {
    let mut points = Vec::new();

    let mut row_start_char = 0usize;
    let mut row_start_x = 0usize;
    // (char_index, byte_offset, x_in_line) just after the last whitespace.
    let mut last_break: Option<(usize, usize, usize)> = None;
    let mut x_in_line = 0usize;

    for (char_index, (byte_offset, ch)) in text.char_indices().enumerate() {
        let w = cell_width_at(ch, x_in_line, tab_width);

        loop {
            let row_indent = if row_start_char == 0 { 0 } else { indent };
            let x_in_row = x_in_line - row_start_x + row_indent;
            if x_in_row + w <= wrap_cells || char_index == row_start_char {
                break;
            }

            if let Some((break_char, break_byte, break_x)) = last_break
                && break_char > row_start_char
            {
                points.push(WrapPoint {
                    char_index: break_char,
                    byte_offset: break_byte,
                });
                row_start_char = break_char;
                row_start_x = break_x;
                last_break = None;
                continue;
            }

            points.push(WrapPoint {
                char_index,
                byte_offset,
            });
            row_start_char = char_index;
            row_start_x = x_in_line;
            last_break = None;
            break;
        }

        x_in_line += w;
        if ch.is_whitespace() {
            last_break = Some((char_index + 1, byte_offset + ch.len_utf8(), x_in_line));
        }
    }

    points
}
