//! Indentation guides for the visible lines.
//!
//! One guide is produced per (indent level, run of consecutive visible lines at least that
//! deep). Blank lines take the shallower depth of their non-blank neighbours so guides run
//! through empty lines inside a block. The guide for the innermost block around the caret is
//! marked active.

use crate::config::IndentGuideConfig;
use crate::document::DocumentSource;
use crate::geometry::VisibleLayout;
use crate::text_metrics::{indentation_width, is_blank};

/// A vertical guide over a run of visible lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentGuide {
    /// Indent level (1-based).
    pub level: usize,
    /// Cell column the guide is drawn at.
    pub cell: usize,
    /// First line of the run.
    pub first_line: usize,
    /// Last line of the run.
    pub last_line: usize,
    /// Innermost guide around the caret.
    pub is_active: bool,
}

/// Guides for `layout`. Returns nothing when disabled or when more than
/// `max_visible_lines` lines are visible.
pub fn compute_indent_guides<D: DocumentSource + ?Sized>(
    doc: &D,
    layout: &VisibleLayout,
    caret_line: usize,
    tab_width: usize,
    config: &IndentGuideConfig,
) -> Vec<IndentGuide> {
    if !config.enabled || layout.is_empty() || layout.len() > config.max_visible_lines {
        return Vec::new();
    }
    let tab_width = tab_width.max(1);

    let raw: Vec<Option<usize>> = layout
        .lines
        .iter()
        .map(|l| {
            let text = doc.line_text(l.line).unwrap_or_default();
            (!is_blank(&text)).then(|| indentation_width(&text, tab_width) / tab_width)
        })
        .collect();
    let depths = fill_blank_depths(&raw);

    let caret_slot = layout.lines.iter().position(|l| l.line == caret_line);
    let caret_depth = caret_slot.map_or(0, |slot| depths[slot]);

    let mut guides = Vec::new();
    let max_depth = depths.iter().copied().max().unwrap_or(0);
    for level in 1..=max_depth {
        let mut run_start: Option<usize> = None;
        for slot in 0..=depths.len() {
            let deep_enough = depths.get(slot).is_some_and(|d| *d >= level);
            match (deep_enough, run_start) {
                (true, None) => run_start = Some(slot),
                (false, Some(start)) => {
                    let is_active = level == caret_depth
                        && caret_slot.is_some_and(|c| (start..slot).contains(&c));
                    guides.push(IndentGuide {
                        level,
                        cell: (level - 1) * tab_width,
                        first_line: layout.lines[start].line,
                        last_line: layout.lines[slot - 1].line,
                        is_active,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    guides
}

fn fill_blank_depths(raw: &[Option<usize>]) -> Vec<usize> {
    let mut before = vec![None; raw.len()];
    let mut last = None;
    for (i, depth) in raw.iter().enumerate() {
        if depth.is_some() {
            last = *depth;
        }
        before[i] = last;
    }

    let mut out = vec![0; raw.len()];
    let mut next = None;
    for i in (0..raw.len()).rev() {
        out[i] = match raw[i] {
            Some(depth) => {
                next = Some(depth);
                depth
            }
            None => before[i].zip(next).map_or(0, |(a, b)| a.min(b)),
        };
    }
    out
}
