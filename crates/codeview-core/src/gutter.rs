//! Gutter layout: sub-column geometry and pointer classification.
//!
//! Left to right the gutter holds an optional breakpoint column, the line numbers (with padding
//! on both sides), an optional fold-icon column and a separator. Its width depends on the digit
//! count of the largest line number, so it only changes when the line count crosses a power of
//! ten.

use crate::config::GutterConfig;

/// A gutter sub-column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GutterRegion {
    /// Breakpoint dots.
    Breakpoint,
    /// Line numbers (and the padding/separator around them).
    LineNumber,
    /// Fold icons.
    FoldIcon,
}

/// Number of decimal digits in `n` (at least 1).
pub fn digit_count(n: usize) -> usize {
    n.max(1).ilog10() as usize + 1
}

/// Resolved gutter geometry for one line count.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterLayout {
    digits: usize,
    width: f32,
    breakpoint: Option<(f32, f32)>,
    numbers: (f32, f32),
    fold: Option<(f32, f32)>,
}

impl GutterLayout {
    /// Lay out the gutter for a document of `line_count` lines.
    pub fn compute(config: &GutterConfig, line_count: usize, digit_width: f32) -> Self {
        let digits = digit_count(line_count).max(config.min_digits);
        let mut x = 0.0f32;

        let breakpoint = config.breakpoints.then(|| {
            let column = (x, x + config.breakpoint_width);
            x += config.breakpoint_width;
            column
        });

        let numbers_width = if config.line_numbers {
            digits as f32 * digit_width + config.padding * 2.0
        } else {
            config.padding
        };
        let numbers = (x, x + numbers_width);
        x += numbers_width;

        let fold = config.fold_icons.then(|| {
            let column = (x, x + config.fold_width);
            x += config.fold_width;
            column
        });

        Self {
            digits,
            width: x + config.separator_width,
            breakpoint,
            numbers,
            fold,
        }
    }

    /// Digits reserved for line numbers.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Total gutter width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns `true` if a document of `line_count` lines needs a different digit count.
    pub fn needs_recompute(&self, config: &GutterConfig, line_count: usize) -> bool {
        digit_count(line_count).max(config.min_digits) != self.digits
    }

    /// `[start, end)` of the breakpoint column.
    pub fn breakpoint_column(&self) -> Option<(f32, f32)> {
        self.breakpoint
    }

    /// `[start, end)` of the line-number column, padding included.
    pub fn number_column(&self) -> (f32, f32) {
        self.numbers
    }

    /// `[start, end)` of the fold-icon column.
    pub fn fold_column(&self) -> Option<(f32, f32)> {
        self.fold
    }

    /// Classify a widget-local x coordinate. Breakpoint column first, then fold icons;
    /// anything else inside the gutter is the line-number area.
    pub fn classify(&self, x: f32) -> Option<GutterRegion> {
        if !(0.0..self.width).contains(&x) {
            return None;
        }
        let inside = |column: Option<(f32, f32)>| column.is_some_and(|(a, b)| x >= a && x < b);
        if inside(self.breakpoint) {
            Some(GutterRegion::Breakpoint)
        } else if inside(self.fold) {
            Some(GutterRegion::FoldIcon)
        } else {
            Some(GutterRegion::LineNumber)
        }
    }
}
