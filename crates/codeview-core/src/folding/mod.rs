//! Fold Engine: lazily detected fold ranges and their folded state.
//!
//! Ranges are detected on first query for a start line and memoized (negative results too).
//! Folding a range first force-unfolds every folded range that starts among the lines it hides
//! (nested or only partly overlapping) and records them by `(start, end)` value; unfolding
//! restores those that would not overlap a fold made in the meantime. Folded ranges therefore
//! never overlap, and a line is hidden iff some folded range `R` has
//! `R.start_line < line <= R.end_line`.

mod detect;

pub use detect::{FoldDetector, detect_fold_at};

use crate::document::DocumentSource;
use crate::lexer::Scanner;
use codeview_lang::LanguageConfig;
use std::collections::{BTreeMap, BTreeSet};

/// What produced a fold range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldKind {
    /// Template block tags (`{% block %}` ... `{% endblock %}`).
    TemplateTag,
    /// Markup element (`<div>` ... `</div>`).
    MarkupTag,
    /// Bracket pair.
    Bracket,
    /// Indentation block.
    Indent,
}

impl FoldKind {
    /// Short label for the fold ellipsis / tooltips.
    pub fn label(self) -> &'static str {
        match self {
            FoldKind::TemplateTag => "{% ... %}",
            FoldKind::MarkupTag => "<...>",
            FoldKind::Bracket => "...",
            FoldKind::Indent => "...",
        }
    }
}

/// A collapsible span of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRange {
    /// First line (stays visible when folded).
    pub start_line: usize,
    /// Last hidden line (inclusive).
    pub end_line: usize,
    /// Whether the range is folded.
    pub is_folded: bool,
    /// `(start, end)` of the ranges that were folded when this one was folded.
    pub originally_folded_children: Vec<(usize, usize)>,
    /// Detector that produced the range.
    pub kind: FoldKind,
}

impl FoldRange {
    /// Create an unfolded range.
    pub fn new(start_line: usize, end_line: usize, kind: FoldKind) -> Self {
        Self {
            start_line,
            end_line,
            is_folded: false,
            originally_folded_children: Vec::new(),
            kind,
        }
    }

    /// Returns `true` if folding this range hides `line`.
    pub fn hides(&self, line: usize) -> bool {
        self.start_line < line && line <= self.end_line
    }

    /// Number of lines hidden while folded.
    pub fn hidden_len(&self) -> usize {
        self.end_line - self.start_line
    }

    fn key(&self) -> (usize, usize) {
        (self.start_line, self.end_line)
    }
}

/// Owns fold detection and fold state for one document.
#[derive(Debug, Clone)]
pub struct FoldEngine {
    detector: FoldDetector,
    /// Memoized detection result per start line.
    ranges: BTreeMap<usize, Option<FoldRange>>,
    /// Start lines of folded ranges.
    folded: BTreeSet<usize>,
}

impl FoldEngine {
    /// Create a fold engine for `lang`.
    pub fn new(lang: LanguageConfig) -> Self {
        Self {
            detector: FoldDetector::new(lang),
            ranges: BTreeMap::new(),
            folded: BTreeSet::new(),
        }
    }

    /// Active language.
    pub fn language(&self) -> &LanguageConfig {
        self.detector.language()
    }

    /// Switch language. Every range (folded or not) is dropped.
    pub fn set_language(&mut self, lang: LanguageConfig) {
        tracing::debug!(language = %lang.id, "fold engine language changed");
        self.detector.set_language(lang);
        self.ranges.clear();
        self.folded.clear();
    }

    /// Lexer scanner shared with bracket matching.
    pub fn scanner_mut(&mut self) -> &mut Scanner {
        self.detector.scanner_mut()
    }

    /// Fold range starting at `line`, detecting it on first query.
    pub fn range_at<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        line: usize,
    ) -> Option<&FoldRange> {
        if line >= doc.line_count() {
            return None;
        }
        if !self.ranges.contains_key(&line) {
            let detected = self.detector.detect(doc, line);
            self.ranges.insert(line, detected);
        }
        self.ranges.get(&line).and_then(Option::as_ref)
    }

    /// Memoized range at `line` without detecting.
    pub fn cached_range(&self, line: usize) -> Option<&FoldRange> {
        self.ranges.get(&line).and_then(Option::as_ref)
    }

    /// Returns `true` if `line` is hidden inside a folded range.
    pub fn is_hidden(&self, line: usize) -> bool {
        self.folded_range_hiding(line).is_some()
    }

    /// The folded range hiding `line`, if any.
    pub fn folded_range_hiding(&self, line: usize) -> Option<&FoldRange> {
        self.folded
            .range(..line)
            .rev()
            .filter_map(|start| self.cached_range(*start))
            .find(|range| range.hides(line))
    }

    /// Returns `true` if `line` starts a folded range.
    pub fn is_folded_start(&self, line: usize) -> bool {
        self.folded.contains(&line)
    }

    /// Returns `true` if any range is folded.
    pub fn has_folds(&self) -> bool {
        !self.folded.is_empty()
    }

    /// Fold the range starting at `line`. Returns `false` if there is no foldable range there,
    /// it is already folded, or `line` itself is hidden.
    pub fn fold<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> bool {
        if self.is_hidden(line) {
            return false;
        }
        let Some(range) = self.range_at(doc, line).cloned() else {
            return false;
        };
        if range.is_folded {
            return false;
        }

        let children: Vec<(usize, usize)> = self
            .folded
            .range(range.start_line + 1..=range.end_line)
            .filter_map(|start| self.cached_range(*start))
            .map(FoldRange::key)
            .collect();
        for (start, _) in &children {
            self.set_folded(*start, false);
        }

        if let Some(Some(target)) = self.ranges.get_mut(&line) {
            target.is_folded = true;
            target.originally_folded_children = children;
            tracing::debug!(
                start_line = target.start_line,
                end_line = target.end_line,
                suppressed_children = target.originally_folded_children.len(),
                "fold"
            );
        }
        self.folded.insert(line);
        true
    }

    /// Unfold the range starting at `line`, restoring the children that were folded when it was
    /// folded. Returns `false` if no folded range starts there.
    pub fn unfold(&mut self, line: usize) -> bool {
        let children = match self.ranges.get_mut(&line) {
            Some(Some(range)) if range.is_folded => {
                range.is_folded = false;
                std::mem::take(&mut range.originally_folded_children)
            }
            _ => return false,
        };
        self.folded.remove(&line);

        for (start, end) in &children {
            // Value lookup: the child is restored only if the same span still exists.
            let matches = self
                .cached_range(*start)
                .is_some_and(|child| child.end_line == *end);
            if matches && !self.overlaps_folded(*start, *end) {
                self.set_folded(*start, true);
            }
        }
        tracing::debug!(start_line = line, restored_children = children.len(), "unfold");
        true
    }

    /// Toggle the fold at `line`. Returns `true` if anything changed.
    pub fn toggle_fold_at_line<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> bool {
        if self.is_folded_start(line) {
            self.unfold(line)
        } else {
            self.fold(doc, line)
        }
    }

    /// Fold every top-level range. Returns the number of ranges folded.
    pub fn fold_all<D: DocumentSource + ?Sized>(&mut self, doc: &D) -> usize {
        let mut folded = 0usize;
        let mut line = 0usize;
        let line_count = doc.line_count();
        while line < line_count {
            let Some(range) = self.range_at(doc, line).cloned() else {
                line += 1;
                continue;
            };
            if !range.is_folded && self.fold(doc, line) {
                folded += 1;
            }
            line = range.end_line + 1;
        }
        tracing::debug!(folded, "fold all");
        folded
    }

    /// Unfold everything and forget every recorded child list.
    pub fn unfold_all(&mut self) {
        for range in self.ranges.values_mut().flatten() {
            range.is_folded = false;
            range.originally_folded_children.clear();
        }
        self.folded.clear();
        tracing::debug!("unfold all");
    }

    /// Drop memoized ranges invalidated by an edit at `line`: every non-folded range starting at
    /// or after `line` or spanning it, and every negative result. Folded ranges survive.
    pub fn invalidate_from(&mut self, line: usize) {
        self.detector.invalidate_from(line);
        self.ranges.retain(|start, range| match range {
            Some(range) if range.is_folded => true,
            Some(range) => *start < line && range.end_line < line,
            None => false,
        });
    }

    /// Shift folded ranges for an edit at `edit_line` that changed the line count by
    /// `line_delta`. Non-folded ranges after the edit are dropped (they are re-detected).
    pub fn apply_line_delta(&mut self, edit_line: usize, line_delta: isize) {
        if line_delta == 0 {
            return;
        }

        let shift = |start: usize, end: usize| -> (usize, usize) {
            if edit_line <= start {
                let start = (start as isize + line_delta).max(0) as usize;
                let end = (end as isize + line_delta).max(0) as usize;
                (start, end)
            } else if edit_line <= end {
                let end = (end as isize + line_delta).max(start as isize) as usize;
                (start, end)
            } else {
                (start, end)
            }
        };

        let old = std::mem::take(&mut self.ranges);
        self.folded.clear();
        for (start, range) in old {
            match range {
                Some(mut range) if range.is_folded => {
                    let (s, e) = shift(range.start_line, range.end_line);
                    if e <= s {
                        continue;
                    }
                    range.start_line = s;
                    range.end_line = e;
                    for child in &mut range.originally_folded_children {
                        *child = shift(child.0, child.1);
                    }
                    self.folded.insert(s);
                    self.ranges.insert(s, Some(range));
                }
                other if start < edit_line => {
                    self.ranges.entry(start).or_insert(other);
                }
                _ => {}
            }
        }
        self.detector.invalidate_from(edit_line);
    }

    /// Drop folded ranges that reach past the end of a document with `line_count` lines.
    pub fn clamp_to_line_count(&mut self, line_count: usize) {
        let max_line = line_count.saturating_sub(1);
        let out_of_range: Vec<usize> = self
            .ranges
            .iter()
            .filter(|(start, range)| {
                **start > max_line || range.as_ref().is_some_and(|r| r.end_line > max_line)
            })
            .map(|(start, _)| *start)
            .collect();
        for start in out_of_range {
            self.ranges.remove(&start);
            self.folded.remove(&start);
        }
    }

    /// All folded ranges, by start line.
    pub fn folded_ranges(&self) -> impl Iterator<Item = &FoldRange> + '_ {
        self.folded
            .iter()
            .filter_map(|start| self.cached_range(*start))
    }

    /// Total number of hidden lines.
    pub fn hidden_line_count(&self) -> usize {
        self.folded_ranges().map(FoldRange::hidden_len).sum()
    }

    fn overlaps_folded(&self, start: usize, end: usize) -> bool {
        self.is_hidden(start) || self.folded.range(start + 1..=end).next().is_some()
    }

    fn set_folded(&mut self, start: usize, folded: bool) {
        if let Some(Some(range)) = self.ranges.get_mut(&start) {
            range.is_folded = folded;
            if folded {
                self.folded.insert(start);
            } else {
                self.folded.remove(&start);
            }
        }
    }
}

impl Default for FoldEngine {
    fn default() -> Self {
        Self::new(LanguageConfig::default())
    }
}
