//! Diagnostics supplied by the language-server collaborator.
//!
//! The engine never fetches diagnostics; it only indexes them by offset so the paint pipeline
//! can draw squiggles and color line numbers for the visible range.

use crate::intervals::{Interval, IntervalIndex};
use std::cmp::Ordering;

/// A half-open character-offset range (`start..end`) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticRange {
    /// Range start offset (inclusive), in `char`s from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in `char`s from the start of the document.
    pub end: usize,
}

impl DiagnosticRange {
    /// Create a new diagnostic range.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }
}

/// Diagnostic severity levels. Ordered so that `Error` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Information,
    /// Hint diagnostics.
    Hint,
}

impl DiagnosticSeverity {
    fn rank(self) -> u8 {
        match self {
            DiagnosticSeverity::Hint => 0,
            DiagnosticSeverity::Information => 1,
            DiagnosticSeverity::Warning => 2,
            DiagnosticSeverity::Error => 3,
        }
    }
}

impl Ord for DiagnosticSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for DiagnosticSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Range in character offsets.
    pub range: DiagnosticRange,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Message.
    pub message: String,
    /// Optional diagnostic code (stringified).
    pub code: Option<String>,
    /// Optional source (e.g. `"rust-analyzer"`).
    pub source: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without code or source.
    pub fn new(
        range: DiagnosticRange,
        severity: DiagnosticSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            source: None,
        }
    }
}

/// The current diagnostics for one document, indexed by offset.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSet {
    diagnostics: Vec<Diagnostic>,
    index: IntervalIndex<usize>,
}

impl DiagnosticSet {
    /// Index `diagnostics`.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let index = diagnostics
            .iter()
            .enumerate()
            .map(|(i, d)| Interval::new(d.range.start, d.range.end, i))
            .collect();
        Self { diagnostics, index }
    }

    /// Replace every diagnostic.
    pub fn replace(&mut self, diagnostics: Vec<Diagnostic>) {
        *self = Self::new(diagnostics);
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if there are no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// All diagnostics, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics overlapping `[start, end)`, in start order.
    pub fn in_range(&self, start: usize, end: usize) -> Vec<&Diagnostic> {
        self.index
            .query_range(start, end)
            .into_iter()
            .filter_map(|interval| self.diagnostics.get(interval.value))
            .collect()
    }

    /// Highest severity overlapping `[start, end)`.
    pub fn max_severity_in_range(&self, start: usize, end: usize) -> Option<DiagnosticSeverity> {
        self.in_range(start, end).into_iter().map(|d| d.severity).max()
    }
}
