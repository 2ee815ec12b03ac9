//! Line Cache Bank: per-line memoization of shaped blocks, widths and wrapped heights.
//!
//! Every lookup re-reads the line's current text and compares it with the cached snapshot; a
//! mismatch drops that line's entry. A document-wide version (bumped on theme or language
//! change) additionally drops every shaped block, since shaping depends on style as well as
//! text. Edits that shift line numbering drop every entry from the first affected line on.

use crate::document::DocumentSource;
use crate::shaping::{LineShaper, ShapedBlock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Memoization counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups served from cache.
    pub hits: u64,
    /// Shaped blocks built.
    pub rebuilds: u64,
}

#[derive(Debug, Clone)]
struct LineEntry {
    text: String,
    block: Option<Arc<ShapedBlock>>,
    width: Option<f32>,
    height: Option<f32>,
    block_version: u64,
}

impl LineEntry {
    fn new(text: String) -> Self {
        Self {
            text,
            block: None,
            width: None,
            height: None,
            block_version: 0,
        }
    }
}

/// Per-line caches owned by the engine.
#[derive(Debug, Default)]
pub struct LineCacheBank {
    entries: BTreeMap<usize, LineEntry>,
    document_version: Option<u64>,
    wrap_width: Option<f32>,
    stats: CacheStats,
}

impl LineCacheBank {
    /// Create an empty cache bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaped block for `line`, rebuilding it if the text snapshot or document version changed.
    ///
    /// Out-of-range lines shape as empty text.
    pub fn shaped_line<D, S>(&mut self, doc: &D, shaper: &S, line: usize) -> Arc<ShapedBlock>
    where
        D: DocumentSource + ?Sized,
        S: LineShaper + ?Sized,
    {
        self.sync_document_version(doc);
        let version = self.document_version.unwrap_or(0);
        let wrap_width = self.wrap_width;

        let current = doc.line_text(line).unwrap_or_default();
        let entry = self.entries.entry(line).or_insert_with(|| LineEntry::new(String::new()));
        if entry.text.as_str() != &*current {
            *entry = LineEntry::new(current.into_owned());
        }

        if let Some(block) = &entry.block
            && entry.block_version == version
        {
            self.stats.hits += 1;
            return Arc::clone(block);
        }

        tracing::trace!(line, "shaping line");
        let block = Arc::new(shaper.build_highlighted_block(line, &entry.text, wrap_width));
        entry.width = Some(block.width());
        entry.height = Some(block.height());
        entry.block = Some(Arc::clone(&block));
        entry.block_version = version;
        self.stats.rebuilds += 1;
        block
    }

    /// Wrapped pixel height of `line`.
    pub fn line_height<D, S>(&mut self, doc: &D, shaper: &S, line: usize) -> f32
    where
        D: DocumentSource + ?Sized,
        S: LineShaper + ?Sized,
    {
        if let Some(height) = self.fresh_metric(doc, line, |e| e.height) {
            self.stats.hits += 1;
            return height;
        }
        self.shaped_line(doc, shaper, line).height()
    }

    /// Intrinsic pixel width of `line`, measured without shaping when nothing is cached.
    pub fn line_width<D, S>(&mut self, doc: &D, shaper: &S, line: usize) -> f32
    where
        D: DocumentSource + ?Sized,
        S: LineShaper + ?Sized,
    {
        if let Some(width) = self.fresh_metric(doc, line, |e| e.width) {
            self.stats.hits += 1;
            return width;
        }
        // Width alone does not need a shaped block.
        let current = doc.line_text(line).unwrap_or_default();
        let entry = self.entries.entry(line).or_insert_with(|| LineEntry::new(String::new()));
        if entry.text.as_str() != &*current {
            *entry = LineEntry::new(current.into_owned());
        }
        let width = shaper.measure_width(&entry.text);
        entry.width = Some(width);
        width
    }

    /// Cached metric if the snapshot still matches. Width and height survive a document
    /// version bump; only text and wrap width affect them.
    fn fresh_metric<D>(
        &mut self,
        doc: &D,
        line: usize,
        get: impl Fn(&LineEntry) -> Option<f32>,
    ) -> Option<f32>
    where
        D: DocumentSource + ?Sized,
    {
        let entry = self.entries.get(&line)?;
        let value = get(entry)?;
        let current = doc.line_text(line).unwrap_or_default();
        if entry.text.as_str() == &*current {
            Some(value)
        } else {
            self.entries.remove(&line);
            None
        }
    }

    fn sync_document_version<D: DocumentSource + ?Sized>(&mut self, doc: &D) {
        let version = doc.document_version();
        if self.document_version != Some(version) {
            if self.document_version.is_some() {
                tracing::debug!(version, "document version changed, dropping shaped blocks");
                for entry in self.entries.values_mut() {
                    entry.block = None;
                }
            }
            self.document_version = Some(version);
        }
    }

    /// Drop the caches of one line.
    pub fn invalidate_line(&mut self, line: usize) {
        self.entries.remove(&line);
    }

    /// Drop the caches of every line `>= line`.
    pub fn invalidate_from(&mut self, line: usize) {
        let dropped = self.entries.split_off(&line);
        if !dropped.is_empty() {
            tracing::debug!(
                from_line = line,
                dropped = dropped.len(),
                "bulk line cache invalidation"
            );
        }
    }

    /// Drop everything.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Apply an edit notification.
    ///
    /// `affected_line` is the line the edit touched, `insertion_line` the line where the dirty
    /// region starts. When the line count changed, numbering after the edit has shifted and
    /// every entry from `min(affected_line, insertion_line) - 1` on is dropped; otherwise only
    /// the affected line is. Returns the dropped line indices that were cached.
    pub fn apply_edit(
        &mut self,
        affected_line: usize,
        insertion_line: usize,
        line_count_changed: bool,
    ) -> BTreeSet<usize> {
        if line_count_changed {
            let from = affected_line.min(insertion_line).saturating_sub(1);
            let dropped: BTreeSet<usize> = self.entries.range(from..).map(|(k, _)| *k).collect();
            self.invalidate_from(from);
            dropped
        } else {
            let mut dropped = BTreeSet::new();
            for line in [affected_line, insertion_line] {
                if self.entries.remove(&line).is_some() {
                    dropped.insert(line);
                }
            }
            dropped
        }
    }

    /// Update the wrap width; a change drops every cached block and metric.
    pub fn set_wrap_width(&mut self, wrap_width: Option<f32>) -> bool {
        if self.wrap_width == wrap_width {
            return false;
        }
        self.wrap_width = wrap_width;
        self.entries.clear();
        true
    }

    /// Current wrap width.
    pub fn wrap_width(&self) -> Option<f32> {
        self.wrap_width
    }

    /// Returns `true` if `line` has a cached shaped block.
    pub fn is_cached(&self, line: usize) -> bool {
        self.entries.get(&line).is_some_and(|e| e.block.is_some())
    }

    /// Cached intrinsic width of `line` without touching the document.
    pub fn cached_width(&self, line: usize) -> Option<f32> {
        self.entries.get(&line).and_then(|e| e.width)
    }

    /// Number of lines with any cached state.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Memoization counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RopeDocument;
    use crate::shaping::{MonospaceShaper, PlainHighlighter};

    fn shaper() -> MonospaceShaper {
        MonospaceShaper::new(PlainHighlighter, 8.0, 16.0, 4)
    }

    #[test]
    fn test_memoizes_until_text_changes() {
        let mut doc = RopeDocument::from_text("abc\ndef");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();

        let a = cache.shaped_line(&doc, &shaper, 1);
        let b = cache.shaped_line(&doc, &shaper, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats().rebuilds, 1);

        // Snapshot comparison notices the edit even without an explicit invalidation.
        doc.insert(5, "X");
        let c = cache.shaped_line(&doc, &shaper, 1);
        assert_eq!(c.text(), "dXef");
        assert_eq!(cache.stats().rebuilds, 2);
    }

    #[test]
    fn test_document_version_drops_blocks_but_keeps_metrics() {
        let mut doc = RopeDocument::from_text("abc");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();

        cache.shaped_line(&doc, &shaper, 0);
        doc.bump_document_version();
        assert_eq!(cache.line_width(&doc, &shaper, 0), 24.0);
        assert_eq!(cache.stats().rebuilds, 1);

        cache.shaped_line(&doc, &shaper, 0);
        assert_eq!(cache.stats().rebuilds, 2);
    }

    #[test]
    fn test_width_is_measured_without_shaping() {
        let doc = RopeDocument::from_text("ab\tc");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();
        assert_eq!(cache.line_width(&doc, &shaper, 0), 40.0);
        assert!(!cache.is_cached(0));
        assert_eq!(cache.cached_width(0), Some(40.0));
        assert_eq!(cache.stats().rebuilds, 0);
    }

    #[test]
    fn test_apply_edit_same_line_count() {
        let doc = RopeDocument::from_text("a\nb\nc\nd");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();
        for line in 0..4 {
            cache.shaped_line(&doc, &shaper, line);
        }

        let dropped = cache.apply_edit(2, 2, false);
        assert_eq!(dropped, BTreeSet::from([2]));
        assert!(cache.is_cached(0) && cache.is_cached(1) && cache.is_cached(3));
        assert!(!cache.is_cached(2));
    }

    #[test]
    fn test_apply_edit_line_count_change_drops_tail() {
        let doc = RopeDocument::from_text("a\nb\nc\nd\ne");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();
        for line in 0..5 {
            cache.shaped_line(&doc, &shaper, line);
        }

        cache.apply_edit(3, 3, true);
        assert!(cache.is_cached(0) && cache.is_cached(1));
        assert!(!cache.is_cached(2) && !cache.is_cached(3) && !cache.is_cached(4));
    }

    #[test]
    fn test_wrap_width_change_clears() {
        let doc = RopeDocument::from_text("abcdefgh");
        let shaper = shaper();
        let mut cache = LineCacheBank::new();
        assert_eq!(cache.line_height(&doc, &shaper, 0), 16.0);

        assert!(cache.set_wrap_width(Some(32.0)));
        assert!(cache.is_empty());
        assert_eq!(cache.line_height(&doc, &shaper, 0), 32.0);
        assert!(!cache.set_wrap_width(Some(32.0)));
    }
}
