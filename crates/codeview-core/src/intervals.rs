//! Sorted interval index for offset-range overlays (diagnostics, search matches).
//!
//! Intervals are kept sorted by start in a vector, alongside a prefix maximum of their ends.
//! Range queries binary-search the candidate window and use the prefix maximum to stop
//! expanding backwards early, so painting a viewport over a document with many overlays stays
//! O(log n + k).

/// A half-open `[start, end)` char-offset interval carrying a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<T> {
    /// Start offset.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Payload.
    pub value: T,
}

impl<T> Interval<T> {
    /// Create an interval.
    pub fn new(start: usize, end: usize, value: T) -> Self {
        Self {
            start,
            end: end.max(start),
            value,
        }
    }

    /// Check if the interval contains `pos`.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if the interval overlaps `[start, end)`. Empty intervals overlap the range
    /// they sit in.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        if self.start == self.end {
            return start <= self.start && self.start < end;
        }
        self.start < end && start < self.end
    }
}

/// Interval index.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    /// Sorted by start.
    intervals: Vec<Interval<T>>,
    /// `prefix_max_end[i] = max(intervals[0..=i].end)`.
    prefix_max_end: Vec<usize>,
}

impl<T> IntervalIndex<T> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
            prefix_max_end: Vec::new(),
        }
    }

    fn rebuild_prefix_max_end_from(&mut self, start_idx: usize) {
        if self.intervals.is_empty() {
            self.prefix_max_end.clear();
            return;
        }

        if self.prefix_max_end.len() != self.intervals.len() {
            self.prefix_max_end.resize(self.intervals.len(), 0);
        }

        let mut max_end = if start_idx == 0 {
            0
        } else {
            self.prefix_max_end[start_idx - 1]
        };

        for (idx, interval) in self.intervals.iter().enumerate().skip(start_idx) {
            max_end = max_end.max(interval.end);
            self.prefix_max_end[idx] = max_end;
        }
    }

    /// Insert an interval, keeping start order (stable for equal starts).
    pub fn insert(&mut self, interval: Interval<T>) {
        let pos = self
            .intervals
            .partition_point(|i| i.start <= interval.start);
        self.intervals.insert(pos, interval);
        self.prefix_max_end.insert(pos, 0);
        self.rebuild_prefix_max_end_from(pos);
    }

    /// All intervals containing `pos`.
    pub fn query_point(&self, pos: usize) -> Vec<&Interval<T>> {
        let mut result = Vec::new();
        // Everything that may contain `pos` starts at or before it.
        let idx = self.intervals.partition_point(|i| i.start <= pos);
        for i in (0..idx).rev() {
            if self.prefix_max_end[i] <= pos {
                break;
            }
            let interval = &self.intervals[i];
            if interval.contains(pos) {
                result.push(interval);
            }
        }
        result.reverse();
        result
    }

    /// All intervals overlapping `[start, end)`, in start order.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&Interval<T>> {
        if self.intervals.is_empty() || start >= end {
            return Vec::new();
        }

        let search_end = self.intervals.partition_point(|i| i.start < end);
        if search_end == 0 {
            return Vec::new();
        }

        let mut scan_start = self
            .intervals
            .partition_point(|i| i.start < start)
            .min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        self.intervals[scan_start..search_end]
            .iter()
            .filter(|interval| interval.overlaps(start, end))
            .collect()
    }

    /// Iterate every interval in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval<T>> {
        self.intervals.iter()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.prefix_max_end.clear();
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Shift intervals for `delta` chars inserted at `pos`.
    pub fn update_for_insertion(&mut self, pos: usize, delta: usize) {
        for interval in &mut self.intervals {
            if interval.start >= pos {
                interval.start += delta;
                interval.end += delta;
            } else if interval.end > pos {
                interval.end += delta;
            }
        }
        self.rebuild_prefix_max_end_from(0);
    }

    /// Shift or clip intervals for the deletion of `[start, end)`. Intervals entirely inside
    /// the deleted range are dropped.
    pub fn update_for_deletion(&mut self, start: usize, end: usize) {
        let delta = end.saturating_sub(start);
        if delta == 0 {
            return;
        }
        let clip = |offset: usize| -> usize {
            if offset <= start {
                offset
            } else if offset >= end {
                offset - delta
            } else {
                start
            }
        };

        self.intervals.retain_mut(|interval| {
            let inside = interval.start >= start && interval.end <= end && interval.end > interval.start;
            if inside {
                return false;
            }
            interval.start = clip(interval.start);
            interval.end = clip(interval.end);
            true
        });
        // Clipping can only move starts toward `start`, which keeps the order intact.
        self.rebuild_prefix_max_end_from(0);
    }
}

impl<T> Default for IntervalIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<Interval<T>> for IntervalIndex<T> {
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        let mut intervals: Vec<Interval<T>> = iter.into_iter().collect();
        intervals.sort_by_key(|i| i.start);
        let mut index = Self {
            intervals,
            prefix_max_end: Vec::new(),
        };
        index.rebuild_prefix_max_end_from(0);
        index
    }
}
