//! Viewport Geometry Resolver.
//!
//! Maps between document-space y coordinates and line indices. With no wrapping and no folds
//! every line is `line_height` tall and offsets are O(1) arithmetic ([`GeometryMode::Fixed`]).
//! Otherwise offsets come from a forward scan over visible lines ([`GeometryMode::Scanned`]),
//! skipping folded regions in one step and resuming from the last resolved first-visible line
//! when the viewport only moved down.
//!
//! Content size is kept approximately current by incremental adjustment after edits; a full
//! recomputation runs once edits settle (see [`crate::debounce`]).

use crate::primitives::Size;

/// Per-line inputs the resolver needs. The engine implements this over the document, the
/// line cache and the fold engine.
pub trait LineMetrics {
    /// Number of logical lines (`>= 1`).
    fn line_count(&self) -> usize;

    /// Returns `true` if `line` is hidden by a fold.
    fn is_hidden(&self, line: usize) -> bool;

    /// If `line` starts a folded range, its last hidden line.
    fn folded_end(&self, line: usize) -> Option<usize>;

    /// On-screen height of a visible line (wrapped height when wrapping).
    fn line_height(&mut self, line: usize) -> f32;

    /// Intrinsic (unwrapped) width of a line.
    fn line_width(&mut self, line: usize) -> f32;
}

/// Scroll position, viewport size and derived sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportState {
    /// Horizontal scroll offset.
    pub scroll_x: f32,
    /// Vertical scroll offset.
    pub scroll_y: f32,
    /// Widget size (gutter included).
    pub viewport: Size,
    /// Gutter width.
    pub gutter_width: f32,
    /// Wrap width; `Some` only when wrapping is enabled.
    pub wrap_width: Option<f32>,
    /// Total content size.
    pub content_size: Size,
}

impl ViewportState {
    /// Width available to text.
    pub fn text_area_width(&self) -> f32 {
        (self.viewport.width - self.gutter_width).max(0.0)
    }

    /// Document y of the viewport's top edge.
    pub fn top(&self) -> f32 {
        self.scroll_y
    }

    /// Document y of the viewport's bottom edge.
    pub fn bottom(&self) -> f32 {
        self.scroll_y + self.viewport.height
    }

    /// Largest valid `(scroll_x, scroll_y)`.
    pub fn max_scroll(&self) -> (f32, f32) {
        (
            (self.content_size.width - self.text_area_width()).max(0.0),
            (self.content_size.height - self.viewport.height).max(0.0),
        )
    }
}

/// Line-offset strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryMode {
    /// No wrapping, no folds: `top(i) = i * line_height`.
    Fixed,
    /// Wrapping and/or folds: offsets come from a forward scan.
    Scanned,
}

impl GeometryMode {
    /// Select the mode from the two switches.
    pub fn select(wrap_enabled: bool, folds_active: bool) -> Self {
        if wrap_enabled || folds_active {
            GeometryMode::Scanned
        } else {
            GeometryMode::Fixed
        }
    }
}

/// Vertical placement of one visible line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    /// Logical line index.
    pub line: usize,
    /// Document-space top.
    pub top: f32,
    /// On-screen height.
    pub height: f32,
}

impl LineLayout {
    /// Document-space bottom.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// The resolved visible range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibleLayout {
    /// First visible line.
    pub first: usize,
    /// Last visible line.
    pub last: usize,
    /// Placement of every non-hidden line in `first..=last`.
    pub lines: Vec<LineLayout>,
}

impl VisibleLayout {
    /// Placement of `line`, if it is visible.
    pub fn line(&self, line: usize) -> Option<&LineLayout> {
        if line < self.first || line > self.last {
            return None;
        }
        self.lines
            .binary_search_by_key(&line, |l| l.line)
            .ok()
            .map(|idx| &self.lines[idx])
    }

    /// Returns `true` if `line` is in the resolved range.
    pub fn contains(&self, line: usize) -> bool {
        (self.first..=self.last).contains(&line)
    }

    /// Number of visible lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if no line is visible.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScanAnchor {
    line: usize,
    top: f32,
}

/// Resolves visible ranges, line offsets and content size.
#[derive(Debug, Clone)]
pub struct GeometryResolver {
    line_height: f32,
    mode: GeometryMode,
    anchor: Option<ScanAnchor>,
    content_size: Size,
    content_exact: bool,
}

impl GeometryResolver {
    /// Create a resolver for a fixed (unwrapped) line height.
    pub fn new(line_height: f32) -> Self {
        Self {
            line_height: line_height.max(1.0),
            mode: GeometryMode::Fixed,
            anchor: None,
            content_size: Size::default(),
            content_exact: false,
        }
    }

    /// Fixed line height.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Active strategy.
    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    /// Update the strategy from the wrap/fold switches.
    pub fn set_mode(&mut self, wrap_enabled: bool, folds_active: bool) {
        let mode = GeometryMode::select(wrap_enabled, folds_active);
        if mode != self.mode {
            tracing::debug!(?mode, "geometry mode changed");
            self.mode = mode;
            self.anchor = None;
        }
    }

    /// Forget the scan anchor (after edits, fold toggles or wrap width changes).
    pub fn invalidate_anchor(&mut self) {
        self.anchor = None;
    }

    fn scan_start(&self, y: f32, line_count: usize) -> (usize, f32) {
        match self.anchor {
            Some(anchor) if anchor.top <= y && anchor.line < line_count => {
                (anchor.line, anchor.top)
            }
            _ => (0, 0.0),
        }
    }

    /// Next non-hidden line after `line`, stepping over its fold if it starts one.
    fn next_line<M: LineMetrics + ?Sized>(metrics: &M, line: usize, line_count: usize) -> usize {
        let next = metrics.folded_end(line).map_or(line + 1, |end| end.max(line) + 1);
        Self::skip_hidden(metrics, next, line_count)
    }

    fn skip_hidden<M: LineMetrics + ?Sized>(metrics: &M, mut line: usize, line_count: usize) -> usize {
        while line < line_count && metrics.is_hidden(line) {
            line += 1;
        }
        line
    }

    /// The minimal contiguous range of lines intersecting `[top, bottom)`.
    ///
    /// Past the end of the content, the last visible line is returned.
    pub fn resolve_visible<M: LineMetrics + ?Sized>(
        &mut self,
        top: f32,
        bottom: f32,
        metrics: &mut M,
    ) -> VisibleLayout {
        let line_count = metrics.line_count().max(1);
        let top = top.max(0.0);
        let bottom = bottom.max(top);

        if self.mode == GeometryMode::Fixed {
            let h = self.line_height;
            let first = ((top / h).floor() as usize).min(line_count - 1);
            let last = ((bottom / h).ceil() as usize)
                .saturating_sub(1)
                .clamp(first, line_count - 1);
            let lines = (first..=last)
                .map(|line| LineLayout {
                    line,
                    top: line as f32 * h,
                    height: h,
                })
                .collect();
            return VisibleLayout { first, last, lines };
        }

        let (start, start_top) = self.scan_start(top, line_count);
        let mut line = Self::skip_hidden(metrics, start, line_count);
        let mut y = start_top;
        let mut lines: Vec<LineLayout> = Vec::new();
        let mut last_seen: Option<LineLayout> = None;

        while line < line_count {
            let height = metrics.line_height(line);
            let layout = LineLayout {
                line,
                top: y,
                height,
            };
            if y + height > top {
                if lines.is_empty() {
                    self.anchor = Some(ScanAnchor { line, top: y });
                    lines.push(layout);
                } else if y < bottom {
                    lines.push(layout);
                } else {
                    break;
                }
            }
            last_seen = Some(layout);
            y += height;
            line = Self::next_line(metrics, line, line_count);
        }

        if lines.is_empty() {
            let fallback = last_seen.unwrap_or(LineLayout {
                line: 0,
                top: 0.0,
                height: self.line_height,
            });
            lines.push(fallback);
        }

        let first = lines.first().map_or(0, |l| l.line);
        let last = lines.last().map_or(first, |l| l.line);
        VisibleLayout { first, last, lines }
    }

    /// Document-space top of `line`. A hidden line reports the bottom of its fold's start line.
    pub fn line_top<M: LineMetrics + ?Sized>(&self, line: usize, metrics: &mut M) -> f32 {
        let line_count = metrics.line_count().max(1);
        let line = line.min(line_count - 1);
        if self.mode == GeometryMode::Fixed {
            return line as f32 * self.line_height;
        }

        let (mut current, mut y) = match self.anchor {
            Some(anchor) if anchor.line <= line => (anchor.line, anchor.top),
            _ => (0, 0.0),
        };
        current = Self::skip_hidden(metrics, current, line_count);
        while current < line {
            y += metrics.line_height(current);
            current = Self::next_line(metrics, current, line_count);
        }
        y
    }

    /// Line whose vertical extent contains document-space `y` (clamped to the content).
    pub fn line_at_y<M: LineMetrics + ?Sized>(&self, y: f32, metrics: &mut M) -> usize {
        let line_count = metrics.line_count().max(1);
        let y = y.max(0.0);
        if self.mode == GeometryMode::Fixed {
            return ((y / self.line_height).floor() as usize).min(line_count - 1);
        }

        let (start, mut top) = self.scan_start(y, line_count);
        let mut line = Self::skip_hidden(metrics, start, line_count);
        let mut last_visible = line.min(line_count - 1);
        while line < line_count {
            let height = metrics.line_height(line);
            if y < top + height {
                return line;
            }
            last_visible = line;
            top += height;
            line = Self::next_line(metrics, line, line_count);
        }
        last_visible
    }

    /// Cached content size.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Returns `true` if the cached content size came from a full recomputation and has not
    /// been adjusted since.
    pub fn is_content_exact(&self) -> bool {
        self.content_exact
    }

    /// Approximate update after an edit: height changes by `line_delta * line_height`; the
    /// width can only grow by the edited line.
    pub fn adjust_for_edit(&mut self, line_delta: isize, edited_line_width: Option<f32>) {
        let delta = line_delta as f32 * self.line_height;
        self.content_size.height = (self.content_size.height + delta).max(self.line_height);
        if let Some(width) = edited_line_width {
            self.content_size.width = self.content_size.width.max(width);
        }
        self.content_exact = false;
        self.anchor = None;
    }

    /// Full recomputation over every visible line.
    ///
    /// With wrapping the width is the wrap width and the height the sum of wrapped heights;
    /// without it the height is `visible_lines * line_height` and the width the widest line.
    pub fn recompute_content_size<M: LineMetrics + ?Sized>(
        &mut self,
        metrics: &mut M,
        wrap_width: Option<f32>,
    ) -> Size {
        let line_count = metrics.line_count().max(1);
        let mut height = 0.0f32;
        let mut width = 0.0f32;
        let mut visible = 0usize;

        let mut line = Self::skip_hidden(metrics, 0, line_count);
        while line < line_count {
            visible += 1;
            match wrap_width {
                Some(_) => height += metrics.line_height(line),
                None => width = width.max(metrics.line_width(line)),
            }
            line = Self::next_line(metrics, line, line_count);
        }

        let size = match wrap_width {
            Some(wrap) => Size::new(wrap, height),
            None => Size::new(width, visible as f32 * self.line_height),
        };
        tracing::debug!(
            lines = line_count,
            visible,
            width = size.width,
            height = size.height,
            "content size recomputed"
        );
        self.content_size = size;
        self.content_exact = true;
        size
    }
}
