//! The viewport engine: owned state tying every component together.
//!
//! A [`ViewportEngine`] is created per widget. It does not own the document; every operation
//! that needs text takes a [`DocumentSource`]. Time is passed in explicitly (`now`) so
//! debouncing, caret blink and the jump-to-line flash are deterministic under test.
//!
//! Typical frame:
//!
//! ```no_run
//! use codeview_core::{EngineConfig, FrameInputs, RopeDocument, Size, ViewportEngine};
//! use std::time::Instant;
//!
//! let doc = RopeDocument::from_text("fn main() {\n    println!(\"hi\");\n}\n");
//! let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
//! engine.resize(Size::new(800.0, 600.0), Instant::now());
//! let frame = engine.paint(&doc, &FrameInputs::default(), Instant::now());
//! assert!(!frame.items().is_empty());
//! ```

use crate::brackets;
use crate::cache::{CacheStats, LineCacheBank};
use crate::config::EngineConfig;
use crate::debounce::{Debouncer, RecomputeTrigger};
use crate::document::{DirtyRegion, DocumentSource, Selection};
use crate::error::ConfigError;
use crate::folding::FoldEngine;
use crate::geometry::{GeometryMode, GeometryResolver, LineMetrics, ViewportState, VisibleLayout};
use crate::ghost_text::{GhostText, GhostTextReconciler, GhostUpdate};
use crate::gutter::GutterLayout;
use crate::hit_test::{self, ColumnLookup, GestureOutcome, GestureRouter, HitTarget, PointerKind};
use crate::indent_guides::compute_indent_guides;
use crate::paint::{Frame, FrameInputs, PaintContext, paint_frame};
use crate::primitives::{Point, Size};
use crate::shaping::{Highlighter, LineShaper, MonospaceShaper, PlainHighlighter};
use codeview_lang::LanguageConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Called with the 1-indexed line of a breakpoint-column click.
pub type BreakpointHandler = Box<dyn FnMut(usize)>;

/// Called on every scroll offset change.
pub type ScrollListener = Box<dyn FnMut(&ScrollEvent)>;

/// A scroll offset change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Offset before the change.
    pub old: Point,
    /// Offset after the change.
    pub new: Point,
}

/// Identifies a scroll subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// [`LineMetrics`] over the document, the line cache and the fold state.
struct DocMetrics<'a, D: ?Sized, S> {
    doc: &'a D,
    shaper: &'a S,
    cache: &'a mut LineCacheBank,
    folds: &'a FoldEngine,
    wrap: bool,
    line_height: f32,
}

impl<D: DocumentSource + ?Sized, S: LineShaper> LineMetrics for DocMetrics<'_, D, S> {
    fn line_count(&self) -> usize {
        self.doc.line_count().max(1)
    }

    fn is_hidden(&self, line: usize) -> bool {
        self.folds.is_hidden(line)
    }

    fn folded_end(&self, line: usize) -> Option<usize> {
        self.folds
            .cached_range(line)
            .filter(|range| range.is_folded)
            .map(|range| range.end_line)
    }

    fn line_height(&mut self, line: usize) -> f32 {
        if self.wrap {
            self.cache.line_height(self.doc, self.shaper, line)
        } else {
            self.line_height
        }
    }

    fn line_width(&mut self, line: usize) -> f32 {
        self.cache.line_width(self.doc, self.shaper, line)
    }
}

impl<D: DocumentSource + ?Sized, S: LineShaper> ColumnLookup for DocMetrics<'_, D, S> {
    fn column_at(&mut self, line: usize, point: Point) -> (usize, usize) {
        let block = self.cache.shaped_line(self.doc, self.shaper, line);
        let column = block.column_at(point);
        (column, self.doc.line_start_offset(line) + column)
    }

    fn line_start_offset(&self, line: usize) -> usize {
        self.doc.line_start_offset(line)
    }
}

/// Incremental viewport rendering and layout engine for one widget.
pub struct ViewportEngine<S = MonospaceShaper<PlainHighlighter>> {
    config: EngineConfig,
    shaper: S,
    cache: LineCacheBank,
    folds: FoldEngine,
    geometry: GeometryResolver,
    state: ViewportState,
    gutter: GutterLayout,
    ghost: GhostTextReconciler,
    debouncer: Debouncer,
    router: GestureRouter,
    layout: VisibleLayout,
    needs_full_recompute: bool,
    last_line_count: Option<usize>,
    flash: Option<(usize, Instant)>,
    blink_epoch: Option<Instant>,
    breakpoint_handler: Option<BreakpointHandler>,
    scroll_listeners: Vec<(SubscriptionId, ScrollListener)>,
    next_subscription: u64,
}

impl ViewportEngine<MonospaceShaper<PlainHighlighter>> {
    /// Engine with the built-in monospace shaper and no syntax highlighting.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_highlighter(config, PlainHighlighter)
    }
}

impl<H: Highlighter> ViewportEngine<MonospaceShaper<H>> {
    /// Engine with the built-in monospace shaper driven by `highlighter`.
    pub fn with_highlighter(config: EngineConfig, highlighter: H) -> Result<Self, ConfigError> {
        let text = &config.text;
        let shaper = MonospaceShaper::new(
            highlighter,
            text.char_width,
            text.line_height,
            text.tab_width,
        )
        .with_wrap(config.wrap.mode, config.wrap.indent);
        Self::with_shaper(config, shaper)
    }
}

impl<S: LineShaper> ViewportEngine<S> {
    /// Engine with a custom shaper. The configuration is validated first.
    pub fn with_shaper(config: EngineConfig, shaper: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let gutter = GutterLayout::compute(&config.gutter, 1, config.text.char_width);
        let debouncer = Debouncer::new(config.debounce());
        Ok(Self {
            geometry: GeometryResolver::new(config.text.line_height),
            state: ViewportState {
                gutter_width: gutter.width(),
                ..ViewportState::default()
            },
            gutter,
            config,
            shaper,
            cache: LineCacheBank::new(),
            folds: FoldEngine::default(),
            ghost: GhostTextReconciler::new(),
            debouncer,
            router: GestureRouter::new(),
            layout: VisibleLayout::default(),
            needs_full_recompute: true,
            last_line_count: None,
            flash: None,
            blink_epoch: None,
            breakpoint_handler: None,
            scroll_listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shaper.
    pub fn shaper(&self) -> &S {
        &self.shaper
    }

    /// Mutable shaper access. Callers changing styles should bump the document version.
    pub fn shaper_mut(&mut self) -> &mut S {
        &mut self.shaper
    }

    /// Switch language (fold detection and bracket matching). Drops folds and shaped lines.
    pub fn set_language(&mut self, lang: LanguageConfig) {
        let hidden = self.folds.hidden_line_count();
        self.folds.set_language(lang);
        self.cache.invalidate_all();
        self.after_fold_change(hidden);
    }

    /// Fold state.
    pub fn folds(&self) -> &FoldEngine {
        &self.folds
    }

    /// Line cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Line cache.
    pub fn cache(&self) -> &LineCacheBank {
        &self.cache
    }

    /// Scroll position, sizes and gutter width.
    pub fn viewport_state(&self) -> &ViewportState {
        &self.state
    }

    /// Current (possibly approximate) content size.
    pub fn content_size(&self) -> Size {
        self.geometry.content_size()
    }

    /// Returns `true` if the content size came from a full recomputation.
    pub fn is_content_size_exact(&self) -> bool {
        self.geometry.is_content_exact()
    }

    /// Active geometry strategy.
    pub fn geometry_mode(&self) -> GeometryMode {
        self.geometry.mode()
    }

    /// Gutter geometry.
    pub fn gutter(&self) -> &GutterLayout {
        &self.gutter
    }

    /// Visible range resolved by the last layout.
    pub fn visible_layout(&self) -> &VisibleLayout {
        &self.layout
    }

    /// Returns `true` while a debounced recomputation is waiting.
    pub fn has_pending_recompute(&self) -> bool {
        self.debouncer.has_pending()
    }

    /// When the next debounced recomputation is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    fn wrap_enabled(&self) -> bool {
        self.config.wrap.mode.is_enabled()
    }

    fn metrics<'a, D: DocumentSource + ?Sized>(
        doc: &'a D,
        shaper: &'a S,
        cache: &'a mut LineCacheBank,
        folds: &'a FoldEngine,
        config: &EngineConfig,
    ) -> DocMetrics<'a, D, S> {
        DocMetrics {
            doc,
            shaper,
            cache,
            folds,
            wrap: config.wrap.mode.is_enabled(),
            line_height: config.text.line_height,
        }
    }

    /// Notify the engine of an edit. `caret` is the caret offset after the edit.
    pub fn document_changed<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        dirty: DirtyRegion,
        caret: usize,
        now: Instant,
    ) {
        let line_count = doc.line_count().max(1);
        let line_delta = dirty.line_delta.unwrap_or_else(|| {
            let previous = self.last_line_count.unwrap_or(line_count);
            line_count as isize - previous as isize
        });
        let insertion_line = doc.offset_to_line(dirty.start_offset);
        let affected_line = dirty.dirty_line.unwrap_or(insertion_line);

        let mut invalidated = self
            .cache
            .apply_edit(affected_line, insertion_line, line_delta != 0);
        invalidated.extend([affected_line, insertion_line]);
        self.shaper.invalidate_lines(&invalidated);

        let hidden_before = self.folds.hidden_line_count();
        if line_delta != 0 {
            // Text inserted at the very start of a line pushes that line down too.
            let at_line_start = dirty.start_offset == doc.line_start_offset(insertion_line);
            let edit_line = if line_delta > 0 && at_line_start {
                insertion_line
            } else {
                insertion_line + 1
            };
            self.folds.apply_line_delta(edit_line, line_delta);
        }
        self.folds.invalidate_from(affected_line.min(insertion_line));
        self.folds.clamp_to_line_count(line_count);
        let hidden_delta = hidden_before as isize - self.folds.hidden_line_count() as isize;

        let edited_width = self.cache.line_width(doc, &self.shaper, affected_line);
        self.geometry
            .adjust_for_edit(line_delta + hidden_delta, Some(edited_width));
        self.debouncer.schedule(RecomputeTrigger::Edit, now);

        if self.ghost.on_document_changed(doc, caret) == GhostUpdate::Cleared {
            tracing::debug!("ghost text cleared by edit");
        }
        self.last_line_count = Some(line_count);
        self.blink_epoch = Some(now);
        tracing::trace!(affected_line, insertion_line, line_delta, "document changed");
    }

    /// Resize the widget. The scroll offset is re-clamped at once; the precise content size is
    /// recomputed once resizing settles.
    pub fn resize(&mut self, size: Size, now: Instant) {
        if self.state.viewport == size {
            return;
        }
        self.state.viewport = size;
        self.geometry.invalidate_anchor();
        self.clamp_scroll();
        self.debouncer.schedule(RecomputeTrigger::Resize, now);
    }

    /// Set the scroll offset, clamped to the content. Listeners are told about changes; no
    /// layout work is done.
    pub fn set_scroll(&mut self, x: f32, y: f32) {
        let (max_x, max_y) = self.state.max_scroll();
        let new = Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y));
        let old = Point::new(self.state.scroll_x, self.state.scroll_y);
        if new == old {
            return;
        }
        self.state.scroll_x = new.x;
        self.state.scroll_y = new.y;
        let event = ScrollEvent { old, new };
        for (_, listener) in &mut self.scroll_listeners {
            listener(&event);
        }
    }

    /// Scroll by a delta.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.set_scroll(self.state.scroll_x + dx, self.state.scroll_y + dy);
    }

    /// Register a scroll listener.
    pub fn subscribe_scroll(
        &mut self,
        listener: impl FnMut(&ScrollEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.scroll_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a scroll listener.
    pub fn unsubscribe_scroll(&mut self, id: SubscriptionId) -> bool {
        let before = self.scroll_listeners.len();
        self.scroll_listeners.retain(|(existing, _)| *existing != id);
        self.scroll_listeners.len() != before
    }

    /// Install the breakpoint-toggle callback.
    pub fn set_breakpoint_handler(&mut self, handler: impl FnMut(usize) + 'static) {
        self.breakpoint_handler = Some(Box::new(handler));
    }

    /// Remember the line count of the first document seen, so an edit reported without a
    /// line delta can still be measured.
    fn observe_line_count<D: DocumentSource + ?Sized>(&mut self, doc: &D) {
        if self.last_line_count.is_none() {
            self.last_line_count = Some(doc.line_count().max(1));
        }
    }

    fn sync_gutter<D: DocumentSource + ?Sized>(&mut self, doc: &D) {
        self.observe_line_count(doc);
        let line_count = doc.line_count().max(1);
        if self.gutter.needs_recompute(&self.config.gutter, line_count) {
            self.gutter =
                GutterLayout::compute(&self.config.gutter, line_count, self.config.text.char_width);
            tracing::debug!(
                digits = self.gutter.digits(),
                width = self.gutter.width(),
                "gutter width recomputed"
            );
        }
        self.state.gutter_width = self.gutter.width();
    }

    fn sync_wrap(&mut self) {
        let wrap_width = self
            .wrap_enabled()
            .then(|| self.state.text_area_width().max(self.config.text.char_width));
        self.state.wrap_width = wrap_width;
        if self.cache.set_wrap_width(wrap_width) {
            self.geometry.invalidate_anchor();
            if self.geometry.is_content_exact() {
                self.needs_full_recompute = true;
            }
        }
        self.geometry
            .set_mode(wrap_width.is_some(), self.folds.has_folds());
    }

    fn recompute_content_size<D: DocumentSource + ?Sized>(&mut self, doc: &D) {
        let wrap_width = self.state.wrap_width;
        let mut metrics =
            Self::metrics(doc, &self.shaper, &mut self.cache, &self.folds, &self.config);
        self.geometry.recompute_content_size(&mut metrics, wrap_width);
        self.needs_full_recompute = false;
    }

    fn clamp_scroll(&mut self) {
        self.state.content_size = self.geometry.content_size();
        self.set_scroll(self.state.scroll_x, self.state.scroll_y);
    }

    /// Resolve the visible range for the current scroll position.
    pub fn layout<D: DocumentSource + ?Sized>(&mut self, doc: &D) -> &VisibleLayout {
        self.refresh_layout(doc);
        &self.layout
    }

    fn refresh_layout<D: DocumentSource + ?Sized>(&mut self, doc: &D) {
        self.sync_gutter(doc);
        self.sync_wrap();
        if self.needs_full_recompute {
            self.recompute_content_size(doc);
        }
        self.clamp_scroll();

        let (top, bottom) = (self.state.top(), self.state.bottom());
        let mut metrics =
            Self::metrics(doc, &self.shaper, &mut self.cache, &self.folds, &self.config);
        self.layout = self.geometry.resolve_visible(top, bottom, &mut metrics);

        // Detect fold ranges of visible lines so the gutter can show their icons.
        for line in self.layout.lines.iter().map(|l| l.line) {
            self.folds.range_at(doc, line);
        }
    }

    /// Run due debounced work. Returns `true` if a full content-size recomputation ran.
    pub fn tick<D: DocumentSource + ?Sized>(&mut self, doc: &D, now: Instant) -> bool {
        if let Some((_, started)) = self.flash
            && now.duration_since(started).as_millis() >= u128::from(self.config.line_flash_ms)
        {
            self.flash = None;
        }

        let fired = self.debouncer.poll(now);
        if fired.is_empty() {
            return false;
        }
        tracing::debug!(tasks = fired.len(), "debounced recomputation");
        self.sync_gutter(doc);
        self.sync_wrap();
        self.recompute_content_size(doc);
        self.clamp_scroll();
        true
    }

    fn caret_visible(&self, now: Instant) -> bool {
        let blink = self.config.caret_blink_ms;
        match self.blink_epoch {
            Some(epoch) if blink > 0 => {
                (now.saturating_duration_since(epoch).as_millis() / u128::from(blink)) % 2 == 0
            }
            _ => true,
        }
    }

    fn flash_opacity(&self, now: Instant) -> Option<(usize, f32)> {
        let (line, started) = self.flash?;
        let total = self.config.line_flash_ms as f32;
        if total <= 0.0 {
            return None;
        }
        let elapsed = now.saturating_duration_since(started).as_millis() as f32;
        (elapsed < total).then(|| (line, 1.0 - elapsed / total))
    }

    /// Lay out and paint one frame.
    pub fn paint<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        inputs: &FrameInputs<'_>,
        now: Instant,
    ) -> Frame {
        self.refresh_layout(doc);

        let mut blocks = BTreeMap::new();
        for line in self.layout.lines.iter().map(|l| l.line) {
            blocks.insert(line, self.cache.shaped_line(doc, &self.shaper, line));
        }

        let selection = inputs.selection;
        let bracket_pair = if selection.is_empty() {
            brackets::enclosing_pair(doc, self.folds.scanner_mut(), selection.head)
        } else {
            None
        };
        let caret_line = doc.offset_to_line(selection.head);
        let indent_guides = compute_indent_guides(
            doc,
            &self.layout,
            caret_line,
            self.config.text.tab_width,
            &self.config.indent_guides,
        );

        let ctx = PaintContext {
            doc,
            config: &self.config,
            state: &self.state,
            layout: &self.layout,
            blocks: &blocks,
            gutter: &self.gutter,
            folds: &self.folds,
            indent_guides: &indent_guides,
            ghost: self.ghost.active(),
            bracket_pair,
            line_flash: self.flash_opacity(now),
            caret_visible: self.caret_visible(now),
            hovered_breakpoint: self.router.hovered_breakpoint(),
            inputs,
        };
        let frame = paint_frame(&ctx);
        self.router.set_touch_handles(frame.touch_handles().to_vec());
        frame
    }

    /// Resolve a widget-local point. Touch handles are considered for touch input.
    pub fn hit_test<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        point: Point,
        kind: PointerKind,
    ) -> HitTarget {
        self.sync_gutter(doc);
        self.sync_wrap();
        let handles = (kind == PointerKind::Touch).then(|| self.router.touch_handles());
        let mut metrics =
            Self::metrics(doc, &self.shaper, &mut self.cache, &self.folds, &self.config);
        hit_test::hit_test(
            point,
            &self.state,
            &self.gutter,
            &self.geometry,
            &mut metrics,
            handles,
        )
    }

    /// Pointer pressed. Breakpoint clicks invoke the breakpoint handler; fold icon clicks
    /// toggle the fold.
    pub fn pointer_down<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        point: Point,
        kind: PointerKind,
        selection: Selection,
        now: Instant,
    ) -> GestureOutcome {
        let hit = self.hit_test(doc, point, kind);
        let outcome = self.router.pointer_down(hit, kind, selection);
        match outcome {
            GestureOutcome::BreakpointToggled { line } => {
                if let Some(handler) = self.breakpoint_handler.as_mut() {
                    handler(line);
                }
            }
            GestureOutcome::FoldToggled { line } => {
                self.toggle_fold_at_line(doc, line);
            }
            GestureOutcome::SelectionChanged(_) => self.blink_epoch = Some(now),
            GestureOutcome::Ignored => {}
        }
        outcome
    }

    /// Pointer moved (hover or drag).
    pub fn pointer_move<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        point: Point,
    ) -> GestureOutcome {
        let hit = self.hit_test(doc, point, PointerKind::Mouse);
        self.router.pointer_move(hit)
    }

    /// Pointer released.
    pub fn pointer_up<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        point: Point,
    ) -> GestureOutcome {
        let hit = self.hit_test(doc, point, PointerKind::Mouse);
        self.router.pointer_up(hit)
    }

    fn after_fold_change(&mut self, hidden_before: usize) {
        let hidden_after = self.folds.hidden_line_count();
        let delta = hidden_before as isize - hidden_after as isize;
        if delta != 0 {
            self.geometry.adjust_for_edit(delta, None);
        }
        self.geometry.invalidate_anchor();
        self.geometry
            .set_mode(self.wrap_enabled(), self.folds.has_folds());
        // Wrapped heights make the adjustment approximate; settle with a full pass.
        if self.wrap_enabled() {
            self.needs_full_recompute = true;
        }
        self.state.content_size = self.geometry.content_size();
    }

    /// Toggle the fold at `line`. Returns `true` if anything changed.
    pub fn toggle_fold_at_line<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        line: usize,
    ) -> bool {
        self.observe_line_count(doc);
        let hidden = self.folds.hidden_line_count();
        let changed = self.folds.toggle_fold_at_line(doc, line);
        if changed {
            self.after_fold_change(hidden);
        }
        changed
    }

    /// Fold every top-level range.
    pub fn fold_all<D: DocumentSource + ?Sized>(&mut self, doc: &D) -> usize {
        self.observe_line_count(doc);
        let hidden = self.folds.hidden_line_count();
        let folded = self.folds.fold_all(doc);
        self.after_fold_change(hidden);
        folded
    }

    /// Unfold everything.
    pub fn unfold_all(&mut self) {
        let hidden = self.folds.hidden_line_count();
        self.folds.unfold_all();
        self.after_fold_change(hidden);
    }

    /// Jump to `line`: unfold anything hiding it, place it a third of the way down the
    /// viewport and start the line flash.
    pub fn scroll_to_line<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        line: usize,
        now: Instant,
    ) {
        let line = line.min(doc.line_count().max(1) - 1);
        let hidden = self.folds.hidden_line_count();
        let mut unfolded = false;
        while let Some(start) = self.folds.folded_range_hiding(line).map(|r| r.start_line) {
            if !self.folds.unfold(start) {
                break;
            }
            unfolded = true;
        }
        if unfolded {
            self.after_fold_change(hidden);
        }

        self.sync_gutter(doc);
        self.sync_wrap();
        if self.needs_full_recompute {
            self.recompute_content_size(doc);
        }
        self.state.content_size = self.geometry.content_size();
        let mut metrics =
            Self::metrics(doc, &self.shaper, &mut self.cache, &self.folds, &self.config);
        let top = self.geometry.line_top(line, &mut metrics);
        let target = top - self.state.viewport.height / 3.0;
        self.set_scroll(self.state.scroll_x, target);
        self.flash = Some((line, now));
        tracing::debug!(line, scroll_y = self.state.scroll_y, "scroll to line");
    }

    /// Show a ghost-text suggestion; returns the one it replaced.
    pub fn show_ghost_text<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        ghost: GhostText,
    ) -> Option<GhostText> {
        self.observe_line_count(doc);
        self.ghost.activate(ghost, doc.char_count())
    }

    /// Remove the ghost-text suggestion.
    pub fn clear_ghost_text(&mut self) -> Option<GhostText> {
        self.ghost.clear()
    }

    /// Active ghost-text suggestion.
    pub fn ghost_text(&self) -> Option<&GhostText> {
        self.ghost.active()
    }

    /// Widget-local top-left of the caret slot at `offset`, if its line was visible in the
    /// last layout. Uses the current scroll offset without re-laying out.
    pub fn anchor_point_for_offset<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        offset: usize,
    ) -> Option<Point> {
        self.observe_line_count(doc);
        let pos = doc.offset_to_position(offset);
        let layout = *self.layout.line(pos.line)?;
        let block = self.cache.shaped_line(doc, &self.shaper, pos.line);
        let p = block.caret_position(pos.column);
        Some(Point::new(
            self.state.gutter_width - self.state.scroll_x + p.x,
            layout.top - self.state.scroll_y + p.y,
        ))
    }
}

impl<S> fmt::Debug for ViewportEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportEngine")
            .field("state", &self.state)
            .field("geometry", &self.geometry)
            .field("gutter", &self.gutter)
            .field("layout", &self.layout)
            .field("scroll_listeners", &self.scroll_listeners.len())
            .finish_non_exhaustive()
    }
}
