//! Paint Pipeline.
//!
//! Painting is headless: [`paint_frame`] turns the resolved visible range plus the per-frame
//! inputs into a [`Frame`], an ordered display list of [`PaintOp`]s tagged with their
//! [`PaintLayer`]. Hosts replay the list with their own renderer.
//!
//! Layers are emitted strictly in [`PaintLayer`] order, and every layer only looks at the lines
//! of the [`VisibleLayout`] it is given.

use crate::config::EngineConfig;
use crate::decorations::{
    GutterDecoration, GutterDecorationKind, LineDecoration, LineDecorationStyle, LineIndexed,
    SearchHighlights,
};
use crate::diagnostics::{DiagnosticSet, DiagnosticSeverity};
use crate::document::{DocumentSource, Selection};
use crate::folding::FoldEngine;
use crate::geometry::{LineLayout, ViewportState, VisibleLayout};
use crate::ghost_text::GhostText;
use crate::gutter::GutterLayout;
use crate::hit_test::{DragTarget, TouchHandle};
use crate::indent_guides::IndentGuide;
use crate::primitives::{Color, Point, Rect};
use crate::shaping::ShapedBlock;
use crate::text_metrics::str_width_with_tab_width;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Caret width in pixels.
pub const CARET_WIDTH: f32 = 2.0;

/// Paint layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaintLayer {
    /// Search-match backgrounds.
    SearchMatches,
    /// Host-supplied line decorations.
    LineDecorations,
    /// Fading jump-to-line highlight.
    LineFlash,
    /// Tint over folded range start lines.
    FoldedTint,
    /// Selection rectangles.
    Selection,
    /// Indentation guides.
    IndentGuides,
    /// Fixed-column rulers.
    Rulers,
    /// Shaped text.
    Text,
    /// Ellipsis after folded range start lines.
    FoldEllipsis,
    /// Diagnostic squiggles.
    Diagnostics,
    /// Ghost-text overlay.
    GhostText,
    /// Gutter.
    Gutter,
    /// Bracket-match boxes.
    BracketMatch,
    /// Caret.
    Caret,
    /// Touch selection handles.
    TouchHandles,
}

/// One quadratic Bézier segment of a wave path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSegment {
    /// Control point.
    pub control: Point,
    /// End point.
    pub end: Point,
}

/// A drawing primitive in widget-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Filled rectangle.
    FillRect {
        /// Rectangle.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    StrokeRect {
        /// Rectangle.
        rect: Rect,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f32,
    },
    /// Straight line.
    Line {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f32,
    },
    /// Wavy underline as a chain of quadratic segments.
    Wave {
        /// Path start.
        start: Point,
        /// Segments, each continuing from the previous end.
        segments: Vec<QuadSegment>,
        /// Stroke color.
        color: Color,
    },
    /// A shaped line with its top-left corner at `origin`.
    Text {
        /// Top-left corner.
        origin: Point,
        /// Logical line.
        line: usize,
        /// Shaped block from the line cache.
        block: Arc<ShapedBlock>,
    },
    /// Unshaped label (line numbers, ghost text, glyphs) with its top-left corner at `origin`.
    Label {
        /// Top-left corner.
        origin: Point,
        /// Text.
        text: String,
        /// Text color.
        color: Color,
    },
    /// Filled circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f32,
        /// Fill color.
        color: Color,
    },
}

/// A paint op and its layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintItem {
    /// Layer.
    pub layer: PaintLayer,
    /// Op.
    pub op: PaintOp,
}

/// The display list for one frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    items: Vec<PaintItem>,
    touch_handles: Vec<TouchHandle>,
    first_line: usize,
    last_line: usize,
}

impl Frame {
    /// Every item, in paint order.
    pub fn items(&self) -> &[PaintItem] {
        &self.items
    }

    /// Ops of one layer, in paint order.
    pub fn layer(&self, layer: PaintLayer) -> impl Iterator<Item = &PaintOp> + '_ {
        self.items
            .iter()
            .filter(move |item| item.layer == layer)
            .map(|item| &item.op)
    }

    /// Touch handle hit rectangles produced by this frame.
    pub fn touch_handles(&self) -> &[TouchHandle] {
        &self.touch_handles
    }

    /// `(first, last)` visible line this frame covers.
    pub fn visible_lines(&self) -> (usize, usize) {
        (self.first_line, self.last_line)
    }

    fn push(&mut self, layer: PaintLayer, op: PaintOp) {
        self.items.push(PaintItem { layer, op });
    }
}

/// Host-supplied per-frame state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs<'a> {
    /// Current selection.
    pub selection: Selection,
    /// Current diagnostics.
    pub diagnostics: Option<&'a DiagnosticSet>,
    /// Search matches.
    pub search: Option<&'a SearchHighlights>,
    /// Line decorations.
    pub line_decorations: Option<&'a LineIndexed<LineDecoration>>,
    /// Gutter decorations.
    pub gutter_decorations: Option<&'a LineIndexed<GutterDecoration>>,
    /// Breakpoints, 1-indexed.
    pub breakpoints: Option<&'a BTreeSet<usize>>,
    /// Lines (0-based) with available code actions.
    pub code_action_lines: &'a [usize],
    /// The widget has keyboard focus.
    pub focused: bool,
    /// Touch input is in use; selection handles are drawn.
    pub touch_mode: bool,
}

/// Everything [`paint_frame`] reads. The engine prepares the derived parts (shaped blocks,
/// bracket pair, indent guides, animation state) before painting.
pub struct PaintContext<'a, D: ?Sized> {
    /// Document.
    pub doc: &'a D,
    /// Configuration.
    pub config: &'a EngineConfig,
    /// Scroll and viewport.
    pub state: &'a ViewportState,
    /// Visible lines.
    pub layout: &'a VisibleLayout,
    /// Shaped blocks of the visible lines.
    pub blocks: &'a BTreeMap<usize, Arc<ShapedBlock>>,
    /// Gutter geometry.
    pub gutter: &'a GutterLayout,
    /// Fold state (ranges of visible lines already detected).
    pub folds: &'a FoldEngine,
    /// Indentation guides for the visible lines.
    pub indent_guides: &'a [IndentGuide],
    /// Ghost text to overlay.
    pub ghost: Option<&'a GhostText>,
    /// Bracket pair around the caret, as offsets.
    pub bracket_pair: Option<(usize, usize)>,
    /// Jump-to-line flash: line and opacity.
    pub line_flash: Option<(usize, f32)>,
    /// Caret blink phase.
    pub caret_visible: bool,
    /// Line whose breakpoint slot is hovered.
    pub hovered_breakpoint: Option<usize>,
    /// Host inputs.
    pub inputs: &'a FrameInputs<'a>,
}

impl<D: DocumentSource + ?Sized> PaintContext<'_, D> {
    fn text_x0(&self) -> f32 {
        self.state.gutter_width - self.state.scroll_x
    }

    fn y(&self, layout: &LineLayout) -> f32 {
        layout.top - self.state.scroll_y
    }

    fn char_width(&self) -> f32 {
        self.config.text.char_width
    }

    fn full_width(&self, layout: &LineLayout) -> Rect {
        Rect::new(
            self.state.gutter_width,
            self.y(layout),
            self.state.text_area_width(),
            layout.height,
        )
    }

    fn visible_line(&self, line: usize) -> Option<(&LineLayout, &Arc<ShapedBlock>)> {
        Some((self.layout.line(line)?, self.blocks.get(&line)?))
    }

    /// Offsets `[start, end)` of the visible document slice.
    fn visible_offsets(&self) -> (usize, usize) {
        let last = self.layout.last;
        (
            self.doc.line_start_offset(self.layout.first),
            self.doc.line_start_offset(last) + self.doc.line_len(last) + 1,
        )
    }

    /// Widget-local boxes covering offsets `[start, end)` on visible lines.
    fn range_boxes(&self, start: usize, end: usize, include_newlines: bool) -> Vec<Rect> {
        let from = self.doc.offset_to_position(start);
        let to = self.doc.offset_to_position(end);
        let mut out = Vec::new();
        let first = from.line.max(self.layout.first);
        let last = to.line.min(self.layout.last);
        for line in first..=last {
            let Some((layout, block)) = self.visible_line(line) else {
                continue;
            };
            let (dx, dy) = (self.text_x0(), self.y(layout));
            let a = if line == from.line { from.column } else { 0 };
            let b = if line == to.line { to.column } else { block.len() };
            out.extend(block.boxes_for_range(a, b).into_iter().map(|r| r.offset(dx, dy)));
            if include_newlines && line < to.line {
                let rect = block.caret_rect(block.len(), self.char_width() / 2.0);
                out.push(rect.offset(dx, dy));
            }
        }
        out
    }

    /// Widget-local caret rectangle at `offset`, if its line is visible.
    fn caret_rect(&self, offset: usize, width: f32) -> Option<Rect> {
        let pos = self.doc.offset_to_position(offset);
        let (layout, block) = self.visible_line(pos.line)?;
        Some(
            block
                .caret_rect(pos.column, width)
                .offset(self.text_x0(), self.y(layout)),
        )
    }

    fn severity_color(&self, severity: DiagnosticSeverity) -> Color {
        let p = &self.config.palette;
        match severity {
            DiagnosticSeverity::Error => p.diagnostic_error,
            DiagnosticSeverity::Warning => p.diagnostic_warning,
            DiagnosticSeverity::Information => p.diagnostic_information,
            DiagnosticSeverity::Hint => p.diagnostic_hint,
        }
    }

    fn wave(&self, rect: Rect, color: Color) -> PaintOp {
        let amplitude = self.config.squiggle.amplitude;
        let baseline = rect.bottom() - amplitude;
        let (start, segments) = wave_segments(
            rect.x,
            rect.right(),
            baseline,
            amplitude,
            self.config.squiggle.wavelength,
        );
        PaintOp::Wave {
            start,
            segments,
            color,
        }
    }
}

/// Quadratic segments of a wave from `x0` to `x1` around `baseline`. Each segment spans half a
/// wavelength and bends alternately up and down.
pub fn wave_segments(
    x0: f32,
    x1: f32,
    baseline: f32,
    amplitude: f32,
    wavelength: f32,
) -> (Point, Vec<QuadSegment>) {
    let half = (wavelength / 2.0).max(1.0);
    let mut segments = Vec::new();
    let mut x = x0;
    let mut up = true;
    while x < x1 {
        let end = (x + half).min(x1);
        // A quadratic curve reaches half of its control point's offset.
        let bend = if up { -2.0 * amplitude } else { 2.0 * amplitude };
        segments.push(QuadSegment {
            control: Point::new((x + end) / 2.0, baseline + bend),
            end: Point::new(end, baseline),
        });
        x = end;
        up = !up;
    }
    (Point::new(x0, baseline), segments)
}

/// Build the display list for one frame.
pub fn paint_frame<D: DocumentSource + ?Sized>(ctx: &PaintContext<'_, D>) -> Frame {
    let mut frame = Frame {
        first_line: ctx.layout.first,
        last_line: ctx.layout.last,
        ..Frame::default()
    };
    if ctx.layout.is_empty() {
        return frame;
    }
    let palette = &ctx.config.palette;
    let inputs = ctx.inputs;
    let (visible_start, visible_end) = ctx.visible_offsets();

    // (a) search matches
    if let Some(search) = inputs.search {
        for m in search.in_range(visible_start, visible_end) {
            let color = if m.is_current {
                palette.search_match_current
            } else {
                palette.search_match
            };
            for rect in ctx.range_boxes(m.start, m.end, false) {
                frame.push(PaintLayer::SearchMatches, PaintOp::FillRect { rect, color });
            }
        }
    }

    // (b) line decorations
    if let Some(decorations) = inputs.line_decorations {
        for (line, items) in decorations.in_lines(ctx.layout.first..ctx.layout.last + 1) {
            let Some((layout, block)) = ctx.visible_line(line) else {
                continue;
            };
            for decoration in items {
                paint_line_decoration(ctx, &mut frame, layout, block, decoration);
            }
        }
    }

    // (c) line flash
    if let Some((line, opacity)) = ctx.line_flash
        && let Some(layout) = ctx.layout.line(line)
    {
        frame.push(
            PaintLayer::LineFlash,
            PaintOp::FillRect {
                rect: ctx.full_width(layout),
                color: palette.line_flash.with_alpha_factor(opacity),
            },
        );
    }

    // (d) folded tint
    let folded_starts: Vec<&LineLayout> = ctx
        .layout
        .lines
        .iter()
        .filter(|l| ctx.folds.is_folded_start(l.line))
        .collect();
    for layout in &folded_starts {
        frame.push(
            PaintLayer::FoldedTint,
            PaintOp::FillRect {
                rect: ctx.full_width(layout),
                color: palette.folded_tint,
            },
        );
    }

    // (e) selection
    let selection = inputs.selection;
    if !selection.is_empty() {
        for rect in ctx.range_boxes(selection.start(), selection.end(), true) {
            frame.push(
                PaintLayer::Selection,
                PaintOp::FillRect {
                    rect,
                    color: palette.selection,
                },
            );
        }
    }

    // (f) indent guides
    for guide in ctx.indent_guides {
        let (Some(first), Some(last)) = (
            ctx.layout.line(guide.first_line),
            ctx.layout.line(guide.last_line),
        ) else {
            continue;
        };
        let x = ctx.text_x0() + guide.cell as f32 * ctx.char_width();
        let (color, width) = if guide.is_active {
            (palette.indent_guide_active, 2.0)
        } else {
            (palette.indent_guide, 1.0)
        };
        frame.push(
            PaintLayer::IndentGuides,
            PaintOp::Line {
                from: Point::new(x, ctx.y(first)),
                to: Point::new(x, last.bottom() - ctx.state.scroll_y),
                color,
                width,
            },
        );
    }

    // (g) rulers
    for column in &ctx.config.rulers {
        let x = ctx.text_x0() + *column as f32 * ctx.char_width();
        if x < ctx.state.gutter_width || x >= ctx.state.viewport.width {
            continue;
        }
        frame.push(
            PaintLayer::Rulers,
            PaintOp::Line {
                from: Point::new(x, 0.0),
                to: Point::new(x, ctx.state.viewport.height),
                color: palette.ruler,
                width: 1.0,
            },
        );
    }

    // (h) text
    for layout in &ctx.layout.lines {
        if let Some(block) = ctx.blocks.get(&layout.line) {
            frame.push(
                PaintLayer::Text,
                PaintOp::Text {
                    origin: Point::new(ctx.text_x0(), ctx.y(layout)),
                    line: layout.line,
                    block: Arc::clone(block),
                },
            );
        }
    }

    // (i) fold ellipsis
    for layout in &folded_starts {
        if let Some(block) = ctx.blocks.get(&layout.line) {
            let end = block.caret_position(block.len());
            frame.push(
                PaintLayer::FoldEllipsis,
                PaintOp::Label {
                    origin: Point::new(
                        ctx.text_x0() + end.x + ctx.char_width(),
                        ctx.y(layout) + end.y,
                    ),
                    text: "\u{2026}".to_string(),
                    color: palette.fold_ellipsis,
                },
            );
        }
    }

    // (j) diagnostics, lowest severity first so higher severities paint on top
    if let Some(diagnostics) = inputs.diagnostics {
        let mut visible = diagnostics.in_range(visible_start, visible_end);
        visible.sort_by_key(|d| d.severity);
        for diagnostic in visible {
            let color = ctx.severity_color(diagnostic.severity);
            let (start, end) = (diagnostic.range.start, diagnostic.range.end);
            let mut boxes = ctx.range_boxes(start, end.max(start + 1), false);
            if boxes.is_empty()
                && let Some(rect) = ctx.caret_rect(start, ctx.char_width())
            {
                boxes.push(rect);
            }
            for rect in boxes {
                frame.push(PaintLayer::Diagnostics, ctx.wave(rect, color));
            }
        }
    }

    // (k) ghost text
    if let Some(ghost) = ctx.ghost {
        paint_ghost_text(ctx, &mut frame, ghost);
    }

    // (l) gutter
    paint_gutter(ctx, &mut frame);

    // (m) bracket match
    if let Some((open, close)) = ctx.bracket_pair {
        for offset in [open, close] {
            for rect in ctx.range_boxes(offset, offset + 1, false) {
                frame.push(
                    PaintLayer::BracketMatch,
                    PaintOp::StrokeRect {
                        rect,
                        color: palette.bracket_match,
                        width: 1.0,
                    },
                );
            }
        }
    }

    // (n) caret
    if inputs.focused
        && ctx.caret_visible
        && let Some(rect) = ctx.caret_rect(selection.head, CARET_WIDTH)
    {
        frame.push(
            PaintLayer::Caret,
            PaintOp::FillRect {
                rect,
                color: palette.caret,
            },
        );
    }

    // (o) touch handles
    if inputs.touch_mode {
        let handles: Vec<(DragTarget, usize)> = if selection.is_empty() {
            vec![(DragTarget::Caret, selection.head)]
        } else {
            vec![
                (DragTarget::RangeStart, selection.start()),
                (DragTarget::RangeEnd, selection.end()),
            ]
        };
        let radius = ctx.config.touch_handle_radius;
        for (target, offset) in handles {
            let Some(caret) = ctx.caret_rect(offset, 0.0) else {
                continue;
            };
            let center = Point::new(caret.x, caret.bottom() + radius);
            frame.push(
                PaintLayer::TouchHandles,
                PaintOp::Circle {
                    center,
                    radius,
                    color: palette.touch_handle,
                },
            );
            frame.touch_handles.push(TouchHandle {
                target,
                rect: Rect::centered(center, radius),
            });
        }
    }

    frame
}

fn paint_line_decoration<D: DocumentSource + ?Sized>(
    ctx: &PaintContext<'_, D>,
    frame: &mut Frame,
    layout: &LineLayout,
    block: &ShapedBlock,
    decoration: &LineDecoration,
) {
    let rects = match &decoration.columns {
        None => vec![ctx.full_width(layout)],
        Some(columns) => block
            .boxes_for_range(columns.start, columns.end)
            .into_iter()
            .map(|r| r.offset(ctx.text_x0(), ctx.y(layout)))
            .collect(),
    };
    let layer = PaintLayer::LineDecorations;
    match decoration.style {
        LineDecorationStyle::Background(color) => {
            for rect in rects {
                frame.push(layer, PaintOp::FillRect { rect, color });
            }
        }
        LineDecorationStyle::LeftBorder { color, width } => {
            let rect = Rect::new(ctx.state.gutter_width, ctx.y(layout), width, layout.height);
            frame.push(layer, PaintOp::FillRect { rect, color });
        }
        LineDecorationStyle::Underline(color) => {
            for rect in rects {
                let y = rect.bottom() - 0.5;
                frame.push(
                    layer,
                    PaintOp::Line {
                        from: Point::new(rect.x, y),
                        to: Point::new(rect.right(), y),
                        color,
                        width: 1.0,
                    },
                );
            }
        }
        LineDecorationStyle::WavyUnderline(color) => {
            for rect in rects {
                frame.push(layer, ctx.wave(rect, color));
            }
        }
    }
}

fn paint_ghost_text<D: DocumentSource + ?Sized>(
    ctx: &PaintContext<'_, D>,
    frame: &mut Frame,
    ghost: &GhostText,
) {
    let pos = ctx.doc.offset_to_position(ghost.anchor);
    let Some((layout, block)) = ctx.visible_line(pos.line) else {
        return;
    };
    let palette = &ctx.config.palette;
    let tab_width = ctx.config.text.tab_width;
    let cell = |s: &str| str_width_with_tab_width(s, tab_width) as f32 * ctx.char_width();
    let caret = block.caret_rect(pos.column, 0.0);
    let origin = Point::new(ctx.text_x0() + caret.x, ctx.y(layout) + caret.y);
    let row_height = caret.height;

    let suffix: String = block.text().chars().skip(pos.column).collect();
    let suffix_width = cell(&suffix);
    let mut lines = ghost.text.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let first_width = cell(first);
    let patch_width = if rest.is_empty() {
        first_width + suffix_width
    } else {
        first_width.max(suffix_width)
    };
    let layer = PaintLayer::GhostText;
    frame.push(
        layer,
        PaintOp::FillRect {
            rect: Rect::new(origin.x, origin.y, patch_width, row_height),
            color: palette.background,
        },
    );
    frame.push(
        layer,
        PaintOp::Label {
            origin,
            text: first.to_string(),
            color: palette.ghost_text,
        },
    );

    let mut suffix_origin = Point::new(origin.x + first_width, origin.y);
    for (i, text) in rest.iter().enumerate() {
        let y = origin.y + (i + 1) as f32 * row_height;
        let line_origin = Point::new(ctx.text_x0(), y);
        frame.push(
            layer,
            PaintOp::FillRect {
                rect: Rect::new(ctx.state.gutter_width, y, ctx.state.text_area_width(), row_height),
                color: palette.background,
            },
        );
        frame.push(
            layer,
            PaintOp::Label {
                origin: line_origin,
                text: (*text).to_string(),
                color: palette.ghost_text,
            },
        );
        suffix_origin = Point::new(line_origin.x + cell(text), y);
    }

    if !suffix.is_empty() {
        frame.push(
            layer,
            PaintOp::Label {
                origin: suffix_origin,
                text: suffix,
                color: palette.text,
            },
        );
    }
}

fn paint_gutter<D: DocumentSource + ?Sized>(ctx: &PaintContext<'_, D>, frame: &mut Frame) {
    let gutter = ctx.gutter;
    let config = &ctx.config.gutter;
    let palette = &ctx.config.palette;
    let inputs = ctx.inputs;
    let layer = PaintLayer::Gutter;
    let char_width = ctx.char_width();

    frame.push(
        layer,
        PaintOp::FillRect {
            rect: Rect::new(0.0, 0.0, gutter.width(), ctx.state.viewport.height),
            color: palette.gutter_background,
        },
    );

    let selection = inputs.selection;
    let caret_line = ctx.doc.offset_to_line(selection.head);
    let selected_lines = if selection.is_empty() {
        None
    } else {
        Some(ctx.doc.offset_to_line(selection.start())..=ctx.doc.offset_to_line(selection.end()))
    };
    let (numbers_start, numbers_end) = gutter.number_column();

    for layout in &ctx.layout.lines {
        let line = layout.line;
        let y = ctx.y(layout);
        let mid = y + ctx.config.text.line_height / 2.0;

        if config.line_numbers {
            let color = if line == caret_line {
                palette.line_number_active
            } else if selected_lines.as_ref().is_some_and(|r| r.contains(&line)) {
                palette.line_number_selected
            } else {
                let start = ctx.doc.line_start_offset(line);
                let end = start + ctx.doc.line_len(line) + 1;
                inputs
                    .diagnostics
                    .and_then(|d| d.max_severity_in_range(start, end))
                    .map_or(palette.line_number, |s| ctx.severity_color(s))
            };
            let text = (line + 1).to_string();
            let x = numbers_end - config.padding - text.len() as f32 * char_width;
            frame.push(
                layer,
                PaintOp::Label {
                    origin: Point::new(x, y),
                    text,
                    color,
                },
            );
        }

        if let Some((start, end)) = gutter.fold_column()
            && ctx.folds.cached_range(line).is_some()
        {
            let icon = if ctx.folds.is_folded_start(line) {
                "\u{25B8}"
            } else {
                "\u{25BE}"
            };
            frame.push(
                layer,
                PaintOp::Label {
                    origin: Point::new(start + ((end - start) - char_width) / 2.0, y),
                    text: icon.to_string(),
                    color: palette.fold_icon,
                },
            );
        }

        if let Some((start, end)) = gutter.breakpoint_column() {
            let is_set = inputs.breakpoints.is_some_and(|b| b.contains(&(line + 1)));
            let color = if is_set {
                Some(palette.breakpoint)
            } else if ctx.hovered_breakpoint == Some(line) {
                Some(palette.breakpoint_hover)
            } else {
                None
            };
            if let Some(color) = color {
                frame.push(
                    layer,
                    PaintOp::Circle {
                        center: Point::new((start + end) / 2.0, mid),
                        radius: ((end - start) / 2.0 - 3.0).max(2.0),
                        color,
                    },
                );
            }
        }

        if inputs.code_action_lines.contains(&line) {
            frame.push(
                layer,
                PaintOp::Circle {
                    center: Point::new(numbers_start + config.padding / 2.0, mid),
                    radius: (config.padding / 2.0 - 1.0).max(1.5),
                    color: palette.code_action,
                },
            );
        }

        if let Some(decorations) = inputs.gutter_decorations {
            for decoration in decorations.on_line(line) {
                let op = match &decoration.kind {
                    GutterDecorationKind::Bar(color) => PaintOp::FillRect {
                        rect: Rect::new(numbers_end - 2.0, y, 2.0, layout.height),
                        color: *color,
                    },
                    GutterDecorationKind::Dot(color) => PaintOp::Circle {
                        center: Point::new(numbers_end - config.padding / 2.0, mid),
                        radius: 2.0,
                        color: *color,
                    },
                    GutterDecorationKind::Glyph { text, color } => PaintOp::Label {
                        origin: Point::new(numbers_start, y),
                        text: text.clone(),
                        color: *color,
                    },
                };
                frame.push(layer, op);
            }
        }
    }

    if config.separator_width > 0.0 {
        let x = gutter.width() - config.separator_width / 2.0;
        frame.push(
            layer,
            PaintOp::Line {
                from: Point::new(x, 0.0),
                to: Point::new(x, ctx.state.viewport.height),
                color: palette.line_number.with_alpha_factor(0.3),
                width: config.separator_width,
            },
        );
    }
}
