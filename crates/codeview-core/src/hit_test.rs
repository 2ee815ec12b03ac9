//! Hit-Testing & Gesture Router.
//!
//! [`hit_test`] turns a widget-local point into a [`HitTarget`] using the same geometry strategy
//! as layout. [`GestureRouter`] turns pointer down/move/up sequences into outcomes: breakpoint
//! toggles, fold toggles and selection changes, including touch handle drags.

use crate::document::Selection;
use crate::geometry::{GeometryResolver, LineMetrics, ViewportState};
use crate::gutter::{GutterLayout, GutterRegion};
use crate::primitives::{Point, Rect};

/// Column lookup inside a line, on top of the line metrics the geometry resolver uses.
pub trait ColumnLookup: LineMetrics {
    /// `(column, char offset)` nearest to `point`, relative to the line's top-left corner.
    fn column_at(&mut self, line: usize, point: Point) -> (usize, usize);

    /// Char offset of the start of `line`.
    fn line_start_offset(&self, line: usize) -> usize;
}

/// Mouse or touch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    /// Mouse, pen or trackpad.
    #[default]
    Mouse,
    /// Finger.
    Touch,
}

/// A draggable touch affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Handle at the start of a range selection.
    RangeStart,
    /// Handle at the end of a range selection.
    RangeEnd,
    /// Handle under a collapsed caret.
    Caret,
}

/// Hit rectangle of a touch handle, recomputed on every paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchHandle {
    /// Which handle.
    pub target: DragTarget,
    /// Widget-local hit rectangle.
    pub rect: Rect,
}

/// What a point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A gutter sub-column of `line`. `offset` is the line's start offset.
    Gutter {
        /// Logical line.
        line: usize,
        /// Sub-column.
        region: GutterRegion,
        /// Start offset of the line.
        offset: usize,
    },
    /// Text.
    Text {
        /// Logical line.
        line: usize,
        /// Column, clamped to the line length.
        column: usize,
        /// Char offset.
        offset: usize,
    },
    /// A touch handle.
    TouchHandle(DragTarget),
    /// Outside the widget.
    Outside,
}

impl HitTarget {
    /// Offset a selection gesture should use for this target.
    pub fn selection_offset(&self) -> Option<usize> {
        match *self {
            HitTarget::Text { offset, .. } => Some(offset),
            HitTarget::Gutter {
                region: GutterRegion::LineNumber,
                offset,
                ..
            } => Some(offset),
            _ => None,
        }
    }
}

/// Resolve a widget-local point. Touch handles are only considered when `handles` is given.
pub fn hit_test<M: ColumnLookup + ?Sized>(
    point: Point,
    state: &ViewportState,
    gutter: &GutterLayout,
    geometry: &GeometryResolver,
    metrics: &mut M,
    handles: Option<&[TouchHandle]>,
) -> HitTarget {
    if point.x < 0.0
        || point.y < 0.0
        || point.x >= state.viewport.width
        || point.y >= state.viewport.height
    {
        return HitTarget::Outside;
    }
    if let Some(handle) = handles
        .into_iter()
        .flatten()
        .find(|h| h.rect.contains(point))
    {
        return HitTarget::TouchHandle(handle.target);
    }

    let doc_y = point.y + state.scroll_y;
    let line = geometry.line_at_y(doc_y, metrics);

    if let Some(region) = gutter.classify(point.x) {
        return HitTarget::Gutter {
            line,
            region,
            offset: metrics.line_start_offset(line),
        };
    }

    let top = geometry.line_top(line, metrics);
    let local = Point::new(
        point.x - gutter.width() + state.scroll_x,
        doc_y - top,
    );
    let (column, offset) = metrics.column_at(line, local);
    HitTarget::Text {
        line,
        column,
        offset,
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A breakpoint click; `line` is 1-indexed.
    BreakpointToggled {
        /// 1-indexed line.
        line: usize,
    },
    /// A fold icon click.
    FoldToggled {
        /// Logical line.
        line: usize,
    },
    /// The selection changed.
    SelectionChanged(Selection),
    /// Nothing happened.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Selecting { anchor: usize },
    Handle { target: DragTarget, fixed: usize },
}

/// Pointer state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureRouter {
    drag: Option<Drag>,
    touch_handles: Vec<TouchHandle>,
    hovered_breakpoint: Option<usize>,
}

impl GestureRouter {
    /// Create an idle router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the touch handle hit rectangles.
    pub fn set_touch_handles(&mut self, handles: Vec<TouchHandle>) {
        self.touch_handles = handles;
    }

    /// Current touch handle hit rectangles.
    pub fn touch_handles(&self) -> &[TouchHandle] {
        &self.touch_handles
    }

    /// Line whose breakpoint slot the pointer hovers.
    pub fn hovered_breakpoint(&self) -> Option<usize> {
        self.hovered_breakpoint
    }

    /// Returns `true` during a drag.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer pressed on `hit`.
    pub fn pointer_down(
        &mut self,
        hit: HitTarget,
        kind: PointerKind,
        selection: Selection,
    ) -> GestureOutcome {
        self.drag = None;
        match hit {
            HitTarget::TouchHandle(target) if kind == PointerKind::Touch => {
                let fixed = match target {
                    DragTarget::RangeStart => selection.end(),
                    DragTarget::RangeEnd => selection.start(),
                    DragTarget::Caret => selection.head,
                };
                self.drag = Some(Drag::Handle { target, fixed });
                GestureOutcome::Ignored
            }
            HitTarget::Gutter {
                line,
                region: GutterRegion::Breakpoint,
                ..
            } => GestureOutcome::BreakpointToggled { line: line + 1 },
            HitTarget::Gutter {
                line,
                region: GutterRegion::FoldIcon,
                ..
            } => GestureOutcome::FoldToggled { line },
            _ => match hit.selection_offset() {
                Some(offset) => {
                    self.drag = Some(Drag::Selecting { anchor: offset });
                    GestureOutcome::SelectionChanged(Selection::caret(offset))
                }
                None => GestureOutcome::Ignored,
            },
        }
    }

    /// Pointer moved over `hit`.
    pub fn pointer_move(&mut self, hit: HitTarget) -> GestureOutcome {
        let Some(drag) = self.drag else {
            self.hovered_breakpoint = match hit {
                HitTarget::Gutter {
                    line,
                    region: GutterRegion::Breakpoint,
                    ..
                } => Some(line),
                _ => None,
            };
            return GestureOutcome::Ignored;
        };
        let Some(offset) = hit.selection_offset().or(match hit {
            // Dragging across the gutter keeps selecting whole-line starts.
            HitTarget::Gutter { offset, .. } => Some(offset),
            _ => None,
        }) else {
            return GestureOutcome::Ignored;
        };

        let selection = match drag {
            Drag::Selecting { anchor } => Selection::new(anchor, offset),
            Drag::Handle {
                target: DragTarget::Caret,
                ..
            } => Selection::caret(offset),
            Drag::Handle { fixed, .. } => Selection::new(fixed, offset),
        };
        GestureOutcome::SelectionChanged(selection)
    }

    /// Pointer released over `hit`.
    pub fn pointer_up(&mut self, hit: HitTarget) -> GestureOutcome {
        if self.drag.is_none() {
            return GestureOutcome::Ignored;
        }
        let outcome = self.pointer_move(hit);
        self.drag = None;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GutterConfig;
    use crate::primitives::Size;

    struct Grid {
        lines: usize,
        width: usize,
    }

    impl LineMetrics for Grid {
        fn line_count(&self) -> usize {
            self.lines
        }
        fn is_hidden(&self, _line: usize) -> bool {
            false
        }
        fn folded_end(&self, _line: usize) -> Option<usize> {
            None
        }
        fn line_height(&mut self, _line: usize) -> f32 {
            20.0
        }
        fn line_width(&mut self, _line: usize) -> f32 {
            self.width as f32 * 8.0
        }
    }

    impl ColumnLookup for Grid {
        fn column_at(&mut self, line: usize, point: Point) -> (usize, usize) {
            let column = ((point.x / 8.0).round().max(0.0) as usize).min(self.width);
            (column, self.line_start_offset(line) + column)
        }
        fn line_start_offset(&self, line: usize) -> usize {
            line * (self.width + 1)
        }
    }

    fn setup() -> (ViewportState, GutterLayout, GeometryResolver, Grid) {
        let gutter = GutterLayout::compute(&GutterConfig::default(), 50, 8.0);
        let state = ViewportState {
            viewport: Size::new(400.0, 200.0),
            gutter_width: gutter.width(),
            ..ViewportState::default()
        };
        (state, gutter, GeometryResolver::new(20.0), Grid { lines: 50, width: 10 })
    }

    #[test]
    fn test_hit_gutter_and_text() {
        let (state, gutter, geometry, mut grid) = setup();
        let hit = hit_test(Point::new(4.0, 85.0), &state, &gutter, &geometry, &mut grid, None);
        assert_eq!(
            hit,
            HitTarget::Gutter {
                line: 4,
                region: GutterRegion::Breakpoint,
                offset: 44
            }
        );

        let hit = hit_test(Point::new(65.0 + 17.0, 5.0), &state, &gutter, &geometry, &mut grid, None);
        assert_eq!(
            hit,
            HitTarget::Text {
                line: 0,
                column: 2,
                offset: 2
            }
        );

        // Past the end of the line clamps to its length.
        let hit = hit_test(Point::new(390.0, 25.0), &state, &gutter, &geometry, &mut grid, None);
        assert_eq!(
            hit,
            HitTarget::Text {
                line: 1,
                column: 10,
                offset: 21
            }
        );
    }

    #[test]
    fn test_breakpoint_click_returns_one_indexed_line() {
        let mut router = GestureRouter::new();
        let hit = HitTarget::Gutter {
            line: 4,
            region: GutterRegion::Breakpoint,
            offset: 0,
        };
        assert_eq!(
            router.pointer_down(hit, PointerKind::Mouse, Selection::default()),
            GestureOutcome::BreakpointToggled { line: 5 }
        );
        assert!(!router.is_dragging());
    }

    #[test]
    fn test_drag_selects() {
        let mut router = GestureRouter::new();
        let at = |offset| HitTarget::Text {
            line: 0,
            column: offset,
            offset,
        };
        assert_eq!(
            router.pointer_down(at(3), PointerKind::Mouse, Selection::default()),
            GestureOutcome::SelectionChanged(Selection::caret(3))
        );
        assert_eq!(
            router.pointer_move(at(7)),
            GestureOutcome::SelectionChanged(Selection::new(3, 7))
        );
        assert_eq!(
            router.pointer_up(at(8)),
            GestureOutcome::SelectionChanged(Selection::new(3, 8))
        );
        assert_eq!(router.pointer_move(at(9)), GestureOutcome::Ignored);
    }

    #[test]
    fn test_touch_handle_drag_keeps_other_end() {
        let mut router = GestureRouter::new();
        let selection = Selection::new(10, 20);
        router.pointer_down(
            HitTarget::TouchHandle(DragTarget::RangeStart),
            PointerKind::Touch,
            selection,
        );
        let moved = router.pointer_move(HitTarget::Text {
            line: 0,
            column: 4,
            offset: 4,
        });
        assert_eq!(moved, GestureOutcome::SelectionChanged(Selection::new(20, 4)));
    }

    #[test]
    fn test_hover_tracks_breakpoint_column() {
        let mut router = GestureRouter::new();
        router.pointer_move(HitTarget::Gutter {
            line: 2,
            region: GutterRegion::Breakpoint,
            offset: 0,
        });
        assert_eq!(router.hovered_breakpoint(), Some(2));
        router.pointer_move(HitTarget::Outside);
        assert_eq!(router.hovered_breakpoint(), None);
    }
}
