use codeview_core::{
    Color, Diagnostic, DiagnosticRange, DiagnosticSet, DiagnosticSeverity, EngineConfig, Frame,
    FrameInputs, LineDecoration, LineDecorationStyle, LineIndexed, PaintLayer, PaintOp, Point,
    PointerKind, Rect, RopeDocument, SearchHighlight, SearchHighlights, Selection, Size,
    ViewportEngine,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const TEXT_X: f32 = 57.0;

fn setup_with(config: EngineConfig, text: &str) -> (RopeDocument, ViewportEngine, Instant) {
    let now = Instant::now();
    let doc = RopeDocument::from_text(text);
    let mut engine = ViewportEngine::new(config).unwrap();
    engine.resize(Size::new(400.0, 200.0), now);
    (doc, engine, now)
}

fn setup(text: &str) -> (RopeDocument, ViewportEngine, Instant) {
    setup_with(EngineConfig::default(), text)
}

fn fill_colors(frame: &Frame, layer: PaintLayer) -> Vec<Color> {
    frame
        .layer(layer)
        .filter_map(|op| match op {
            PaintOp::FillRect { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

fn labels(frame: &Frame, layer: PaintLayer) -> Vec<(String, Point)> {
    frame
        .layer(layer)
        .filter_map(|op| match op {
            PaintOp::Label { text, origin, .. } => Some((text.clone(), *origin)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_items_are_emitted_in_layer_order() {
    let (doc, mut engine, now) = setup("fn main() {\n    let a = (1, 2);\n}\n");
    let diagnostics = DiagnosticSet::new(vec![Diagnostic::new(
        DiagnosticRange::new(16, 17),
        DiagnosticSeverity::Warning,
        "unused",
    )]);
    let search = SearchHighlights::new([SearchHighlight::new(4, 8)]);
    let decorations: LineIndexed<LineDecoration> = [LineDecoration::whole_line(
        2,
        LineDecorationStyle::Background(Color::rgb(40, 0, 0)),
    )]
    .into_iter()
    .collect();
    let inputs = FrameInputs {
        selection: Selection::new(12, 20),
        diagnostics: Some(&diagnostics),
        search: Some(&search),
        line_decorations: Some(&decorations),
        focused: true,
        touch_mode: true,
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);

    let layers: Vec<PaintLayer> = frame.items().iter().map(|item| item.layer).collect();
    assert!(layers.windows(2).all(|w| w[0] <= w[1]), "{layers:?}");
    for layer in [
        PaintLayer::SearchMatches,
        PaintLayer::LineDecorations,
        PaintLayer::Selection,
        PaintLayer::IndentGuides,
        PaintLayer::Text,
        PaintLayer::Diagnostics,
        PaintLayer::Gutter,
        PaintLayer::Caret,
        PaintLayer::TouchHandles,
    ] {
        assert!(frame.layer(layer).count() > 0, "{layer:?} missing");
    }
}

#[test]
fn test_only_visible_lines_are_painted() {
    let text = (0..10_000).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let (doc, mut engine, now) = setup(&text);

    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(frame.visible_lines(), (0, 9));
    assert_eq!(frame.layer(PaintLayer::Text).count(), 10);

    engine.set_scroll(0.0, 5010.0);
    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(frame.visible_lines(), (250, 260));
    assert_eq!(frame.layer(PaintLayer::Text).count(), 11);
    assert!(engine.cache().is_cached(255));
    assert!(!engine.cache().is_cached(100));
}

#[test]
fn test_selection_covers_line_breaks() {
    let (doc, mut engine, now) = setup("abc\nde\nf");
    let inputs = FrameInputs {
        selection: Selection::new(1, 6),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    let rects: Vec<Rect> = frame
        .layer(PaintLayer::Selection)
        .filter_map(|op| match op {
            PaintOp::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(
        rects,
        vec![
            Rect::new(TEXT_X + 8.0, 0.0, 16.0, 20.0),
            Rect::new(TEXT_X + 24.0, 0.0, 4.0, 20.0),
            Rect::new(TEXT_X, 20.0, 16.0, 20.0),
        ]
    );
}

#[test]
fn test_diagnostics_paint_higher_severity_last() {
    let (doc, mut engine, now) = setup("let a = b;\nok");
    let diagnostics = DiagnosticSet::new(vec![
        Diagnostic::new(DiagnosticRange::new(8, 9), DiagnosticSeverity::Error, "unresolved"),
        Diagnostic::new(DiagnosticRange::new(4, 9), DiagnosticSeverity::Warning, "shadowed"),
        Diagnostic::new(DiagnosticRange::new(0, 3), DiagnosticSeverity::Hint, "style"),
    ]);
    let inputs = FrameInputs {
        selection: Selection::caret(11),
        diagnostics: Some(&diagnostics),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    let palette = &engine.config().palette;

    let waves: Vec<(Color, f32, f32)> = frame
        .layer(PaintLayer::Diagnostics)
        .filter_map(|op| match op {
            PaintOp::Wave {
                start,
                segments,
                color,
            } => Some((*color, start.x, segments.last().map_or(start.x, |s| s.end.x))),
            _ => None,
        })
        .collect();
    assert_eq!(
        waves,
        vec![
            (palette.diagnostic_hint, TEXT_X, TEXT_X + 24.0),
            (palette.diagnostic_warning, TEXT_X + 32.0, TEXT_X + 72.0),
            (palette.diagnostic_error, TEXT_X + 64.0, TEXT_X + 72.0),
        ]
    );

    let first_line_number = frame.layer(PaintLayer::Gutter).find_map(|op| match op {
        PaintOp::Label { text, color, .. } if text == "1" => Some(*color),
        _ => None,
    });
    assert_eq!(first_line_number, Some(palette.diagnostic_error));
}

#[test]
fn test_zero_width_diagnostic_still_gets_a_squiggle() {
    let (doc, mut engine, now) = setup("abc");
    let diagnostics = DiagnosticSet::new(vec![Diagnostic::new(
        DiagnosticRange::new(3, 3),
        DiagnosticSeverity::Error,
        "expected `;`",
    )]);
    let inputs = FrameInputs {
        diagnostics: Some(&diagnostics),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    assert_eq!(frame.layer(PaintLayer::Diagnostics).count(), 1);
}

#[test]
fn test_current_search_match_is_distinct() {
    let (doc, mut engine, now) = setup("foo bar foo\nfoo");
    let search = SearchHighlights::new([
        SearchHighlight::new(0, 3),
        SearchHighlight::new(8, 11).current(),
        SearchHighlight::new(12, 15),
    ]);
    let inputs = FrameInputs {
        search: Some(&search),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    let palette = &engine.config().palette;
    let colors = fill_colors(&frame, PaintLayer::SearchMatches);
    assert_eq!(colors.len(), 3);
    assert_eq!(
        colors.iter().filter(|c| **c == palette.search_match_current).count(),
        1
    );
}

#[test]
fn test_line_decorations() {
    let (doc, mut engine, now) = setup("alpha\nbeta\ngamma");
    let red = Color::rgb(255, 0, 0);
    let decorations: LineIndexed<LineDecoration> = [
        LineDecoration::whole_line(0, LineDecorationStyle::Background(red)),
        LineDecoration::whole_line(1, LineDecorationStyle::LeftBorder { color: red, width: 3.0 }),
        LineDecoration::columns(2, 1..3, LineDecorationStyle::WavyUnderline(red)),
        LineDecoration::columns(2, 0..5, LineDecorationStyle::Underline(red)),
    ]
    .into_iter()
    .collect();
    let inputs = FrameInputs {
        line_decorations: Some(&decorations),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    let ops: Vec<&PaintOp> = frame.layer(PaintLayer::LineDecorations).collect();
    assert_eq!(ops.len(), 4);
    assert!(matches!(ops[0], PaintOp::FillRect { rect, .. } if rect.width == 400.0 - TEXT_X));
    assert!(matches!(ops[1], PaintOp::FillRect { rect, .. } if rect.width == 3.0 && rect.y == 20.0));
    assert!(matches!(ops[2], PaintOp::Wave { start, .. } if start.x == TEXT_X + 8.0));
    assert!(matches!(ops[3], PaintOp::Line { from, to, .. } if to.x - from.x == 40.0));
}

#[test]
fn test_caret_blinks_after_interaction() {
    let (doc, mut engine, now) = setup("hello");
    let inputs = FrameInputs {
        selection: Selection::caret(2),
        focused: true,
        ..FrameInputs::default()
    };
    assert_eq!(engine.paint(&doc, &inputs, now).layer(PaintLayer::Caret).count(), 1);

    engine.pointer_down(
        &doc,
        Point::new(TEXT_X + 16.0, 5.0),
        PointerKind::Mouse,
        Selection::caret(0),
        now,
    );
    let blink = Duration::from_millis(engine.config().caret_blink_ms);
    let caret_at = |engine: &mut ViewportEngine, t: Instant| {
        engine.paint(&doc, &inputs, t).layer(PaintLayer::Caret).count()
    };
    assert_eq!(caret_at(&mut engine, now + blink / 2), 1);
    assert_eq!(caret_at(&mut engine, now + blink + blink / 2), 0);
    assert_eq!(caret_at(&mut engine, now + blink * 2), 1);

    let unfocused = FrameInputs {
        focused: false,
        ..inputs
    };
    assert_eq!(engine.paint(&doc, &unfocused, now).layer(PaintLayer::Caret).count(), 0);
}

#[test]
fn test_bracket_pair_around_caret() {
    let (doc, mut engine, now) = setup("f(a, [b])");
    let inputs = FrameInputs {
        selection: Selection::caret(7),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);
    let boxes: Vec<f32> = frame
        .layer(PaintLayer::BracketMatch)
        .filter_map(|op| match op {
            PaintOp::StrokeRect { rect, .. } => Some(rect.x),
            _ => None,
        })
        .collect();
    assert_eq!(boxes, vec![TEXT_X + 40.0, TEXT_X + 56.0]);

    let ranged = FrameInputs {
        selection: Selection::new(6, 7),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &ranged, now);
    assert_eq!(frame.layer(PaintLayer::BracketMatch).count(), 0);
}

#[test]
fn test_indent_guides_and_rulers() {
    let config = EngineConfig::default().with_rulers(vec![20, 200]);
    let (doc, mut engine, now) =
        setup_with(config, "fn a() {\n    if x {\n        y();\n    }\n}");
    let inputs = FrameInputs {
        selection: Selection::caret(26),
        ..FrameInputs::default()
    };
    let frame = engine.paint(&doc, &inputs, now);

    let guides: Vec<(f32, f32)> = frame
        .layer(PaintLayer::IndentGuides)
        .filter_map(|op| match op {
            PaintOp::Line { from, width, .. } => Some((from.x, *width)),
            _ => None,
        })
        .collect();
    assert_eq!(guides, vec![(TEXT_X, 1.0), (TEXT_X + 32.0, 2.0)]);

    let rulers: Vec<f32> = frame
        .layer(PaintLayer::Rulers)
        .filter_map(|op| match op {
            PaintOp::Line { from, .. } => Some(from.x),
            _ => None,
        })
        .collect();
    assert_eq!(rulers, vec![TEXT_X + 160.0]);
}

#[test]
fn test_ghost_text_patch_and_suffix() {
    let (doc, mut engine, now) = setup("foo()");
    engine.show_ghost_text(
        &doc,
        codeview_core::GhostText::new(4, "a, b", codeview_core::GhostSource::Assistant),
    );
    let frame = engine.paint(&doc, &FrameInputs::default(), now);

    let palette = &engine.config().palette;
    assert_eq!(
        fill_colors(&frame, PaintLayer::GhostText),
        vec![palette.background]
    );
    assert!(frame.layer(PaintLayer::GhostText).any(|op| matches!(
        op,
        PaintOp::FillRect { rect, .. } if rect.x == TEXT_X + 32.0 && rect.width == 40.0
    )));
    assert_eq!(
        labels(&frame, PaintLayer::GhostText),
        vec![
            ("a, b".to_string(), Point::new(TEXT_X + 32.0, 0.0)),
            (")".to_string(), Point::new(TEXT_X + 64.0, 0.0)),
        ]
    );
}

#[test]
fn test_multiline_ghost_text_moves_suffix_to_last_row() {
    let (doc, mut engine, now) = setup("foo()\nbar");
    engine.show_ghost_text(
        &doc,
        codeview_core::GhostText::new(4, "a\nbc", codeview_core::GhostSource::Controller),
    );
    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(
        labels(&frame, PaintLayer::GhostText),
        vec![
            ("a".to_string(), Point::new(TEXT_X + 32.0, 0.0)),
            ("bc".to_string(), Point::new(TEXT_X, 20.0)),
            (")".to_string(), Point::new(TEXT_X + 16.0, 20.0)),
        ]
    );
}
