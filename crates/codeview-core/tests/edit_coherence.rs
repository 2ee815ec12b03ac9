use codeview_core::{
    DocumentSource, EngineConfig, Frame, FrameInputs, GhostSource, GhostText, PaintLayer, PaintOp,
    RopeDocument, Size, ViewportEngine, WrapIndent, WrapMode,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

fn painted_lines(frame: &Frame) -> Vec<(usize, String)> {
    frame
        .layer(PaintLayer::Text)
        .filter_map(|op| match op {
            PaintOp::Text { line, block, .. } => Some((*line, block.text().to_string())),
            _ => None,
        })
        .collect()
}

fn expected_lines(doc: &RopeDocument, frame: &Frame) -> Vec<(usize, String)> {
    painted_lines(frame)
        .into_iter()
        .map(|(line, _)| (line, doc.line_text(line).unwrap_or_default().into_owned()))
        .collect()
}

#[test]
fn test_single_line_edit_reshapes_only_that_line() {
    let now = Instant::now();
    let text = (0..30).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let mut doc = RopeDocument::from_text(&text);
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.resize(Size::new(400.0, 200.0), now);

    engine.paint(&doc, &FrameInputs::default(), now);
    let before = engine.cache_stats().rebuilds;
    engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(engine.cache_stats().rebuilds, before);

    let offset = doc.line_start_offset(3) + 2;
    let dirty = doc.insert(offset, "XY");
    assert_eq!(dirty.dirty_line, Some(3));
    engine.document_changed(&doc, dirty, offset + 2, now);

    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(engine.cache_stats().rebuilds, before + 1);
    assert_eq!(painted_lines(&frame), expected_lines(&doc, &frame));
}

#[test]
fn test_random_edits_keep_painted_text_current() {
    let mut rng = StdRng::seed_from_u64(99);
    let now = Instant::now();
    let text = (0..200).map(|i| format!("row {i} {}", "ab ".repeat(i % 17))).collect::<Vec<_>>();
    let mut doc = RopeDocument::from_text(&text.join("\n"));

    for wrap in [WrapMode::None, WrapMode::Word] {
        let config = EngineConfig::default().with_wrap(wrap, WrapIndent::None);
        let mut engine = ViewportEngine::new(config).unwrap();
        engine.resize(Size::new(360.0, 240.0), now);

        for step in 0..300 {
            let total = doc.char_count();
            let start = rng.gen_range(0..=total);
            let dirty = match rng.gen_range(0..3) {
                0 => doc.insert(start, ["x", "yz ", "\n", "q\nr"][rng.gen_range(0..4)]),
                1 => doc.delete(start, rng.gen_range(0..6)),
                _ => doc.replace(start, rng.gen_range(0..3), "w"),
            };
            let caret = dirty.end_offset_exclusive;
            engine.document_changed(&doc, dirty, caret, now);
            if rng.gen_bool(0.2) {
                engine.tick(&doc, now + Duration::from_secs(1));
            }
            if rng.gen_bool(0.3) {
                let line = rng.gen_range(0..doc.line_count());
                engine.scroll_to_line(&doc, line, now);
            }

            let frame = engine.paint(&doc, &FrameInputs::default(), now);
            assert_eq!(
                painted_lines(&frame),
                expected_lines(&doc, &frame),
                "{wrap:?} step {step}"
            );
        }
    }
}

#[test]
fn test_ghost_text_follows_typing_through_the_engine() {
    let now = Instant::now();
    let mut doc = RopeDocument::from_text("let x = \nnext");
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.resize(Size::new(400.0, 200.0), now);
    assert!(
        engine
            .show_ghost_text(&doc, GhostText::new(8, "value;", GhostSource::Assistant))
            .is_none()
    );

    let dirty = doc.insert(8, "v");
    engine.document_changed(&doc, dirty, 9, now);
    let ghost = engine.ghost_text().unwrap();
    assert_eq!((ghost.anchor, ghost.text.as_str()), (9, "alue;"));

    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    let shown: Vec<String> = frame
        .layer(PaintLayer::GhostText)
        .filter_map(|op| match op {
            PaintOp::Label { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(shown, vec!["alue;".to_string()]);
    let origin = engine.anchor_point_for_offset(&doc, 9).unwrap();
    assert_eq!(origin.x, engine.viewport_state().gutter_width + 72.0);

    let dirty = doc.insert(9, "z");
    engine.document_changed(&doc, dirty, 10, now);
    assert!(engine.ghost_text().is_none());
    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(frame.layer(PaintLayer::GhostText).count(), 0);
}

#[test]
fn test_new_suggestion_replaces_other_source() {
    let doc = RopeDocument::from_text("abc");
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.show_ghost_text(&doc, GhostText::new(3, "def", GhostSource::Assistant));
    let replaced = engine
        .show_ghost_text(&doc, GhostText::new(3, "xyz", GhostSource::Controller).persistent())
        .unwrap();
    assert_eq!(replaced.source, GhostSource::Assistant);
    assert_eq!(engine.ghost_text().unwrap().source, GhostSource::Controller);
    assert_eq!(engine.clear_ghost_text().unwrap().text, "xyz");
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = EngineConfig::default();
    config.text.line_height = 0.0;
    assert!(ViewportEngine::new(config).is_err());

    let config = EngineConfig::default().with_lsp("", "rust");
    assert!(ViewportEngine::new(config).is_err());
}
