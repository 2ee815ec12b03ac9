use codeview_core::{
    DocumentSource, EngineConfig, FrameInputs, GeometryMode, LanguageConfig, PaintLayer,
    RopeDocument, Size, ViewportEngine,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

/// 100 lines; lines 50..=60 form a brace block.
fn document() -> RopeDocument {
    let lines: Vec<String> = (0..100)
        .map(|i| match i {
            50 => "block {".to_string(),
            51..=59 => format!("    body {i}"),
            60 => "}".to_string(),
            _ => format!("line {i}"),
        })
        .collect();
    RopeDocument::from_text(&lines.join("\n"))
}

fn engine(doc: &RopeDocument, now: Instant) -> ViewportEngine {
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.resize(Size::new(600.0, 200.0), now);
    engine.layout(doc);
    engine
}

fn visible_lines(engine: &mut ViewportEngine, doc: &RopeDocument) -> Vec<usize> {
    engine.layout(doc).lines.iter().map(|l| l.line).collect()
}

#[test]
fn test_fold_hides_block_and_shrinks_content() {
    let now = Instant::now();
    let doc = document();
    let mut engine = engine(&doc, now);
    assert_eq!(engine.content_size().height, 2000.0);
    assert_eq!(engine.geometry_mode(), GeometryMode::Fixed);

    assert!(engine.toggle_fold_at_line(&doc, 50));
    assert_eq!(engine.geometry_mode(), GeometryMode::Scanned);
    assert_eq!(engine.folds().hidden_line_count(), 10);
    assert_eq!(engine.content_size().height, 1800.0);

    engine.set_scroll(0.0, 46.0 * 20.0);
    assert_eq!(
        visible_lines(&mut engine, &doc),
        vec![46, 47, 48, 49, 50, 61, 62, 63, 64, 65]
    );

    assert!(engine.toggle_fold_at_line(&doc, 50));
    assert_eq!(engine.geometry_mode(), GeometryMode::Fixed);
    assert_eq!(engine.content_size().height, 2000.0);
}

#[test]
fn test_edit_above_fold_shifts_it() {
    let now = Instant::now();
    let mut doc = document();
    let mut engine = engine(&doc, now);
    assert!(engine.toggle_fold_at_line(&doc, 50));

    let dirty = doc.insert(0, "new\n");
    engine.document_changed(&doc, dirty, 4, now);

    assert!(engine.folds().is_folded_start(51));
    assert!(!engine.folds().is_folded_start(50));
    assert!(engine.folds().is_hidden(61));
    assert!(!engine.folds().is_hidden(62));
    assert_eq!(engine.content_size().height, 1820.0);
    assert!(!engine.is_content_size_exact());
}

#[test]
fn test_deleting_fold_end_drops_fold() {
    let now = Instant::now();
    let mut doc = document();
    let mut engine = engine(&doc, now);
    assert!(engine.toggle_fold_at_line(&doc, 50));

    // Remove everything from line 55 to the end.
    let start = doc.line_start_offset(55) - 1;
    let len = doc.char_count() - start;
    let dirty = doc.delete(start, len);
    engine.document_changed(&doc, dirty, start, now);

    assert_eq!(doc.line_count(), 55);
    assert!(!engine.folds().has_folds());
    assert!(!engine.folds().is_hidden(52));
}

#[test]
fn test_debounced_recompute_settles_content_size() {
    let start = Instant::now();
    let mut doc = document();
    let mut engine = engine(&doc, start);
    // Settle the initial resize.
    let now = start + Duration::from_secs(1);
    assert!(engine.tick(&doc, now));
    assert!(!engine.has_pending_recompute());

    let dirty = doc.insert(0, "a\nb\n");
    engine.document_changed(&doc, dirty, 4, now);
    assert!(engine.has_pending_recompute());
    assert!(!engine.tick(&doc, now + Duration::from_millis(50)));

    let dirty = doc.insert(0, "c\n");
    let later = now + Duration::from_millis(80);
    engine.document_changed(&doc, dirty, 2, later);
    assert_eq!(engine.next_deadline(), Some(later + Duration::from_millis(100)));
    assert!(!engine.tick(&doc, now + Duration::from_millis(150)));

    assert!(engine.tick(&doc, later + Duration::from_millis(100)));
    assert!(!engine.has_pending_recompute());
    assert!(engine.is_content_size_exact());
    assert_eq!(engine.content_size().height, 103.0 * 20.0);
}

#[test]
fn test_scroll_to_hidden_line_unfolds_and_flashes() {
    let now = Instant::now();
    let doc = document();
    let mut engine = engine(&doc, now);
    assert!(engine.toggle_fold_at_line(&doc, 50));
    assert!(engine.folds().is_hidden(55));

    engine.scroll_to_line(&doc, 55, now);

    assert!(!engine.folds().has_folds());
    let expected = 55.0 * 20.0 - 200.0 / 3.0;
    assert!((engine.viewport_state().scroll_y - expected).abs() < 0.01);

    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(frame.layer(PaintLayer::LineFlash).count(), 1);
    assert!(engine.visible_layout().contains(55));

    let flash_ms = engine.config().line_flash_ms;
    let after = now + Duration::from_millis(flash_ms);
    engine.tick(&doc, after);
    let frame = engine.paint(&doc, &FrameInputs::default(), after);
    assert_eq!(frame.layer(PaintLayer::LineFlash).count(), 0);
}

#[test]
fn test_scroll_to_first_line_clamps_to_top() {
    let now = Instant::now();
    let doc = document();
    let mut engine = engine(&doc, now);
    engine.set_scroll(0.0, 500.0);
    engine.scroll_to_line(&doc, 1, now);
    assert_eq!(engine.viewport_state().scroll_y, 0.0);
}

#[test]
fn test_fold_all_then_unfold_all() {
    let now = Instant::now();
    let doc = RopeDocument::from_text("a {\n  b\n}\nc {\n  d {\n    e\n  }\n}\nf");
    let mut engine = engine(&doc, now);

    assert_eq!(engine.fold_all(&doc), 2);
    assert_eq!(visible_lines(&mut engine, &doc), vec![0, 3, 8]);

    let frame = engine.paint(&doc, &FrameInputs::default(), now);
    assert_eq!(frame.layer(PaintLayer::FoldedTint).count(), 2);
    assert_eq!(frame.layer(PaintLayer::FoldEllipsis).count(), 2);

    engine.unfold_all();
    assert_eq!(visible_lines(&mut engine, &doc).len(), 9);
    assert_eq!(engine.content_size().height, 180.0);
}

#[test]
fn test_edit_before_first_layout_shifts_fold() {
    let now = Instant::now();
    let mut doc = RopeDocument::from_text("fn a() {\n    x();\n    y();\n}\nrest");
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.resize(Size::new(600.0, 200.0), now);
    assert!(engine.toggle_fold_at_line(&doc, 0));

    let dirty = doc.insert(0, "// entry\n");
    engine.document_changed(&doc, dirty, 9, now);

    let folded: Vec<(usize, usize)> = engine
        .folds()
        .folded_ranges()
        .map(|r| (r.start_line, r.end_line))
        .collect();
    assert_eq!(folded, vec![(1, 4)]);
    let hidden: Vec<usize> = (0..doc.line_count())
        .filter(|l| engine.folds().is_hidden(*l))
        .collect();
    assert_eq!(hidden, vec![2, 3, 4]);
    assert_eq!(visible_lines(&mut engine, &doc), vec![0, 1, 5]);
}

#[test]
fn test_crossing_template_and_markup_folds_never_show_hidden_lines() {
    let now = Instant::now();
    let doc = RopeDocument::from_text(
        "{% if a %}\n  x\n  <div>\n  y\n{% endif %}\n  z\n  </div>\nafter",
    );
    let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
    engine.set_language(LanguageConfig::jinja());
    engine.resize(Size::new(600.0, 200.0), now);

    assert!(engine.toggle_fold_at_line(&doc, 2));
    assert!(engine.toggle_fold_at_line(&doc, 0));
    let shown = visible_lines(&mut engine, &doc);
    assert_eq!(shown, vec![0, 5, 6, 7]);
    assert!(shown.iter().all(|line| !engine.folds().is_hidden(*line)));
    assert_eq!(engine.content_size().height, 80.0);

    assert!(engine.toggle_fold_at_line(&doc, 0));
    assert_eq!(visible_lines(&mut engine, &doc), vec![0, 1, 2, 7]);
}

#[test]
fn test_resize_clamps_scroll_immediately() {
    let now = Instant::now();
    let doc = document();
    let mut engine = engine(&doc, now);
    engine.set_scroll(0.0, 1800.0);
    assert_eq!(engine.viewport_state().scroll_y, 1800.0);

    engine.resize(Size::new(600.0, 600.0), now);
    assert_eq!(engine.viewport_state().scroll_y, 1400.0);
    assert!(engine.has_pending_recompute());
}
