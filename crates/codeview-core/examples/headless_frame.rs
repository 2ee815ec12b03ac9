//! Lay out and paint a frame without a renderer, then print a summary of the display list.
//!
//! Run with `cargo run -p codeview-core --example headless_frame`.

use codeview_core::{
    Diagnostic, DiagnosticRange, DiagnosticSet, DiagnosticSeverity, DocumentSource, EngineConfig,
    FrameInputs, PaintLayer, RopeDocument, Selection, Size, ViewportEngine,
};
use std::collections::BTreeMap;
use std::time::Instant;

fn main() {
    let source = r#"fn main() {
    let names = ["ada", "grace", "barbara"];
    for name in names {
        if name.len() > 3 {
            println!("{name}");
        }
    }
}
"#;
    let doc = RopeDocument::from_text(source);
    let mut engine = match ViewportEngine::new(EngineConfig::default().with_rulers(vec![80])) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("bad configuration: {err}");
            return;
        }
    };
    let now = Instant::now();
    engine.resize(Size::new(720.0, 240.0), now);

    engine.toggle_fold_at_line(&doc, 3);

    let unused = doc.position_to_offset(codeview_core::Position::new(1, 8));
    let diagnostics = DiagnosticSet::new(vec![Diagnostic::new(
        DiagnosticRange::new(unused, unused + 5),
        DiagnosticSeverity::Warning,
        "variable could be a slice",
    )]);
    let caret = doc.position_to_offset(codeview_core::Position::new(2, 10));
    let inputs = FrameInputs {
        selection: Selection::caret(caret),
        diagnostics: Some(&diagnostics),
        focused: true,
        ..FrameInputs::default()
    };

    let frame = engine.paint(&doc, &inputs, now);
    let mut per_layer: BTreeMap<PaintLayer, usize> = BTreeMap::new();
    for item in frame.items() {
        *per_layer.entry(item.layer).or_default() += 1;
    }

    let (first, last) = frame.visible_lines();
    println!("visible lines {first}..={last}, gutter {}px", engine.gutter().width());
    println!("content size {:?}", engine.content_size());
    for (layer, count) in per_layer {
        println!("{layer:?}: {count}");
    }
}
