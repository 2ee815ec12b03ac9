use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use codeview_core::{
    EngineConfig, FrameInputs, RopeDocument, Selection, Size, ViewportEngine, WrapIndent,
    WrapMode,
};
use std::time::Instant;

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        if i % 20 == 0 {
            out.push_str(&format!("fn block_{i}() {{\n"));
        } else if i % 20 == 19 {
            out.push_str("}\n");
        } else {
            out.push_str(&format!(
                "    {i:06} the quick brown fox jumps over the lazy dog (codeview benchmark)\n"
            ));
        }
    }
    out.pop();
    out
}

fn engine(config: EngineConfig, doc: &RopeDocument) -> ViewportEngine {
    let mut engine = ViewportEngine::new(config).unwrap();
    engine.resize(Size::new(1200.0, 1200.0), Instant::now());
    engine.layout(doc);
    engine
}

fn bench_first_layout(c: &mut Criterion) {
    let doc = RopeDocument::from_text(&large_text(100_000));
    c.bench_function("first_layout/100k_lines", |b| {
        b.iter_batched(
            || ViewportEngine::new(EngineConfig::default()).unwrap(),
            |mut engine| {
                engine.resize(Size::new(1200.0, 1200.0), Instant::now());
                black_box(engine.layout(&doc).len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_scroll(c: &mut Criterion) {
    let doc = RopeDocument::from_text(&large_text(100_000));

    let mut fixed = engine(EngineConfig::default(), &doc);
    c.bench_function("scroll/fixed/100_steps", |b| {
        b.iter(|| {
            fixed.set_scroll(0.0, 0.0);
            for _ in 0..100 {
                fixed.scroll_by(0.0, 480.0);
                black_box(fixed.layout(&doc).first);
            }
        })
    });

    let mut folded = engine(EngineConfig::default(), &doc);
    folded.fold_all(&doc);
    c.bench_function("scroll/folded/100_steps", |b| {
        b.iter(|| {
            folded.set_scroll(0.0, 0.0);
            for _ in 0..100 {
                folded.scroll_by(0.0, 480.0);
                black_box(folded.layout(&doc).first);
            }
        })
    });

    let wrapped_doc = RopeDocument::from_text(&large_text(10_000));
    let config = EngineConfig::default().with_wrap(WrapMode::Word, WrapIndent::SameAsLineIndent);
    let mut wrapped = engine(config, &wrapped_doc);
    c.bench_function("scroll/wrapped/100_steps", |b| {
        b.iter(|| {
            wrapped.set_scroll(0.0, 0.0);
            for _ in 0..100 {
                wrapped.scroll_by(0.0, 480.0);
                black_box(wrapped.layout(&wrapped_doc).first);
            }
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || {
                let doc = RopeDocument::from_text(&text);
                let engine = engine(EngineConfig::default(), &doc);
                (doc, engine)
            },
            |(mut doc, mut engine)| {
                let now = Instant::now();
                let mut offset = text.chars().count() / 2;
                for _ in 0..100 {
                    let dirty = doc.insert(offset, "x");
                    offset += 1;
                    engine.document_changed(&doc, dirty, offset, now);
                    black_box(engine.layout(&doc).len());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_paint_slice(c: &mut Criterion) {
    let doc = RopeDocument::from_text(&large_text(50_000));
    let mut engine = engine(EngineConfig::default(), &doc);
    // Well into the file, so the top-of-document paths are not the only warm ones.
    engine.scroll_to_line(&doc, 25_000, Instant::now());
    let inputs = FrameInputs {
        selection: Selection::new(
            codeview_core::DocumentSource::line_start_offset(&doc, 25_001),
            codeview_core::DocumentSource::line_start_offset(&doc, 25_004),
        ),
        focused: true,
        ..FrameInputs::default()
    };

    c.bench_function("paint/60_lines", |b| {
        b.iter(|| {
            let frame = engine.paint(&doc, &inputs, Instant::now());
            black_box(frame.items().len());
        })
    });
}

criterion_group!(
    benches,
    bench_first_layout,
    bench_scroll,
    bench_typing_in_middle,
    bench_paint_slice
);
criterion_main!(benches);
