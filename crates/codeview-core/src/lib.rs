#![warn(missing_docs)]
//! Codeview Core - Incremental Viewport Layout and Paint Engine
//!
//! # Overview
//!
//! `codeview-core` is the rendering engine behind an embeddable code-editing surface. On every
//! edit, scroll, resize or fold toggle it decides which lines are visible, how tall each one is,
//! how to shape and cache their text, and what to paint, without re-measuring the whole
//! document. It is headless: painting produces a display list ([`Frame`]) that the host replays
//! with its own renderer.
//!
//! The document store, syntax highlighter and language server are collaborators. The engine
//! reads text through [`DocumentSource`], asks a [`LineShaper`] (usually a [`MonospaceShaper`]
//! over a [`Highlighter`]) for shaped lines, and takes diagnostics as plain data.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  ViewportEngine (owned state, entry points) │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Paint Pipeline  │  Hit-Testing & Gestures  │  ← Frame output / pointer input
//! ├─────────────────────────────────────────────┤
//! │  Geometry Resolver (visible range, size)    │  ← Line offsets
//! ├─────────────────────────────────────────────┤
//! │  Fold Engine  │  Ghost Text  │  Debouncer   │  ← View state
//! ├─────────────────────────────────────────────┤
//! │  Line Cache Bank (shaped blocks, metrics)   │  ← Memoization
//! ├─────────────────────────────────────────────┤
//! │  DocumentSource / LineShaper collaborators  │  ← Text and styles
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use codeview_core::{
//!     EngineConfig, FrameInputs, PaintLayer, RopeDocument, Selection, Size, ViewportEngine,
//! };
//! use std::time::Instant;
//!
//! let mut doc = RopeDocument::from_text("fn main() {\n    let x = 1;\n    x\n}\n");
//! let mut engine = ViewportEngine::new(EngineConfig::default()).unwrap();
//! let now = Instant::now();
//! engine.resize(Size::new(640.0, 480.0), now);
//!
//! // Fold the function body.
//! assert!(engine.toggle_fold_at_line(&doc, 0));
//!
//! // Edit, then notify the engine with the dirty region.
//! let dirty = doc.insert(0, "// entry\n");
//! engine.document_changed(&doc, dirty, 9, now);
//!
//! let inputs = FrameInputs {
//!     selection: Selection::caret(9),
//!     focused: true,
//!     ..FrameInputs::default()
//! };
//! let frame = engine.paint(&doc, &inputs, now);
//! assert!(frame.layer(PaintLayer::Text).count() > 0);
//! ```
//!
//! # Module Description
//!
//! - [`document`] - document collaborator trait and a rope-backed reference document
//! - [`text_metrics`] - Unicode cell widths and soft-wrap points
//! - [`shaping`] - shaped line blocks, highlighter and shaper traits
//! - [`cache`] - Line Cache Bank
//! - [`folding`] - fold detection and fold state
//! - [`geometry`] - visible-range resolution and content size
//! - [`paint`] - layered display list
//! - [`hit_test`] - pointer classification and gesture routing
//! - [`ghost_text`] - inline suggestion reconciliation
//! - [`engine`] - the owned-state façade
//!
//! # Unicode Support
//!
//! - Offsets and columns are in `char`s
//! - CJK double-width characters take two cells and are never split by wrapping
//! - Hit-testing snaps to grapheme clusters, so a click never lands inside an emoji sequence

pub mod brackets;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod decorations;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod error;
pub mod folding;
pub mod geometry;
pub mod ghost_text;
pub mod gutter;
pub mod hit_test;
pub mod indent_guides;
pub mod intervals;
pub mod lexer;
pub mod paint;
pub mod primitives;
pub mod shaping;
pub mod text_metrics;

pub use cache::{CacheStats, LineCacheBank};
pub use config::{
    EngineConfig, GutterConfig, IndentGuideConfig, LspConfig, Palette, SquiggleConfig,
    TextConfig, WrapConfig,
};
pub use debounce::{Debouncer, RecomputeTrigger, TaskHandle};
pub use decorations::{
    GutterDecoration, GutterDecorationKind, LineDecoration, LineDecorationStyle, LineIndexed,
    SearchHighlight, SearchHighlights,
};
pub use diagnostics::{Diagnostic, DiagnosticRange, DiagnosticSet, DiagnosticSeverity};
pub use document::{DirtyRegion, DocumentSource, Position, RopeDocument, Selection};
pub use engine::{BreakpointHandler, ScrollEvent, ScrollListener, SubscriptionId, ViewportEngine};
pub use error::ConfigError;
pub use folding::{FoldEngine, FoldKind, FoldRange, detect_fold_at};
pub use geometry::{
    GeometryMode, GeometryResolver, LineLayout, LineMetrics, ViewportState, VisibleLayout,
};
pub use ghost_text::{GhostSource, GhostText, GhostTextReconciler, GhostUpdate};
pub use gutter::{GutterLayout, GutterRegion};
pub use hit_test::{
    DragTarget, GestureOutcome, GestureRouter, HitTarget, PointerKind, TouchHandle,
};
pub use indent_guides::IndentGuide;
pub use intervals::{Interval, IntervalIndex};
pub use paint::{Frame, FrameInputs, PaintItem, PaintLayer, PaintOp, QuadSegment};
pub use primitives::{Color, Point, Rect, Size};
pub use shaping::{
    Highlighter, LineShaper, MonospaceShaper, PlainHighlighter, ShapedBlock, StyleId, StyledRun,
};
pub use text_metrics::{WrapIndent, WrapMode};

pub use codeview_lang::LanguageConfig;
