//! Engine configuration.
//!
//! Everything is plain data with serde support; missing JSON fields fall back to defaults.
//! [`EngineConfig::validate`] rejects the few combinations the engine cannot run with.

use crate::error::ConfigError;
use crate::primitives::Color;
use crate::text_metrics::{DEFAULT_TAB_WIDTH, WrapIndent, WrapMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text metrics for the built-in monospace shaper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Height of one visual row, in pixels.
    pub line_height: f32,
    /// Width of one cell, in pixels.
    pub char_width: f32,
    /// Tab width, in cells.
    pub tab_width: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            char_width: 8.0,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Soft-wrap settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Wrap mode; `None` disables wrapping.
    pub mode: WrapMode,
    /// Continuation indent.
    pub indent: WrapIndent,
}

/// Gutter sub-columns, left to right: breakpoints, line numbers, fold icons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    /// Show line numbers.
    pub line_numbers: bool,
    /// Reserve a breakpoint column.
    pub breakpoints: bool,
    /// Reserve a fold-icon column.
    pub fold_icons: bool,
    /// Breakpoint column width.
    pub breakpoint_width: f32,
    /// Fold-icon column width.
    pub fold_width: f32,
    /// Padding on each side of the line numbers.
    pub padding: f32,
    /// Separator between gutter and text.
    pub separator_width: f32,
    /// Digits always reserved for line numbers.
    pub min_digits: usize,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            breakpoints: true,
            fold_icons: true,
            breakpoint_width: 16.0,
            fold_width: 16.0,
            padding: 8.0,
            separator_width: 1.0,
            min_digits: 1,
        }
    }
}

/// Indentation guides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentGuideConfig {
    /// Draw guides at all.
    pub enabled: bool,
    /// Guides are skipped when more lines than this are visible.
    pub max_visible_lines: usize,
}

impl Default for IndentGuideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_visible_lines: 200,
        }
    }
}

/// Diagnostic squiggle shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquiggleConfig {
    /// Wave amplitude, in pixels.
    pub amplitude: f32,
    /// Length of one full wave, in pixels.
    pub wavelength: f32,
}

impl Default for SquiggleConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.5,
            wavelength: 6.0,
        }
    }
}

/// Paint colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub gutter_background: Color,
    pub line_number: Color,
    pub line_number_active: Color,
    pub line_number_selected: Color,
    pub fold_icon: Color,
    pub breakpoint: Color,
    pub breakpoint_hover: Color,
    pub code_action: Color,
    pub selection: Color,
    pub search_match: Color,
    pub search_match_current: Color,
    pub line_flash: Color,
    pub folded_tint: Color,
    pub fold_ellipsis: Color,
    pub indent_guide: Color,
    pub indent_guide_active: Color,
    pub ruler: Color,
    pub diagnostic_error: Color,
    pub diagnostic_warning: Color,
    pub diagnostic_information: Color,
    pub diagnostic_hint: Color,
    pub ghost_text: Color,
    pub bracket_match: Color,
    pub caret: Color,
    pub touch_handle: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(0x1E, 0x1E, 0x1E),
            text: Color::rgb(0xD4, 0xD4, 0xD4),
            gutter_background: Color::rgb(0x1E, 0x1E, 0x1E),
            line_number: Color::rgb(0x85, 0x85, 0x85),
            line_number_active: Color::rgb(0xC6, 0xC6, 0xC6),
            line_number_selected: Color::rgb(0xA0, 0xA0, 0xA0),
            fold_icon: Color::rgb(0xC5, 0xC5, 0xC5),
            breakpoint: Color::rgb(0xE5, 0x14, 0x00),
            breakpoint_hover: Color::rgb(0xE5, 0x14, 0x00).with_alpha_factor(0.4),
            code_action: Color::rgb(0xFF, 0xCC, 0x00),
            selection: Color::rgb(0x26, 0x4F, 0x78),
            search_match: Color::rgb(0x62, 0x33, 0x15),
            search_match_current: Color::rgb(0x51, 0x5C, 0x6A),
            line_flash: Color::rgb(0xFF, 0xE0, 0x66).with_alpha_factor(0.35),
            folded_tint: Color::rgb(0x26, 0x4F, 0x78).with_alpha_factor(0.25),
            fold_ellipsis: Color::rgb(0x80, 0x80, 0x80),
            indent_guide: Color::rgb(0x40, 0x40, 0x40),
            indent_guide_active: Color::rgb(0x70, 0x70, 0x70),
            ruler: Color::rgb(0x5A, 0x5A, 0x5A),
            diagnostic_error: Color::rgb(0xF1, 0x4C, 0x4C),
            diagnostic_warning: Color::rgb(0xCC, 0xA7, 0x00),
            diagnostic_information: Color::rgb(0x37, 0x94, 0xFF),
            diagnostic_hint: Color::rgb(0xA0, 0xA0, 0xA0),
            ghost_text: Color::rgb(0x80, 0x80, 0x80),
            bracket_match: Color::rgb(0x88, 0x88, 0x88),
            caret: Color::rgb(0xAE, 0xAF, 0xAD),
            touch_handle: Color::rgb(0x37, 0x94, 0xFF),
        }
    }
}

/// Language-server integration settings. The engine only consumes diagnostics; the
/// configuration is checked here so a missing document path is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LspConfig {
    /// Path (or URI) of the document the server should analyse.
    pub document_path: String,
    /// LSP language identifier.
    pub language_id: String,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Text metrics.
    pub text: TextConfig,
    /// Soft wrapping.
    pub wrap: WrapConfig,
    /// Gutter layout.
    pub gutter: GutterConfig,
    /// Indentation guides.
    pub indent_guides: IndentGuideConfig,
    /// Ruler columns (in cells).
    pub rulers: Vec<usize>,
    /// Settle period before a full content-size recomputation.
    pub debounce_ms: u64,
    /// Caret blink half-period; `0` disables blinking.
    pub caret_blink_ms: u64,
    /// Duration of the jump-to-line flash.
    pub line_flash_ms: u64,
    /// Diagnostic squiggle shape.
    pub squiggle: SquiggleConfig,
    /// Hit radius of touch selection handles.
    pub touch_handle_radius: f32,
    /// Colors.
    pub palette: Palette,
    /// Optional LSP integration.
    pub lsp: Option<LspConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            wrap: WrapConfig::default(),
            gutter: GutterConfig::default(),
            indent_guides: IndentGuideConfig::default(),
            rulers: Vec::new(),
            debounce_ms: 100,
            caret_blink_ms: 500,
            line_flash_ms: 800,
            squiggle: SquiggleConfig::default(),
            touch_handle_radius: 12.0,
            palette: Palette::default(),
            lsp: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the preconditions the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_metric("text.line_height", self.text.line_height)?;
        check_metric("text.char_width", self.text.char_width)?;
        if self.text.tab_width == 0 {
            return Err(ConfigError::InvalidTabWidth);
        }
        if !self.touch_handle_radius.is_finite() || self.touch_handle_radius < 0.0 {
            return Err(ConfigError::InvalidMetric {
                name: "touch_handle_radius",
                value: self.touch_handle_radius,
            });
        }
        check_metric("squiggle.wavelength", self.squiggle.wavelength)?;
        if let Some(lsp) = &self.lsp
            && lsp.document_path.trim().is_empty()
        {
            return Err(ConfigError::LspWithoutDocumentPath);
        }
        Ok(())
    }

    /// Settle period as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Set the text metrics.
    pub fn with_text(mut self, line_height: f32, char_width: f32, tab_width: usize) -> Self {
        self.text = TextConfig {
            line_height,
            char_width,
            tab_width,
        };
        self
    }

    /// Set the wrap mode and continuation indent.
    pub fn with_wrap(mut self, mode: WrapMode, indent: WrapIndent) -> Self {
        self.wrap = WrapConfig { mode, indent };
        self
    }

    /// Set the gutter configuration.
    pub fn with_gutter(mut self, gutter: GutterConfig) -> Self {
        self.gutter = gutter;
        self
    }

    /// Set the indentation guide configuration.
    pub fn with_indent_guides(mut self, indent_guides: IndentGuideConfig) -> Self {
        self.indent_guides = indent_guides;
        self
    }

    /// Set ruler columns.
    pub fn with_rulers(mut self, rulers: Vec<usize>) -> Self {
        self.rulers = rulers;
        self
    }

    /// Set the debounce settle period.
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set the caret blink half-period (`0` disables blinking).
    pub fn with_caret_blink_ms(mut self, caret_blink_ms: u64) -> Self {
        self.caret_blink_ms = caret_blink_ms;
        self
    }

    /// Set the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Enable LSP integration for `document_path`.
    pub fn with_lsp(mut self, document_path: impl Into<String>, language_id: impl Into<String>) -> Self {
        self.lsp = Some(LspConfig {
            document_path: document_path.into(),
            language_id: language_id.into(),
        });
        self
    }
}

fn check_metric(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMetric { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "text": { "line_height": 18.0 }, "wrap": { "mode": "word" }, "rulers": [80] }"#,
        )
        .unwrap();
        assert_eq!(config.text.line_height, 18.0);
        assert_eq!(config.text.char_width, 8.0);
        assert_eq!(config.wrap.mode, WrapMode::Word);
        assert_eq!(config.rulers, vec![80]);
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    fn test_lsp_without_document_path_is_rejected() {
        let err = EngineConfig::default().with_lsp("  ", "rust").validate().unwrap_err();
        assert!(matches!(err, ConfigError::LspWithoutDocumentPath));

        let err = EngineConfig::from_json(r#"{ "lsp": { "language_id": "rust" } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::LspWithoutDocumentPath));

        assert!(EngineConfig::default().with_lsp("/tmp/a.rs", "rust").validate().is_ok());
    }

    #[test]
    fn test_invalid_metrics() {
        let err = EngineConfig::default().with_text(0.0, 8.0, 4).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMetric { name: "text.line_height", .. }));

        let err = EngineConfig::default().with_text(20.0, 8.0, 0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTabWidth));

        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default().with_rulers(vec![80, 100]);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
