//! `codeview-highlight-simple` - Regex-based syntax highlighting for `codeview-core`.
//!
//! This crate is intended for lightweight formats (JSON/INI/etc.) where a full parser or a
//! language server is unnecessary. [`RegexHighlighter`] implements
//! [`codeview_core::Highlighter`], so it plugs straight into
//! [`ViewportEngine::with_highlighter`](codeview_core::ViewportEngine::with_highlighter).

use codeview_core::{Highlighter, StyleId, StyledRun};
use regex::Regex;

/// A single regex highlighting rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    style: StyleId,
    capture_group: Option<usize>,
}

impl RegexRule {
    /// Compile `pattern` into a rule painting matches with `style`.
    pub fn new(pattern: &str, style: StyleId) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            style,
            capture_group: None,
        })
    }

    /// Highlight only a capture group of each match.
    ///
    /// Example (INI key):
    /// - pattern: `^\\s*([^=\\s]+)\\s*=`
    /// - capture_group: `1` (the key)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    /// Style applied by this rule.
    pub fn style(&self) -> StyleId {
        self.style
    }

    fn byte_spans<'t>(&'t self, text: &'t str) -> Box<dyn Iterator<Item = (usize, usize)> + 't> {
        match self.capture_group {
            Some(group) => Box::new(
                self.regex
                    .captures_iter(text)
                    .filter_map(move |caps| caps.get(group))
                    .map(|m| (m.start(), m.end())),
            ),
            None => Box::new(self.regex.find_iter(text).map(|m| (m.start(), m.end()))),
        }
    }
}

/// A simple regex-based syntax highlighter.
///
/// Rules are applied per line in order; columns claimed by an earlier rule are not restyled by
/// a later one, so a number inside a JSON string stays a string.
#[derive(Debug, Clone, Default)]
pub struct RegexHighlighter {
    rules: Vec<RegexRule>,
}

impl RegexHighlighter {
    /// Highlighter over `rules`, highest priority first.
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Append a lower-priority rule.
    pub fn push_rule(&mut self, rule: RegexRule) {
        self.rules.push(rule);
    }

    /// A small default JSON grammar (strings, numbers, booleans, null).
    pub fn json_default(styles: SimpleJsonStyles) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // Single-line string with escapes.
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, styles.string)?,
            RegexRule::new(
                r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#,
                styles.number,
            )?,
            RegexRule::new(r#"\b(?:true|false)\b"#, styles.boolean)?,
            RegexRule::new(r#"\bnull\b"#, styles.null)?,
        ]))
    }

    /// A small default INI grammar (section, key, comment).
    pub fn ini_default(styles: SimpleIniStyles) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(r#"^\s*[;#].*$"#, styles.comment)?,
            RegexRule::new(r#"^\s*\[([^\]]+)\]\s*$"#, styles.section)?.with_capture_group(1),
            RegexRule::new(r#"^\s*([^=\s]+)\s*="#, styles.key)?.with_capture_group(1),
        ]))
    }
}

impl Highlighter for RegexHighlighter {
    fn highlight_line(&self, _line: usize, text: &str) -> Vec<StyledRun> {
        let mut claimed = vec![false; text.chars().count()];
        let mut runs = Vec::new();

        for rule in &self.rules {
            for (start_byte, end_byte) in rule.byte_spans(text) {
                let Some((start, end)) = char_span(text, start_byte, end_byte) else {
                    continue;
                };
                if claimed[start..end].iter().any(|c| *c) {
                    continue;
                }
                claimed[start..end].fill(true);
                runs.push(StyledRun::new(start, end, rule.style));
            }
        }

        runs.sort_by_key(|run| run.start);
        runs
    }
}

/// Styles used by [`RegexHighlighter::json_default`].
#[derive(Debug, Clone, Copy)]
pub struct SimpleJsonStyles {
    /// String literals.
    pub string: StyleId,
    /// Numbers.
    pub number: StyleId,
    /// `true` / `false`.
    pub boolean: StyleId,
    /// `null`.
    pub null: StyleId,
}

impl Default for SimpleJsonStyles {
    fn default() -> Self {
        Self {
            string: SIMPLE_STYLE_STRING,
            number: SIMPLE_STYLE_NUMBER,
            boolean: SIMPLE_STYLE_BOOLEAN,
            null: SIMPLE_STYLE_NULL,
        }
    }
}

/// Styles used by [`RegexHighlighter::ini_default`].
#[derive(Debug, Clone, Copy)]
pub struct SimpleIniStyles {
    /// `[section]` names.
    pub section: StyleId,
    /// Keys of `key = value` lines.
    pub key: StyleId,
    /// `;` and `#` comments.
    pub comment: StyleId,
}

impl Default for SimpleIniStyles {
    fn default() -> Self {
        Self {
            section: SIMPLE_STYLE_SECTION,
            key: SIMPLE_STYLE_KEY,
            comment: SIMPLE_STYLE_COMMENT,
        }
    }
}

/// JSON string style.
pub const SIMPLE_STYLE_STRING: StyleId = 0x0200_0001;
/// JSON number style.
pub const SIMPLE_STYLE_NUMBER: StyleId = 0x0200_0002;
/// JSON boolean style.
pub const SIMPLE_STYLE_BOOLEAN: StyleId = 0x0200_0003;
/// JSON null style.
pub const SIMPLE_STYLE_NULL: StyleId = 0x0200_0004;
/// INI section style.
pub const SIMPLE_STYLE_SECTION: StyleId = 0x0200_0010;
/// INI key style.
pub const SIMPLE_STYLE_KEY: StyleId = 0x0200_0011;
/// INI comment style.
pub const SIMPLE_STYLE_COMMENT: StyleId = 0x0200_0012;

/// Byte span to char columns; `None` for empty or out-of-range spans.
fn char_span(text: &str, start_byte: usize, end_byte: usize) -> Option<(usize, usize)> {
    if start_byte >= end_byte || end_byte > text.len() {
        return None;
    }
    let start = text[..start_byte].chars().count();
    let end = start + text[start_byte..end_byte].chars().count();
    (start < end).then_some((start, end))
}
