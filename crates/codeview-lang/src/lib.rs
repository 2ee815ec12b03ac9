#![warn(missing_docs)]
//! `codeview-lang` - data-driven language configuration for `codeview-core`.
//!
//! This crate stays dependency-free. It describes *what* a language looks like to the
//! rendering engine (comment tokens, bracket pairs, block introducers, markup tags), and
//! leaves all scanning to the engine.

/// Comment tokens for a language.
///
/// Fold detection skips comment regions entirely and bracket matching ignores brackets
/// that appear inside comments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`, `<!--`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`, `-->`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// Returns `true` if a line comment token is configured.
    pub fn has_line(&self) -> bool {
        self.line.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Returns `true` if both block comment tokens are configured.
    pub fn has_block(&self) -> bool {
        self.block_start.as_deref().is_some_and(|s| !s.is_empty())
            && self.block_end.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Template (server-side markup) block tag syntax, e.g. Jinja's `{% block %}...{% endblock %}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTagConfig {
    /// Opening delimiter of a tag (e.g. `{%`).
    pub open: String,
    /// Closing delimiter of a tag (e.g. `%}`).
    pub close: String,
    /// Prefix that turns a tag name into its end tag (`end` for `endblock`).
    pub end_prefix: String,
    /// Tag names that open a foldable block (`block`, `if`, `for`, ...).
    pub block_tags: Vec<String>,
}

impl TemplateTagConfig {
    /// Jinja/Django style tags.
    pub fn jinja() -> Self {
        Self {
            open: "{%".to_string(),
            close: "%}".to_string(),
            end_prefix: "end".to_string(),
            block_tags: ["block", "if", "for", "macro", "with", "filter", "call", "raw"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Returns `true` if `name` opens a block.
    pub fn is_block_tag(&self, name: &str) -> bool {
        self.block_tags.iter().any(|t| t == name)
    }
}

/// HTML void elements (never closed, never foldable).
pub const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Language description consumed by fold detection and bracket matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Human-readable identifier (`rust`, `python`, ...).
    pub id: String,
    /// Comment tokens.
    pub comments: CommentConfig,
    /// Bracket pairs, in `(open, close)` form.
    pub brackets: Vec<(char, char)>,
    /// String delimiters; brackets inside strings are ignored.
    pub string_quotes: Vec<char>,
    /// Tokens that introduce an indentation block when they end a line (e.g. `:` in Python).
    pub block_introducers: Vec<String>,
    /// Whether HTML/XML-style tags are matched as fold regions.
    pub markup_tags: bool,
    /// Elements that never have a closing tag.
    pub void_elements: Vec<String>,
    /// Template block tags (if the language embeds a templating syntax).
    pub template_tags: Option<TemplateTagConfig>,
}

impl LanguageConfig {
    /// Plain text: brackets only, no comments.
    pub fn plain() -> Self {
        Self {
            id: "plain".to_string(),
            comments: CommentConfig::default(),
            brackets: vec![('{', '}'), ('(', ')'), ('[', ']')],
            string_quotes: Vec::new(),
            block_introducers: Vec::new(),
            markup_tags: false,
            void_elements: Vec::new(),
            template_tags: None,
        }
    }

    /// Rust and other C-like brace languages.
    pub fn rust() -> Self {
        Self {
            id: "rust".to_string(),
            comments: CommentConfig::line_and_block("//", "/*", "*/"),
            string_quotes: vec!['"'],
            ..Self::plain()
        }
    }

    /// JSON.
    pub fn json() -> Self {
        Self {
            id: "json".to_string(),
            string_quotes: vec!['"'],
            ..Self::plain()
        }
    }

    /// Python: indentation blocks introduced by a trailing `:`.
    pub fn python() -> Self {
        Self {
            id: "python".to_string(),
            comments: CommentConfig::line("#"),
            string_quotes: vec!['"', '\''],
            block_introducers: vec![":".to_string()],
            ..Self::plain()
        }
    }

    /// HTML / XML markup.
    pub fn html() -> Self {
        Self {
            id: "html".to_string(),
            comments: CommentConfig::block("<!--", "-->"),
            string_quotes: Vec::new(),
            markup_tags: true,
            void_elements: HTML_VOID_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            ..Self::plain()
        }
    }

    /// HTML with Jinja template tags.
    pub fn jinja() -> Self {
        Self {
            id: "jinja".to_string(),
            comments: CommentConfig::block("{#", "#}"),
            template_tags: Some(TemplateTagConfig::jinja()),
            ..Self::html()
        }
    }

    /// Returns the closing bracket for `open`, if it is an opening bracket.
    pub fn closing_for(&self, open: char) -> Option<char> {
        self.brackets
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, c)| *c)
    }

    /// Returns the opening bracket for `close`, if it is a closing bracket.
    pub fn opening_for(&self, close: char) -> Option<char> {
        self.brackets
            .iter()
            .find(|(_, c)| *c == close)
            .map(|(o, _)| *o)
    }

    /// Returns `true` if `name` is a void element (case-insensitive).
    pub fn is_void_element(&self, name: &str) -> bool {
        self.void_elements
            .iter()
            .any(|v| v.eq_ignore_ascii_case(name))
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::plain()
    }
}
