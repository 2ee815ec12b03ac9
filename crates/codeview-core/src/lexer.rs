//! Lightweight per-line lexical classification.
//!
//! Fold detection and bracket matching must ignore characters inside comments, string literals
//! and markup/template tag spans. [`Scanner`] classifies each char of a line and memoizes the
//! carry-over state (open block comment, open tag) at the start of every line it has seen, so a
//! query for line `n` costs one forward pass the first time and O(1) afterwards.

use crate::document::DocumentSource;
use codeview_lang::LanguageConfig;

/// Classification of a single char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Ordinary code.
    Code,
    /// Inside a line or block comment (delimiters included).
    Comment,
    /// Inside a string literal (quotes included).
    String,
    /// Inside a markup (`<div ...>`) or template (`{% ... %}`) tag span.
    MarkupTag,
}

/// Lexer state carried across a line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexState {
    /// Inside an unterminated block comment.
    pub in_block_comment: bool,
    /// Inside an unterminated markup tag.
    pub in_markup_tag: bool,
    /// Inside an unterminated template tag.
    pub in_template_tag: bool,
}

fn starts_with_at(chars: &[char], i: usize, token: &str) -> bool {
    let mut idx = i;
    for t in token.chars() {
        if chars.get(idx) != Some(&t) {
            return false;
        }
        idx += 1;
    }
    !token.is_empty()
}

fn token_len(token: &str) -> usize {
    token.chars().count()
}

/// Classify every char of `text`, starting from `state`. Returns the classes and the state at
/// the end of the line.
pub fn classify_line(
    text: &str,
    lang: &LanguageConfig,
    mut state: LexState,
) -> (Vec<CharClass>, LexState) {
    let chars: Vec<char> = text.chars().collect();
    let mut classes = vec![CharClass::Code; chars.len()];
    let line_comment = lang.comments.line.as_deref().filter(|t| !t.is_empty());
    let block = lang
        .comments
        .has_block()
        .then(|| {
            (
                lang.comments.block_start.as_deref().unwrap_or_default(),
                lang.comments.block_end.as_deref().unwrap_or_default(),
            )
        });
    let template = lang.template_tags.as_ref();

    let mut i = 0usize;
    while i < chars.len() {
        if state.in_block_comment {
            let (_, end) = block.unwrap_or(("", ""));
            if starts_with_at(&chars, i, end) {
                let n = token_len(end);
                classes[i..i + n].fill(CharClass::Comment);
                i += n;
                state.in_block_comment = false;
            } else {
                classes[i] = CharClass::Comment;
                i += 1;
            }
            continue;
        }

        if state.in_template_tag {
            let close = template.map(|t| t.close.as_str()).unwrap_or_default();
            if starts_with_at(&chars, i, close) {
                let n = token_len(close);
                classes[i..i + n].fill(CharClass::MarkupTag);
                i += n;
                state.in_template_tag = false;
            } else {
                classes[i] = CharClass::MarkupTag;
                i += 1;
            }
            continue;
        }

        if state.in_markup_tag {
            classes[i] = CharClass::MarkupTag;
            if chars[i] == '>' {
                state.in_markup_tag = false;
            }
            i += 1;
            continue;
        }

        if let Some((start, _)) = block
            && starts_with_at(&chars, i, start)
        {
            let n = token_len(start);
            classes[i..i + n].fill(CharClass::Comment);
            i += n;
            state.in_block_comment = true;
            continue;
        }

        if let Some(token) = line_comment
            && starts_with_at(&chars, i, token)
        {
            classes[i..].fill(CharClass::Comment);
            break;
        }

        if let Some(t) = template
            && starts_with_at(&chars, i, &t.open)
        {
            let n = token_len(&t.open);
            classes[i..i + n].fill(CharClass::MarkupTag);
            i += n;
            state.in_template_tag = true;
            continue;
        }

        let ch = chars[i];
        if lang.string_quotes.contains(&ch) {
            // Strings end at the matching quote or at the end of the line.
            classes[i] = CharClass::String;
            i += 1;
            while i < chars.len() {
                classes[i] = CharClass::String;
                if chars[i] == '\\' && i + 1 < chars.len() {
                    classes[i + 1] = CharClass::String;
                    i += 2;
                    continue;
                }
                i += 1;
                if chars[i - 1] == ch {
                    break;
                }
            }
            continue;
        }

        if lang.markup_tags
            && ch == '<'
            && chars
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_alphabetic() || *c == '/' || *c == '!' || *c == '?')
        {
            classes[i] = CharClass::MarkupTag;
            state.in_markup_tag = true;
            i += 1;
            continue;
        }

        i += 1;
    }

    (classes, state)
}

/// Memoizing line classifier bound to one language.
#[derive(Debug, Clone)]
pub struct Scanner {
    lang: LanguageConfig,
    /// `line_states[i]` is the state at the start of line `i`.
    line_states: Vec<LexState>,
}

impl Scanner {
    /// Create a scanner for `lang`.
    pub fn new(lang: LanguageConfig) -> Self {
        Self {
            lang,
            line_states: vec![LexState::default()],
        }
    }

    /// Active language.
    pub fn language(&self) -> &LanguageConfig {
        &self.lang
    }

    /// Switch language, dropping all memoized state.
    pub fn set_language(&mut self, lang: LanguageConfig) {
        self.lang = lang;
        self.line_states.truncate(1);
    }

    /// Forget the state of every line after `line` (the start state of `line` only depends on
    /// earlier lines).
    pub fn invalidate_from(&mut self, line: usize) {
        self.line_states.truncate(line.saturating_add(1).max(1));
    }

    /// Lexer state at the start of `line`.
    pub fn state_at<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> LexState {
        let line = line.min(doc.line_count().saturating_sub(1));
        while self.line_states.len() <= line {
            let prev = self.line_states.len() - 1;
            let text = doc.line_text(prev).unwrap_or_default();
            let (_, end) = classify_line(&text, &self.lang, self.line_states[prev]);
            self.line_states.push(end);
        }
        self.line_states[line]
    }

    /// Per-char classes of `line`.
    pub fn classify<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> Vec<CharClass> {
        let state = self.state_at(doc, line);
        let text = doc.line_text(line).unwrap_or_default();
        classify_line(&text, &self.lang, state).0
    }

    /// Returns `true` if `line` holds nothing but comment text (and at least some of it), or
    /// starts inside a block comment.
    pub fn is_comment_line<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> bool {
        let state = self.state_at(doc, line);
        if state.in_block_comment {
            return true;
        }
        let text = doc.line_text(line).unwrap_or_default();
        let (classes, _) = classify_line(&text, &self.lang, state);
        let mut saw_comment = false;
        for (ch, class) in text.chars().zip(classes) {
            if ch.is_whitespace() {
                continue;
            }
            if class != CharClass::Comment {
                return false;
            }
            saw_comment = true;
        }
        saw_comment
    }
}
