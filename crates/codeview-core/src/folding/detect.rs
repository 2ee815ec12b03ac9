//! On-demand fold region detection.
//!
//! Detectors run for one start line at a time, in a fixed priority order:
//!
//! 1. comment lines never start a fold;
//! 2. template block tags (`{% block %}` ... `{% endblock %}`);
//! 3. markup tags (`<div>` ... `</div>`), excluding void and self-closing elements;
//! 4. the last unmatched opening bracket on the line;
//! 5. indentation blocks opened by a line ending in a block introducer (`:`).
//!
//! The first detector that finds a range with `end_line > start_line + 1` wins. Ranges are never
//! merged across detectors.

use super::{FoldKind, FoldRange};
use crate::brackets::forward_match;
use crate::document::{DocumentSource, Position};
use crate::lexer::{CharClass, Scanner};
use crate::text_metrics::{DEFAULT_TAB_WIDTH, indentation_width, is_blank};
use codeview_lang::LanguageConfig;
use regex::Regex;

const MARKUP_TAG_PATTERN: &str = r"<(/)?([A-Za-z][A-Za-z0-9:._-]*)";

/// A tag occurrence on one line.
#[derive(Debug, Clone)]
struct TagHit {
    column: usize,
    name: String,
    closing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagFlavor {
    Template,
    Markup,
}

/// Stateful detector: owns the lexer scanner and compiled tag patterns for one language.
#[derive(Debug, Clone)]
pub struct FoldDetector {
    scanner: Scanner,
    template_tag: Option<Regex>,
    markup_tag: Option<Regex>,
}

impl FoldDetector {
    /// Create a detector for `lang`.
    pub fn new(lang: LanguageConfig) -> Self {
        let (template_tag, markup_tag) = compile_patterns(&lang);
        Self {
            scanner: Scanner::new(lang),
            template_tag,
            markup_tag,
        }
    }

    /// Active language.
    pub fn language(&self) -> &LanguageConfig {
        self.scanner.language()
    }

    /// Switch language.
    pub fn set_language(&mut self, lang: LanguageConfig) {
        let (template_tag, markup_tag) = compile_patterns(&lang);
        self.template_tag = template_tag;
        self.markup_tag = markup_tag;
        self.scanner.set_language(lang);
    }

    /// The lexer scanner (shared with bracket matching).
    pub fn scanner_mut(&mut self) -> &mut Scanner {
        &mut self.scanner
    }

    /// Forget lexer state for lines after `line`.
    pub fn invalidate_from(&mut self, line: usize) {
        self.scanner.invalidate_from(line);
    }

    /// Detect the fold range starting at `line`, if any.
    pub fn detect<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> Option<FoldRange> {
        if line >= doc.line_count() || self.scanner.is_comment_line(doc, line) {
            return None;
        }

        let min_end = line + 1;
        if let Some(end) = self.tag_fold(doc, line, TagFlavor::Template, min_end) {
            return Some(FoldRange::new(line, end, FoldKind::TemplateTag));
        }
        if let Some(end) = self.tag_fold(doc, line, TagFlavor::Markup, min_end) {
            return Some(FoldRange::new(line, end, FoldKind::MarkupTag));
        }
        if let Some(end) = self.bracket_fold(doc, line).filter(|&end| end > min_end) {
            return Some(FoldRange::new(line, end, FoldKind::Bracket));
        }
        if let Some(end) = self.indent_fold(doc, line).filter(|&end| end > min_end) {
            return Some(FoldRange::new(line, end, FoldKind::Indent));
        }
        None
    }

    fn tag_hits(&self, flavor: TagFlavor, text: &str, classes: &[CharClass]) -> Vec<TagHit> {
        let lang = self.scanner.language();
        let pattern = match flavor {
            TagFlavor::Template => self.template_tag.as_ref(),
            TagFlavor::Markup => self.markup_tag.as_ref(),
        };
        let Some(pattern) = pattern else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let column = text[..whole.start()].chars().count();
            // Tags inside comments or strings are not structure.
            if classes.get(column) != Some(&CharClass::MarkupTag) {
                continue;
            }

            match flavor {
                TagFlavor::Template => {
                    let Some(raw) = caps.get(1).map(|m| m.as_str()) else {
                        continue;
                    };
                    let Some(tags) = lang.template_tags.as_ref() else {
                        continue;
                    };
                    if tags.is_block_tag(raw) {
                        hits.push(TagHit {
                            column,
                            name: raw.to_string(),
                            closing: false,
                        });
                    } else if let Some(inner) = raw.strip_prefix(tags.end_prefix.as_str())
                        && tags.is_block_tag(inner)
                    {
                        hits.push(TagHit {
                            column,
                            name: inner.to_string(),
                            closing: true,
                        });
                    }
                }
                TagFlavor::Markup => {
                    let closing = caps.get(1).is_some();
                    let Some(name) = caps.get(2).map(|m| m.as_str()) else {
                        continue;
                    };
                    if lang.is_void_element(name) {
                        continue;
                    }
                    if !closing && is_self_closing(&text[whole.end()..]) {
                        continue;
                    }
                    hits.push(TagHit {
                        column,
                        name: name.to_ascii_lowercase(),
                        closing,
                    });
                }
            }
        }
        hits
    }

    fn line_tag_hits<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        line: usize,
        flavor: TagFlavor,
    ) -> Vec<TagHit> {
        let classes = self.scanner.classify(doc, line);
        let text = doc.line_text(line).unwrap_or_default();
        self.tag_hits(flavor, &text, &classes)
    }

    /// First opening tag on `line` whose matching end tag lies after `min_end`.
    fn tag_fold<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        line: usize,
        flavor: TagFlavor,
        min_end: usize,
    ) -> Option<usize> {
        let enabled = match flavor {
            TagFlavor::Template => self.template_tag.is_some(),
            TagFlavor::Markup => self.markup_tag.is_some(),
        };
        if !enabled {
            return None;
        }

        let openers: Vec<TagHit> = self
            .line_tag_hits(doc, line, flavor)
            .into_iter()
            .filter(|hit| !hit.closing)
            .collect();
        for opener in openers {
            if let Some(end) = self.match_tag_forward(doc, line, &opener, flavor)
                && end > min_end
            {
                return Some(end);
            }
        }
        None
    }

    /// Scan forward for the end tag of `opener` with an explicit depth counter.
    fn match_tag_forward<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        start_line: usize,
        opener: &TagHit,
        flavor: TagFlavor,
    ) -> Option<usize> {
        let mut depth = 1usize;
        for line in start_line..doc.line_count() {
            for hit in self.line_tag_hits(doc, line, flavor) {
                if line == start_line && hit.column <= opener.column {
                    continue;
                }
                if hit.name != opener.name {
                    continue;
                }
                if hit.closing {
                    depth -= 1;
                    if depth == 0 {
                        return Some(line);
                    }
                } else {
                    depth += 1;
                }
            }
        }
        None
    }

    /// End line of the block opened by the last unmatched bracket on `line`.
    fn bracket_fold<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> Option<usize> {
        let classes = self.scanner.classify(doc, line);
        let text = doc.line_text(line)?;
        let lang = self.scanner.language();

        let mut open_stack: Vec<(usize, char, char)> = Vec::new();
        for (column, (ch, class)) in text.chars().zip(classes).enumerate() {
            if class != CharClass::Code {
                continue;
            }
            if let Some(close) = lang.closing_for(ch) {
                open_stack.push((column, ch, close));
            } else if open_stack.last().is_some_and(|(_, _, close)| *close == ch) {
                open_stack.pop();
            }
        }

        let (column, open, close) = open_stack.pop()?;
        let end = forward_match(
            doc,
            &mut self.scanner,
            Position::new(line, column),
            open,
            close,
            None,
        )?;
        Some(end.line)
    }

    /// Last line of the indentation block introduced by `line`.
    fn indent_fold<D: DocumentSource + ?Sized>(&mut self, doc: &D, line: usize) -> Option<usize> {
        let text = doc.line_text(line)?;
        let trimmed = text.trim_end();
        let introduced = self
            .scanner
            .language()
            .block_introducers
            .iter()
            .any(|token| !token.is_empty() && trimmed.ends_with(token.as_str()));
        if !introduced {
            return None;
        }

        // The introducer itself must be code (not `# note:` in a comment).
        let last_column = trimmed.chars().count().checked_sub(1)?;
        let classes = self.scanner.classify(doc, line);
        if classes.get(last_column) != Some(&CharClass::Code) {
            return None;
        }

        let base = indentation_width(&text, DEFAULT_TAB_WIDTH);
        let mut end = None;
        for next in line + 1..doc.line_count() {
            let next_text = doc.line_text(next).unwrap_or_default();
            if is_blank(&next_text) {
                continue;
            }
            if indentation_width(&next_text, DEFAULT_TAB_WIDTH) > base {
                end = Some(next);
            } else {
                break;
            }
        }
        end
    }
}

fn compile_patterns(lang: &LanguageConfig) -> (Option<Regex>, Option<Regex>) {
    let template = lang.template_tags.as_ref().and_then(|tags| {
        Regex::new(&format!(r"{}[-+]?\s*(\w+)", regex::escape(&tags.open))).ok()
    });
    let markup = if lang.markup_tags {
        Regex::new(MARKUP_TAG_PATTERN).ok()
    } else {
        None
    };
    (template, markup)
}

/// `rest` is the text after a tag name; the tag self-closes if its `>` is preceded by `/`.
fn is_self_closing(rest: &str) -> bool {
    rest.find('>')
        .is_some_and(|idx| rest[..idx].trim_end().ends_with('/'))
}

/// Detect the fold range starting at `line` for `lang`.
///
/// Convenience wrapper that builds a throwaway [`FoldDetector`]; the engine keeps a long-lived
/// one so lexer state is memoized across queries.
pub fn detect_fold_at<D: DocumentSource + ?Sized>(
    doc: &D,
    line: usize,
    lang: &LanguageConfig,
) -> Option<FoldRange> {
    FoldDetector::new(lang.clone()).detect(doc, line)
}
