//! Ghost-Text Reconciler.
//!
//! Keeps an inline suggestion in step with typing. Each document change is compared against the
//! previous char count: typing the suggestion's next characters shrinks it, anything else
//! (a mismatching insertion, or a deletion unless the suggestion is persistent) cancels it.
//! A change that keeps the char count (typing over a selection) is judged by the text between
//! the anchor and the new caret.

use crate::document::DocumentSource;

/// Who owns a suggestion. At most one source is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostSource {
    /// An AI-assistant completion.
    Assistant,
    /// A suggestion pushed by the host's controller.
    Controller,
}

/// An inline suggestion anchored at a char offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostText {
    /// Char offset the suggestion is drawn at (the caret when it was shown).
    pub anchor: usize,
    /// Remaining suggestion text.
    pub text: String,
    /// Survives deletions; still cancelled by a mismatching insertion.
    pub persistent: bool,
    /// Owner.
    pub source: GhostSource,
}

impl GhostText {
    /// A non-persistent suggestion.
    pub fn new(anchor: usize, text: impl Into<String>, source: GhostSource) -> Self {
        Self {
            anchor,
            text: text.into(),
            persistent: false,
            source,
        }
    }

    /// Mark the suggestion as persistent.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// Outcome of reconciling a document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GhostUpdate {
    /// Nothing to repaint.
    Unchanged,
    /// The suggestion lost its typed prefix.
    Shrunk,
    /// A persistent suggestion followed the caret through a deletion.
    Moved,
    /// The suggestion was cancelled (or fully typed out).
    Cleared,
}

/// Two-state machine: inactive, or active with one suggestion.
#[derive(Debug, Clone, Default)]
pub struct GhostTextReconciler {
    active: Option<GhostText>,
    last_char_count: Option<usize>,
}

impl GhostTextReconciler {
    /// Create an inactive reconciler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `ghost`, given the document's current char count. Returns the suggestion it
    /// replaced, which may belong to the other source.
    pub fn activate(&mut self, ghost: GhostText, char_count: usize) -> Option<GhostText> {
        let previous = self.active.replace(ghost);
        if let Some(previous) = &previous {
            tracing::debug!(source = ?previous.source, "ghost text replaced");
        }
        self.last_char_count = Some(char_count);
        previous
    }

    /// Drop the suggestion.
    pub fn clear(&mut self) -> Option<GhostText> {
        self.active.take()
    }

    /// The active suggestion.
    pub fn active(&self) -> Option<&GhostText> {
        self.active.as_ref()
    }

    /// Returns `true` if a suggestion is shown.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Reconcile after the document changed, with the caret now at `caret`.
    pub fn on_document_changed<D: DocumentSource + ?Sized>(
        &mut self,
        doc: &D,
        caret: usize,
    ) -> GhostUpdate {
        let count = doc.char_count();
        let previous = self.last_char_count.replace(count).unwrap_or(count);
        let Some(ghost) = self.active.as_mut() else {
            return GhostUpdate::Unchanged;
        };

        let update = if count > previous {
            match caret.checked_sub(count - previous) {
                Some(start) => consume_typed(ghost, &doc.slice(start, caret), caret),
                None => GhostUpdate::Cleared,
            }
        } else if count < previous {
            if ghost.persistent {
                ghost.anchor = caret;
                GhostUpdate::Moved
            } else {
                GhostUpdate::Cleared
            }
        } else if caret > ghost.anchor {
            let typed = doc.slice(ghost.anchor, caret);
            consume_typed(ghost, &typed, caret)
        } else if caret < ghost.anchor {
            GhostUpdate::Cleared
        } else {
            GhostUpdate::Unchanged
        };

        if update == GhostUpdate::Cleared {
            tracing::debug!(caret, "ghost text cancelled");
            self.active = None;
        }
        update
    }
}

/// Drop `typed` from the front of the suggestion, or cancel it if `typed` does not match.
fn consume_typed(ghost: &mut GhostText, typed: &str, caret: usize) -> GhostUpdate {
    if !ghost.text.starts_with(typed) {
        return GhostUpdate::Cleared;
    }
    ghost.text.drain(..typed.len());
    ghost.anchor = caret;
    if ghost.text.is_empty() {
        GhostUpdate::Cleared
    } else {
        GhostUpdate::Shrunk
    }
}
