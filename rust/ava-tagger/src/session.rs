//! Tagging session: one annotation pass over one sentence.
//!
//! The session owns the sentence's words, the cursor into
//! [`Category::ALL`] and the save state. All transitions are synchronous;
//! the only asynchronous step, storing the tagged sentence, happens outside
//! the session and reports back through [`TaggingSession::complete_save`] or
//! [`TaggingSession::fail_save`].
//!
//! ## State machine
//!
//! ```text
//!            advance           advance          advance          advance
//! Command ──────────▶ Object ──────────▶ Actor ──────────▶ Time ──────────▶ Place
//!    ◀──────────────     ◀──────────────    ◀──────────────   ◀──────────────  │
//!        retreat            retreat            retreat          retreat        │ advance
//!                                                                              ▼
//!                                                        Saving ──▶ Complete
//!                                                          │
//!                                                          └──▶ Failed(msg) ──advance──▶ Saving
//! ```
//!
//! Advancing from Place does not produce a sixth state. It flips the save
//! state to [`SaveState::Saving`] and hands out the [`TaggedSentence`]
//! payload. Until the save completes or fails, further advances report
//! [`Advance::SaveInProgress`] and no second payload is produced.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::TaggerError;
use crate::word::{Word, tokenize};

/// Identifies the sentence a session annotates and the assignment it
/// belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceRef {
    pub id: u64,
    pub assignment_id: Option<String>,
    pub foreign_id: Option<String>,
    pub max_assignments: u32,
}

impl SentenceRef {
    pub fn new(id: u64) -> Self {
        SentenceRef {
            id,
            ..Default::default()
        }
    }

    pub fn with_assignment(mut self, assignment_id: impl Into<String>) -> Self {
        self.assignment_id = Some(assignment_id.into());
        self
    }

    pub fn with_foreign_id(mut self, foreign_id: impl Into<String>) -> Self {
        self.foreign_id = Some(foreign_id.into());
        self
    }

    pub fn with_max_assignments(mut self, max_assignments: u32) -> Self {
        self.max_assignments = max_assignments;
        self
    }
}

/// The payload submitted when a session is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(
        rename = "AssignmentID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assignment_id: Option<String>,
    #[serde(rename = "ForeignID", default, skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
    #[serde(rename = "Sentence")]
    pub sentence: String,
    #[serde(rename = "MaxAssignments", default)]
    pub max_assignments: u32,
}

/// Where the session stands with respect to saving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing has been submitted yet.
    #[default]
    Idle,
    /// A payload has been handed out and its save has not resolved.
    Saving,
    /// The last save was rejected; the message is the server's.
    Failed(String),
    /// The sentence has been stored.
    Complete,
}

/// The outcome of [`TaggingSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to the given category.
    Moved(Category),
    /// The cursor was at the last category; the payload must be saved.
    Save(TaggedSentence),
    /// A save is already in flight; nothing happened.
    SaveInProgress,
    /// The sentence has already been saved; nothing happened.
    Complete,
}

/// The state of one annotation pass over one sentence.
#[derive(Debug, Clone)]
pub struct TaggingSession {
    sentence: SentenceRef,
    words: Vec<Word>,
    cursor: usize,
    save: SaveState,
}

impl TaggingSession {
    /// Start a pass over `text`, with Command active and every word untagged.
    pub fn new(sentence: SentenceRef, text: &str) -> Self {
        TaggingSession {
            sentence,
            words: tokenize(text),
            cursor: Category::FIRST.index(),
            save: SaveState::Idle,
        }
    }

    pub fn sentence(&self) -> &SentenceRef {
        &self.sentence
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn active(&self) -> Category {
        Category::ALL[self.cursor]
    }

    pub fn save_state(&self) -> &SaveState {
        &self.save
    }

    /// True while a payload is out and its save has not resolved.
    pub fn is_saving(&self) -> bool {
        self.save == SaveState::Saving
    }

    pub fn is_complete(&self) -> bool {
        self.save == SaveState::Complete
    }

    /// The server message of the last failed save, if the last save failed.
    pub fn last_error(&self) -> Option<&str> {
        match &self.save {
            SaveState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the next advance would save rather than move.
    pub fn at_last_category(&self) -> bool {
        self.active() == Category::LAST
    }

    /// Tap the word at `index` under the active category.
    pub fn toggle(&mut self, index: usize) -> Result<&Word, TaggerError> {
        let active = self.active();
        let len = self.words.len();
        let word = self
            .words
            .get_mut(index)
            .ok_or(TaggerError::WordOutOfRange { index, len })?;
        word.toggle(active);
        tracing::trace!(index, tag = ?word.tag, "toggled word");
        Ok(word)
    }

    /// Move to the next category, or hand out the save payload from the last.
    pub fn advance(&mut self) -> Advance {
        match self.save {
            SaveState::Saving => return Advance::SaveInProgress,
            SaveState::Complete => return Advance::Complete,
            SaveState::Idle | SaveState::Failed(_) => {}
        }

        match self.active().next() {
            Some(next) => {
                self.cursor = next.index();
                tracing::debug!(category = %next, "advanced category");
                Advance::Moved(next)
            }
            None => {
                self.save = SaveState::Saving;
                tracing::debug!(sentence = self.sentence.id, "dispatching save");
                Advance::Save(self.tagged_sentence())
            }
        }
    }

    /// Move back one category. Returns the new category, or `None` when
    /// already at the first category or while saving/saved.
    pub fn retreat(&mut self) -> Option<Category> {
        if matches!(self.save, SaveState::Saving | SaveState::Complete) {
            return None;
        }
        let previous = self.active().previous()?;
        self.cursor = previous.index();
        tracing::debug!(category = %previous, "retreated category");
        Some(previous)
    }

    /// Record that the in-flight save was stored.
    pub fn complete_save(&mut self) {
        self.save = SaveState::Complete;
    }

    /// Record that the in-flight save was rejected, so a later advance may
    /// dispatch it again.
    pub fn fail_save(&mut self, message: impl Into<String>) {
        self.save = SaveState::Failed(message.into());
    }

    /// Every word's wrapper in sentence order, each followed by a space.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for word in &self.words {
            out.push_str(&word.wrapper());
            out.push(' ');
        }
        out
    }

    /// The payload for the current state of the session.
    pub fn tagged_sentence(&self) -> TaggedSentence {
        TaggedSentence {
            id: self.sentence.id,
            assignment_id: self.sentence.assignment_id.clone(),
            foreign_id: self.sentence.foreign_id.clone(),
            sentence: self.serialize(),
            max_assignments: self.sentence.max_assignments,
        }
    }
}
