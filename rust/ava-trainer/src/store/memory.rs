//! In-memory sentence store for testing

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use ava_tagger::TaggedSentence;
use tokio::sync::RwLock;

use super::{SentenceStore, StoreError, TrainingSentence};

#[derive(Debug, Default)]
struct State {
    sentences: Vec<TrainingSentence>,
    saved: Vec<TaggedSentence>,
    rejections: VecDeque<String>,
    fetch_failures: VecDeque<String>,
    cursor: usize,
}

impl State {
    fn is_saved(&self, id: u64) -> bool {
        self.saved.iter().any(|s| s.id == id)
    }
}

/// In-memory sentence store.
///
/// Clones share the same state, so a test can hand one clone to a
/// [`crate::Trainer`] and inspect what was saved through another.
///
/// Fetching without an id cycles through the sentences that have not been
/// saved yet, starting after the one handed out last, so skipping a
/// sentence moves on to the next.
///
/// # Examples
///
/// ```
/// use ava_trainer::store::{MemorySentenceStore, SentenceStore, TrainingSentence};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemorySentenceStore::new();
/// store.add(TrainingSentence::new(1, "find me a wine")).await;
///
/// let sentence = store.fetch(None).await?.unwrap();
/// assert_eq!(sentence.id, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemorySentenceStore {
    state: Arc<RwLock<State>>,
}

impl MemorySentenceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given sentences
    pub async fn with_sentences(sentences: impl IntoIterator<Item = TrainingSentence>) -> Self {
        let store = Self::new();
        for sentence in sentences {
            store.add(sentence).await;
        }
        store
    }

    /// Add a sentence awaiting annotation
    pub async fn add(&self, sentence: TrainingSentence) {
        self.state.write().await.sentences.push(sentence);
    }

    /// Make the next save fail with the given server message
    pub async fn reject_next_save(&self, message: impl Into<String>) {
        self.state.write().await.rejections.push_back(message.into());
    }

    /// Make the next fetch fail with the given server message
    pub async fn fail_next_fetch(&self, message: impl Into<String>) {
        self.state
            .write()
            .await
            .fetch_failures
            .push_back(message.into());
    }

    /// Every tagged sentence stored so far, oldest first
    pub async fn saved(&self) -> Vec<TaggedSentence> {
        self.state.read().await.saved.clone()
    }
}

#[async_trait]
impl SentenceStore for MemorySentenceStore {
    async fn fetch(&self, id: Option<u64>) -> Result<Option<TrainingSentence>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(message) = state.fetch_failures.pop_front() {
            return Err(StoreError::Rejected {
                status: 503,
                message,
            });
        }

        if let Some(id) = id {
            return Ok(state.sentences.iter().find(|s| s.id == id).cloned());
        }

        let count = state.sentences.len();
        for offset in 0..count {
            let index = (state.cursor + offset) % count;
            let candidate = &state.sentences[index];
            if !state.is_saved(candidate.id) {
                let found = candidate.clone();
                state.cursor = index + 1;
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    async fn save(&self, sentence: &TaggedSentence) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if let Some(message) = state.rejections.pop_front() {
            return Err(StoreError::Rejected {
                status: 500,
                message,
            });
        }

        if !state.sentences.iter().any(|s| s.id == sentence.id) {
            return Err(StoreError::Rejected {
                status: 404,
                message: format!("sentence {} not found", sentence.id),
            });
        }

        state.saved.push(sentence.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: u64, sentence: &str) -> TaggedSentence {
        TaggedSentence {
            id,
            assignment_id: None,
            foreign_id: None,
            sentence: sentence.into(),
            max_assignments: 0,
        }
    }

    #[tokio::test]
    async fn fetch_cycles_through_unsaved() {
        let store = MemorySentenceStore::with_sentences([
            TrainingSentence::new(1, "one"),
            TrainingSentence::new(2, "two"),
        ])
        .await;

        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 1);
        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 2);
        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 1);

        store.save(&payload(1, "_N(one) ")).await.unwrap();
        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 2);
        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 2);

        store.save(&payload(2, "_N(two) ")).await.unwrap();
        assert!(store.fetch(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_by_id() {
        let store = MemorySentenceStore::with_sentences([
            TrainingSentence::new(1, "one"),
            TrainingSentence::new(2, "two"),
        ])
        .await;

        assert_eq!(store.fetch(Some(2)).await.unwrap().unwrap().sentence, "two");
        assert!(store.fetch(Some(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejection_is_consumed_once() {
        let store = MemorySentenceStore::with_sentences([TrainingSentence::new(1, "one")]).await;
        store.reject_next_save("try again later").await;

        let error = store.save(&payload(1, "_N(one) ")).await.unwrap_err();
        assert_eq!(error.message(), "try again later");
        assert!(store.saved().await.is_empty());

        store.save(&payload(1, "_N(one) ")).await.unwrap();
        assert_eq!(store.saved().await.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_is_consumed_once() {
        let store = MemorySentenceStore::with_sentences([TrainingSentence::new(1, "one")]).await;
        store.fail_next_fetch("busy").await;

        let error = store.fetch(None).await.unwrap_err();
        assert!(matches!(error, StoreError::Rejected { status: 503, .. }));
        assert_eq!(error.message(), "busy");

        assert_eq!(store.fetch(None).await.unwrap().unwrap().id, 1);
    }

    #[tokio::test]
    async fn save_unknown_sentence_fails() {
        let store = MemorySentenceStore::new();
        let error = store.save(&payload(7, "_N(x) ")).await.unwrap_err();
        assert!(matches!(error, StoreError::Rejected { status: 404, .. }));
    }
}
