//! Sentence storage used by the training workflow
//!
//! The server hands out sentences that still need annotations and accepts
//! tagged sentences back. This module defines the records exchanged with it
//! and the [`SentenceStore`] trait, with a REST implementation talking to the
//! real server and an in-memory one for tests and offline use.

use async_trait::async_trait;
use ava_tagger::{SentenceRef, TaggedSentence, TaggingSession};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;
pub use memory::*;

mod rest;
pub use rest::*;

/// A sentence awaiting annotation, as returned by the server.
///
/// An `id` of zero is the server's way of saying no sentence needs work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSentence {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Sentence", default)]
    pub sentence: String,
    #[serde(rename = "ForeignID", default)]
    pub foreign_id: String,
    #[serde(rename = "MaxAssignments", default)]
    pub max_assignments: u32,
}

impl TrainingSentence {
    pub fn new(id: u64, sentence: impl Into<String>) -> Self {
        Self {
            id,
            sentence: sentence.into(),
            ..Default::default()
        }
    }

    pub fn with_foreign_id(mut self, foreign_id: impl Into<String>) -> Self {
        self.foreign_id = foreign_id.into();
        self
    }

    pub fn with_max_assignments(mut self, max_assignments: u32) -> Self {
        self.max_assignments = max_assignments;
        self
    }

    /// True for the "all done" placeholder.
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }

    /// Start a tagging session over this sentence.
    pub fn into_session(self, assignment_id: Option<String>) -> TaggingSession {
        let mut reference = SentenceRef::new(self.id).with_max_assignments(self.max_assignments);
        if !self.foreign_id.is_empty() {
            reference = reference.with_foreign_id(self.foreign_id);
        }
        if let Some(assignment_id) = assignment_id {
            reference = reference.with_assignment(assignment_id);
        }
        TaggingSession::new(reference, &self.sentence)
    }
}

/// Error body returned by the server on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "Msg")]
    pub msg: String,
}

/// Error type for sentence store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a failure status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The response could not be decoded
    #[error("Could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl StoreError {
    /// The text to show a trainer: the server's own message when it sent one.
    pub fn message(&self) -> String {
        match self {
            StoreError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Where training sentences come from and where tagged sentences go.
#[async_trait]
pub trait SentenceStore: Send + Sync {
    /// Fetch a sentence to annotate: the given one, or the next available.
    /// Returns `None` when nothing needs annotating.
    async fn fetch(&self, id: Option<u64>) -> Result<Option<TrainingSentence>, StoreError>;

    /// Store a tagged sentence.
    async fn save(&self, sentence: &TaggedSentence) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> SentenceStore for std::sync::Arc<S>
where
    S: SentenceStore + ?Sized,
{
    async fn fetch(&self, id: Option<u64>) -> Result<Option<TrainingSentence>, StoreError> {
        (**self).fetch(id).await
    }

    async fn save(&self, sentence: &TaggedSentence) -> Result<(), StoreError> {
        (**self).save(sentence).await
    }
}
