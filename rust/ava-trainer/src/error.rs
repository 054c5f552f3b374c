use ava_tagger::TaggerError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The save was rejected; the message is what the trainer should see.
    #[error("{message}")]
    SaveFailed { message: String },

    #[error(transparent)]
    Tagger(#[from] TaggerError),
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Endpoint '{endpoint}' cannot carry a conversation feed: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Could not open socket to {uri}: {reason}")]
    Connect { uri: String, reason: String },

    #[error("No user id configured for the conversation feed")]
    MissingUserId,

    #[error("Socket error: {0}")]
    Transport(String),
}
