//! # Ava Trainer
//!
//! The networked half of Ava's training tools. Trainers annotate sentences
//! for the classifier and watch live conversations so they can spot what
//! Ava gets wrong.
//!
//! ## Features
//!
//! - **Sentence store**: fetch sentences needing annotation and submit tagged
//!   ones, over the server's REST API or an in-memory store for tests
//! - **Training workflow**: drive a [`ava_tagger::TaggingSession`] through
//!   fetch, tagging and save, with at most one save in flight
//! - **Conversation feed**: a socket that appends incoming chat messages to a
//!   log and reconnects on a fixed delay when it drops
//! - **Terminal front end**: the `ava-trainer` binary
//!
//! ## Usage
//!
//! ```bash
//! ava-trainer --endpoint https://ava.example.com tag
//! ava-trainer --endpoint https://ava.example.com feed --user-id 42
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod store;
pub mod terminal;
pub mod trainer;

pub use config::{AuthMethod, TrainerConfig};
pub use error::{FeedError, TrainerError};
pub use feed::{
    Connector, ConversationFeed, FeedEvent, FeedMessage, FeedState, MessageLog,
    WebSocketConnector, feed_uri,
};
pub use store::{
    MemorySentenceStore, RestSentenceStore, SentenceStore, StoreError, TrainingSentence,
};
pub use trainer::{Progress, SessionHandle, Trainer};
