//! Error types for the tagger.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaggerError {
    #[error("word {index} is out of range for a sentence of {len} words")]
    WordOutOfRange { index: usize, len: usize },

    #[error("syntax error in entity '{field}'")]
    SyntaxError { field: String },

    #[error("answer has {answer} words but the reference annotation has {known}")]
    WordCountMismatch { known: usize, answer: usize },
}
