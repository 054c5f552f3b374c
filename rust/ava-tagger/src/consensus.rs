//! Agreement between a trainer's answer and a reference annotation.
//!
//! Each sentence is sent to several trainers. Before an answer is trusted it
//! is compared with an annotation already known for the same sentence: if
//! every word the reference is sure about carries the same class in the
//! answer, the answer is accepted as a whole. Words the reference marks
//! `_?` act as a captcha wildcard and are not compared.

use crate::annotation::{EntityClass, parse_wrapper};
use crate::error::TaggerError;

/// Result of comparing an answer to a reference annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    /// Every word the reference is sure about matches.
    Agree,
    /// The first word, by position, whose class differs.
    Disagree {
        position: usize,
        known: EntityClass,
        answer: EntityClass,
    },
}

impl Consensus {
    pub fn is_agreement(&self) -> bool {
        matches!(self, Consensus::Agree)
    }
}

/// Compare `answer` with the reference annotation `known`.
///
/// Both are tagged sentences in wrapper form. A word-count mismatch is an
/// error rather than a disagreement: the two cannot be about the same
/// sentence.
///
/// Fields are decoded as the comparison reaches them. An answer field at a
/// position the reference marks unsure is never read, and nothing after the
/// first disagreement is read, so syntax errors there go unreported.
pub fn check_consensus(known: &str, answer: &str) -> Result<Consensus, TaggerError> {
    let known: Vec<&str> = known.split_whitespace().collect();
    let answer: Vec<&str> = answer.split_whitespace().collect();

    if known.len() != answer.len() {
        return Err(TaggerError::WordCountMismatch {
            known: known.len(),
            answer: answer.len(),
        });
    }

    for (position, (known_field, answer_field)) in known.iter().zip(&answer).enumerate() {
        let (_, known_class) = parse_wrapper(known_field)?;
        if known_class == EntityClass::Unsure {
            continue;
        }

        let (_, answer_class) = parse_wrapper(answer_field)?;
        if known_class != answer_class {
            tracing::debug!(position, %known_class, %answer_class, "annotations disagree");
            return Ok(Consensus::Disagree {
                position,
                known: known_class,
                answer: answer_class,
            });
        }
    }

    Ok(Consensus::Agree)
}
