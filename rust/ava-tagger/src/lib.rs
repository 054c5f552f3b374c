//! # Ava Tagger: Sentence Annotation for Classifier Training
//!
//! Ava learns to read commands from sentences that human trainers have
//! annotated word by word. A trainer walks a fixed sequence of grammatical
//! categories and, for each one, taps the words of the sentence that belong
//! to it. The finished annotation is a tagged sentence such as
//! `_C(find) _N(me) _N(a) _O(wine) ` which the server uses as training data.
//!
//! ## Core Ideas
//!
//! - **Categories are a closed, ordered set**: Command, Object, Actor, Time
//!   and Place. The active category is a cursor into that order, never a
//!   free-form string.
//! - **Words toggle**: tapping an untagged word tags it with the active
//!   category; tapping a tagged word clears it.
//! - **Saving is part of the state machine**: advancing past the last
//!   category hands out the submission payload exactly once, and the session
//!   refuses to hand out another until the first has completed or failed.
//! - **No I/O**: this crate only models state. Fetching and storing
//!   sentences lives in `ava-trainer`.
//!
//! ## Workflow
//!
//! ```text
//! Sentence → tokenize → TaggingSession
//!   → toggle words / advance / retreat
//!     → advance past Place → TaggedSentence (payload)
//!       → complete_save | fail_save(message)
//! ```
//!
//! ```
//! use ava_tagger::{Advance, Category, SentenceRef, TaggingSession};
//!
//! let mut session = TaggingSession::new(SentenceRef::new(7), "find me a wine");
//! session.toggle(0).unwrap();
//! assert_eq!(session.advance(), Advance::Moved(Category::Object));
//! session.toggle(3).unwrap();
//! assert_eq!(session.serialize(), "_C(find) _N(me) _N(a) _O(wine) ");
//! ```

pub mod annotation;
pub mod category;
pub mod consensus;
pub mod error;
pub mod session;
pub mod word;

pub use annotation::{EntityClass, parse_annotation, parse_wrapper};
pub use category::Category;
pub use consensus::{Consensus, check_consensus};
pub use error::TaggerError;
pub use session::{Advance, SaveState, SentenceRef, TaggedSentence, TaggingSession};
pub use word::{Word, tokenize};
