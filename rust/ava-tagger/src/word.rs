//! Words of a sentence under annotation.
//!
//! A sentence is split on whitespace into [`Word`]s when a tagging session
//! starts. Words are never split, merged or removed afterwards; the only
//! thing that changes is the tag each one carries.
//!
//! ```text
//! "find me a wine"
//!   → Word { value: "find", position: 0, tag: None }
//!     Word { value: "me",   position: 1, tag: None }
//!     Word { value: "a",    position: 2, tag: None }
//!     Word { value: "wine", position: 3, tag: None }
//! ```

use std::fmt;

use crate::category::Category;

/// Wrapper letter for an untagged word.
pub const UNTAGGED_INITIAL: char = 'N';

/// A single whitespace-delimited token of the sentence being tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The token exactly as it appeared in the sentence.
    pub value: String,
    /// Zero-based position in the sentence.
    pub position: usize,
    /// The category assigned by the trainer, if any.
    pub tag: Option<Category>,
}

impl Word {
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        Word {
            value: value.into(),
            position,
            tag: None,
        }
    }

    /// Tap the word while `active` is the current category.
    ///
    /// An untagged word takes `active`; a tagged word is cleared no matter
    /// which category it carries. Returns the tag after the toggle.
    pub fn toggle(&mut self, active: Category) -> Option<Category> {
        self.tag = match self.tag {
            None => Some(active),
            Some(_) => None,
        };
        self.tag
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    /// The serialized form: `_C(find)` when tagged, `_N(find)` otherwise.
    pub fn wrapper(&self) -> String {
        match self.tag {
            Some(category) => category.wrap(&self.value),
            None => format!("_{}({})", UNTAGGED_INITIAL, self.value),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wrapper())
    }
}

/// Split a sentence into untagged words.
///
/// Runs of whitespace count as a single separator and leading or trailing
/// whitespace produces no empty words.
pub fn tokenize(sentence: &str) -> Vec<Word> {
    sentence
        .split_whitespace()
        .enumerate()
        .map(|(position, value)| Word::new(value, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_simple_sentence() {
        let words = tokenize("find me a wine");
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].value, "find");
        assert_eq!(words[3].value, "wine");
        assert_eq!(words[3].position, 3);
        assert!(words.iter().all(|w| !w.is_tagged()));
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        let words = tokenize("  meet  Bob\tat\nnoon ");
        let values: Vec<&str> = words.iter().map(|w| w.value.as_str()).collect();
        assert_eq!(values, vec!["meet", "Bob", "at", "noon"]);
    }

    #[test]
    fn tokenize_preserves_case_and_punctuation() {
        let words = tokenize("Where's Starbucks?");
        assert_eq!(words[0].value, "Where's");
        assert_eq!(words[1].value, "Starbucks?");
    }

    #[test]
    fn toggle_twice_restores_untagged() {
        let mut word = Word::new("find", 0);
        assert_eq!(word.toggle(Category::Command), Some(Category::Command));
        assert_eq!(word.wrapper(), "_C(find)");
        assert_eq!(word.toggle(Category::Command), None);
        assert_eq!(word.wrapper(), "_N(find)");
    }

    #[test]
    fn toggle_under_another_category_clears() {
        let mut word = Word::new("wine", 3);
        word.toggle(Category::Command);
        assert_eq!(word.toggle(Category::Object), None);
        assert_eq!(word.toggle(Category::Object), Some(Category::Object));
        assert_eq!(word.wrapper(), "_O(wine)");
    }
}
