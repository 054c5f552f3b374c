//! Grammatical categories a trainer assigns to words.
//!
//! The categories mirror the structured input Ava's language layer works
//! with: what to do (command), what to do it to (object), who is involved
//! (actor), when (time) and where (place). Trainers visit them in a fixed
//! order, so the order itself is part of the type: [`Category::ALL`] is
//! indexed by the session cursor and [`Category::next`] /
//! [`Category::previous`] walk it.
//!
//! Each category serializes as a one-letter wrapper around the word it tags:
//!
//! ```text
//! Command → _C(find)    Object → _O(wine)    Actor → _A(bob)
//! Time    → _T(noon)    Place  → _P(nearby)
//! ```
//!
//! Untagged words use `_N`, which is not a category (see
//! [`crate::annotation::EntityClass`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grammatical role a word can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// The verb of the sentence: "Find", "Walk", "Meet".
    Command,
    /// The direct object.
    Object,
    /// Often the indirect object: who the command involves.
    Actor,
    /// Every Tuesday, noon, tomorrow.
    Time,
    /// Where the event should take place: Starbucks, nearby.
    Place,
}

impl Category {
    /// Every category, in the order trainers visit them.
    pub const ALL: [Category; 5] = [
        Category::Command,
        Category::Object,
        Category::Actor,
        Category::Time,
        Category::Place,
    ];

    /// The category a tagging pass starts with.
    pub const FIRST: Category = Category::Command;

    /// The category after which advancing saves the sentence.
    pub const LAST: Category = Category::Place;

    /// Position of this category in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Command => 0,
            Self::Object => 1,
            Self::Actor => 2,
            Self::Time => 3,
            Self::Place => 4,
        }
    }

    /// The category at `index` in visiting order.
    pub fn from_index(index: usize) -> Option<Category> {
        Self::ALL.get(index).copied()
    }

    /// The following category, or `None` at [`Category::LAST`].
    pub fn next(self) -> Option<Category> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding category, or `None` at [`Category::FIRST`].
    pub fn previous(self) -> Option<Category> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// The letter used in the serialized wrapper, e.g. `C` in `_C(find)`.
    pub fn initial(self) -> char {
        match self {
            Self::Command => 'C',
            Self::Object => 'O',
            Self::Actor => 'A',
            Self::Time => 'T',
            Self::Place => 'P',
        }
    }

    /// Inverse of [`Category::initial`].
    pub fn from_initial(initial: char) -> Option<Category> {
        Self::ALL.into_iter().find(|category| category.initial() == initial)
    }

    /// Wrap a word value in this category's tag.
    pub fn wrap(self, value: &str) -> String {
        format!("_{}({})", self.initial(), value)
    }

    /// Upper-case plural heading shown to the trainer ("Tap the COMMANDS").
    pub fn heading(self) -> &'static str {
        match self {
            Self::Command => "COMMANDS",
            Self::Object => "OBJECTS",
            Self::Actor => "ACTORS",
            Self::Time => "TIMES",
            Self::Place => "PLACES",
        }
    }

    /// Highlight color for words tagged with this category.
    pub fn color(self) -> &'static str {
        match self {
            Self::Command => "red",
            Self::Object => "blue",
            Self::Actor => "green",
            Self::Time => "yellow",
            Self::Place => "pink",
        }
    }

    pub fn help_title(self) -> &'static str {
        match self {
            Self::Command => "What is a command?",
            Self::Object => "What is an object?",
            Self::Actor => "What is an actor?",
            Self::Time => "What are times?",
            Self::Place => "What are places?",
        }
    }

    pub fn help_body(self) -> &'static str {
        match self {
            Self::Command => r#"A command is a verb, like "Find," "Walk," or "Meet.""#,
            Self::Object => "Objects are the direct objects of the sentence.",
            Self::Actor => "Actors are often the indirect objects of the sentence.",
            Self::Time => "Every Tuesday. Noon. Friday. Tomorrow. This Wednesday. Etc.",
            Self::Place => {
                "A place is any description of where an event should take place. Starbucks. Nearby. Etc."
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Object => write!(f, "object"),
            Self::Actor => write!(f, "actor"),
            Self::Time => write!(f, "time"),
            Self::Place => write!(f, "place"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_by_position() {
        for (position, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), position);
            assert_eq!(Category::from_index(position), Some(category));
        }
        assert_eq!(Category::from_index(5), None);
    }

    #[test]
    fn walking_forward_visits_every_category_once() {
        let mut visited = vec![Category::FIRST];
        while let Some(next) = visited.last().and_then(|c| c.next()) {
            visited.push(next);
        }
        assert_eq!(visited, Category::ALL.to_vec());
        assert_eq!(Category::LAST.next(), None);
    }

    #[test]
    fn first_has_no_previous() {
        assert_eq!(Category::FIRST.previous(), None);
        assert_eq!(Category::Object.previous(), Some(Category::Command));
        assert_eq!(Category::Place.previous(), Some(Category::Time));
    }

    #[test]
    fn wrap_uses_initial() {
        assert_eq!(Category::Command.wrap("find"), "_C(find)");
        assert_eq!(Category::Place.wrap("nearby"), "_P(nearby)");
    }

    #[test]
    fn initials_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_initial(category.initial()), Some(category));
        }
        assert_eq!(Category::from_initial('N'), None);
        assert_eq!(Category::from_initial('?'), None);
    }
}
