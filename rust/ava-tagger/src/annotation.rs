//! Reading tagged sentences back.
//!
//! The server stores annotations in the same wrapper format the session
//! serializes to, and reference annotations may additionally mark a word as
//! `_?` when the reference itself is unsure. Parsing is lenient in the same
//! places the classifier's reader is: trailing punctuation is ignored and a
//! bare word without a wrapper is accepted as unannotated.

use std::fmt;

use crate::category::Category;
use crate::error::TaggerError;
use crate::word::UNTAGGED_INITIAL;

/// Wrapper letter for a word whose class the reference annotation leaves open.
pub const UNSURE_INITIAL: char = '?';

/// Characters ignored at the end of a field.
const TRAILING: &[char] = &[')', '.', ',', ';', '?', '!', ':'];

/// The class decoded from one field of a tagged sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// Tagged with a category: `_C`, `_O`, `_A`, `_T`, `_P`.
    Category(Category),
    /// Explicitly untagged: `_N`.
    None,
    /// Left open by a reference annotation: `_?`.
    Unsure,
    /// A bare word with no wrapper at all.
    Unannotated,
}

impl From<Option<Category>> for EntityClass {
    fn from(tag: Option<Category>) -> Self {
        match tag {
            Some(category) => EntityClass::Category(category),
            None => EntityClass::None,
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => write!(f, "{}", category),
            Self::None => write!(f, "none"),
            Self::Unsure => write!(f, "unsure"),
            Self::Unannotated => write!(f, "unannotated"),
        }
    }
}

/// Decode a single field such as `_C(find)` into its value and class.
pub fn parse_wrapper(field: &str) -> Result<(String, EntityClass), TaggerError> {
    let trimmed = field.trim_end_matches(TRAILING);

    let mut chars = trimmed.chars();
    if trimmed.chars().count() <= 1 || chars.next() != Some('_') {
        return Ok((trimmed.to_string(), EntityClass::Unannotated));
    }

    let syntax_error = || TaggerError::SyntaxError {
        field: field.to_string(),
    };

    let class = match chars.next() {
        Some(UNTAGGED_INITIAL) => EntityClass::None,
        Some(UNSURE_INITIAL) => EntityClass::Unsure,
        Some(initial) => Category::from_initial(initial)
            .map(EntityClass::Category)
            .ok_or_else(syntax_error)?,
        None => return Err(syntax_error()),
    };

    if chars.next() != Some('(') {
        return Err(syntax_error());
    }

    Ok((chars.as_str().to_string(), class))
}

/// Decode every field of a tagged sentence, in order.
pub fn parse_annotation(text: &str) -> Result<Vec<(String, EntityClass)>, TaggerError> {
    text.split_whitespace().map(parse_wrapper).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SentenceRef, TaggingSession};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    #[test]
    fn parses_each_class() -> TestResult {
        assert_eq!(
            parse_wrapper("_C(find)")?,
            ("find".to_string(), EntityClass::Category(Category::Command))
        );
        assert_eq!(
            parse_wrapper("_P(starbucks)")?,
            ("starbucks".to_string(), EntityClass::Category(Category::Place))
        );
        assert_eq!(parse_wrapper("_N(me)")?, ("me".to_string(), EntityClass::None));
        assert_eq!(
            parse_wrapper("_?(it)")?,
            ("it".to_string(), EntityClass::Unsure)
        );
        Ok(())
    }

    #[test]
    fn trailing_punctuation_is_ignored() -> TestResult {
        assert_eq!(
            parse_wrapper("_T(noon.),")?,
            ("noon".to_string(), EntityClass::Category(Category::Time))
        );
        assert_eq!(
            parse_wrapper("tomorrow?")?,
            ("tomorrow".to_string(), EntityClass::Unannotated)
        );
        Ok(())
    }

    #[test]
    fn bare_words_are_unannotated() -> TestResult {
        assert_eq!(parse_wrapper("a")?, ("a".to_string(), EntityClass::Unannotated));
        assert_eq!(parse_wrapper("_")?, ("_".to_string(), EntityClass::Unannotated));
        assert_eq!(
            parse_wrapper("wine")?,
            ("wine".to_string(), EntityClass::Unannotated)
        );
        Ok(())
    }

    #[test]
    fn unknown_class_is_a_syntax_error() {
        assert_eq!(
            parse_wrapper("_X(find)"),
            Err(TaggerError::SyntaxError {
                field: "_X(find)".to_string()
            })
        );
        assert!(parse_wrapper("_Cfind").is_err());
    }

    #[test]
    fn parsing_recovers_session_tags() -> TestResult {
        let mut session = TaggingSession::new(SentenceRef::new(1), "meet bob at noon");
        session.toggle(0)?;
        session.advance();
        session.advance();
        session.toggle(1)?;
        session.advance();
        session.toggle(3)?;

        let parsed = parse_annotation(&session.serialize())?;
        let expected: Vec<(String, EntityClass)> = session
            .words()
            .iter()
            .map(|w| (w.value.clone(), EntityClass::from(w.tag)))
            .collect();
        assert_eq!(parsed, expected);
        assert_eq!(parsed[1].1, EntityClass::Category(Category::Actor));
        Ok(())
    }
}
