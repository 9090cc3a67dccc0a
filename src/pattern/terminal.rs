//! Leaf matchers: literal text and single-code-point classes.

use std::rc::Rc;

use anyhow::Result;

use crate::reader::Reader;
use crate::result::{MatchResult, Value};

use super::{Pattern, Transform, transform_then_commit, transform_then_restore};

/// Matches an exact literal, code point by code point.
pub struct TerminalString<V = ()> {
    literal: String,
    transform: Option<Transform<V>>,
}

impl<V> TerminalString<V> {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            transform: None,
        }
    }

    /// Attach a transform callback, consuming self.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&mut MatchResult<V>, &mut Reader<V>) -> Result<()> + 'static,
    ) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }
}

impl<V> Pattern<V> for TerminalString<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        reader.push_state();
        let begin = reader.position();

        for expected in self.literal.chars() {
            if reader.read() != Some(expected) {
                let failure = MatchResult::failure(begin, reader.position());
                return transform_then_restore(self.transform.as_ref(), failure, reader);
            }
        }

        let success = MatchResult::success(begin, reader.position(), Value::Text(reader.string()));
        transform_then_commit(self.transform.as_ref(), success, reader)
    }
}

/// Matches one code point for which `predicate(rune) XOR negated` holds.
pub struct CharacterClass<V = ()> {
    predicate: Box<dyn Fn(char) -> bool>,
    negated: bool,
    transform: Option<Transform<V>>,
}

impl<V> CharacterClass<V> {
    pub fn new(predicate: impl Fn(char) -> bool + 'static, negated: bool) -> Self {
        Self {
            predicate: Box::new(predicate),
            negated,
            transform: None,
        }
    }

    /// Class over the inclusive code-point range `low..=high`.
    pub fn range(low: char, high: char, negated: bool) -> Self {
        Self::new(crate::char_class::range(low, high), negated)
    }

    /// Class over the enumerated code points of `set`.
    pub fn one_of(set: &str, negated: bool) -> Self {
        Self::new(crate::char_class::one_of(set), negated)
    }

    /// Attach a transform callback, consuming self.
    pub fn with_transform(
        mut self,
        transform: impl Fn(&mut MatchResult<V>, &mut Reader<V>) -> Result<()> + 'static,
    ) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }
}

impl<V> Pattern<V> for CharacterClass<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        reader.push_state();
        let begin = reader.position();

        match reader.read() {
            Some(rune) if (self.predicate)(rune) != self.negated => {
                let success =
                    MatchResult::success(begin, reader.position(), Value::Text(reader.string()));
                transform_then_commit(self.transform.as_ref(), success, reader)
            }
            _ => {
                let failure = MatchResult::failure(begin, reader.position());
                transform_then_restore(self.transform.as_ref(), failure, reader)
            }
        }
    }
}
