//! Ordered choice and sequencing.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::reader::Reader;
use crate::result::{MatchResult, Value};

use super::{
    Pattern, PatternRef, Transform, run_transform, transform_then_commit, transform_then_restore,
};

/// Ordered choice: the first child that matches wins.
///
/// The child list has interior mutability so a grammar can refer to itself:
/// create the alternation empty, reference it from deeper patterns, then
/// fill the children in with [`Alternation::set_patterns`].
pub struct Alternation<V = ()> {
    patterns: RefCell<Vec<PatternRef<V>>>,
    transform: Option<Transform<V>>,
}

impl<V> Alternation<V> {
    pub fn new(patterns: Vec<PatternRef<V>>) -> Self {
        Self {
            patterns: RefCell::new(patterns),
            transform: None,
        }
    }

    /// Replace the child list; the way to tie a recursive grammar's knot.
    pub fn set_patterns(&self, patterns: Vec<PatternRef<V>>) {
        *self.patterns.borrow_mut() = patterns;
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

impl<V> Pattern<V> for Alternation<V> {
    /// Children are tried left to right; each restores the reader itself on
    /// failure, so the alternation pushes no savepoint of its own. The
    /// transform runs only on the adopted successful child result.
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        let begin = reader.position();
        let mut last_partial: Option<MatchResult<V>> = None;

        let count = self.patterns.borrow().len();
        for index in 0..count {
            if reader.finished() {
                break;
            }
            // Clone the handle so no borrow is held across the recursive call.
            let pattern = Rc::clone(&self.patterns.borrow()[index]);
            let mut result = pattern.try_match(reader)?;
            if result.matched {
                run_transform(self.transform.as_ref(), &mut result, reader)?;
                return Ok(result);
            }
            if result.partial {
                last_partial = Some(result);
            }
        }

        let mut failure = MatchResult::failure(begin, reader.position());
        failure.failed = last_partial.map(Box::new);
        Ok(failure)
    }
}

/// Sequence: all children must match in order, or the whole thing rolls back.
pub struct Concatenation<V = ()> {
    patterns: Vec<PatternRef<V>>,
    transform: Option<Transform<V>>,
}

impl<V> Concatenation<V> {
    pub fn new(patterns: Vec<PatternRef<V>>) -> Self {
        Self {
            patterns,
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

impl<V> Pattern<V> for Concatenation<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        reader.push_state();
        let begin = reader.position();
        let mut matches = Vec::with_capacity(self.patterns.len());

        for pattern in &self.patterns {
            let result = match pattern.try_match(reader) {
                Ok(result) => result,
                Err(fatal) => {
                    reader.restore_state();
                    return Err(fatal);
                }
            };
            if !result.matched {
                let mut failure = MatchResult::failure(begin, reader.position());
                failure.partial = !matches.is_empty();
                failure.failed = Some(Box::new(result));
                return transform_then_restore(self.transform.as_ref(), failure, reader);
            }
            matches.push(result);
        }

        let success = MatchResult::success(begin, reader.position(), Value::Matches(matches));
        transform_then_commit(self.transform.as_ref(), success, reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{CharacterClass, TerminalString};
    use anyhow::bail;

    fn reader(text: &str) -> Reader {
        Reader::from_str(text)
    }

    fn literal(text: &str) -> PatternRef {
        Rc::new(TerminalString::new(text))
    }

    // --- Alternation ---

    #[test]
    fn alternation_adopts_second_branch() {
        let choice = Alternation::new(vec![literal("foo"), literal("bar")]);
        let mut r = reader("bar");
        let result = choice.try_match(&mut r).unwrap();
        assert!(result.matched);
        assert_eq!(result.value.text(), Some("bar"));
        assert_eq!(r.position().abs, 3);
    }

    #[test]
    fn alternation_is_ordered_choice() {
        // Both children would match; the first must win.
        let choice = Alternation::new(vec![literal("ab"), literal("abc")]);
        let mut r = reader("abc");
        let result = choice.try_match(&mut r).unwrap();
        assert_eq!(result.value.text(), Some("ab"));
        assert_eq!(r.position().abs, 2);
    }

    #[test]
    fn alternation_failure_keeps_most_recent_partial() {
        let partial_one: PatternRef = Rc::new(Concatenation::new(vec![literal("a"), literal("x")]));
        let partial_two: PatternRef = Rc::new(Concatenation::new(vec![literal("ab"), literal("y")]));
        let choice = Alternation::new(vec![partial_one, partial_two]);
        let mut r = reader("abc");
        let result = choice.try_match(&mut r).unwrap();
        assert!(!result.matched);
        let remembered = result.failed.expect("partial branch remembered");
        assert!(remembered.partial);
        // the second branch got further before failing
        assert_eq!(remembered.failed.unwrap().end.abs, 3);
        assert_eq!(r.position().abs, 0);
    }

    #[test]
    fn alternation_stops_at_end_of_input() {
        let choice = Alternation::new(vec![literal("a")]);
        let mut r = reader("");
        let result = choice.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert!(result.failed.is_none());
    }

    #[test]
    fn alternation_children_can_be_set_late() {
        let choice = Alternation::new(Vec::new());
        choice.set_patterns(vec![literal("x")]);
        let mut r = reader("x");
        assert!(choice.try_match(&mut r).unwrap().matched);
    }

    // --- Concatenation ---

    #[test]
    fn concatenation_collects_child_results() {
        let sequence = Concatenation::new(vec![literal("a"), literal("b")]);
        let mut r = reader("ab");
        let result = sequence.try_match(&mut r).unwrap();
        assert!(result.matched);
        let children = result.value.matches().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].value.text(), Some("b"));
        assert_eq!(result.end.abs, 2);
    }

    #[test]
    fn concatenation_failure_is_partial_after_first_child() {
        let sequence = Concatenation::new(vec![literal("a"), literal("b")]);
        let mut r = reader("ax");
        let result = sequence.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert!(result.partial);
        // failure points at the child that broke the sequence
        let failing = result.failed.unwrap();
        assert_eq!(failing.begin.abs, 1);
        assert_eq!(r.position().abs, 0);
        assert_eq!(r.savepoint_depth(), 1);
    }

    #[test]
    fn concatenation_failure_on_first_child_is_not_partial() {
        let sequence = Concatenation::new(vec![literal("a"), literal("b")]);
        let mut r = reader("xy");
        let result = sequence.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert!(!result.partial);
    }

    #[test]
    fn transforms_run_in_post_order() {
        // The parent transform must observe child values already rewritten.
        let child: PatternRef<String> = Rc::new(TerminalString::new("a").with_transform(|m, _| {
            m.value = Value::Custom("child".to_string());
            Ok(())
        }));
        let parent = Concatenation::new(vec![child]).with_transform(|m, _| {
            let children = m.value.matches().expect("child results");
            let seen = children[0].value.custom().cloned().unwrap_or_default();
            m.value = Value::Custom(format!("parent saw {seen}"));
            Ok(())
        });
        let mut r: Reader<String> = Reader::from_str("a");
        let result = parent.try_match(&mut r).unwrap();
        assert_eq!(result.value.custom().map(String::as_str), Some("parent saw child"));
    }

    #[test]
    fn fatal_child_error_restores_sequence_savepoint() {
        let poisoned: PatternRef =
            Rc::new(TerminalString::new("b").with_transform(|_, _| bail!("poisoned")));
        let sequence = Concatenation::new(vec![literal("a"), poisoned]);
        let mut r = reader("ab");
        assert!(sequence.try_match(&mut r).is_err());
        assert_eq!(r.position().abs, 0);
        assert_eq!(r.savepoint_depth(), 1);
    }

    #[test]
    fn nested_backtracking_is_neutral() {
        let inner: PatternRef = Rc::new(Concatenation::new(vec![
            literal("ab"),
            Rc::new(CharacterClass::range('0', '9', false)),
        ]));
        let outer = Concatenation::new(vec![inner, literal("!")]);
        let mut r = reader("abx!");
        let before = r.position();
        let result = outer.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert_eq!(r.position(), before);
    }
}
