//! Greedy repetition with inclusive bounds.

use std::rc::Rc;

use anyhow::Result;

use crate::reader::Reader;
use crate::result::{MatchResult, Value};

use super::{Pattern, PatternRef, Transform, transform_then_commit, transform_then_restore};

/// Matches the child `min..=max` times; `max = 0` means no upper bound.
///
/// Repetition is greedy and never gives a successful consumption back to
/// satisfy an enclosing pattern.
pub struct Repetition<V = ()> {
    pattern: PatternRef<V>,
    min: usize,
    max: usize,
    transform: Option<Transform<V>>,
}

impl<V> Repetition<V> {
    pub fn new(pattern: PatternRef<V>, min: usize, max: usize) -> Self {
        Self {
            pattern,
            min,
            max,
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

/// The child zero or one time.
pub fn optional<V>(pattern: PatternRef<V>) -> Repetition<V> {
    Repetition::new(pattern, 0, 1)
}

/// The child any number of times, including none.
pub fn any<V>(pattern: PatternRef<V>) -> Repetition<V> {
    Repetition::new(pattern, 0, 0)
}

impl<V> Pattern<V> for Repetition<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        reader.push_state();
        let begin = reader.position();
        let mut matches = Vec::new();
        let mut last_failure = None;

        while !reader.finished() {
            let result = match self.pattern.try_match(reader) {
                Ok(result) => result,
                Err(fatal) => {
                    reader.restore_state();
                    return Err(fatal);
                }
            };
            if !result.matched {
                last_failure = Some(result);
                break;
            }
            matches.push(result);
            if self.max > 0 && matches.len() == self.max {
                break;
            }
        }

        if matches.len() < self.min {
            let mut failure = MatchResult::failure(begin, reader.position());
            failure.error = Some(format!("expected minimum of {} repetitions", self.min));
            failure.failed = last_failure.map(Box::new);
            return transform_then_restore(self.transform.as_ref(), failure, reader);
        }

        let success = MatchResult::success(begin, reader.position(), Value::Matches(matches));
        transform_then_commit(self.transform.as_ref(), success, reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{CharacterClass, Concatenation, TerminalString};

    fn reader(text: &str) -> Reader {
        Reader::from_str(text)
    }

    fn digit() -> PatternRef {
        Rc::new(CharacterClass::range('0', '9', false))
    }

    #[test]
    fn unbounded_repetition_consumes_longest_prefix() {
        let digits = Repetition::new(digit(), 2, 0);
        let mut r = reader("12ab");
        let result = digits.try_match(&mut r).unwrap();
        assert!(result.matched);
        assert_eq!(result.value.matches().unwrap().len(), 2);
        assert_eq!(r.position().abs, 2);
    }

    #[test]
    fn repetition_below_minimum_fails_with_message() {
        let digits = Repetition::new(digit(), 2, 0);
        let mut r = reader("1ab");
        let result = digits.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert_eq!(
            result.error.as_deref(),
            Some("expected minimum of 2 repetitions")
        );
        // the failing child attempt is kept for diagnostics
        assert!(result.failed.is_some());
        assert_eq!(r.position().abs, 0);
        assert_eq!(r.savepoint_depth(), 1);
    }

    #[test]
    fn minimum_unmet_by_end_of_input_has_no_failed_child() {
        let digits = Repetition::new(digit(), 3, 0);
        let mut r = reader("12");
        let result = digits.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert!(result.failed.is_none());
    }

    #[test]
    fn maximum_stops_consumption() {
        let digits = Repetition::new(digit(), 1, 2);
        let mut r = reader("1234");
        let result = digits.try_match(&mut r).unwrap();
        assert!(result.matched);
        assert_eq!(result.value.matches().unwrap().len(), 2);
        assert_eq!(r.position().abs, 2);
    }

    #[test]
    fn optional_matches_zero_or_one() {
        let sign = || optional::<()>(Rc::new(TerminalString::new("-")));
        let mut r = reader("-5");
        let result = sign().try_match(&mut r).unwrap();
        assert_eq!(result.value.matches().unwrap().len(), 1);
        assert_eq!(r.position().abs, 1);

        let mut r = reader("5");
        let result = sign().try_match(&mut r).unwrap();
        assert!(result.matched);
        assert!(result.value.matches().unwrap().is_empty());
        assert_eq!(r.position().abs, 0);
    }

    #[test]
    fn any_matches_empty_input() {
        let mut r = reader("");
        let result = any(digit()).try_match(&mut r).unwrap();
        assert!(result.matched);
        assert!(result.value.matches().unwrap().is_empty());
    }

    #[test]
    fn greedy_repetition_does_not_give_back() {
        // any(digit) swallows all digits, so the trailing digit can't match.
        let grammar = Concatenation::new(vec![
            Rc::new(any(digit())) as PatternRef,
            digit(),
        ]);
        let mut r = reader("123");
        let result = grammar.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert!(result.partial);
        assert_eq!(r.position().abs, 0);
    }
}
