//! Exclusion and end-of-input matchers.

use std::rc::Rc;

use anyhow::Result;

use crate::reader::Reader;
use crate::result::{MatchResult, Value};

use super::{Pattern, PatternRef, Transform, run_transform, transform_then_restore};

/// Matches whatever `must_match` matches, but only where `except` does not
/// match first. The EBNF `-` operator.
pub struct Exception<V = ()> {
    must_match: PatternRef<V>,
    except: PatternRef<V>,
    transform: Option<Transform<V>>,
}

impl<V> Exception<V> {
    pub fn new(must_match: PatternRef<V>, except: PatternRef<V>) -> Self {
        Self {
            must_match,
            except,
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

impl<V> Pattern<V> for Exception<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        reader.push_state();
        let begin = reader.position();

        let excluded = match self.except.try_match(reader) {
            Ok(result) => result,
            Err(fatal) => {
                reader.restore_state();
                return Err(fatal);
            }
        };
        if excluded.matched {
            let mut failure = MatchResult::failure(begin, reader.position());
            failure.failed = Some(Box::new(excluded));
            return transform_then_restore(self.transform.as_ref(), failure, reader);
        }

        // The excluded pattern restored itself; nothing left to guard.
        reader.pop_state();
        let mut result = self.must_match.try_match(reader)?;
        run_transform(self.transform.as_ref(), &mut result, reader)?;
        Ok(result)
    }
}

/// Matches only the position past the last code point; never advances.
pub struct EndOfInput<V = ()> {
    transform: Option<Transform<V>>,
}

impl<V> EndOfInput<V> {
    pub fn new() -> Self {
        Self { transform: None }
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

impl<V> Default for EndOfInput<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Pattern<V> for EndOfInput<V> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>> {
        let position = reader.position();
        let mut result = if reader.finished() {
            MatchResult::success(position, position, Value::None)
        } else {
            MatchResult::failure(position, position)
        };
        run_transform(self.transform.as_ref(), &mut result, reader)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{CharacterClass, TerminalString};

    fn reader(text: &str) -> Reader {
        Reader::from_str(text)
    }

    fn visible() -> PatternRef {
        Rc::new(CharacterClass::new(|rune| !rune.is_control(), false))
    }

    fn quote() -> PatternRef {
        Rc::new(TerminalString::new("\""))
    }

    // --- Exception ---

    #[test]
    fn exception_matches_when_excluded_fails() {
        let pattern = Exception::new(visible(), quote());
        let mut r = reader("a");
        let result = pattern.try_match(&mut r).unwrap();
        assert!(result.matched);
        assert_eq!(result.value.text(), Some("a"));
        assert_eq!(r.position().abs, 1);
    }

    #[test]
    fn exception_fails_when_excluded_matches() {
        let pattern = Exception::new(visible(), quote());
        let mut r = reader("\"");
        let result = pattern.try_match(&mut r).unwrap();
        assert!(!result.matched);
        // the failure links to the excluded pattern's own result
        assert!(result.failed.unwrap().matched);
        assert_eq!(r.position().abs, 0);
        assert_eq!(r.savepoint_depth(), 1);
    }

    #[test]
    fn exception_advances_only_what_must_match_consumes() {
        let pattern = Exception::new(
            Rc::new(TerminalString::new("ab")) as PatternRef,
            Rc::new(TerminalString::new("abc")) as PatternRef,
        );
        let mut r = reader("abd");
        let result = pattern.try_match(&mut r).unwrap();
        assert!(result.matched);
        assert_eq!(r.position().abs, 2);
    }

    #[test]
    fn exception_fails_when_must_match_fails() {
        let pattern = Exception::new(quote(), Rc::new(TerminalString::new("x")) as PatternRef);
        let mut r = reader("y");
        let result = pattern.try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert_eq!(r.position().abs, 0);
        assert_eq!(r.savepoint_depth(), 1);
    }

    // --- EndOfInput ---

    #[test]
    fn end_of_input_matches_only_at_end() {
        let mut r = reader("");
        assert!(EndOfInput::new().try_match(&mut r).unwrap().matched);

        let mut r = reader("a");
        let result = EndOfInput::new().try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert_eq!(r.position().abs, 0);
    }

    #[test]
    fn end_of_input_never_advances() {
        let mut r = reader("ab");
        r.read();
        let result = EndOfInput::new().try_match(&mut r).unwrap();
        assert!(!result.matched);
        assert_eq!(result.begin.abs, 1);
        assert_eq!(result.end.abs, 1);
        assert_eq!(r.position().abs, 1);
    }
}
