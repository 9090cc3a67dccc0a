//! Pattern variants of the matching engine.
//!
//! A grammar is a DAG of pattern nodes sharing one operation,
//! [`Pattern::try_match`]. Matching is strictly recursive top-down; a variant
//! that consumes input pushes a reader savepoint at its decision boundary and
//! either commits or rolls back before returning, so a failed attempt never
//! moves the reader.
//!
//! | Variant          | Matches                                           |
//! |------------------|---------------------------------------------------|
//! | `TerminalString` | an exact literal, code point by code point        |
//! | `CharacterClass` | one code point satisfying a predicate (negatable) |
//! | `Alternation`    | the first child that matches (ordered choice)     |
//! | `Concatenation`  | all children in sequence, or rolls back           |
//! | `Repetition`     | a child `min..max` times, greedy                  |
//! | `Exception`      | `must_match`, unless `except` matches first       |
//! | `EndOfInput`     | the position past the last code point             |
//!
//! Every variant carries an optional transform callback that runs after the
//! result is finalized and may rewrite its value or abort the whole parse.

mod compound;
mod except;
mod repeat;
mod terminal;

pub use compound::{Alternation, Concatenation};
pub use except::{EndOfInput, Exception};
pub use repeat::{Repetition, any, optional};
pub use terminal::{CharacterClass, TerminalString};

use std::rc::Rc;

use anyhow::Result;

use crate::reader::Reader;
use crate::result::MatchResult;

/// Anything that can attempt a match against a reader.
///
/// `Ok` carries both outcomes of a normal attempt; `Err` is the out-of-band
/// fatal channel (a transform refusing the parse). A failed attempt leaves
/// the reader where it started.
pub trait Pattern<V = ()> {
    fn try_match(&self, reader: &mut Reader<V>) -> Result<MatchResult<V>>;
}

/// A shareable handle to a pattern node. Sub-patterns are routinely shared
/// by many enclosing patterns, and recursive grammars share cyclically.
pub type PatternRef<V = ()> = Rc<dyn Pattern<V>>;

/// Callback invoked after a pattern finalizes its result.
///
/// May rewrite the result's `value` and `error` freely; returning `Err`
/// aborts the entire match.
pub type Transform<V = ()> = Rc<dyn Fn(&mut MatchResult<V>, &mut Reader<V>) -> Result<()>>;

/// Run a pattern's transform, if it has one.
pub(crate) fn run_transform<V>(
    transform: Option<&Transform<V>>,
    result: &mut MatchResult<V>,
    reader: &mut Reader<V>,
) -> Result<()> {
    match transform {
        Some(transform) => transform(result, reader),
        None => Ok(()),
    }
}

/// Failure path: run the transform while the savepoint is still live, then
/// roll the reader back to it. Fatal transform errors also roll back.
pub(crate) fn transform_then_restore<V>(
    transform: Option<&Transform<V>>,
    mut result: MatchResult<V>,
    reader: &mut Reader<V>,
) -> Result<MatchResult<V>> {
    let outcome = run_transform(transform, &mut result, reader);
    reader.restore_state();
    outcome.map(|_| result)
}

/// Success path: run the transform while the savepoint is still live, then
/// commit. A fatal transform error rolls back instead.
pub(crate) fn transform_then_commit<V>(
    transform: Option<&Transform<V>>,
    mut result: MatchResult<V>,
    reader: &mut Reader<V>,
) -> Result<MatchResult<V>> {
    match run_transform(transform, &mut result, reader) {
        Ok(()) => {
            reader.pop_state();
            Ok(result)
        }
        Err(fatal) => {
            reader.restore_state();
            Err(fatal)
        }
    }
}
