//! Composable EBNF-style pattern matching over Unicode code-point streams.
//!
//! Grammars are trees of pattern values sharing one operation,
//! [`Pattern::try_match`], run against a backtrackable [`Reader`]. Every node
//! can carry a transform callback that reshapes its [`MatchResult`] into a
//! domain value, so a grammar doubles as a parser producing source trees.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use runegram::{Alternation, CharacterClass, Concatenation, Pattern, Reader, any};
//!
//! // identifier = letter , { letter | digit } ;
//! let letter = Rc::new(CharacterClass::range('a', 'z', false));
//! let digit = Rc::new(CharacterClass::range('0', '9', false));
//! let tail = any(Rc::new(Alternation::new(vec![letter.clone(), digit])));
//! let identifier = Concatenation::new(vec![letter, Rc::new(tail)]);
//!
//! let mut reader: Reader = Reader::from_str("ab12 rest");
//! let result = identifier.try_match(&mut reader).unwrap();
//! assert!(result.matched);
//! assert_eq!(reader.string_from_result(&result), "ab12");
//! ```
//!
//! Matching failure is a normal value (`matched == false`), never an `Err`;
//! the reader is restored to where the attempt began. The `Err` channel is
//! reserved for fatal conditions raised by transform callbacks.

pub mod char_class;
pub mod json;
pub mod pattern;
mod position;
mod reader;
mod result;

pub use pattern::{
    Alternation, CharacterClass, Concatenation, EndOfInput, Exception, Pattern, PatternRef,
    Repetition, TerminalString, Transform, any, optional,
};
pub use position::Position;
pub use reader::Reader;
pub use result::{MatchResult, Value};
