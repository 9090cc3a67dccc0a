//! Match results produced by pattern attempts.
//!
//! Every pattern attempt yields a [`MatchResult`], whether it matched or not.
//! A failed attempt is a normal value, never an `Err`; enclosing patterns
//! decide what to do with it.

use crate::position::Position;

/// The structured payload of a match.
///
/// The engine fills this in per pattern variant; transform callbacks may
/// overwrite it with a [`Value::Custom`] of the user's own type `V`.
#[derive(Debug, Clone)]
pub enum Value<V = ()> {
    /// No payload (failures, end-of-input).
    None,
    /// The literal matched text (terminal strings and character classes).
    Text(String),
    /// Ordered child results (concatenation and repetition).
    Matches(Vec<MatchResult<V>>),
    /// A user value written by a transform callback.
    Custom(V),
}

impl<V> Default for Value<V> {
    fn default() -> Self {
        Value::None
    }
}

impl<V> Value<V> {
    /// The matched text, if this is a [`Value::Text`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The child results, if this is a [`Value::Matches`].
    pub fn matches(&self) -> Option<&[MatchResult<V>]> {
        match self {
            Value::Matches(matches) => Some(matches),
            _ => None,
        }
    }

    /// The child results by value, if this is a [`Value::Matches`].
    pub fn into_matches(self) -> Option<Vec<MatchResult<V>>> {
        match self {
            Value::Matches(matches) => Some(matches),
            _ => None,
        }
    }

    /// The user value, if this is a [`Value::Custom`].
    pub fn custom(&self) -> Option<&V> {
        match self {
            Value::Custom(value) => Some(value),
            _ => None,
        }
    }

    /// The user value by value, if this is a [`Value::Custom`].
    pub fn into_custom(self) -> Option<V> {
        match self {
            Value::Custom(value) => Some(value),
            _ => None,
        }
    }
}

/// The outcome of one pattern attempt.
///
/// On success `begin <= end` and the input slice between them is the matched
/// text. On failure the reader has been restored to `begin` by the time the
/// caller sees the result, while `end` still records how far the attempt got
/// before giving up.
#[derive(Debug, Clone)]
pub struct MatchResult<V = ()> {
    /// Did the pattern match.
    pub matched: bool,
    /// For failed concatenations: at least one child matched before the
    /// failing one. Alternation uses this to rank failures.
    pub partial: bool,
    /// Position where the attempt started.
    pub begin: Position,
    /// Position reached by the attempt (the furthest advance on failure).
    pub end: Position,
    /// Structured payload; absent on failure unless a transform wrote one.
    pub value: Value<V>,
    /// Diagnostic message attached by the engine or a transform.
    pub error: Option<String>,
    /// The failing sub-result, for walking down to the point of failure.
    pub failed: Option<Box<MatchResult<V>>>,
}

impl<V> MatchResult<V> {
    /// A successful result spanning `begin..end` with the given payload.
    pub fn success(begin: Position, end: Position, value: Value<V>) -> Self {
        Self {
            matched: true,
            partial: false,
            begin,
            end,
            value,
            error: None,
            failed: None,
        }
    }

    /// A failed result; `end` records the furthest advance of the attempt.
    pub fn failure(begin: Position, end: Position) -> Self {
        Self {
            matched: false,
            partial: false,
            begin,
            end,
            value: Value::None,
            error: None,
            failed: None,
        }
    }

    /// Take the payload out, leaving [`Value::None`] behind.
    ///
    /// Convenient in transforms that rebuild the value from child results.
    pub fn take_value(&mut self) -> Value<V> {
        std::mem::take(&mut self.value)
    }

    /// Format the matched range for diagnostics, with 1-based line and
    /// column numbers.
    pub fn range_string(&self) -> String {
        format!("> {} --- {} <", self.begin, self.end)
    }
}
