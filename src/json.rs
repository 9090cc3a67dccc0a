//! A JSON grammar built on the pattern engine.
//!
//! Demonstrates the full engine surface: transforms shaping results into a
//! domain type, a recursive grammar (the value alternation is tied after
//! construction), and failure telemetry via the reader's error stack.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use phf::phf_map;

use crate::pattern::{
    Alternation, CharacterClass, Concatenation, EndOfInput, Pattern, PatternRef, Repetition,
    TerminalString, any, optional,
};
use crate::reader::Reader;
use crate::result::{MatchResult, Value};

/// A parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(BTreeMap<String, JsonValue>),
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(value) => write!(f, "{value}"),
            JsonValue::Number(value) => write!(f, "{value}"),
            JsonValue::String(value) => write!(f, "{value:?}"),
            JsonValue::Array(values) => write!(f, "[{}]", values.iter().format(", ")),
            JsonValue::Object(members) => write!(
                f,
                "{{{}}}",
                members
                    .iter()
                    .format_with(", ", |(key, value), f| f(&format_args!("{key:?}: {value}")))
            ),
        }
    }
}

/// Parse a complete JSON document.
///
/// Matches `value , end-of-input`; on failure the deepest recorded partial
/// failure is rendered into the error, with its 1-based input range.
pub fn parse_str(input: &str) -> Result<JsonValue> {
    let mut reader = Reader::from_str(input);
    let root = Concatenation::new(vec![pattern(), Rc::new(EndOfInput::new())]);

    let result = root.try_match(&mut reader)?;
    if result.matched {
        let mut parts = result
            .value
            .into_matches()
            .context("document pattern must yield child matches")?;
        return custom_of(parts.swap_remove(0));
    }

    match reader.deepest_error() {
        Some(deepest) => {
            let message = deepest.error.as_deref().unwrap_or("no match");
            bail!("{message} {}", deepest.range_string())
        }
        None => bail!("input is not valid json"),
    }
}

/// Build the composite JSON value pattern.
///
/// The value alternation starts empty and is filled in once the object and
/// array patterns exist, closing the recursive grammar loop.
pub fn pattern() -> PatternRef<JsonValue> {
    let whitespace: PatternRef<JsonValue> = Rc::new(
        any(Rc::new(CharacterClass::one_of(" \n\r\t", false)) as PatternRef<JsonValue>)
            .with_transform(whitespace_transform),
    );

    let choices = Rc::new(Alternation::new(Vec::new()));
    let value: PatternRef<JsonValue> = Rc::new(
        Concatenation::new(vec![
            Rc::clone(&whitespace),
            Rc::clone(&choices) as PatternRef<JsonValue>,
            Rc::clone(&whitespace),
        ])
        .with_transform(value_transform),
    );

    let string = string_pattern();
    let number = number_pattern();
    let array = array_pattern(Rc::clone(&value), Rc::clone(&whitespace));
    let object = object_pattern(Rc::clone(&value), Rc::clone(&string), Rc::clone(&whitespace));
    let true_literal: PatternRef<JsonValue> =
        Rc::new(TerminalString::new("true").with_transform(|m, _| {
            if m.matched {
                m.value = Value::Custom(JsonValue::Bool(true));
            }
            Ok(())
        }));
    let false_literal: PatternRef<JsonValue> =
        Rc::new(TerminalString::new("false").with_transform(|m, _| {
            if m.matched {
                m.value = Value::Custom(JsonValue::Bool(false));
            }
            Ok(())
        }));
    let null_literal: PatternRef<JsonValue> =
        Rc::new(TerminalString::new("null").with_transform(|m, _| {
            if m.matched {
                m.value = Value::Custom(JsonValue::Null);
            }
            Ok(())
        }));

    choices.set_patterns(vec![
        string,
        number,
        object,
        array,
        true_literal,
        false_literal,
        null_literal,
    ]);

    value
}

fn string_pattern() -> PatternRef<JsonValue> {
    let quote: PatternRef<JsonValue> = Rc::new(TerminalString::new("\""));
    let hex_digit: PatternRef<JsonValue> = Rc::new(Alternation::new(vec![
        Rc::new(CharacterClass::range('0', '9', false)),
        Rc::new(CharacterClass::range('a', 'f', false)),
        Rc::new(CharacterClass::range('A', 'F', false)),
    ]));
    let unicode_escape: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        Rc::new(TerminalString::new("u")),
        Rc::new(Repetition::new(hex_digit, 4, 4)),
    ]));
    let escape: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        Rc::new(TerminalString::new("\\")),
        Rc::new(Alternation::new(vec![
            Rc::new(CharacterClass::one_of("\"\\/bfnrt", false)),
            unicode_escape,
        ])),
    ]));
    let normal: PatternRef<JsonValue> = Rc::new(CharacterClass::new(
        |rune| rune.is_control() || rune == '\\' || rune == '"',
        true,
    ));

    Rc::new(
        Concatenation::new(vec![
            Rc::clone(&quote),
            Rc::new(any(Rc::new(Alternation::new(vec![normal, escape])) as PatternRef<JsonValue>)),
            quote,
        ])
        .with_transform(string_transform),
    )
}

fn number_pattern() -> PatternRef<JsonValue> {
    let digit: PatternRef<JsonValue> = Rc::new(CharacterClass::range('0', '9', false));
    let digit_1_9: PatternRef<JsonValue> = Rc::new(CharacterClass::range('1', '9', false));

    let integer: PatternRef<JsonValue> = Rc::new(Alternation::new(vec![
        Rc::new(TerminalString::new("0")),
        Rc::new(Concatenation::new(vec![
            digit_1_9,
            Rc::new(any(Rc::clone(&digit))),
        ])),
    ]));
    let fraction: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        Rc::new(TerminalString::new(".")),
        Rc::new(any(Rc::clone(&digit))),
    ]));
    let exponent: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        Rc::new(CharacterClass::one_of("eE", false)),
        Rc::new(optional(
            Rc::new(CharacterClass::one_of("-+", false)) as PatternRef<JsonValue>
        )),
        Rc::new(Repetition::new(Rc::clone(&digit), 1, 0)),
    ]));

    Rc::new(
        Concatenation::new(vec![
            Rc::new(optional(
                Rc::new(TerminalString::new("-")) as PatternRef<JsonValue>
            )),
            integer,
            Rc::new(optional(fraction)),
            Rc::new(optional(exponent)),
        ])
        .with_transform(number_transform),
    )
}

fn array_pattern(
    value: PatternRef<JsonValue>,
    whitespace: PatternRef<JsonValue>,
) -> PatternRef<JsonValue> {
    let more_values: PatternRef<JsonValue> = Rc::new(any(Rc::new(Concatenation::new(vec![
        Rc::new(TerminalString::new(",")),
        Rc::clone(&value),
    ])) as PatternRef<JsonValue>));
    let values: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![value, more_values]));

    Rc::new(
        Concatenation::new(vec![
            Rc::new(TerminalString::new("[")),
            // whitespace comes second so a value wins when one is present
            Rc::new(Alternation::new(vec![values, whitespace])),
            Rc::new(TerminalString::new("]")),
        ])
        .with_transform(array_transform),
    )
}

fn object_pattern(
    value: PatternRef<JsonValue>,
    string: PatternRef<JsonValue>,
    whitespace: PatternRef<JsonValue>,
) -> PatternRef<JsonValue> {
    let key: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        Rc::clone(&whitespace),
        string,
        Rc::clone(&whitespace),
    ]));
    let key_value: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![
        key,
        Rc::new(TerminalString::new(":")),
        value,
    ]));
    let more_members: PatternRef<JsonValue> = Rc::new(any(Rc::new(Concatenation::new(vec![
        Rc::new(TerminalString::new(",")),
        Rc::clone(&key_value),
    ])) as PatternRef<JsonValue>));
    let members: PatternRef<JsonValue> = Rc::new(Concatenation::new(vec![key_value, more_members]));

    Rc::new(
        Concatenation::new(vec![
            Rc::new(TerminalString::new("{")),
            Rc::new(Alternation::new(vec![members, whitespace])),
            Rc::new(TerminalString::new("}")),
        ])
        .with_transform(object_transform),
    )
}

// ─── Transforms ──────────────────────────────────────────────────────────────

fn whitespace_transform(m: &mut MatchResult<JsonValue>, _r: &mut Reader<JsonValue>) -> Result<()> {
    if m.matched {
        // Drop the blanks so enclosing transforms see an empty payload.
        m.value = Value::None;
    }
    Ok(())
}

fn value_transform(m: &mut MatchResult<JsonValue>, _r: &mut Reader<JsonValue>) -> Result<()> {
    if !m.matched {
        m.error = Some("no valid json value found".into());
        return Ok(());
    }
    let mut parts = m
        .take_value()
        .into_matches()
        .context("value pattern must yield child matches")?;
    // whitespace, value, whitespace: adopt the middle child's payload.
    m.value = parts.swap_remove(1).value;
    Ok(())
}

fn string_transform(m: &mut MatchResult<JsonValue>, r: &mut Reader<JsonValue>) -> Result<()> {
    if !m.matched {
        if m.partial {
            m.error = Some("string is not closed properly".into());
            r.push_error(m.clone());
        }
        return Ok(());
    }
    let quoted = r.string_from_result(m);
    m.value = Value::Custom(JsonValue::String(decode_string(&quoted)?));
    Ok(())
}

fn number_transform(m: &mut MatchResult<JsonValue>, r: &mut Reader<JsonValue>) -> Result<()> {
    if !m.matched {
        return Ok(());
    }
    let text = r.string_from_result(m);
    let number: f64 = text
        .parse()
        .with_context(|| format!("invalid number literal {text}"))?;
    m.value = Value::Custom(JsonValue::Number(number));
    Ok(())
}

fn array_transform(m: &mut MatchResult<JsonValue>, r: &mut Reader<JsonValue>) -> Result<()> {
    if !m.matched {
        if m.partial {
            m.error = Some("array is not closed properly".into());
            r.push_error(m.clone());
        }
        return Ok(());
    }
    let mut parts = m
        .take_value()
        .into_matches()
        .context("array pattern must yield child matches")?;
    let middle = parts.swap_remove(1);

    let mut values = Vec::new();
    // An empty payload means the whitespace branch won: no elements.
    if let Some(items) = middle.value.into_matches() {
        let mut items = items.into_iter();
        let first = items.next().context("first array element")?;
        values.push(custom_of(first)?);
        if let Some(rest) = items.next()
            && let Some(tail) = rest.value.into_matches()
        {
            for item in tail {
                let comma_value = item
                    .value
                    .into_matches()
                    .context("array continuation must be a sequence")?;
                let element = comma_value
                    .into_iter()
                    .nth(1)
                    .context("array continuation must carry a value")?;
                values.push(custom_of(element)?);
            }
        }
    }
    m.value = Value::Custom(JsonValue::Array(values));
    Ok(())
}

fn object_transform(m: &mut MatchResult<JsonValue>, r: &mut Reader<JsonValue>) -> Result<()> {
    if !m.matched {
        if m.partial {
            m.error = Some("object is not closed properly".into());
            r.push_error(m.clone());
        }
        return Ok(());
    }
    let mut parts = m
        .take_value()
        .into_matches()
        .context("object pattern must yield child matches")?;
    let middle = parts.swap_remove(1);

    let mut members = BTreeMap::new();
    if let Some(items) = middle.value.into_matches() {
        let mut items = items.into_iter();
        let first = items.next().context("first object member")?;
        let (key, value) = member_of(first)?;
        members.insert(key, value);
        if let Some(rest) = items.next()
            && let Some(tail) = rest.value.into_matches()
        {
            for item in tail {
                let comma_member = item
                    .value
                    .into_matches()
                    .context("object continuation must be a sequence")?;
                let member = comma_member
                    .into_iter()
                    .nth(1)
                    .context("object continuation must carry a member")?;
                let (key, value) = member_of(member)?;
                members.insert(key, value);
            }
        }
    }
    m.value = Value::Custom(JsonValue::Object(members));
    Ok(())
}

/// Pull the transformed user value out of a child result.
fn custom_of(result: MatchResult<JsonValue>) -> Result<JsonValue> {
    result
        .value
        .into_custom()
        .context("expected a transformed json value")
}

/// Decompose a `key : value` sequence result into its pair.
fn member_of(result: MatchResult<JsonValue>) -> Result<(String, JsonValue)> {
    let mut parts = result
        .value
        .into_matches()
        .context("object member must be a sequence")?
        .into_iter();
    let key_part = parts.next().context("object member key")?;
    let _colon = parts.next();
    let value_part = parts.next().context("object member value")?;

    let key_string = key_part
        .value
        .into_matches()
        .context("object key must be a sequence")?
        .into_iter()
        .nth(1)
        .context("object key must carry a string")?;
    let JsonValue::String(key) = custom_of(key_string)? else {
        bail!("object key must be a string");
    };
    Ok((key, custom_of(value_part)?))
}

// ─── String unquoting ────────────────────────────────────────────────────────

/// Two-character escape sequences and their decoded code points.
static ESCAPES: phf::Map<char, char> = phf_map! {
    '"' => '"',
    '\\' => '\\',
    '/' => '/',
    'b' => '\u{0008}',
    'f' => '\u{000c}',
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
};

/// Decode a quoted JSON string literal, escapes and all.
fn decode_string(quoted: &str) -> Result<String> {
    let runes: Vec<char> = quoted.chars().collect();
    if runes.len() < 2 || runes[0] != '"' || runes[runes.len() - 1] != '"' {
        bail!("string literal is not quoted: {quoted}");
    }

    let mut decoded = String::with_capacity(runes.len());
    let end = runes.len() - 1;
    let mut i = 1;
    while i < end {
        let rune = runes[i];
        if rune != '\\' {
            decoded.push(rune);
            i += 1;
            continue;
        }
        let escape = *runes.get(i + 1).context("dangling escape")?;
        if let Some(&simple) = ESCAPES.get(&escape) {
            decoded.push(simple);
            i += 2;
            continue;
        }
        if escape != 'u' {
            bail!("unsupported escape \\{escape}");
        }
        let unit = hex4(&runes, i + 2)?;
        i += 6;
        if (0xD800..0xDC00).contains(&unit) {
            // High surrogate: a low surrogate escape must follow.
            if runes.get(i) == Some(&'\\') && runes.get(i + 1) == Some(&'u') {
                let low = hex4(&runes, i + 2)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    decoded.push(
                        char::from_u32(combined)
                            .with_context(|| format!("invalid surrogate pair {unit:04X} {low:04X}"))?,
                    );
                    i += 6;
                    continue;
                }
            }
            bail!("unpaired surrogate \\u{unit:04X}");
        }
        decoded.push(char::from_u32(unit).with_context(|| format!("unpaired surrogate \\u{unit:04X}"))?);
    }
    Ok(decoded)
}

/// Read four hex digits starting at `at`.
fn hex4(runes: &[char], at: usize) -> Result<u32> {
    let mut unit = 0u32;
    for offset in 0..4 {
        let digit = runes
            .get(at + offset)
            .and_then(|rune| rune.to_digit(16))
            .context("truncated unicode escape")?;
        unit = unit * 16 + digit;
    }
    Ok(unit)
}
