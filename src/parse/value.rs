//! Field value grammar.
//!
//! A value is a single braced group, or one or more segments joined by `#`. A segment is a quoted
//! string, a braced group, a number, or a macro reference.
use super::cursor::Cursor;
use crate::error::{Error, ErrorCode, Result};
use crate::token::{Number, Token};
use crate::value::{ComponentKind, FieldValue, StringComponent, StringDatum};

#[derive(Debug, PartialEq)]
enum Segment<'r> {
    Quoted(Vec<StringDatum>),
    Braced(Vec<StringDatum>),
    Number(Number<'r>),
    MacroRef(String),
}

fn flush(text: &mut String, data: &mut Vec<StringDatum>) {
    if !text.is_empty() {
        data.push(StringDatum::Text(std::mem::take(text)));
    }
}

/// Parse a nested braced group whose opening `{` was already consumed. The group itself sits at
/// brace depth `depth`.
fn nested_braced(cursor: &mut Cursor, depth: usize) -> Result<StringDatum> {
    cursor.check_depth(depth)?;
    let data = braced_content(cursor, depth)?;
    Ok(StringDatum::Component(StringComponent::new(
        ComponentKind::Braced,
        depth,
        data,
    )))
}

/// Parse the contents of a braced group up to and including its closing `}`.
pub(crate) fn braced_content(cursor: &mut Cursor, depth: usize) -> Result<Vec<StringDatum>> {
    let mut data = Vec::new();
    let mut text = String::new();
    loop {
        match cursor.bump() {
            None => return Err(cursor.unexpected("closing '}'")),
            Some(Token::Special('}')) => break,
            Some(Token::Special('{')) => {
                flush(&mut text, &mut data);
                data.push(nested_braced(cursor, depth + 1)?);
            }
            Some(token) => token.push_source(&mut text),
        }
    }
    flush(&mut text, &mut data);
    Ok(data)
}

/// Parse the contents of a quoted string up to and including its closing `"`. Quotes only close
/// the string outside of braces; `\"` and `\\` are escapes and kept literally.
pub(crate) fn quoted_content(cursor: &mut Cursor, depth: usize) -> Result<Vec<StringDatum>> {
    let mut data = Vec::new();
    let mut text = String::new();
    loop {
        let at = cursor.offset();
        match cursor.bump() {
            None => return Err(cursor.unexpected("closing '\"'")),
            Some(Token::Special('"')) => break,
            Some(Token::Special('{')) => {
                flush(&mut text, &mut data);
                data.push(nested_braced(cursor, depth + 1)?);
            }
            Some(Token::Special('}')) => {
                return Err(Error::syntax(ErrorCode::UnbalancedClosingBracket, at));
            }
            Some(Token::Special('\\')) => {
                text.push('\\');
                if cursor.eat_special('"') {
                    text.push('"');
                } else if cursor.eat_special('\\') {
                    text.push('\\');
                }
            }
            Some(token) => token.push_source(&mut text),
        }
    }
    flush(&mut text, &mut data);
    Ok(data)
}

/// Glue a run of adjacent identifier and number tokens into a single key.
pub(crate) fn key(cursor: &mut Cursor, expected: &'static str) -> Result<String> {
    let mut key = String::new();
    while let Some(token @ (Token::Id(_) | Token::Number(_))) = cursor.peek() {
        token.push_source(&mut key);
        cursor.bump();
    }
    if key.is_empty() {
        Err(cursor.unexpected(expected))
    } else {
        Ok(key)
    }
}

fn segment<'r>(cursor: &mut Cursor<'_, 'r>) -> Result<Segment<'r>> {
    match cursor.peek() {
        Some(Token::Special('"')) => {
            cursor.bump();
            Ok(Segment::Quoted(quoted_content(cursor, 0)?))
        }
        Some(Token::Special('{')) => {
            cursor.bump();
            Ok(Segment::Braced(braced_content(cursor, 0)?))
        }
        Some(Token::Number(number)) => {
            cursor.bump();
            Ok(Segment::Number(number.clone()))
        }
        Some(Token::Id(_)) => Ok(Segment::MacroRef(key(cursor, "macro name")?)),
        _ => Err(cursor.unexpected("field value")),
    }
}

impl Segment<'_> {
    fn into_datum(self) -> StringDatum {
        match self {
            Segment::Quoted(data) | Segment::Braced(data) => {
                StringDatum::Component(StringComponent::quoted(data))
            }
            Segment::Number(Number::Int(n)) => StringDatum::Number(n),
            Segment::Number(Number::Text(s)) => StringDatum::text_from(s),
            Segment::MacroRef(name) => StringDatum::MacroRef(name),
        }
    }
}

/// Parse a field value. Whitespace following the value is consumed.
pub(crate) fn value(cursor: &mut Cursor) -> Result<FieldValue> {
    let mut segments = vec![segment(cursor)?];
    loop {
        cursor.skip_whitespace();
        if !cursor.eat_special('#') {
            break;
        }
        cursor.skip_whitespace();
        segments.push(segment(cursor)?);
    }

    if segments.len() > 1 {
        let data = segments.into_iter().map(Segment::into_datum).collect();
        return Ok(FieldValue::String(StringComponent::quoted(data)));
    }

    Ok(match segments.remove(0) {
        Segment::Number(Number::Int(n)) => FieldValue::Number(n),
        Segment::Braced(data) => FieldValue::String(StringComponent::braced(data)),
        Segment::Quoted(data) => FieldValue::String(StringComponent::quoted(data)),
        single => FieldValue::String(StringComponent::quoted(vec![single.into_datum()])),
    })
}
