//! Entry bodies: publication records, macro definitions, preambles and comments.
use log::trace;
use unicase::UniCase;

use super::cursor::Cursor;
use super::value::{key, value};
use super::{RawBibEntry, RawEntry, RawField};
use crate::error::{Error, ErrorCode, Result};
use crate::token::{BlockKind, BlockType, Token};

/// Consume the opening bracket of a body and return the matching closing bracket.
fn opening(cursor: &mut Cursor) -> Result<char> {
    cursor.skip_whitespace();
    if cursor.eat_special('{') {
        Ok('}')
    } else if cursor.eat_special('(') {
        Ok(')')
    } else {
        Err(cursor.unexpected("'{' or '('"))
    }
}

/// Parse the body of the block opened by `block`, which was already consumed.
pub(crate) fn entry(cursor: &mut Cursor, block: &BlockType) -> Result<RawEntry> {
    let closing = opening(cursor)?;
    match block.kind {
        BlockKind::Bib => Ok(RawEntry::Bib(bib_body(cursor, &block.name, closing)?)),
        BlockKind::String => Ok(RawEntry::Macro(string_body(cursor, closing)?)),
        BlockKind::Preamble => Ok(RawEntry::Preamble(delimited_text(cursor, closing, true)?)),
        BlockKind::Comment => Ok(RawEntry::Comment(delimited_text(cursor, closing, true)?)),
    }
}

/// Parse `key = value`, consuming trailing whitespace.
fn field(cursor: &mut Cursor) -> Result<RawField> {
    let key = key(cursor, "field name")?;
    cursor.skip_whitespace();
    cursor.expect_special('=', "'='")?;
    cursor.skip_whitespace();
    let value = value(cursor)?;
    Ok(RawField { key, value })
}

/// Parse `, field` repeatedly up to the closing bracket, allowing a trailing comma.
fn fields_until(cursor: &mut Cursor, closing: char, fields: &mut Vec<RawField>) -> Result<()> {
    let expected = if closing == '}' { "',' or '}'" } else { "',' or ')'" };
    loop {
        if cursor.eat_special(closing) {
            return Ok(());
        }
        cursor.expect_special(',', expected)?;
        cursor.skip_whitespace();
        if cursor.eat_special(closing) {
            return Ok(());
        }
        fields.push(field(cursor)?);
    }
}

fn bib_body(cursor: &mut Cursor, entry_type: &str, closing: char) -> Result<RawBibEntry> {
    cursor.skip_whitespace();
    let id = key(cursor, "entry id")?;
    cursor.skip_whitespace();

    let mut parsed = Vec::new();
    fields_until(cursor, closing, &mut parsed)?;

    // the first occurrence of a field name wins
    let mut fields: Vec<RawField> = Vec::with_capacity(parsed.len());
    for field in parsed {
        let name = UniCase::unicode(field.key.as_str());
        if fields
            .iter()
            .any(|kept| UniCase::unicode(kept.key.as_str()) == name)
        {
            trace!("entry '{id}': dropping duplicate field '{}'", field.key);
        } else {
            fields.push(field);
        }
    }

    Ok(RawBibEntry {
        entry_type: entry_type.to_string(),
        id,
        fields,
    })
}

fn string_body(cursor: &mut Cursor, closing: char) -> Result<Vec<RawField>> {
    cursor.skip_whitespace();
    let mut fields = vec![field(cursor)?];
    fields_until(cursor, closing, &mut fields)?;
    Ok(fields)
}

/// Read balanced text up to the bracket `closing`, which is consumed but not included.
///
/// Braces always nest. When the body is delimited by parentheses, parentheses outside of braces
/// nest as well. With `unescape`, `\\` collapses to a single backslash and `\@type{...}` is kept
/// as the literal text `@type{...}`.
pub(crate) fn delimited_text(cursor: &mut Cursor, closing: char, unescape: bool) -> Result<String> {
    let mut text = String::new();
    let mut braces = 0usize;
    let mut parens = 0usize;
    let expected = if closing == '}' { "closing '}'" } else { "closing ')'" };

    loop {
        let at = cursor.offset();
        let Some(token) = cursor.bump() else {
            return Err(cursor.unexpected(expected));
        };
        match token {
            Token::Special('{') => {
                braces += 1;
                cursor.check_depth(braces)?;
            }
            Token::Special('}') if braces == 0 => {
                if closing == '}' {
                    return Ok(text);
                }
                return Err(Error::syntax(ErrorCode::UnbalancedClosingBracket, at));
            }
            Token::Special('}') => braces -= 1,
            Token::Special('(') if closing == ')' && braces == 0 => parens += 1,
            Token::Special(')') if closing == ')' && braces == 0 => {
                if parens == 0 {
                    return Ok(text);
                }
                parens -= 1;
            }
            Token::Special('\\') if unescape => {
                escaped(cursor, &mut text)?;
                continue;
            }
            _ => {}
        }
        token.push_source(&mut text);
    }
}

/// Handle the token following an unescaped `\`, which was already consumed.
pub(crate) fn escaped(cursor: &mut Cursor, text: &mut String) -> Result<()> {
    match cursor.peek() {
        Some(Token::Special('\\')) => {
            cursor.bump();
            text.push('\\');
        }
        Some(token @ Token::BlockType(_)) => {
            cursor.bump();
            token.push_source(text);
            let closing = opening(cursor)?;
            text.push(if closing == '}' { '{' } else { '(' });
            text.push_str(&delimited_text(cursor, closing, false)?);
            text.push(closing);
        }
        _ => text.push('\\'),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use crate::value::{FieldValue, StringComponent, StringDatum};

    fn parse_entry(input: &str) -> Result<RawEntry> {
        let tokens = tokenize(input);
        let mut cursor = Cursor::new(&tokens, None);
        match cursor.bump() {
            Some(Token::BlockType(block)) => entry(&mut cursor, block),
            _ => panic!("input must begin with a block type"),
        }
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::String(StringComponent::braced(vec![StringDatum::text_from(s)]))
    }

    #[test]
    fn test_bib_entry() {
        assert_eq!(
            parse_entry("@Article{t1, Title = {A}, year = 1936, title = {B},}"),
            Ok(RawEntry::Bib(RawBibEntry {
                entry_type: "article".to_string(),
                id: "t1".to_string(),
                fields: vec![
                    RawField {
                        key: "Title".to_string(),
                        value: text("A"),
                    },
                    RawField {
                        key: "year".to_string(),
                        value: FieldValue::Number(1936),
                    },
                ],
            }))
        );
        assert_eq!(
            parse_entry("@misc( DBLP:x/12 )"),
            Ok(RawEntry::Bib(RawBibEntry {
                entry_type: "misc".to_string(),
                id: "DBLP:x/12".to_string(),
                fields: vec![],
            }))
        );
    }

    #[test]
    fn test_bib_entry_errors() {
        assert!(matches!(
            parse_entry("@article{, title = {A}}"),
            Err(Error {
                code: ErrorCode::Expected {
                    expected: "entry id",
                    ..
                },
                ..
            })
        ));
        assert!(matches!(
            parse_entry("@article{k, title {A}}"),
            Err(Error {
                code: ErrorCode::Expected { expected: "'='", .. },
                ..
            })
        ));
        assert!(matches!(
            parse_entry("@article{k, title = {A}"),
            Err(Error {
                code: ErrorCode::UnexpectedEof { .. },
                ..
            })
        ));
        assert!(matches!(
            parse_entry("@article(k, title = {A}}"),
            Err(Error {
                code: ErrorCode::Expected { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_string_entry() {
        assert_eq!(
            parse_entry("@string( a = {A}, b = 2 )"),
            Ok(RawEntry::Macro(vec![
                RawField {
                    key: "a".to_string(),
                    value: text("A"),
                },
                RawField {
                    key: "b".to_string(),
                    value: FieldValue::Number(2),
                },
            ]))
        );
        assert!(parse_entry("@string{}").is_err());
    }

    #[test]
    fn test_comment_and_preamble() {
        assert_eq!(
            parse_entry("@comment{some {nested} text (x}"),
            Ok(RawEntry::Comment("some {nested} text (x".to_string()))
        );
        assert_eq!(
            parse_entry("@comment(a (b) {)} c)"),
            Ok(RawEntry::Comment("a (b) {)} c".to_string()))
        );
        assert_eq!(
            parse_entry(r#"@preamble{"\newcommand{\x}" # \\ \@book{k}}"#),
            Ok(RawEntry::Preamble(
                r#""\newcommand{\x}" # \ @book{k}"#.to_string()
            ))
        );
        assert!(matches!(
            parse_entry("@comment(a})"),
            Err(Error {
                code: ErrorCode::UnbalancedClosingBracket,
                ..
            })
        ));
    }
}
