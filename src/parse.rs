//! # Grammar parser
//!
//! Consumes a token stream and produces the top-level [`Node`]s of a file: free text lying between
//! entries, and typed entries. See the [`syntax`](crate::syntax) module for the accepted grammar.
//!
//! Nothing is resolved at this stage: macro references are kept as references, entry ids are not
//! checked for uniqueness, and field names keep the case they were written in.
mod block;
mod cursor;
mod value;

use log::debug;

use crate::error::Result;
use crate::token::Token;
use crate::value::FieldValue;
use cursor::Cursor;

/// A `key = value` pair in a publication record or macro definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawField {
    pub key: String,
    pub value: FieldValue,
}

/// A publication record, such as `@article{key, title = {Title}}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawBibEntry {
    /// Lower-cased entry type, such as `article`.
    pub entry_type: String,
    pub id: String,
    /// Fields in source order. Of several fields with the same (case-insensitive) name, only the
    /// first is kept.
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RawEntry {
    Bib(RawBibEntry),
    /// A `@string` block, which may define several macros.
    Macro(Vec<RawField>),
    /// The text of a `@preamble` block.
    Preamble(String),
    /// The text of a `@comment` block.
    Comment(String),
}

/// A top-level node of a file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Node {
    /// Free text between entries, with escapes applied.
    NonEntry(String),
    Entry(RawEntry),
}

/// Parse a token stream into top-level nodes.
pub fn parse(tokens: &[Token<'_>]) -> Result<Vec<Node>> {
    parse_with_limit(tokens, None)
}

/// Parse a token stream, failing if braces nest deeper than `max_depth`.
pub fn parse_with_limit(tokens: &[Token<'_>], max_depth: Option<usize>) -> Result<Vec<Node>> {
    let mut cursor = Cursor::new(tokens, max_depth);
    let mut nodes = Vec::new();

    loop {
        let text = non_entry(&mut cursor)?;
        if !text.is_empty() {
            nodes.push(Node::NonEntry(text));
        }
        let Some(Token::BlockType(block)) = cursor.bump() else {
            break;
        };
        nodes.push(Node::Entry(block::entry(&mut cursor, block)?));
    }

    debug!("parsed {} top-level nodes from {} tokens", nodes.len(), tokens.len());
    Ok(nodes)
}

/// Read free text up to the next unescaped block type, or the end of input.
fn non_entry(cursor: &mut Cursor) -> Result<String> {
    let mut text = String::new();
    loop {
        match cursor.peek() {
            None | Some(Token::BlockType(_)) => return Ok(text),
            Some(Token::Special('\\')) => {
                cursor.bump();
                block::escaped(cursor, &mut text)?;
            }
            Some(token) => {
                cursor.bump();
                token.push_source(&mut text);
            }
        }
    }
}
