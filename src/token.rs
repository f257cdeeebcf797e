//! # Tokenizer
//!
//! Converts raw source text into a flat sequence of [`Token`]s. The tokenizer is total: every
//! input produces a token stream, and concatenating [`Token::source`] over the stream reproduces
//! the input exactly.
//!
//! | Input                        | Token                                  |
//! |------------------------------|----------------------------------------|
//! | run of whitespace            | [`Token::Whitespace`]                  |
//! | `@name` followed by `{`/`(`  | [`Token::BlockType`]                   |
//! | one of `@(){}#=,\"`          | [`Token::Special`]                     |
//! | run of ASCII digits          | [`Token::Number`]                      |
//! | anything else                | [`Token::Id`]                          |
use std::borrow::Cow;
use std::fmt;

use unicase::UniCase;

/// Lookup table for the special characters `@(){}#=,\"`.
pub(crate) static SPECIAL: [bool; 128] = {
    const SP: bool = true; // special
    const __: bool = false;
    [
        //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 0
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 1
        __, __, SP, SP, __, __, __, __, SP, SP, __, __, SP, __, __, __, // 2
        __, __, __, __, __, __, __, __, __, __, __, __, __, SP, __, __, // 3
        SP, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
        __, __, __, __, __, __, __, __, __, __, __, __, SP, __, __, __, // 5
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
        __, __, __, __, __, __, __, __, __, __, __, SP, __, SP, __, __, // 7
    ]
};

#[inline]
pub fn is_special(ch: char) -> bool {
    ch.is_ascii() && SPECIAL[ch as usize]
}

#[inline]
fn is_id_char(ch: char) -> bool {
    !(is_special(ch) || ch.is_ascii_digit() || ch.is_whitespace())
}

/// A run of ASCII digits.
///
/// Runs with a leading zero, and runs too large for a `u64`, are kept as text so that no
/// formatting is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Number<'r> {
    Int(u64),
    Text(&'r str),
}

impl<'r> Number<'r> {
    fn from_digits(digits: &'r str) -> Self {
        if digits.starts_with('0') {
            return Number::Text(digits);
        }
        digits
            .parse()
            .map_or(Number::Text(digits), Number::Int)
    }
}

impl fmt::Display for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => n.fmt(f),
            Number::Text(s) => f.write_str(s),
        }
    }
}

/// The kind of an `@`-block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// A publication record such as `@article`.
    Bib,
    /// A macro definition, `@string`.
    String,
    Preamble,
    Comment,
}

/// The `@name` opener of a block, such as `@article` in `@article{key, ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockType<'r> {
    pub kind: BlockKind,
    /// Trimmed, lower-cased name with escapes removed.
    pub name: String,
    /// Everything between the `@` and the opening bracket, exactly as written.
    pub raw: &'r str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'r> {
    Id(&'r str),
    Number(Number<'r>),
    Whitespace(&'r str),
    /// One of the characters `@(){}#=,\"`.
    Special(char),
    BlockType(BlockType<'r>),
}

impl<'r> Token<'r> {
    /// The exact source text this token was lexed from.
    pub fn source(&self) -> Cow<'r, str> {
        match self {
            Token::Id(s) | Token::Whitespace(s) | Token::Number(Number::Text(s)) => {
                Cow::Borrowed(s)
            }
            Token::Number(Number::Int(n)) => Cow::Owned(n.to_string()),
            Token::Special(ch) => Cow::Owned(ch.to_string()),
            Token::BlockType(block) => Cow::Owned(format!("@{}", block.raw)),
        }
    }

    /// Append the source text of this token to `buf`.
    pub fn push_source(&self, buf: &mut String) {
        match self {
            Token::Id(s) | Token::Whitespace(s) | Token::Number(Number::Text(s)) => {
                buf.push_str(s)
            }
            Token::Number(Number::Int(n)) => buf.push_str(&n.to_string()),
            Token::Special(ch) => buf.push(*ch),
            Token::BlockType(block) => {
                buf.push('@');
                buf.push_str(block.raw);
            }
        }
    }

    /// Length in bytes of the source text of this token.
    pub fn source_len(&self) -> usize {
        match self {
            Token::Id(s) | Token::Whitespace(s) | Token::Number(Number::Text(s)) => s.len(),
            Token::Number(Number::Int(n)) => n.checked_ilog10().map_or(1, |d| d as usize + 1),
            Token::Special(ch) => ch.len_utf8(),
            Token::BlockType(block) => 1 + block.raw.len(),
        }
    }

    /// A short human readable description, used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Id(s) => format!("identifier '{s}'"),
            Token::Number(n) => format!("number '{n}'"),
            Token::Whitespace(_) => "whitespace".to_string(),
            Token::Special(ch) => format!("'{ch}'"),
            Token::BlockType(block) => format!("'@{}'", block.name),
        }
    }
}

/// Read from `input` up to (but not including) the first unescaped occurrence of `open_a` or
/// `open_b`. A backslash escapes the char following it, which is then captured literally.
///
/// The captured text is a single name, optionally surrounded by whitespace, so the scan stops at
/// the first unescaped special char or at a second word. Returns the byte position of the
/// terminal and the captured text with escapes removed, or `None` if no terminal follows the name.
pub(crate) fn take_until_unescaped(input: &str, open_a: char, open_b: char) -> Option<(usize, String)> {
    let mut captured = String::new();
    let mut chars = input.char_indices();
    let mut in_name = false;
    let mut name_done = false;

    while let Some((idx, ch)) = chars.next() {
        if ch == open_a || ch == open_b {
            return Some((idx, captured));
        }
        if ch.is_whitespace() {
            name_done = in_name;
            captured.push(ch);
            continue;
        }
        if name_done || (ch != '\\' && is_special(ch)) {
            return None;
        }
        in_name = true;
        match ch {
            '\\' => captured.push(chars.next().map_or('\\', |(_, escaped)| escaped)),
            _ => captured.push(ch),
        }
    }
    None
}

/// A single left-to-right scanner over the source text.
#[derive(Debug, Clone)]
pub struct Lexer<'r> {
    input: &'r str,
    pos: usize,
}

impl<'r> Lexer<'r> {
    pub fn new(input: &'r str) -> Self {
        Self { input, pos: 0 }
    }

    /// Attempt to read a block type; `rest` begins with `@`.
    fn block_type(rest: &'r str) -> Option<BlockType<'r>> {
        let after_at = &rest[1..];
        let (end, captured) = take_until_unescaped(after_at, '{', '(')?;
        let name = captured.trim();
        if name.is_empty() || !name.chars().all(|ch| !is_special(ch) && !ch.is_whitespace()) {
            return None;
        }

        let uni = UniCase::unicode(name);
        let kind = if uni == UniCase::ascii("string") {
            BlockKind::String
        } else if uni == UniCase::ascii("preamble") {
            BlockKind::Preamble
        } else if uni == UniCase::ascii("comment") {
            BlockKind::Comment
        } else {
            BlockKind::Bib
        };

        Some(BlockType {
            kind,
            name: name.to_lowercase(),
            raw: &after_at[..end],
        })
    }
}

impl<'r> Iterator for Lexer<'r> {
    type Item = Token<'r>;

    fn next(&mut self) -> Option<Token<'r>> {
        let rest = &self.input[self.pos..];
        let first = rest.chars().next()?;

        let (len, token) = if first.is_whitespace() {
            let end = rest
                .find(|ch: char| !ch.is_whitespace())
                .unwrap_or(rest.len());
            (end, Token::Whitespace(&rest[..end]))
        } else if is_special(first) {
            match first {
                '@' => match Self::block_type(rest) {
                    Some(block) => (1 + block.raw.len(), Token::BlockType(block)),
                    None => (1, Token::Special('@')),
                },
                _ => (1, Token::Special(first)),
            }
        } else if first.is_ascii_digit() {
            let end = rest
                .find(|ch: char| !ch.is_ascii_digit())
                .unwrap_or(rest.len());
            (end, Token::Number(Number::from_digits(&rest[..end])))
        } else {
            let end = rest.find(|ch: char| !is_id_char(ch)).unwrap_or(rest.len());
            (end, Token::Id(&rest[..end]))
        };

        self.pos += len;
        Some(token)
    }
}

/// Convert the source text into a sequence of tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block<'r>(kind: BlockKind, name: &str, raw: &'r str) -> Token<'r> {
        Token::BlockType(BlockType {
            kind,
            name: name.to_string(),
            raw,
        })
    }

    #[test]
    fn test_tokenize_entry() {
        assert_eq!(
            tokenize("@article{key2, year = 1936}"),
            vec![
                block(BlockKind::Bib, "article", "article"),
                Token::Special('{'),
                Token::Id("key"),
                Token::Number(Number::Int(2)),
                Token::Special(','),
                Token::Whitespace(" "),
                Token::Id("year"),
                Token::Whitespace(" "),
                Token::Special('='),
                Token::Whitespace(" "),
                Token::Number(Number::Int(1936)),
                Token::Special('}'),
            ]
        );
    }

    #[test]
    fn test_block_type() {
        assert_eq!(
            tokenize("@ STRING ("),
            vec![
                block(BlockKind::String, "string", " STRING "),
                Token::Special('('),
            ]
        );
        assert_eq!(
            tokenize("@preAMble{")[0],
            block(BlockKind::Preamble, "preamble", "preAMble")
        );
        assert_eq!(
            tokenize("@Comment{")[0],
            block(BlockKind::Comment, "comment", "Comment")
        );
        // escaped chars are taken literally
        assert_eq!(
            tokenize("@art\\icle{")[0],
            block(BlockKind::Bib, "article", "art\\icle")
        );
        // an escaped bracket does not terminate the name, so the name is invalid
        assert_eq!(tokenize("@a\\{b")[0], Token::Special('@'));
        // no opening bracket at all
        assert_eq!(tokenize("mail@host"), vec![
            Token::Id("mail"),
            Token::Special('@'),
            Token::Id("host"),
        ]);
        // whitespace inside the name
        assert_eq!(tokenize("@ two words {")[0], Token::Special('@'));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("0123"), vec![Token::Number(Number::Text("0123"))]);
        assert_eq!(tokenize("0"), vec![Token::Number(Number::Text("0"))]);
        assert_eq!(tokenize("42"), vec![Token::Number(Number::Int(42))]);
        assert_eq!(
            tokenize("123456789012345678901234567890"),
            vec![Token::Number(Number::Text("123456789012345678901234567890"))]
        );
        assert_eq!(
            tokenize("2nd"),
            vec![Token::Number(Number::Int(2)), Token::Id("nd")]
        );
    }

    #[test]
    fn test_whitespace_and_ids() {
        assert_eq!(
            tokenize("a \t\nb-c:d"),
            vec![
                Token::Id("a"),
                Token::Whitespace(" \t\n"),
                Token::Id("b-c:d"),
            ]
        );
        assert_eq!(
            tokenize("\\\"o"),
            vec![Token::Special('\\'), Token::Special('"'), Token::Id("o")]
        );
    }

    #[test]
    fn test_take_until_unescaped() {
        assert_eq!(
            take_until_unescaped("abc{d", '{', '('),
            Some((3, "abc".to_string()))
        );
        assert_eq!(
            take_until_unescaped("a\\{b(c", '{', '('),
            Some((4, "a{b".to_string()))
        );
        assert_eq!(
            take_until_unescaped("a\\\\{", '{', '('),
            Some((3, "a\\".to_string()))
        );
        assert_eq!(take_until_unescaped("a\\{", '{', '('), None);
        assert_eq!(take_until_unescaped("🍄\\", '{', '('), None);
        assert_eq!(
            take_until_unescaped(" book \n(x", '{', '('),
            Some((6, " book \n".to_string()))
        );
        // the name ends at a special char or a second word
        assert_eq!(take_until_unescaped("a@b{", '{', '('), None);
        assert_eq!(take_until_unescaped("a b{", '{', '('), None);
    }

    #[test]
    fn test_many_at_signs() {
        let input = format!("{}{{}}", "@".repeat(100_000));
        let tokens = tokenize(&input);
        assert_eq!(tokens.len(), 100_002);
        assert!(tokens[..100_000].iter().all(|token| *token == Token::Special('@')));
        assert_eq!(tokens[100_000..], [Token::Special('{'), Token::Special('}')]);
    }

    #[test]
    fn test_source_len() {
        for token in tokenize("@book{x, 10 # 0010 # {ü}}") {
            assert_eq!(token.source_len(), token.source().len());
        }
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn lossless(s in "\\PC*") {
            let mut rebuilt = String::new();
            for token in tokenize(&s) {
                token.push_source(&mut rebuilt);
            }
            prop_assert_eq!(rebuilt, s);
        }
    }
}
