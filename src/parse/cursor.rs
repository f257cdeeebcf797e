use crate::error::{Error, ErrorCode, Result};
use crate::token::Token;

/// A position in a token stream, tracking the byte offset into the source text for error
/// reporting.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'t, 'r> {
    tokens: &'t [Token<'r>],
    pos: usize,
    offset: usize,
    max_depth: Option<usize>,
}

impl<'t, 'r> Cursor<'t, 'r> {
    pub fn new(tokens: &'t [Token<'r>], max_depth: Option<usize>) -> Self {
        Self {
            tokens,
            pos: 0,
            offset: 0,
            max_depth,
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<&'t Token<'r>> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consume and return the next token.
    pub fn bump(&mut self) -> Option<&'t Token<'r>> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.offset += token.source_len();
        Some(token)
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(Token::Whitespace(_)) = self.peek() {
            self.bump();
        }
    }

    /// Consume the special char `ch` if it is next.
    pub fn eat_special(&mut self, ch: char) -> bool {
        match self.peek() {
            Some(Token::Special(c)) if *c == ch => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    pub fn expect_special(&mut self, ch: char, expected: &'static str) -> Result<()> {
        if self.eat_special(ch) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// An error describing the next token, which does not match `expected`.
    pub fn unexpected(&self, expected: &'static str) -> Error {
        match self.peek() {
            Some(token) => Error::syntax(
                ErrorCode::Expected {
                    expected,
                    found: token.describe(),
                },
                self.offset,
            ),
            None => Error::syntax(ErrorCode::UnexpectedEof { expected }, self.offset),
        }
    }

    /// Fail if `depth` exceeds the configured nesting limit.
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        match self.max_depth {
            Some(max) if depth > max => {
                Err(Error::syntax(ErrorCode::NestingTooDeep(max), self.offset))
            }
            _ => Ok(()),
        }
    }
}
