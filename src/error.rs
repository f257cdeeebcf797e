use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// The broad class of an [`Error`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    /// The token stream does not match the grammar.
    Parse,
    /// Two macros share a name, or two entries share an id.
    Duplicate,
    /// A macro reference names a macro which is not defined.
    Unresolved,
    /// A macro (transitively) references itself.
    Cycle,
    /// An author field could not be split into names.
    Author,
    /// The configured nesting limit was exceeded.
    Limit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Found a token other than the one required by the grammar.
    Expected {
        expected: &'static str,
        found: String,
    },
    /// Input ended while the grammar still required more.
    UnexpectedEof { expected: &'static str },
    /// A closing bracket with no matching opening bracket.
    UnbalancedClosingBracket,
    DuplicateMacro(String),
    DuplicateEntry(String),
    UnresolvedReference(String),
    /// `name` was re-entered while still being resolved; `cycle` is the chain of names from the
    /// first occurrence of `name` up to the reference which closed the cycle.
    CycleDetected { name: String, cycle: Vec<String> },
    /// An author name split into an unsupported number of comma separated parts, or into parts
    /// holding no words at all.
    MalformedAuthorPartition { parts: Vec<String> },
    NestingTooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub(crate) code: ErrorCode,
    pub(crate) offset: Option<usize>,
}

impl Error {
    pub(crate) fn syntax(code: ErrorCode, offset: usize) -> Self {
        Self {
            code,
            offset: Some(offset),
        }
    }

    /// An error with no source position.
    pub fn new(code: ErrorCode) -> Self {
        Self { code, offset: None }
    }

    /// The specific problem which caused the error.
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// Byte offset into the source text, for errors raised by the grammar parser.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn category(&self) -> Category {
        match self.code {
            ErrorCode::Expected { .. }
            | ErrorCode::UnexpectedEof { .. }
            | ErrorCode::UnbalancedClosingBracket => Category::Parse,
            ErrorCode::DuplicateMacro(_) | ErrorCode::DuplicateEntry(_) => Category::Duplicate,
            ErrorCode::UnresolvedReference(_) => Category::Unresolved,
            ErrorCode::CycleDetected { .. } => Category::Cycle,
            ErrorCode::MalformedAuthorPartition { .. } => Category::Author,
            ErrorCode::NestingTooDeep(_) => Category::Limit,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ErrorCode::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            ErrorCode::UnbalancedClosingBracket => f.write_str("closing bracket was never opened"),
            ErrorCode::DuplicateMacro(name) => write!(f, "macro '{name}' is defined twice"),
            ErrorCode::DuplicateEntry(id) => write!(f, "entry id '{id}' is used twice"),
            ErrorCode::UnresolvedReference(name) => {
                write!(f, "reference to undefined macro '{name}'")
            }
            ErrorCode::CycleDetected { name, cycle } => {
                write!(f, "macro '{name}' references itself: ")?;
                for step in cycle {
                    write!(f, "{step} -> ")?;
                }
                f.write_str(name)
            }
            ErrorCode::MalformedAuthorPartition { parts } if parts.len() <= 3 => {
                write!(f, "author name has no words: {parts:?}")
            }
            ErrorCode::MalformedAuthorPartition { parts } => {
                write!(
                    f,
                    "author name has {} comma separated parts, expected 1 to 3: {:?}",
                    parts.len(),
                    parts
                )
            }
            ErrorCode::NestingTooDeep(limit) => {
                write!(f, "nesting depth exceeds the limit of {limit}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at byte {}", self.code, offset),
            None => self.code.fmt(f),
        }
    }
}

impl std::error::Error for Error {}
