//! Positional parse errors.
//!
//! These never escape the crate's public parsing entry points: a bad line or
//! value is logged and skipped. They are public so callers of the lower-level
//! lexer and value parsers can inspect what went wrong.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingPropertyName,
    InvalidPropertyName,
    InvalidParameter,
    UnclosedQuote,
    MissingColon,
    InvalidDate,
    InvalidDateTime,
    InvalidRecur,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingPropertyName => "missing property name",
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::UnclosedQuote => "unclosed quote",
            Self::MissingColon => "missing ':'",
            Self::InvalidDate => "invalid date",
            Self::InvalidDateTime => "invalid date-time",
            Self::InvalidRecur => "invalid recurrence rule",
        }
    }
}

/// A lexing or value error at a position in the unfolded input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} at line {line}, column {column}{}", .kind.as_str(), .context.as_ref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
