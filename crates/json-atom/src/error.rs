//! Error types shared by the value model and the decoder.

use thiserror::Error;

use crate::descriptor::AtomType;
use crate::pool::PoolKind;

/// Errors raised by constructors, casts and container operations.
#[derive(Debug, Error)]
pub enum AtomError {
    #[error("type mismatch: expected {expected} but got {got}")]
    TypeMismatch { expected: &'static str, got: String },
    #[error("allocation failure: {kind:?} pool is exhausted")]
    AllocationFailure { kind: PoolKind },
    #[error("validation error at byte {offset}: {message}")]
    Validation { offset: usize, message: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AtomError {
    pub(crate) fn mismatch(expected: AtomType, got: AtomType) -> Self {
        AtomError::TypeMismatch {
            expected: expected.name(),
            got: got.name().to_string(),
        }
    }
}

/// Stable decoder error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    None = 0,
    InvalidChar = 1,
    InvalidKeyword = 2,
    InvalidEscapeSequence = 3,
    InvalidUnicodeSequence = 4,
    InvalidNumber = 5,
    NestingDepthReached = 6,
    UnbalancedCollection = 7,
    ExpectedKey = 8,
    ExpectedColon = 9,
    OutOfMemory = 10,
    Internal = 11,
    Unknown = 12,
}

impl ParseErrorCode {
    /// Numeric code, stable across releases.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn description(self) -> &'static str {
        match self {
            ParseErrorCode::None => "OK",
            ParseErrorCode::InvalidChar => "Invalid character",
            ParseErrorCode::InvalidKeyword => "Invalid keyword",
            ParseErrorCode::InvalidEscapeSequence => "Invalid escape sequence",
            ParseErrorCode::InvalidUnicodeSequence => "Invalid unicode sequence",
            ParseErrorCode::InvalidNumber => "Invalid number",
            ParseErrorCode::NestingDepthReached => "Nesting depth limit reached",
            ParseErrorCode::UnbalancedCollection => "Unbalanced collection",
            ParseErrorCode::ExpectedKey => "Expected key",
            ParseErrorCode::ExpectedColon => "Expected colon",
            ParseErrorCode::OutOfMemory => "Out of memory",
            ParseErrorCode::Internal => "Internal error",
            ParseErrorCode::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// A located decoder failure. Terminal for the parse attempt that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "parse error #{} ({}) at character offset {offset}, line {line}, column {column}{}",
    .code.code(),
    .code.description(),
    .message.as_deref().map(|m| format!(". {m}")).unwrap_or_default()
)]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    pub message: Option<String>,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, position: Position) -> Self {
        Self {
            code,
            line: position.line,
            column: position.column,
            offset: position.offset,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Input position: 1-based line, 0-based column, byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            line: 1,
            column: 0,
            offset: 0,
        }
    }
}

impl Position {
    pub(crate) fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}
