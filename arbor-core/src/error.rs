//! Error types for tokenizing and parsing.
//!
//! Every error is fatal to the current parse. Lexical and grammatical
//! failures carry the byte offset where they were detected plus a
//! line/column location for diagnostics.

use std::fmt;
use std::io;

use crate::span::Location;

/// Error codes for lexical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LexErrorCode {
    /// End of input inside a string literal
    UnterminatedString = 0,
    /// Unknown `\x` escape
    InvalidEscape,
    /// Bad `\uXXXX` escape (non-hex digits or unpaired surrogate)
    InvalidUnicodeEscape,
    /// Raw control character inside a string
    ControlCharacter,
    /// Number does not match the numeric grammar
    MalformedNumber,
    /// Integer part with a redundant leading zero
    LeadingZero,
    /// `t`/`f`/`n` not followed by the rest of `true`/`false`/`null`
    InvalidLiteral,
    /// Character that cannot start any token
    UnexpectedCharacter,
}

impl LexErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnterminatedString => "unterminated string",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidUnicodeEscape => "invalid unicode escape",
            Self::ControlCharacter => "unescaped control character in string",
            Self::MalformedNumber => "malformed number",
            Self::LeadingZero => "leading zeros are not allowed",
            Self::InvalidLiteral => "invalid literal",
            Self::UnexpectedCharacter => "unexpected character",
        }
    }
}

/// Error codes for grammar errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ParseErrorCode {
    /// A value was required but another token (or nothing) was found
    ExpectedValue = 0,
    /// Object entry does not start with a string key
    ExpectedKey,
    /// Key not followed by `:`
    ExpectedColon,
    /// Entry not followed by `,` or the closing delimiter
    ExpectedCommaOrClose,
    /// `,` directly before `}` or `]`
    TrailingComma,
    /// Input continues after the root value
    TrailingContent,
    /// Input ended inside an object or list
    UnexpectedEnd,
    /// Composite nesting went past the configured limit
    DepthExceeded,
}

impl ParseErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::ExpectedValue => "expected value",
            Self::ExpectedKey => "expected string key",
            Self::ExpectedColon => "expected ':'",
            Self::ExpectedCommaOrClose => "expected ',' or closing delimiter",
            Self::TrailingComma => "trailing comma",
            Self::TrailingContent => "trailing content",
            Self::UnexpectedEnd => "unexpected end of input",
            Self::DepthExceeded => "maximum nesting depth exceeded",
        }
    }
}

/// The tokenizer could not classify the next lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub code: LexErrorCode,
    pub message: String,
    pub offset: usize,
    pub location: Location,
}

impl LexError {
    pub fn new(code: LexErrorCode, message: impl Into<String>, offset: usize, location: Location) -> Self {
        Self { code, message: message.into(), offset, location }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (offset {})", self.message, self.location, self.offset)
    }
}

impl std::error::Error for LexError {}

/// Tokens were individually valid but violated the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub message: String,
    pub offset: usize,
    pub location: Location,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, message: impl Into<String>, offset: usize, location: Location) -> Self {
        Self { code, message: message.into(), offset, location }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (offset {})", self.message, self.location, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Error returned when a document cannot be parsed.
#[derive(Debug)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    /// The underlying reader failed or produced invalid UTF-8.
    Io(io::Error),
}

impl Error {
    /// Byte offset of the failure, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.offset),
            Error::Parse(e) => Some(e.offset),
            Error::Io(_) => None,
        }
    }

    /// Line/column of the failure, when known.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Lex(e) => Some(e.location),
            Error::Parse(e) => Some(e.location),
            Error::Io(_) => None,
        }
    }

    pub fn is_lex(&self) -> bool {
        matches!(self, Error::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    pub fn lex_code(&self) -> Option<LexErrorCode> {
        match self {
            Error::Lex(e) => Some(e.code),
            _ => None,
        }
    }

    pub fn parse_code(&self) -> Option<ParseErrorCode> {
        match self {
            Error::Parse(e) => Some(e.code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "lex error: {}", e),
            Error::Parse(e) => write!(f, "parse error: {}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
