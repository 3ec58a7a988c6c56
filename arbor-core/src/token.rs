//! Token types produced by the tokenizer.

use std::fmt;

use crate::span::Span;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `{`
    ObjectOpen,
    /// `}`
    ObjectClose,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `[`
    ArrayOpen,
    /// `]`
    ArrayClose,
    /// Quoted string, payload is escape-decoded
    String,
    /// Numeric literal, payload is the literal text
    Number,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
}

impl TokenKind {
    /// Short description used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::ObjectOpen => "'{'",
            Self::ObjectClose => "'}'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::ArrayOpen => "'['",
            Self::ArrayClose => "']'",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Check if a token of this kind can begin a value.
    pub fn starts_value(self) -> bool {
        matches!(
            self,
            Self::ObjectOpen | Self::ArrayOpen | Self::String | Self::Number | Self::Boolean | Self::Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A single lexeme.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Decoded payload for strings, literal text for numbers and booleans,
    /// empty for everything else.
    pub text: String,
    /// Value of a number token, checked finite when it was lexed.
    pub number: Option<f64>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self { kind, text: text.into(), number: None, span }
    }

    /// Number token carrying both its literal text and its value.
    pub fn number(text: impl Into<String>, value: f64, span: Span) -> Self {
        Self { kind: TokenKind::Number, text: text.into(), number: Some(value), span }
    }

    /// Token without payload.
    pub fn symbol(kind: TokenKind, span: Span) -> Self {
        Self { kind, text: String::new(), number: None, span }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "string {:?}", self.text),
            TokenKind::Number | TokenKind::Boolean => write!(f, "{} {}", self.kind, self.text),
            _ => f.write_str(self.kind.describe()),
        }
    }
}
