//! Tokenizer: characters in, tokens out.
//!
//! Pulls characters from a [`CharSource`], skips insignificant whitespace
//! and produces one [`Token`] per call. Exactly one token can be pushed
//! back; the pushed-back token is kept in a single-slot buffer together
//! with the source mark it started at, so pushing back never touches the
//! source.

use phf::phf_map;
use tracing::{debug, trace};
use unicode_xid::UnicodeXID;

use crate::error::{Error, LexError, LexErrorCode, Result};
use crate::source::{CharSource, Mark};
use crate::span::{Location, Span};
use crate::token::{Token, TokenKind};

/// Keyword literals, keyed by their leading character.
static KEYWORDS: phf::Map<char, (&'static str, TokenKind)> = phf_map! {
    't' => ("true", TokenKind::Boolean),
    'f' => ("false", TokenKind::Boolean),
    'n' => ("null", TokenKind::Null),
};

/// Single-character escapes: the character after `\` and what it decodes to.
static ESCAPES: phf::Map<char, char> = phf_map! {
    '"' => '"',
    '\\' => '\\',
    '/' => '/',
    'b' => '\u{08}',
    'f' => '\u{0C}',
    'n' => '\n',
    'r' => '\r',
    't' => '\t',
};

#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t' | '\r')
}

/// The most recently returned token.
#[derive(Debug)]
struct Slot {
    token: Token,
    /// Source position before the whitespace preceding the token.
    mark: Mark,
    /// Whether the token will be handed out again.
    pushed_back: bool,
}

/// Turns a character stream into tokens with one token of pushback.
#[derive(Debug)]
pub struct Tokenizer<S> {
    source: S,
    slot: Option<Slot>,
}

impl<S: CharSource> Tokenizer<S> {
    pub fn new(source: S) -> Self {
        Self { source, slot: None }
    }

    /// Return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(slot) = self.slot.as_mut() {
            if slot.pushed_back {
                slot.pushed_back = false;
                return Ok(Some(slot.token.clone()));
            }
        }

        let mark = self.source.mark();
        match self.lex()? {
            Some(token) => {
                trace!(kind = ?token.kind, span = %token.span, "token");
                self.slot = Some(Slot { token: token.clone(), mark, pushed_back: false });
                Ok(Some(token))
            }
            None => {
                self.slot = None;
                Ok(None)
            }
        }
    }

    /// Make the most recently returned token the next one again.
    ///
    /// # Panics
    ///
    /// Panics if no token has been returned since the last push-back (or
    /// since construction). Only one token of pushback exists.
    pub fn push_back(&mut self) {
        match self.slot.as_mut() {
            Some(slot) if !slot.pushed_back => slot.pushed_back = true,
            Some(_) => panic!("Tokenizer::push_back called twice without an intervening next_token"),
            None => panic!("Tokenizer::push_back called with no token to push back"),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<&Token>> {
        if self.next_token()?.is_none() {
            return Ok(None);
        }
        self.push_back();
        Ok(self.slot.as_ref().map(|slot| &slot.token))
    }

    /// Check whether any non-whitespace content remains.
    ///
    /// Consumes nothing: the source is reset to where it was.
    pub fn has_more_tokens(&mut self) -> Result<bool> {
        if self.slot.as_ref().is_some_and(|slot| slot.pushed_back) {
            return Ok(true);
        }
        let mark = self.source.mark();
        let more = self
            .skip_whitespace()
            .and_then(|()| Ok(self.source.peek_char()?.is_some()));
        self.source.reset(mark)?;
        more
    }

    /// Byte offset of the stream position, accounting for a pushed-back
    /// token.
    pub fn offset(&self) -> usize {
        match &self.slot {
            Some(slot) if slot.pushed_back => slot.mark.offset(),
            _ => self.source.offset(),
        }
    }

    /// Translate a byte offset into a line/column location.
    pub fn locate(&mut self, offset: usize) -> Location {
        self.source.locate(offset)
    }

    /// Give the source back.
    pub fn into_source(self) -> S {
        self.source
    }

    // ------------------------------------------------------------------
    // Lexing
    // ------------------------------------------------------------------

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.source.peek_char()? {
            if !is_whitespace(c) {
                break;
            }
            self.source.next_char()?;
        }
        Ok(())
    }

    fn lex(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace()?;
        let start = self.source.offset();
        let Some(c) = self.source.peek_char()? else {
            return Ok(None);
        };

        let structural = match c {
            '{' => Some(TokenKind::ObjectOpen),
            '}' => Some(TokenKind::ObjectClose),
            '[' => Some(TokenKind::ArrayOpen),
            ']' => Some(TokenKind::ArrayClose),
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = structural {
            self.source.next_char()?;
            return Ok(Some(Token::symbol(kind, Span::new(start, self.source.offset()))));
        }

        let token = match c {
            '"' => self.lex_string(start)?,
            '-' | '0'..='9' => self.lex_number(start)?,
            _ => match KEYWORDS.get(&c) {
                Some(&(literal, kind)) => self.lex_literal(start, literal, kind)?,
                None => return Err(self.unexpected(start, c)),
            },
        };
        Ok(Some(token))
    }

    fn lex_string(&mut self, start: usize) -> Result<Token> {
        self.source.next_char()?; // opening quote
        let mut text = String::new();

        loop {
            let at = self.source.offset();
            match self.source.next_char()? {
                None => {
                    return Err(self.error(LexErrorCode::UnterminatedString, "unterminated string", start));
                }
                Some('"') => break,
                Some('\\') => {
                    let c = self.lex_escape(start, at)?;
                    text.push(c);
                }
                Some(c) if c < '\u{20}' => {
                    return Err(self.error(
                        LexErrorCode::ControlCharacter,
                        format!("unescaped control character U+{:04X} in string", c as u32),
                        at,
                    ));
                }
                Some(c) => text.push(c),
            }
        }

        Ok(Token::new(TokenKind::String, text, Span::new(start, self.source.offset())))
    }

    /// Decode the escape whose backslash sat at `at`.
    fn lex_escape(&mut self, start: usize, at: usize) -> Result<char> {
        let Some(c) = self.source.next_char()? else {
            return Err(self.error(LexErrorCode::UnterminatedString, "unterminated string", start));
        };
        if c != 'u' {
            return match ESCAPES.get(&c) {
                Some(&decoded) => Ok(decoded),
                None => Err(self.error(
                    LexErrorCode::InvalidEscape,
                    format!("invalid escape sequence '\\{}'", c.escape_debug()),
                    at,
                )),
            };
        }

        let high = self.lex_hex4(start, at)?;
        let code = match high {
            0xD800..=0xDBFF => {
                // A high surrogate must be followed by an escaped low one.
                let low_at = self.source.offset();
                let paired = self.source.next_char()? == Some('\\') && self.source.next_char()? == Some('u');
                if !paired {
                    return Err(self.error(
                        LexErrorCode::InvalidUnicodeEscape,
                        format!("unpaired surrogate \\u{:04X}", high),
                        at,
                    ));
                }
                let low = self.lex_hex4(start, low_at)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(
                        LexErrorCode::InvalidUnicodeEscape,
                        format!("unpaired surrogate \\u{:04X}", high),
                        at,
                    ));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error(
                    LexErrorCode::InvalidUnicodeEscape,
                    format!("unpaired surrogate \\u{:04X}", high),
                    at,
                ));
            }
            code => code,
        };

        char::from_u32(code).ok_or_else(|| {
            self.error(
                LexErrorCode::InvalidUnicodeEscape,
                format!("invalid code point U+{:04X}", code),
                at,
            )
        })
    }

    /// Read the four hex digits of a `\u` escape.
    fn lex_hex4(&mut self, start: usize, at: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = match self.source.next_char()? {
                Some(c) => c.to_digit(16),
                None => {
                    return Err(self.error(LexErrorCode::UnterminatedString, "unterminated string", start));
                }
            };
            match digit {
                Some(d) => code = code * 16 + d,
                None => {
                    return Err(self.error(
                        LexErrorCode::InvalidUnicodeEscape,
                        "expected four hex digits after '\\u'",
                        at,
                    ));
                }
            }
        }
        Ok(code)
    }

    /// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
    fn lex_number(&mut self, start: usize) -> Result<Token> {
        let mut text = String::new();

        if self.source.peek_char()? == Some('-') {
            self.source.next_char()?;
            text.push('-');
        }

        match self.source.next_char()? {
            Some('0') => {
                text.push('0');
                if matches!(self.source.peek_char()?, Some('0'..='9')) {
                    return Err(self.error(
                        LexErrorCode::LeadingZero,
                        LexErrorCode::LeadingZero.message(),
                        start,
                    ));
                }
            }
            Some(c @ '1'..='9') => {
                text.push(c);
                self.take_digits(&mut text)?;
            }
            _ => {
                return Err(self.error(
                    LexErrorCode::MalformedNumber,
                    "malformed number: expected digit after '-'",
                    start,
                ));
            }
        }

        if self.source.peek_char()? == Some('.') {
            self.source.next_char()?;
            text.push('.');
            if self.take_digits(&mut text)? == 0 {
                return Err(self.error(
                    LexErrorCode::MalformedNumber,
                    "malformed number: expected digit after decimal point",
                    start,
                ));
            }
        }

        if let Some(e @ ('e' | 'E')) = self.source.peek_char()? {
            self.source.next_char()?;
            text.push(e);
            if let Some(sign @ ('+' | '-')) = self.source.peek_char()? {
                self.source.next_char()?;
                text.push(sign);
            }
            if self.take_digits(&mut text)? == 0 {
                return Err(self.error(
                    LexErrorCode::MalformedNumber,
                    "malformed number: expected digit in exponent",
                    start,
                ));
            }
        }

        let value = match text.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                return Err(self.error(
                    LexErrorCode::MalformedNumber,
                    format!("number out of range: {}", text),
                    start,
                ));
            }
        };

        Ok(Token::number(text, value, Span::new(start, self.source.offset())))
    }

    /// Append a run of ASCII digits, returning how many were taken.
    fn take_digits(&mut self, text: &mut String) -> Result<usize> {
        let mut count = 0;
        while let Some(c @ '0'..='9') = self.source.peek_char()? {
            self.source.next_char()?;
            text.push(c);
            count += 1;
        }
        Ok(count)
    }

    /// Match `literal` exactly, character by character.
    fn lex_literal(&mut self, start: usize, literal: &'static str, kind: TokenKind) -> Result<Token> {
        for expected in literal.chars() {
            if self.source.peek_char()? != Some(expected) {
                return Err(self.error(
                    LexErrorCode::InvalidLiteral,
                    format!("invalid literal, expected `{}`", literal),
                    start,
                ));
            }
            self.source.next_char()?;
        }

        // `nullable`, `true_` and friends are not keywords.
        if self.source.peek_char()?.is_some_and(|c| c.is_xid_continue()) {
            let mut word = literal.to_string();
            self.take_identifier(&mut word)?;
            return Err(self.error(
                LexErrorCode::InvalidLiteral,
                format!("invalid literal `{}`, expected `{}`", word, literal),
                start,
            ));
        }

        let text = if kind == TokenKind::Boolean { literal } else { "" };
        Ok(Token::new(kind, text, Span::new(start, self.source.offset())))
    }

    fn take_identifier(&mut self, word: &mut String) -> Result<()> {
        while let Some(c) = self.source.peek_char()? {
            if !c.is_xid_continue() {
                break;
            }
            self.source.next_char()?;
            word.push(c);
        }
        Ok(())
    }

    /// Error for a character that cannot start a token.
    fn unexpected(&mut self, start: usize, c: char) -> Error {
        if c.is_xid_start() {
            let mut word = String::new();
            if let Err(e) = self.take_identifier(&mut word) {
                return e;
            }
            return self.error(
                LexErrorCode::UnexpectedCharacter,
                format!("unexpected identifier {:?}; strings must be quoted", word),
                start,
            );
        }
        self.error(
            LexErrorCode::UnexpectedCharacter,
            format!("unexpected character {:?}", c),
            start,
        )
    }

    fn error(&mut self, code: LexErrorCode, message: impl Into<String>, offset: usize) -> Error {
        let location = self.source.locate(offset);
        let err = LexError::new(code, message, offset, location);
        debug!(offset, %location, message = %err.message, "lex error");
        Error::Lex(err)
    }
}
