//! Recursive-descent parser.
//!
//! One production per value kind. The parser has no state besides the call
//! stack and a nesting counter: each composite production walks
//! expect-key-or-close → expect-colon → expect-value → expect-comma-or-close
//! (lists skip the key and colon), and each scalar production consumes a
//! single literal token.
//!
//! Every failure is returned as an [`Error`] and propagated unchanged to
//! [`Parser::parse_document`]; nothing is recovered or retried.

use tracing::{debug, trace};

use crate::error::{Error, ParseError, ParseErrorCode, Result};
use crate::source::CharSource;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::value::{Map, Value};

/// Default limit on composite nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of nested objects/lists. Parsing `[[...]]` deeper
    /// than this fails with [`ParseErrorCode::DepthExceeded`].
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// The kind of composite being parsed, for diagnostics.
#[derive(Debug, Clone, Copy)]
enum Composite {
    Object,
    List,
}

impl Composite {
    fn name(self) -> &'static str {
        match self {
            Composite::Object => "object",
            Composite::List => "list",
        }
    }

    fn close(self) -> char {
        match self {
            Composite::Object => '}',
            Composite::List => ']',
        }
    }
}

type Production<S> = fn(&mut Parser<S>) -> Result<Value>;

/// Builds a [`Value`] tree from a token stream.
#[derive(Debug)]
pub struct Parser<S> {
    tokens: Tokenizer<S>,
    options: ParserOptions,
    depth: usize,
}

impl<S: CharSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: S, options: ParserOptions) -> Self {
        Self { tokens: Tokenizer::new(source), options, depth: 0 }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Give the tokenizer back, e.g. to inspect what follows a document.
    pub fn into_tokenizer(self) -> Tokenizer<S> {
        self.tokens
    }

    /// Parse exactly one value spanning the whole input.
    ///
    /// Trailing whitespace is allowed; any trailing token is an error.
    pub fn parse_document(&mut self) -> Result<Value> {
        debug!(max_depth = self.options.max_depth, "parsing document");
        self.depth = 0;

        let value = self.parse_value()?;

        if let Some(token) = self.tokens.next_token()? {
            return Err(self.error(
                ParseErrorCode::TrailingContent,
                format!("trailing content: found {} after the document", token),
                token.span.start,
            ));
        }

        debug!(kind = %value.kind(), depth = value.depth(), "parsed document");
        Ok(value)
    }

    /// Dispatch on the lookahead token to the matching production.
    fn parse_value(&mut self) -> Result<Value> {
        let Some(token) = self.tokens.next_token()? else {
            let offset = self.tokens.offset();
            return Err(self.error(
                ParseErrorCode::ExpectedValue,
                "expected value, found end of input",
                offset,
            ));
        };

        let production: Production<S> = match token.kind {
            TokenKind::ObjectOpen => return self.parse_composite(Composite::Object, &token),
            TokenKind::ArrayOpen => return self.parse_composite(Composite::List, &token),
            TokenKind::String => Self::parse_string,
            TokenKind::Number => Self::parse_number,
            TokenKind::Boolean => Self::parse_boolean,
            TokenKind::Null => Self::parse_null,
            TokenKind::ObjectClose | TokenKind::ArrayClose | TokenKind::Colon | TokenKind::Comma => {
                return Err(self.error(
                    ParseErrorCode::ExpectedValue,
                    format!("expected value, found {}", token),
                    token.span.start,
                ));
            }
        };

        // Scalar productions consume their own token.
        self.tokens.push_back();
        production(self)
    }

    fn parse_composite(&mut self, composite: Composite, open: &Token) -> Result<Value> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error(
                ParseErrorCode::DepthExceeded,
                format!("maximum nesting depth of {} exceeded", self.options.max_depth),
                open.span.start,
            ));
        }

        let value = match composite {
            Composite::Object => self.parse_object(open)?,
            Composite::List => self.parse_list(open)?,
        };
        self.depth -= 1;
        Ok(value)
    }

    /// `{` already consumed.
    fn parse_object(&mut self, open: &Token) -> Result<Value> {
        trace!(offset = open.span.start, depth = self.depth, "object");
        let mut map = Map::new();

        let mut token = self.next_in(Composite::Object, open)?;
        if token.kind == TokenKind::ObjectClose {
            return Ok(Value::Object(map));
        }

        loop {
            if token.kind != TokenKind::String {
                return Err(self.error(
                    ParseErrorCode::ExpectedKey,
                    format!("expected string key, found {}", token),
                    token.span.start,
                ));
            }
            let key = token.text;

            let colon = self.next_in(Composite::Object, open)?;
            if colon.kind != TokenKind::Colon {
                return Err(self.error(
                    ParseErrorCode::ExpectedColon,
                    format!("expected ':' after object key, found {}", colon),
                    colon.span.start,
                ));
            }

            let value = self.parse_value()?;
            if let Some(previous) = map.insert(key, value) {
                trace!(previous = %previous.kind(), "duplicate key overwritten");
            }

            let separator = self.next_in(Composite::Object, open)?;
            match separator.kind {
                TokenKind::ObjectClose => break,
                TokenKind::Comma => {
                    token = self.next_in(Composite::Object, open)?;
                    if token.kind == TokenKind::ObjectClose {
                        return Err(self.trailing_comma(Composite::Object, &separator));
                    }
                }
                _ => return Err(self.expected_comma_or_close(Composite::Object, &separator)),
            }
        }

        Ok(Value::Object(map))
    }

    /// `[` already consumed.
    fn parse_list(&mut self, open: &Token) -> Result<Value> {
        trace!(offset = open.span.start, depth = self.depth, "list");
        let mut items = Vec::new();

        let first = self.next_in(Composite::List, open)?;
        if first.kind == TokenKind::ArrayClose {
            return Ok(Value::List(items));
        }
        self.tokens.push_back();

        loop {
            items.push(self.parse_value()?);

            let separator = self.next_in(Composite::List, open)?;
            match separator.kind {
                TokenKind::ArrayClose => break,
                TokenKind::Comma => {
                    let closes = self
                        .tokens
                        .peek_token()?
                        .is_some_and(|next| next.kind == TokenKind::ArrayClose);
                    if closes {
                        return Err(self.trailing_comma(Composite::List, &separator));
                    }
                }
                _ => return Err(self.expected_comma_or_close(Composite::List, &separator)),
            }
        }

        Ok(Value::List(items))
    }

    fn parse_string(&mut self) -> Result<Value> {
        let token = self.expect_scalar(TokenKind::String)?;
        Ok(Value::String(token.text))
    }

    fn parse_number(&mut self) -> Result<Value> {
        let token = self.expect_scalar(TokenKind::Number)?;
        match token.number {
            Some(n) => Ok(Value::Number(n)),
            None => {
                debug_assert!(false, "number token without a value: {}", token);
                Err(self.error(ParseErrorCode::ExpectedValue, "expected number", token.span.start))
            }
        }
    }

    fn parse_boolean(&mut self) -> Result<Value> {
        let token = self.expect_scalar(TokenKind::Boolean)?;
        Ok(Value::Boolean(token.text == "true"))
    }

    fn parse_null(&mut self) -> Result<Value> {
        self.expect_scalar(TokenKind::Null)?;
        Ok(Value::Null)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Consume the literal token a scalar production was dispatched for.
    fn expect_scalar(&mut self, kind: TokenKind) -> Result<Token> {
        match self.tokens.next_token()? {
            Some(token) if token.kind == kind => Ok(token),
            other => {
                debug_assert!(false, "{} production dispatched on {:?}", kind, other);
                let offset = other.map_or_else(|| self.tokens.offset(), |t| t.span.start);
                Err(self.error(ParseErrorCode::ExpectedValue, format!("expected {}", kind), offset))
            }
        }
    }

    /// Next token inside an open composite; end of input is an error.
    fn next_in(&mut self, composite: Composite, open: &Token) -> Result<Token> {
        match self.tokens.next_token()? {
            Some(token) => Ok(token),
            None => {
                let offset = self.tokens.offset();
                Err(self.error(
                    ParseErrorCode::UnexpectedEnd,
                    format!(
                        "unexpected end of input: unclosed {} opened at offset {}",
                        composite.name(),
                        open.span.start
                    ),
                    offset,
                ))
            }
        }
    }

    fn trailing_comma(&mut self, composite: Composite, comma: &Token) -> Error {
        self.error(
            ParseErrorCode::TrailingComma,
            format!("trailing comma before '{}' in {}", composite.close(), composite.name()),
            comma.span.start,
        )
    }

    fn expected_comma_or_close(&mut self, composite: Composite, found: &Token) -> Error {
        self.error(
            ParseErrorCode::ExpectedCommaOrClose,
            format!(
                "expected ',' or '{}' in {}, found {}",
                composite.close(),
                composite.name(),
                found
            ),
            found.span.start,
        )
    }

    fn error(&mut self, code: ParseErrorCode, message: impl Into<String>, offset: usize) -> Error {
        let location = self.tokens.locate(offset);
        let err = ParseError::new(code, message, offset, location);
        debug!(offset, %location, message = %err.message, "parse error");
        Error::Parse(err)
    }
}
