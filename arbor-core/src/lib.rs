//! arbor core parser
//!
//! Parses JSON-like documents into an owned tree of [`Value`]s.
//! Pull-based: the parser pulls tokens from the tokenizer, which pulls
//! characters from a [`CharSource`].
//!
//! # Architecture
//!
//! - **source.rs** - Character sources (`&str`, seekable readers) with mark/reset
//! - **tokenizer.rs** - Whitespace skipping, token recognition, one-token pushback
//! - **parser.rs** - Recursive-descent productions, depth limit
//! - **value.rs** - Tagged value tree and debug rendering
//! - **error.rs** - Lex/parse error types with offsets and locations
//! - **span.rs** - Span/Location types
//!
//! # Example
//!
//! ```
//! let doc = arbor_core::parse_str(r#"{"name": "arbor", "tags": ["a", "b"]}"#).unwrap();
//! assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("arbor"));
//! assert_eq!(doc.get("tags").map(|v| v.len()), Some(2));
//! ```

pub mod error;
pub mod parser;
pub mod source;
pub mod span;
pub mod token;
pub mod tokenizer;
pub mod value;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

pub use error::{Error, LexError, LexErrorCode, ParseError, ParseErrorCode, Result};
pub use parser::{Parser, ParserOptions, DEFAULT_MAX_DEPTH};
pub use source::{CharSource, Mark, ReadSource, StrSource};
pub use span::{Location, Span};
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use value::{Map, Value, ValueKind};

/// Parse an in-memory document.
pub fn parse_str(input: &str) -> Result<Value> {
    parse_str_with(input, ParserOptions::default())
}

/// Parse an in-memory document with explicit options.
pub fn parse_str_with(input: &str, options: ParserOptions) -> Result<Value> {
    Parser::with_options(StrSource::new(input), options).parse_document()
}

/// Parse a document from a seekable reader. The reader is dropped before
/// returning, whether parsing succeeded or not.
pub fn parse_reader<R: Read + Seek>(reader: R) -> Result<Value> {
    parse_reader_with(reader, ParserOptions::default())
}

/// Parse a document from a seekable reader with explicit options.
pub fn parse_reader_with<R: Read + Seek>(reader: R, options: ParserOptions) -> Result<Value> {
    Parser::with_options(ReadSource::new(reader), options).parse_document()
}

/// Open and parse the file at `path`. The file is closed on every exit path.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Value> {
    parse_file_with(path, ParserOptions::default())
}

/// Open and parse the file at `path` with explicit options.
pub fn parse_file_with(path: impl AsRef<Path>, options: ParserOptions) -> Result<Value> {
    let file = File::open(path)?;
    parse_reader_with(file, options)
}
