//! PDF Lexical Front End
//!
//! Converts raw PDF bytes into a stream of lexical tokens and recovers the
//! primary cross-reference offset from the file trailer. Building objects out
//! of the tokens is left to the consumer.

pub mod cursor;
pub mod lexer;
pub mod trailer;

use std::io::{Read, Seek, SeekFrom};

pub use self::cursor::{ByteCursor, Pattern};
pub use self::lexer::{Token, Tokenizer, LOOKAHEAD_DEPTH};
pub use self::trailer::{find_trailer_offset, find_trailer_offset_in, TRAILING_BYTECOUNT};

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed PDF: {0}")]
    Malformed(#[from] MalformedReason),
}

impl ParseError {
    /// The malformed-input reason code, if this is a malformed-input error
    pub fn reason(&self) -> Option<MalformedReason> {
        match self {
            ParseError::Malformed(reason) => Some(*reason),
            ParseError::Io(_) => None,
        }
    }
}

/// Why the input was rejected as malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("PDF file is empty")]
    EmptySource,

    #[error("PDF does not contain EOF marker")]
    MissingEndOfFileMarker,

    #[error("PDF EOF marker does not follow offset")]
    MarkerHasNoPrecedingOffsetLine,

    #[error("invalid xref offset")]
    NegativeOffset,
}

/// Options for constructing a [`Tokenizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Byte offset to start tokenizing from
    pub seek: usize,
    /// Use the content stream character classes for whitespace and name
    /// terminators instead of the file-level ones
    pub content_stream: bool,
}

impl LexerOptions {
    /// Options for tokenizing a page content stream
    pub fn content_stream() -> Self {
        Self {
            content_stream: true,
            ..Self::default()
        }
    }

    pub fn with_seek(mut self, offset: usize) -> Self {
        self.seek = offset;
        self
    }

    pub fn with_content_stream(mut self, content_stream: bool) -> Self {
        self.content_stream = content_stream;
        self
    }
}

/// Rewind a file-like source and read all of it into memory.
///
/// The tokenizer only works on in-memory buffers, so file handles go through
/// here first.
pub fn load_source<R: Read + Seek>(mut reader: R) -> ParseResult<Vec<u8>> {
    reader.seek(SeekFrom::Start(0))?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    tracing::debug!(bytes = data.len(), "loaded PDF source");
    Ok(data)
}
