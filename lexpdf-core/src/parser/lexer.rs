//! PDF Lexer
//!
//! Tokenizes PDF syntax with a small mode-based state machine. Regular mode
//! recognizes ordinary tokens; opening a stream, a literal string or a hex
//! string switches into a sub-mode that scans the payload under its own rules
//! and then hands control back to regular mode.
//!
//! Tokens are produced ahead of the consumer into a short lookahead queue so
//! that the object parser can always see a couple of tokens past the one it is
//! about to take.

use super::cursor::ByteCursor;
use super::LexerOptions;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace, warn};

/// Minimum number of pending tokens kept ahead of the consumer
pub const LOOKAHEAD_DEPTH: usize = 3;

const STREAM_KEYWORD: &[u8; 6] = b"stream";
const ENDSTREAM_KEYWORD: &[u8] = b"endstream";

lazy_static! {
    static ref INDIRECT_REFERENCE: Regex = Regex::new(r"(?-u)^(\d+)\s(\d+)\sR").unwrap();
    static ref ALPHA: Regex = Regex::new(r"(?-u)^[a-zA-Z0-9\-.,*+_:'\\;]+").unwrap();
    static ref NUMBER: Regex = Regex::new(r"(?-u)^\d+(\.\d+)?").unwrap();
    static ref ARRAY_DELIMITER: Regex = Regex::new(r"(?-u)^[\[\]]").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?-u)^%[^\r\n]*").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"(?-u)^\s+").unwrap();
    static ref CONTENT_WHITESPACE: Regex = Regex::new(r"(?-u)^[\x00\t\n\x0C\r ]+").unwrap();
    static ref INSIDE_HEX_STRING: Regex = Regex::new(r"(?-u)^[^>]+").unwrap();
    static ref STREAM_END: Regex = Regex::new(r"(?s-u)^.*?endstream").unwrap();
}

/// PDF Token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Numeric literal, kept as written (e.g. `3.14`)
    Number(String),

    /// Run of keyword/operator characters (e.g. `obj`, `Tf`, `Type`)
    Alpha(String),

    /// `[` or `]`
    Delimiter(u8),

    /// Dictionary start <<
    DictStart,

    /// Dictionary end >>
    DictEnd,

    /// Hex string start <
    HexStringStart,

    /// Hex string end >
    HexStringEnd,

    /// Literal string start (
    LiteralStringStart,

    /// Literal string end )
    LiteralStringEnd,

    /// Name marker /
    NameStart,

    /// Zero-length name content directly after a [`Token::NameStart`]
    EmptyName,

    /// Reference (e.g., 1 0 R)
    Reference { id: u64, generation: u64 },

    /// Stream keyword
    Stream,

    /// Raw stream payload, never re-scanned
    StreamBody(Vec<u8>),

    /// Endstream keyword
    EndStream,

    /// Literal string content with escapes left as written
    LiteralString(Vec<u8>),

    /// Hex string content with everything but hex digits removed
    HexString(String),

    /// Any byte the grammar does not recognize
    Raw(u8),
}

impl Token {
    pub fn is_stream_start(&self) -> bool {
        matches!(self, Token::Stream)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(s) | Token::Alpha(s) | Token::HexString(s) => f.write_str(s),
            Token::Delimiter(b) | Token::Raw(b) => write!(f, "{}", char::from(*b)),
            Token::DictStart => f.write_str("<<"),
            Token::DictEnd => f.write_str(">>"),
            Token::HexStringStart => f.write_str("<"),
            Token::HexStringEnd => f.write_str(">"),
            Token::LiteralStringStart => f.write_str("("),
            Token::LiteralStringEnd => f.write_str(")"),
            Token::NameStart => f.write_str("/"),
            Token::EmptyName => Ok(()),
            Token::Reference { id, generation } => write!(f, "{id} {generation} R"),
            Token::Stream => f.write_str("stream"),
            Token::EndStream => f.write_str("endstream"),
            Token::StreamBody(bytes) | Token::LiteralString(bytes) => {
                f.write_str(&String::from_utf8_lossy(bytes))
            }
        }
    }
}

/// Which sub-grammar the next scan uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Regular,
    InStream,
    InLiteralString,
    InHexString,
}

/// Character classes that differ between file-level and content stream syntax
#[derive(Debug, Clone, Copy)]
struct CharClasses {
    content_stream: bool,
}

impl CharClasses {
    fn whitespace(&self) -> &'static Regex {
        if self.content_stream {
            &*CONTENT_WHITESPACE
        } else {
            &*WHITESPACE
        }
    }

    /// Whether `next` (empty at end of input) ends a name before it has any characters
    fn ends_empty_name(&self, next: &[u8]) -> bool {
        let Some(&byte) = next.first() else {
            return true;
        };
        if is_legacy_delimiter(byte) {
            return true;
        }
        if self.content_stream {
            is_pdf_whitespace(byte)
        } else {
            matches!(byte, b' ' | b'\n')
        }
    }
}

fn is_legacy_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'%' | b'<' | b'>' | b'(' | b'[' | b'{' | b')' | b']' | b'}' | b'/'
    )
}

fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// Pull tokenizer over an in-memory PDF buffer
pub struct Tokenizer<'a> {
    cursor: ByteCursor<'a>,
    mode: Mode,
    classes: CharClasses,
    tokens: VecDeque<Token>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer starting at the beginning of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, LexerOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: LexerOptions) -> Self {
        let mut cursor = ByteCursor::new(data);
        cursor.seek(options.seek);
        Self {
            cursor,
            mode: Mode::Regular,
            classes: CharClasses {
                content_stream: options.content_stream,
            },
            tokens: VecDeque::with_capacity(LOOKAHEAD_DEPTH + 1),
        }
    }

    /// Take the next token, or `None` once the input is used up
    pub fn next_token(&mut self) -> Option<Token> {
        self.fill_lookahead();
        self.tokens.pop_front()
    }

    /// Look at the `n`th pending token (0 is the one `next_token` returns)
    /// without consuming anything.
    ///
    /// Only the lookahead queue is visible, so this looks at most
    /// [`LOOKAHEAD_DEPTH`] tokens ahead. `n >= LOOKAHEAD_DEPTH` gives `None`
    /// even when more input remains; use [`Tokenizer::is_exhausted`] to test
    /// for end of input.
    pub fn peek_token(&mut self, n: usize) -> Option<&Token> {
        self.fill_lookahead();
        self.tokens.get(n)
    }

    /// True when no more tokens can ever be produced
    pub fn is_exhausted(&mut self) -> bool {
        self.fill_lookahead();
        self.tokens.is_empty()
    }

    /// Current scan position in the buffer.
    ///
    /// This runs ahead of the last returned token by however many tokens are
    /// queued.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Restart tokenization at `offset`, discarding any queued tokens
    pub fn reset(&mut self, offset: usize) {
        self.tokens.clear();
        self.mode = Mode::Regular;
        self.cursor.seek(offset);
    }

    pub fn content_stream(&self) -> bool {
        self.classes.content_stream
    }

    /// Scan until LOOKAHEAD_DEPTH tokens are pending or the input runs out.
    ///
    /// Nothing past a queued `stream` keyword is scanned until the keyword has
    /// been handed out.
    fn fill_lookahead(&mut self) {
        while self.tokens.len() < LOOKAHEAD_DEPTH {
            if self.tokens.back().is_some_and(Token::is_stream_start) {
                break;
            }
            if !self.prepare_tokens() {
                break;
            }
        }
    }

    /// Run one scan step in the current mode. Returns false when the input is
    /// exhausted and there is nothing left to emit.
    fn prepare_tokens(&mut self) -> bool {
        if self.cursor.at_end() {
            return match self.mode {
                Mode::Regular => false,
                Mode::InLiteralString => {
                    // Source cut off right after an opening parenthesis
                    self.tokens.push_back(Token::LiteralStringEnd);
                    self.set_mode(Mode::Regular);
                    true
                }
                Mode::InStream | Mode::InHexString => {
                    self.set_mode(Mode::Regular);
                    true
                }
            };
        }

        match self.mode {
            Mode::Regular => self.scan_regular(),
            Mode::InStream => self.scan_stream(),
            Mode::InLiteralString => self.scan_literal_string(),
            Mode::InHexString => self.scan_hex_string(),
        }
        true
    }

    fn set_mode(&mut self, mode: Mode) {
        trace!(from = ?self.mode, to = ?mode, position = self.cursor.position(), "lexer mode change");
        self.mode = mode;
    }

    fn scan_regular(&mut self) {
        if let Some(token) = self.scan_reference() {
            self.tokens.push_back(token);
        } else if self.cursor.skip(STREAM_KEYWORD) {
            self.tokens.push_back(Token::Stream);
            self.set_mode(Mode::InStream);
        } else if let Some(alpha) = self.cursor.scan(&*ALPHA) {
            self.tokens.push_back(Token::Alpha(ascii_string(alpha)));
        } else if let Some(number) = self.cursor.scan(&*NUMBER) {
            self.tokens.push_back(Token::Number(ascii_string(number)));
        } else if let Some(delimiter) = self.cursor.scan(&*ARRAY_DELIMITER) {
            self.tokens.push_back(Token::Delimiter(delimiter[0]));
        } else if self.cursor.skip(&*COMMENT) {
            // comments are dropped
        } else if self.cursor.skip(b"<<") {
            self.tokens.push_back(Token::DictStart);
        } else if self.cursor.skip(b">>") {
            self.tokens.push_back(Token::DictEnd);
        } else if self.cursor.skip(b"<") {
            self.tokens.push_back(Token::HexStringStart);
            self.set_mode(Mode::InHexString);
        } else if self.cursor.skip(b">") {
            self.tokens.push_back(Token::HexStringEnd);
        } else if self.cursor.skip(b"(") {
            self.tokens.push_back(Token::LiteralStringStart);
            self.set_mode(Mode::InLiteralString);
        } else if self.cursor.skip(b")") {
            self.tokens.push_back(Token::LiteralStringEnd);
        } else if self.cursor.skip(b"/") {
            self.tokens.push_back(Token::NameStart);
            // PDF names can be empty, so a lone "/" is the name ""
            if self.classes.ends_empty_name(self.cursor.peek(1)) {
                self.tokens.push_back(Token::EmptyName);
            }
        } else if self.cursor.skip(self.classes.whitespace()) {
            // whitespace is dropped
        } else if let Some(byte) = self.cursor.next_byte() {
            self.tokens.push_back(Token::Raw(byte));
        }
    }

    /// `id gen R`, provided both numbers fit in a `u64`
    fn scan_reference(&mut self) -> Option<Token> {
        let caps = self.cursor.check(&INDIRECT_REFERENCE)?;
        let id = ascii_str(&caps[1]).parse::<u64>().ok()?;
        let generation = ascii_str(&caps[2]).parse::<u64>().ok()?;
        let len = caps[0].len();
        self.cursor.advance(len);
        Some(Token::Reference { id, generation })
    }

    fn scan_stream(&mut self) {
        let (content, terminated) = match self.cursor.scan(&*STREAM_END) {
            Some(span) => (&span[..span.len() - ENDSTREAM_KEYWORD.len()], true),
            None => {
                let rest = self.cursor.remaining();
                self.cursor.advance(rest.len());
                (rest, false)
            }
        };

        let body = strip_trailing_eol(strip_leading_eol(content));
        debug!(bytes = body.len(), "stream body");
        self.tokens.push_back(Token::StreamBody(body.to_vec()));

        if terminated {
            self.tokens.push_back(Token::EndStream);
        } else {
            warn!(
                position = self.cursor.position(),
                "stream has no endstream keyword, taking the rest of the input"
            );
        }
        self.set_mode(Mode::Regular);
    }

    fn scan_literal_string(&mut self) {
        let mut content = Vec::new();
        let mut depth = 1usize;

        while depth > 0 {
            let Some(byte) = self.cursor.next_byte() else {
                warn!(
                    position = self.cursor.position(),
                    "unbalanced parentheses in literal string"
                );
                break;
            };
            match byte {
                b'\\' => {
                    // Escapes are passed through untouched
                    content.push(byte);
                    if let Some(escaped) = self.cursor.next_byte() {
                        content.push(escaped);
                    }
                }
                b'(' => {
                    depth += 1;
                    content.push(byte);
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        content.push(byte);
                    }
                }
                _ => content.push(byte),
            }
        }

        if !content.is_empty() {
            self.tokens.push_back(Token::LiteralString(content));
        }
        self.tokens.push_back(Token::LiteralStringEnd);
        self.set_mode(Mode::Regular);
    }

    fn scan_hex_string(&mut self) {
        if let Some(span) = self.cursor.scan(&*INSIDE_HEX_STRING) {
            let digits = span
                .iter()
                .filter(|b| b.is_ascii_hexdigit())
                .map(|&b| char::from(b))
                .collect();
            self.tokens.push_back(Token::HexString(digits));
        }
        self.set_mode(Mode::Regular);
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn strip_leading_eol(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_prefix(b"\r\n")
        .or_else(|| bytes.strip_prefix(b"\n"))
        .unwrap_or(bytes)
}

fn strip_trailing_eol(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}

// The grammar regexes only ever match ASCII, so these never lose data.
fn ascii_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap_or_default()
}

fn ascii_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
