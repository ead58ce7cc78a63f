//! # lexpdf
//!
//! The lexical front end of a PDF reader: turns raw PDF bytes into a stream of
//! tokens, and recovers the cross-reference offset from the file trailer.
//!
//! ## Features
//!
//! - **Tokenizer**: Mode-based scanner with dedicated sub-grammars for streams,
//!   literal strings and hex strings
//! - **Lookahead**: Always at least three tokens queued ahead of the consumer
//! - **Lenient**: Never fails on malformed input; unknown bytes become single
//!   byte tokens
//! - **Trailer Recovery**: Finds the `startxref` offset even with trailing junk
//!
//! ## Quick Start
//!
//! ### Tokenizing
//!
//! ```rust
//! use lexpdf::parser::{Token, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::new(b"<< /Type /Page /Parent 2 0 R >>");
//!
//! assert_eq!(tokenizer.next_token(), Some(Token::DictStart));
//! assert_eq!(tokenizer.next_token(), Some(Token::NameStart));
//! assert_eq!(tokenizer.next_token(), Some(Token::Alpha("Type".to_string())));
//!
//! let rest: Vec<Token> = tokenizer.collect();
//! assert!(rest.contains(&Token::Reference { id: 2, generation: 0 }));
//! assert_eq!(rest.last(), Some(&Token::DictEnd));
//! ```
//!
//! ### Content streams
//!
//! ```rust
//! use lexpdf::parser::{LexerOptions, Tokenizer};
//!
//! let content = b"BT /F1 12 Tf (Hello) Tj ET";
//! let tokenizer = Tokenizer::with_options(content, LexerOptions::content_stream());
//! assert_eq!(tokenizer.count(), 10);
//! ```
//!
//! ### Finding the xref offset
//!
//! ```rust
//! use lexpdf::parser::find_trailer_offset_in;
//!
//! let tail = b"trailer\n<< /Size 4 >>\nstartxref\n1234\n%%EOF\n";
//! assert_eq!(find_trailer_offset_in(tail).unwrap(), 1234);
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - Lexical scanning of PDF files
//!   - [`parser::cursor`] - Position-tracked byte view
//!   - [`parser::lexer`] - Tokenizer and token types
//!   - [`parser::trailer`] - Trailer offset recovery

pub mod parser;

// Re-export parsing types
pub use parser::{
    find_trailer_offset, find_trailer_offset_in, load_source, LexerOptions, MalformedReason,
    ParseError, ParseResult, Token, Tokenizer,
};

/// Current version of lexpdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
