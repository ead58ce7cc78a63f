//! Byte Cursor
//!
//! Position-tracked view over an immutable in-memory PDF buffer. All matching
//! is anchored at the current position: a pattern either applies right here or
//! it does not apply at all.

use regex::bytes::{Captures, Regex};

/// Something that can be matched at the start of a byte slice.
pub trait Pattern {
    /// Length of the match anchored at the start of `haystack`, if any.
    fn match_len(&self, haystack: &[u8]) -> Option<usize>;
}

impl Pattern for Regex {
    fn match_len(&self, haystack: &[u8]) -> Option<usize> {
        // Grammar regexes are written with a leading `^`, but an unanchored
        // expression must still not be allowed to match further ahead.
        self.find(haystack)
            .filter(|m| m.start() == 0)
            .map(|m| m.end())
    }
}

impl Pattern for [u8] {
    fn match_len(&self, haystack: &[u8]) -> Option<usize> {
        haystack.starts_with(self).then_some(self.len())
    }
}

impl<const N: usize> Pattern for [u8; N] {
    fn match_len(&self, haystack: &[u8]) -> Option<usize> {
        self.as_slice().match_len(haystack)
    }
}

/// Cursor over a borrowed byte buffer
///
/// The buffer is never mutated; only the offset moves. Several cursors may
/// share one buffer, each owning its own position.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Match `pattern` at the current position.
    ///
    /// On success the cursor moves past the match and the matched bytes are
    /// returned. On failure the position is left untouched.
    pub fn scan<P: Pattern + ?Sized>(&mut self, pattern: &P) -> Option<&'a [u8]> {
        let rest = self.remaining();
        let len = pattern.match_len(rest)?;
        self.position += len;
        Some(&rest[..len])
    }

    /// Same as [`scan`](Self::scan) but only reports whether it matched
    pub fn skip<P: Pattern + ?Sized>(&mut self, pattern: &P) -> bool {
        self.scan(pattern).is_some()
    }

    /// Capture groups of `regex` matched at the current position, without advancing
    pub fn check(&self, regex: &Regex) -> Option<Captures<'a>> {
        let rest = self.remaining();
        regex
            .captures(rest)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
    }

    /// Up to `n` bytes from the current position, without advancing
    pub fn peek(&self, n: usize) -> &'a [u8] {
        let rest = self.remaining();
        &rest[..n.min(rest.len())]
    }

    /// Consume a single byte
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.data.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    /// Move forward `n` bytes, stopping at the end of the buffer
    pub fn advance(&mut self, n: usize) {
        self.position = self.position.saturating_add(n).min(self.data.len());
    }

    /// Everything from the current position to the end of the buffer
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Move to an absolute offset. Offsets past the end clamp to the end.
    pub fn seek(&mut self, offset: usize) {
        self.position = offset.min(self.data.len());
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
