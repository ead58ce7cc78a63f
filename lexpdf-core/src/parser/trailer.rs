//! PDF Trailer Offset Recovery
//!
//! Locates the byte offset of the primary cross-reference section from the
//! `startxref` / offset / `%%EOF` lines at the end of the file (ISO 32000-1
//! Section 7.5.5). Works on the raw source, independent of any tokenizer.

use super::{MalformedReason, ParseResult};
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// How far back from the end of the file to look for `%%EOF`.
///
/// Quite a few PDFs carry trailing junk after the marker, sometimes several
/// kilobytes of NUL padding.
pub const TRAILING_BYTECOUNT: u64 = 5000;

const EOF_MARKER: &[u8] = b"%%EOF";

/// Find the offset of the first xref section by reading the tail of `source`.
///
/// Repositions `source`; callers sharing a handle with other readers must
/// restore their own position afterwards.
pub fn find_trailer_offset<R: Read + Seek>(source: &mut R) -> ParseResult<u64> {
    let file_size = match source.seek(SeekFrom::End(0)) {
        Ok(size) => size,
        Err(err) => {
            debug!(%err, "source cannot be sought, treating it as empty");
            return Err(MalformedReason::EmptySource.into());
        }
    };
    if file_size == 0 {
        return Err(MalformedReason::EmptySource.into());
    }

    let read_size = file_size.min(TRAILING_BYTECOUNT);
    source.seek(SeekFrom::Start(file_size - read_size))?;

    let mut tail = Vec::with_capacity(read_size as usize);
    source.by_ref().take(read_size).read_to_end(&mut tail)?;

    let offset = offset_from_tail(&tail)?;
    debug!(offset, "recovered xref offset from trailer");
    Ok(offset)
}

/// [`find_trailer_offset`] over an already-loaded buffer
pub fn find_trailer_offset_in(data: &[u8]) -> ParseResult<u64> {
    find_trailer_offset(&mut Cursor::new(data))
}

fn offset_from_tail(tail: &[u8]) -> ParseResult<u64> {
    // EOL markers can be CR, LF or both, and blank lines carry no information
    let lines: Vec<&[u8]> = tail
        .split(|&b| b == b'\n' || b == b'\r')
        .filter(|line| !line.is_empty())
        .rev()
        .collect();

    let eof_index = lines
        .iter()
        .position(|line| trim_line(line).starts_with(EOF_MARKER))
        .ok_or(MalformedReason::MissingEndOfFileMarker)?;

    let offset_line = lines
        .get(eof_index + 1)
        .ok_or(MalformedReason::MarkerHasNoPrecedingOffsetLine)?;

    let offset = parse_leading_integer(offset_line);
    if offset < 0 {
        warn!(offset, "negative xref offset before %%EOF");
        return Err(MalformedReason::NegativeOffset.into());
    }
    Ok(offset as u64)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let is_padding = |b: &u8| b.is_ascii_whitespace() || *b == 0 || *b == 0x0B;
    let start = line.iter().position(|b| !is_padding(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !is_padding(b)).map_or(start, |i| i + 1);
    &line[start..end]
}

/// Parse an integer the lenient way: skip leading whitespace, accept an
/// optional sign, then take as many digits as follow.
///
/// Anything without leading digits is 0 rather than an error. Overlong values
/// saturate.
pub(crate) fn parse_leading_integer(line: &[u8]) -> i64 {
    let mut bytes = line
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace() || *b == 0x0B)
        .peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    let mut saw_digit = false;
    for digit in bytes.take_while(u8::is_ascii_digit) {
        saw_digit = true;
        let digit = i64::from(digit - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !saw_digit {
        warn!(
            line = %String::from_utf8_lossy(line),
            "xref offset line is not numeric, using 0"
        );
    }

    if negative {
        -value
    } else {
        value
    }
}
