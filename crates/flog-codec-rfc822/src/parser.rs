//! The RFC 822-style header parser: a single-pass, restartable-across-refills
//! state machine:
//!
//! ```text
//! LeadingWs → HeaderName → NameValueSep → HeaderValue → ValueTerminator
//!                    ↘ TrailingCrlf → Done
//! ```
//!
//! `'\r'` followed by `'\n'` at the start of a header-name position (i.e. in
//! `LeadingWs`) terminates the header block. Folded (continuation) lines —
//! a line starting with horizontal whitespace that is meant to extend the
//! previous header's value — are a known gap and are rejected
//! as a framing error rather than merged.

use crate::scratch::Scratch;
use flog_core::error::{CoreError, ErrorCategory, codes};
use std::io::IoSlice;
use std::ops::Range;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const COLON: u8 = b':';
const SPACE: u8 = b' ';
const HTAB: u8 = b'\t';

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    LeadingWs,
    HeaderName,
    NameValueSep,
    HeaderValue,
    ValueTerminator,
    TrailingCrlf,
    Done,
}

/// One parsed header's name/value ranges into the parser's [`Scratch`]
/// buffer. Substitutes for four raw `iov_base` pointers per
/// header — ranges are bounds-checked against the owning `Scratch` rather
/// than raw pointers aliasing it, the idiomatic Rust shape for the same
/// "points into a shared scratch buffer" contract.
#[derive(Clone, Debug)]
pub struct HeaderSlot {
    name: Range<usize>,
    value: Range<usize>,
}

/// What [`HeaderParser::feed`] did with the bytes it was handed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeaderDecodeOutcome {
    /// The header block is not yet complete; refill the input and call
    /// `feed` again. The parser's internal state is preserved.
    NeedMore,
    /// The terminating blank line (`\r\n`) was consumed; the header table
    /// is final.
    Done,
}

/// Incremental RFC 822 header-block parser plus the resulting flat header
/// table.
pub struct HeaderParser {
    scratch: Scratch,
    headers: Vec<HeaderSlot>,
    state: State,
    name_start: usize,
    name_end: usize,
    value_start: usize,
}

impl HeaderParser {
    pub fn new() -> Self {
        Self {
            scratch: Scratch::new(),
            headers: Vec::new(),
            state: State::LeadingWs,
            name_start: 0,
            name_end: 0,
            value_start: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn headers(&self) -> &[HeaderSlot] {
        &self.headers
    }

    /// Consumes as much of `input` as forms complete header-block grammar,
    /// returning how many bytes were consumed and whether the block is
    /// done. Restartable: call again with more bytes if it returns
    /// `NeedMore`.
    pub fn feed(&mut self, input: &[u8]) -> Result<(HeaderDecodeOutcome, usize), CoreError> {
        let mut i = 0;
        while i < input.len() {
            let byte = input[i];
            match self.state {
                State::LeadingWs => {
                    if byte == CR {
                        self.state = State::TrailingCrlf;
                        i += 1;
                    } else if byte == SPACE || byte == HTAB {
                        return Err(folded_header_error());
                    } else {
                        self.name_start = self.scratch.len();
                        self.state = State::HeaderName;
                        // Reprocess `byte` as the first byte of the name.
                    }
                }
                State::HeaderName => {
                    if byte == COLON {
                        self.name_end = self.scratch.len();
                        self.state = State::NameValueSep;
                        i += 1;
                    } else if byte == CR || byte == LF {
                        return Err(malformed("header line ended before a `:` separator"));
                    } else {
                        self.scratch.push(byte);
                        i += 1;
                    }
                }
                State::NameValueSep => {
                    if byte == SPACE || byte == HTAB {
                        i += 1;
                    } else {
                        self.value_start = self.scratch.len();
                        self.state = State::HeaderValue;
                        // Reprocess `byte` as the first byte of the value.
                    }
                }
                State::HeaderValue => {
                    if byte == CR {
                        self.headers.push(HeaderSlot {
                            name: self.name_start..self.name_end,
                            value: self.value_start..self.scratch.len(),
                        });
                        self.state = State::ValueTerminator;
                        i += 1;
                    } else {
                        self.scratch.push(byte);
                        i += 1;
                    }
                }
                State::ValueTerminator => {
                    if byte != LF {
                        return Err(malformed("header value not terminated by CRLF"));
                    }
                    self.state = State::LeadingWs;
                    i += 1;
                }
                State::TrailingCrlf => {
                    if byte != LF {
                        return Err(malformed("header block terminator not CRLF"));
                    }
                    self.state = State::Done;
                    i += 1;
                    return Ok((HeaderDecodeOutcome::Done, i));
                }
                State::Done => {
                    return Ok((HeaderDecodeOutcome::Done, i));
                }
            }
        }
        Ok((HeaderDecodeOutcome::NeedMore, i))
    }

    /// Scans the header table for `name`, comparing case-sensitively as
    /// stored, returning the first matching value or
    /// `default`.
    pub fn get_header<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        let bytes = self.scratch.as_slice();
        for slot in &self.headers {
            if &bytes[slot.name.clone()] == name.as_bytes() {
                return std::str::from_utf8(&bytes[slot.value.clone()]).unwrap_or(default);
            }
        }
        default
    }

    /// Scans case-insensitively, used by the HTTP codec's `Content-Length`
    /// lookup which tries two spellings in a fixed order —
    /// exposed generically here since the case-insensitive match itself is
    /// a single, reusable primitive.
    pub fn get_header_ci<'a>(&'a self, name: &str) -> Option<&'a str> {
        let bytes = self.scratch.as_slice();
        for slot in &self.headers {
            let candidate = &bytes[slot.name.clone()];
            if candidate.eq_ignore_ascii_case(name.as_bytes()) {
                return std::str::from_utf8(&bytes[slot.value.clone()]).ok();
            }
        }
        None
    }

    /// Produces a gather-I/O view over the current header table: four
    /// `IoSlice`s per header (`name`, `": "`, `value`, `"\r\n"`), suitable
    /// for `writev`.
    pub fn serialize(&self) -> Vec<IoSlice<'_>> {
        static SEP: &[u8] = b": ";
        static CRLF: &[u8] = b"\r\n";
        let bytes = self.scratch.as_slice();
        let mut out = Vec::with_capacity(self.headers.len() * 4);
        for slot in &self.headers {
            out.push(IoSlice::new(&bytes[slot.name.clone()]));
            out.push(IoSlice::new(SEP));
            out.push(IoSlice::new(&bytes[slot.value.clone()]));
            out.push(IoSlice::new(CRLF));
        }
        out
    }

    /// Appends a header to the table directly (used by the emit path — a
    /// response/request under construction, not one being parsed off the
    /// wire).
    pub fn push_header(&mut self, name: &str, value: &str) {
        let name_start = self.scratch.len();
        for b in name.as_bytes() {
            self.scratch.push(*b);
        }
        let name_end = self.scratch.len();
        let value_start = self.scratch.len();
        for b in value.as_bytes() {
            self.scratch.push(*b);
        }
        let value_end = self.scratch.len();
        self.headers.push(HeaderSlot {
            name: name_start..name_end,
            value: value_start..value_end,
        });
    }

    pub fn reset(&mut self) {
        self.scratch.clear();
        self.headers.clear();
        self.state = State::LeadingWs;
        self.name_start = 0;
        self.name_end = 0;
        self.value_start = 0;
    }
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(msg: &'static str) -> CoreError {
    CoreError::new(codes::HEADER_MALFORMED, ErrorCategory::Malformed, msg)
}

fn folded_header_error() -> CoreError {
    CoreError::new(
        codes::HEADER_MALFORMED,
        ErrorCategory::Malformed,
        "folded (continuation) header lines are not supported",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_header_and_terminates_on_blank_line() {
        let mut p = HeaderParser::new();
        let input = b"Host: example.com\r\n\r\n";
        let (outcome, consumed) = p.feed(input).unwrap();
        assert_eq!(outcome, HeaderDecodeOutcome::Done);
        assert_eq!(consumed, input.len());
        assert_eq!(p.get_header("Host", ""), "example.com");
    }

    #[test]
    fn parses_multiple_headers() {
        let mut p = HeaderParser::new();
        let input = b"Host: example.com\r\nContent-Length: 5\r\n\r\n";
        let (outcome, _) = p.feed(input).unwrap();
        assert_eq!(outcome, HeaderDecodeOutcome::Done);
        assert_eq!(p.get_header("Content-Length", ""), "5");
        assert_eq!(p.get_header("Host", ""), "example.com");
    }

    #[test]
    fn need_more_when_input_ends_mid_header_and_resumes_on_refill() {
        let mut p = HeaderParser::new();
        let (outcome, consumed) = p.feed(b"Host: exa").unwrap();
        assert_eq!(outcome, HeaderDecodeOutcome::NeedMore);
        assert_eq!(consumed, 9);
        let (outcome, _) = p.feed(b"mple.com\r\n\r\n").unwrap();
        assert_eq!(outcome, HeaderDecodeOutcome::Done);
        assert_eq!(p.get_header("Host", ""), "example.com");
    }

    #[test]
    fn missing_colon_is_malformed() {
        let mut p = HeaderParser::new();
        assert!(p.feed(b"NoColonHere\r\n").is_err());
    }

    #[test]
    fn leading_whitespace_continuation_is_rejected() {
        let mut p = HeaderParser::new();
        p.feed(b"Host: example.com\r\n").unwrap();
        assert!(p.feed(b" continued\r\n").is_err());
    }

    #[test]
    fn get_header_is_case_sensitive_as_stored() {
        let mut p = HeaderParser::new();
        p.feed(b"Host: example.com\r\n\r\n").unwrap();
        assert_eq!(p.get_header("host", "missing"), "missing");
    }

    #[test]
    fn get_header_ci_matches_regardless_of_case() {
        let mut p = HeaderParser::new();
        p.feed(b"Content-length: 5\r\n\r\n").unwrap();
        assert_eq!(p.get_header_ci("Content-Length"), Some("5"));
    }

    #[test]
    fn push_header_then_serialize_round_trips_through_iovecs() {
        let mut p = HeaderParser::new();
        p.push_header("Host", "example.com");
        let slices = p.serialize();
        let joined: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();
        assert_eq!(joined, b"Host: example.com\r\n");
    }
}
