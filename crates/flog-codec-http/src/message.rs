//! The HTTP message base shared by requests and responses:
//! headers, an optional body, and an HTTP minor-version byte, with a
//! deserialize path that moves from the header block to the body and a
//! serialize path that finalizes `Content-Length`/`Date` before handing off
//! to the header codec's gather-I/O emission.
//!
//! **Open question resolved**: this rewrite takes option (a) — `Content-Length` is
//! required to size the body buffer up front, and the body is accumulated
//! into that fixed-size buffer across refills rather than chained as
//! separate segments. See `DESIGN.md`.

use flog_codec_rfc822::{HeaderDecodeOutcome, HeaderParser};
use flog_core::buffer::{Buffer, HeapBuffer};
use flog_core::error::{CoreError, ErrorCategory, codes};
use std::io::IoSlice;

/// What [`HttpMessage::feed`] did with the bytes it was handed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageDecodeOutcome {
    NeedMore,
    /// The message (headers, and body if any) is fully parsed.
    Done,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Headers,
    Body,
    Done,
}

/// Headers, optional body, and the shared deserialize/serialize machinery
/// `HttpRequest`/`HttpResponse` build their front matter on top of.
pub struct HttpMessage {
    pub headers: HeaderParser,
    // `Content-Length` sizes a `HeapBuffer` (flog-core::buffer) up front
    // and the body accumulates into it across `feed()` refills.
    body: Option<HeapBuffer>,
    state: State,
}

impl HttpMessage {
    pub fn new() -> Self {
        Self { headers: HeaderParser::new(), body: None, state: State::Headers }
    }

    pub fn with_body(body: Vec<u8>) -> Self {
        Self { headers: HeaderParser::new(), body: Some(HeapBuffer::from_vec(body)), state: State::Headers }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_ref().map(HeapBuffer::peek)
    }

    pub fn take_body(&mut self) -> Option<Vec<u8>> {
        self.body.take().map(HeapBuffer::into_vec)
    }

    /// Advances header parsing and, once the header block is complete,
    /// decides how (or whether) to read a body: rejects chunked
    /// transfer-encoding outright, treats a zero or absent `Content-Length`
    /// as bodiless, short-circuits on `Expect: 100-continue`, and otherwise
    /// accumulates exactly `Content-Length` bytes.
    pub fn feed(&mut self, input: &[u8]) -> Result<(MessageDecodeOutcome, usize), CoreError> {
        let mut consumed = 0;

        if self.state == State::Headers {
            let (outcome, n) = self.headers.feed(input)?;
            consumed += n;
            if outcome == HeaderDecodeOutcome::NeedMore {
                return Ok((MessageDecodeOutcome::NeedMore, consumed));
            }

            if let Some(te) = self.headers.get_header_ci("Transfer-Encoding") {
                if te.eq_ignore_ascii_case("chunked") {
                    return Err(chunked_unsupported());
                }
            }

            let content_length = content_length(&self.headers);
            if content_length == 0 {
                self.state = State::Done;
                return Ok((MessageDecodeOutcome::Done, consumed));
            }

            let expects_continue =
                self.headers.get_header_ci("Expect").map(|v| v.eq_ignore_ascii_case("100-continue")).unwrap_or(false);
            if expects_continue {
                self.state = State::Done;
                return Ok((MessageDecodeOutcome::Done, consumed));
            }

            self.body = Some(HeapBuffer::new(content_length));
            self.state = State::Body;
        }

        if self.state == State::Body {
            let target = self.body.as_ref().map(HeapBuffer::capacity).unwrap_or(0);
            let body = self.body.get_or_insert_with(|| HeapBuffer::new(0));
            let remaining = target.saturating_sub(body.size());
            let take = remaining.min(input.len() - consumed);
            body.put(&input[consumed..consumed + take])?;
            consumed += take;
            if body.size() >= target {
                self.state = State::Done;
                return Ok((MessageDecodeOutcome::Done, consumed));
            }
            return Ok((MessageDecodeOutcome::NeedMore, consumed));
        }

        Ok((MessageDecodeOutcome::Done, consumed))
    }

    /// Finalizes `Content-Length` (computed from the attached body if the
    /// header is absent) and `Date`, then returns the header block's
    /// gather-I/O view followed by the body as a trailing slice.
    pub fn serialize_trailer(&mut self) -> Vec<IoSlice<'_>> {
        if let Some(body) = &self.body {
            if self.headers.get_header("Content-Length", "").is_empty() {
                self.headers.push_header("Content-Length", &body.size().to_string());
            }
        }
        self.headers.push_header("Date", &httpdate::fmt_http_date(std::time::SystemTime::now()));

        let mut out = self.headers.serialize();
        if let Some(body) = &self.body {
            out.push(IoSlice::new(body.peek()));
        }
        out
    }
}

impl Default for HttpMessage {
    fn default() -> Self {
        Self::new()
    }
}

fn content_length(headers: &HeaderParser) -> usize {
    let mixed_case = headers.get_header("Content-Length", "");
    let value = if mixed_case.is_empty() { headers.get_header("Content-length", "") } else { mixed_case };
    value.parse().unwrap_or(0)
}

fn chunked_unsupported() -> CoreError {
    CoreError::new(
        codes::HTTP_CHUNKED_UNSUPPORTED,
        ErrorCategory::Malformed,
        "chunked transfer-encoding is not supported on the inbound path",
    )
}
