//! `HttpResponse`: version, status code, reason text, then the shared
//! [`HttpMessage`], ported from the original
//! `HTTPResponse::deserialize`/`serialize`.

use crate::message::{HttpMessage, MessageDecodeOutcome};
use crate::status::{normalize_parsed_status_code, status_line_and_reason};
use flog_core::error::CoreError;
use std::io::IoSlice;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Version,
    StatusCode,
    Reason,
    ReasonLf,
    Message,
    Done,
}

/// What [`HttpResponse::feed`] did with the bytes it was handed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseDecodeOutcome {
    NeedMore,
    Done,
}

pub struct HttpResponse {
    status_code: u16,
    status_digits: String,
    message: HttpMessage,
    state: State,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self { status_code: 0, status_digits: String::new(), message: HttpMessage::new(), state: State::Version }
    }

    /// Builds a response to serialize, e.g. the server's `200 OK` reply.
    pub fn with_status(status_code: u16) -> Self {
        Self { status_code, status_digits: String::new(), message: HttpMessage::new(), state: State::Done }
    }

    pub fn with_status_and_body(status_code: u16, body: Vec<u8>) -> Self {
        Self {
            status_code,
            status_digits: String::new(),
            message: HttpMessage::with_body(body),
            state: State::Done,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.message.headers.push_header(name, value);
    }

    pub fn get_header<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.message.headers.get_header(name, default)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.message.body()
    }

    pub fn take_body(&mut self) -> Option<Vec<u8>> {
        self.message.take_body()
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Drives the version → status-code → reason → headers/body state
    /// machine. The reason phrase itself is discarded once
    /// parsed — only `status_code` is retained, matching the original.
    pub fn feed(&mut self, input: &[u8]) -> Result<(ResponseDecodeOutcome, usize), CoreError> {
        let mut i = 0;
        while i < input.len() {
            match self.state {
                State::Version => {
                    let byte = input[i];
                    if byte == b' ' {
                        self.state = State::StatusCode;
                    }
                    i += 1;
                }
                State::StatusCode => {
                    let byte = input[i];
                    if byte == b' ' {
                        let parsed = self.status_digits.parse::<u16>().ok();
                        self.status_code = normalize_parsed_status_code(parsed);
                        self.state = State::Reason;
                    } else if self.status_digits.len() < 3 {
                        self.status_digits.push(byte as char);
                    }
                    i += 1;
                }
                State::Reason => {
                    let byte = input[i];
                    if byte == b'\r' {
                        self.state = State::ReasonLf;
                    }
                    i += 1;
                }
                State::ReasonLf => {
                    let byte = input[i];
                    if byte != b'\n' {
                        return Err(crate::request::malformed("status line not terminated by CRLF"));
                    }
                    self.state = State::Message;
                    i += 1;
                }
                State::Message => {
                    let (outcome, n) = self.message.feed(&input[i..])?;
                    i += n;
                    if outcome == MessageDecodeOutcome::NeedMore {
                        return Ok((ResponseDecodeOutcome::NeedMore, i));
                    }
                    self.state = State::Done;
                    return Ok((ResponseDecodeOutcome::Done, i));
                }
                State::Done => return Ok((ResponseDecodeOutcome::Done, i)),
            }
        }
        if self.state == State::Done {
            Ok((ResponseDecodeOutcome::Done, i))
        } else {
            Ok((ResponseDecodeOutcome::NeedMore, i))
        }
    }

    /// One of the fixed status lines, followed by the header
    /// block and body. `Date` is always inserted.
    pub fn serialize(&mut self) -> Vec<IoSlice<'_>> {
        let (status_line, _reason) = status_line_and_reason(self.status_code);
        let mut out = vec![IoSlice::new(status_line.as_bytes())];
        out.extend(self.message.serialize_trailer());
        out
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}
