//! `HttpRequest`: a three-phase front matter (method, URI, version) ahead of
//! the shared [`HttpMessage`], ported from the original
//! `HTTPRequest::deserialize`/`serialize`.

use crate::message::{HttpMessage, MessageDecodeOutcome};
use crate::scratch::{MethodScratch, UriScratch};
use flog_core::error::{CoreError, ErrorCategory, codes};
use std::io::IoSlice;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Method,
    Uri,
    Version,
    VersionLf,
    Message,
    Done,
}

/// What [`HttpRequest::feed`] did with the bytes it was handed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestDecodeOutcome {
    NeedMore,
    Done,
}

pub struct HttpRequest {
    method: MethodScratch,
    uri: UriScratch,
    http_minor_version: u8,
    message: HttpMessage,
    state: State,
}

impl HttpRequest {
    /// An empty request ready to be fed bytes off the wire.
    pub fn new() -> Self {
        Self {
            method: MethodScratch::new(),
            uri: UriScratch::new(),
            http_minor_version: 1,
            message: HttpMessage::new(),
            state: State::Method,
        }
    }

    /// Builds a request to serialize and send, e.g. `HttpRequest::build("GET",
    /// "/x")`.
    pub fn build(method: &str, uri: &str) -> Self {
        let mut m = MethodScratch::new();
        for b in method.as_bytes() {
            m.push(*b);
        }
        let mut u = UriScratch::new();
        for b in uri.as_bytes() {
            u.push(*b);
        }
        Self { method: m, uri: u, http_minor_version: 1, message: HttpMessage::new(), state: State::Done }
    }

    pub fn with_body(method: &str, uri: &str, body: Vec<u8>) -> Self {
        let mut req = Self::build(method, uri);
        req.message = HttpMessage::with_body(body);
        req
    }

    pub fn method(&self) -> &str {
        self.method.as_str()
    }

    pub fn uri(&self) -> Result<&str, CoreError> {
        self.uri.as_str()
    }

    pub fn http_minor_version(&self) -> u8 {
        self.http_minor_version
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

    /// Drives the method → URI → version → headers/body state machine
    ///, restartable across refills.
    pub fn feed(&mut self, input: &[u8]) -> Result<(RequestDecodeOutcome, usize), CoreError> {
        let mut i = 0;
        while i < input.len() {
            match self.state {
                State::Method => {
                    let byte = input[i];
                    if byte == b' ' {
                        self.state = State::Uri;
                    } else {
                        self.method.push(byte);
                    }
                    i += 1;
                }
                State::Uri => {
                    let byte = input[i];
                    if byte == b' ' {
                        self.state = State::Version;
                    } else {
                        self.uri.push(byte);
                    }
                    i += 1;
                }
                State::Version => {
                    let byte = input[i];
                    if byte == b'\r' {
                        self.state = State::VersionLf;
                    } else {
                        self.http_minor_version = if byte == b'1' { 1 } else { 0 };
                    }
                    i += 1;
                }
                State::VersionLf => {
                    let byte = input[i];
                    if byte != b'\n' {
                        return Err(malformed("HTTP version line not terminated by CRLF"));
                    }
                    self.state = State::Message;
                    i += 1;
                }
                State::Message => {
                    let (outcome, n) = self.message.feed(&input[i..])?;
                    i += n;
                    if outcome == MessageDecodeOutcome::NeedMore {
                        return Ok((RequestDecodeOutcome::NeedMore, i));
                    }
                    self.state = State::Done;
                    return Ok((RequestDecodeOutcome::Done, i));
                }
                State::Done => return Ok((RequestDecodeOutcome::Done, i)),
            }
        }
        if self.state == State::Done {
            Ok((RequestDecodeOutcome::Done, i))
        } else {
            Ok((RequestDecodeOutcome::NeedMore, i))
        }
    }

    /// `METHOD URI HTTP/1.1\r\n` followed by the header block and body.
    pub fn serialize(&mut self) -> Vec<IoSlice<'_>> {
        static SPACE: &[u8] = b" ";
        static VERSION: &[u8] = b" HTTP/1.1\r\n";
        let method_bytes = self.method.as_str().as_bytes();
        let uri_bytes = self.uri.as_str().map(str::as_bytes).unwrap_or(b"");
        let mut out = vec![
            IoSlice::new(method_bytes),
            IoSlice::new(SPACE),
            IoSlice::new(uri_bytes),
            IoSlice::new(VERSION),
        ];
        out.extend(self.message.serialize_trailer());
        out
    }
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn malformed(msg: &'static str) -> CoreError {
    CoreError::new(codes::HTTP_MALFORMED, ErrorCategory::Malformed, msg)
}
