//! The HTTP request-line front matter's growable scratch buffers: `method`
//! (fixed 16-byte cap) and `uri` (starts at 2 bytes, doubles on overflow).
//!
//! Grounded directly on the original `HTTPRequest` constructor (`uri = new
//! char[2]`) and its deserialize loop's `uri_len * 2` reallocation — the
//! idiomatic Rust rendition swaps `new`/`memcpy`/`delete` for `Vec::resize`.

use flog_core::error::{CoreError, ErrorCategory, codes};

const METHOD_CAPACITY: usize = 16;
const URI_INITIAL_CAPACITY: usize = 2;

/// Space-terminated method buffer, truncated at 16 bytes (original source:
/// `char method[16]`).
#[derive(Debug, Default)]
pub struct MethodScratch {
    buf: [u8; METHOD_CAPACITY],
    len: usize,
}

impl MethodScratch {
    pub fn new() -> Self {
        Self { buf: [0u8; METHOD_CAPACITY], len: 0 }
    }

    /// Appends a byte, silently truncating past capacity rather than
    /// erroring — matches the original's fixed-size buffer, which simply
    /// stops advancing once full.
    pub fn push(&mut self, byte: u8) {
        if self.len < METHOD_CAPACITY {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// Doubling URI scratch buffer. Starts at a 2-byte capacity (the original's
/// `new char[2]`); a write that would overflow the current capacity doubles
/// it first. Any URI longer than 2 bytes triggers at least one growth.
#[derive(Debug)]
pub struct UriScratch {
    buf: Vec<u8>,
}

impl UriScratch {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(URI_INITIAL_CAPACITY) }
    }

    pub fn push(&mut self, byte: u8) {
        if self.buf.len() == self.buf.capacity() {
            let new_capacity = (self.buf.capacity().max(1)) * 2;
            self.buf.reserve_exact(new_capacity - self.buf.capacity());
        }
        self.buf.push(byte);
    }

    pub fn as_str(&self) -> Result<&str, CoreError> {
        std::str::from_utf8(&self.buf).map_err(|_| {
            CoreError::new(codes::HTTP_MALFORMED, ErrorCategory::Malformed, "URI is not valid UTF-8")
        })
    }

    pub fn has_grown(&self) -> bool {
        self.buf.capacity() > URI_INITIAL_CAPACITY
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for UriScratch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_scratch_truncates_past_sixteen_bytes() {
        let mut m = MethodScratch::new();
        for b in b"VERYLONGMETHODNAMEINDEED" {
            m.push(*b);
        }
        assert_eq!(m.as_str().len(), METHOD_CAPACITY);
    }

    #[test]
    fn uri_scratch_grows_past_initial_capacity() {
        let mut u = UriScratch::new();
        for b in b"/a/somewhat/longer/resource/path" {
            u.push(*b);
        }
        assert!(u.has_grown());
        assert_eq!(u.as_str().unwrap(), "/a/somewhat/longer/resource/path");
    }

    #[test]
    fn short_uri_may_not_need_to_grow() {
        let mut u = UriScratch::new();
        u.push(b'/');
        assert_eq!(u.as_str().unwrap(), "/");
    }
}
