use super::{Buffer, capacity_exceeded};
use crate::error::{CoreError, ErrorCategory, codes};

/// A growable `String`-backed buffer, used by the ONC-RPC long-fragment
/// accumulator. Bytes are stored as raw UTF-8-agnostic bytes in a plain
/// `Vec<u8>` — "string-backed" names the buffer variant's role, not a
/// literal `std::string::String`, since the accumulated bytes (an
/// XDR-encoded RPC body) aren't necessarily valid UTF-8; `finish_as_str`
/// validates lazily for the one caller (header text) that does need a
/// `&str` view.
#[derive(Debug)]
pub struct StringBuffer {
    data: Vec<u8>,
    read_pos: usize,
    capacity: usize,
}

impl StringBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            read_pos: 0,
            capacity,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    /// Consumes the buffer, returning the accumulated bytes as owned
    /// storage. Used once a codec (e.g. the ONC-RPC long-fragment
    /// accumulator) is done appending and is ready to hand the whole
    /// payload to a parser.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Validates the accumulated bytes as UTF-8 and returns them. Used once
    /// a codec is ready to interpret the scratch area as text (header
    /// names/values).
    pub fn finish_as_str(&self) -> Result<&str, CoreError> {
        std::str::from_utf8(self.as_bytes()).map_err(|_| {
            CoreError::new(
                codes::HEADER_MALFORMED,
                ErrorCategory::Malformed,
                "scratch buffer is not valid utf-8",
            )
        })
    }
}

impl Buffer for StringBuffer {
    fn size(&self) -> usize {
        self.data.len() - self.read_pos
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get(&mut self, dst: &mut [u8]) -> usize {
        let available = self.size();
        let n = dst.len().min(available);
        dst[..n].copy_from_slice(&self.data[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        n
    }

    fn put(&mut self, src: &[u8]) -> Result<usize, CoreError> {
        if self.data.len() + src.len() > self.capacity {
            return Err(capacity_exceeded(self.data.len() + src.len(), self.capacity));
        }
        self.data.extend_from_slice(src);
        Ok(src.len())
    }

    fn advance_after_kernel_write(&mut self, n: usize) -> Result<(), CoreError> {
        if self.data.len() + n > self.capacity {
            return Err(capacity_exceeded(self.data.len() + n, self.capacity));
        }
        Ok(())
    }
}
