//! The XDR marshalling port: a pair of
//! traits the call/reply codec writes its fields through, plus one
//! concrete in-memory implementation (`XdrCursor`). A production
//! deployment might swap in a zero-copy marshaller over a borrowed
//! buffer; this workspace ships the one implementation it needs to be
//! runnable without an external XDR library.

use flog_core::error::{CoreError, ErrorCategory, codes};

fn malformed(msg: &'static str) -> CoreError {
    CoreError::new(codes::RPC_MALFORMED, ErrorCategory::Malformed, msg)
}

/// Writes XDR primitives in big-endian, 4-byte-aligned form.
pub trait XdrWriter {
    fn write_u32(&mut self, value: u32);
    fn write_i32(&mut self, value: i32);
    fn write_u64(&mut self, value: u64);
    fn write_bool(&mut self, value: bool);
    fn write_opaque(&mut self, bytes: &[u8]);
    fn write_string(&mut self, s: &str);
}

/// Reads XDR primitives back out, in the order they were written.
pub trait XdrReader {
    fn read_u32(&mut self) -> Result<u32, CoreError>;
    fn read_i32(&mut self) -> Result<i32, CoreError>;
    fn read_u64(&mut self) -> Result<u64, CoreError>;
    fn read_bool(&mut self) -> Result<bool, CoreError>;
    fn read_opaque(&mut self) -> Result<Vec<u8>, CoreError>;
    fn read_string(&mut self) -> Result<String, CoreError>;
    /// Remaining unread bytes, verbatim — used for the opaque call/reply
    /// body the codec does not interpret itself.
    fn read_remaining(&mut self) -> Vec<u8>;
}

/// An in-memory, growable XDR buffer with an independent read cursor,
/// used both to marshal outgoing messages and to unmarshal incoming
/// ones.
#[derive(Debug, Default)]
pub struct XdrCursor {
    buf: Vec<u8>,
    pos: usize,
}

impl XdrCursor {
    pub fn new() -> Self {
        Self { buf: Vec::new(), pos: 0 }
    }

    /// Wraps an already-received fragment payload for reading.
    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn pad_len(len: usize) -> usize {
        (4 - (len % 4)) % 4
    }

    fn take(&mut self, n: usize) -> Result<&[u8], CoreError> {
        if self.pos + n > self.buf.len() {
            return Err(malformed("XDR cursor ran past the end of the buffer"));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip_padding(&mut self, data_len: usize) -> Result<(), CoreError> {
        let pad = Self::pad_len(data_len);
        if pad > 0 {
            self.take(pad)?;
        }
        Ok(())
    }
}

impl XdrWriter for XdrCursor {
    fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_bool(&mut self, value: bool) {
        self.write_u32(if value { 1 } else { 0 });
    }

    fn write_opaque(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
        for _ in 0..Self::pad_len(bytes.len()) {
            self.buf.push(0);
        }
    }

    fn write_string(&mut self, s: &str) {
        self.write_opaque(s.as_bytes());
    }
}

impl XdrReader for XdrCursor {
    fn read_u32(&mut self) -> Result<u32, CoreError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_i32(&mut self) -> Result<i32, CoreError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64, CoreError> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn read_bool(&mut self) -> Result<bool, CoreError> {
        Ok(self.read_u32()? != 0)
    }

    fn read_opaque(&mut self) -> Result<Vec<u8>, CoreError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?.to_vec();
        self.skip_padding(len)?;
        Ok(bytes)
    }

    fn read_string(&mut self) -> Result<String, CoreError> {
        let bytes = self.read_opaque()?;
        String::from_utf8(bytes).map_err(|_| malformed("XDR string was not valid UTF-8"))
    }

    fn read_remaining(&mut self) -> Vec<u8> {
        let rest = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        rest
    }
}
