use super::{Buffer, capacity_exceeded};
use crate::error::CoreError;
use bytes::{BufMut as _, BytesMut};

/// A growable, `bytes::BytesMut`-backed buffer with independent read and
/// write cursors — the default variant used for socket reads, HTTP bodies
/// and the ONC-RPC long-fragment accumulator's byte store. `BytesMut` is
/// the same reallocation-amortizing growable-buffer type
/// `spark_transport_tcp::channel::TcpChannel`'s read/write paths build on
/// (`use bytes::{Buf, BufMut}`), kept here rather than a bare `Vec<u8>` so this buffer's
/// growth behavior matches the rest of the workspace's I/O paths.
#[derive(Debug)]
pub struct HeapBuffer {
    data: BytesMut,
    read_pos: usize,
    capacity: usize,
}

impl HeapBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity.min(1 << 20)),
            read_pos: 0,
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        let capacity = data.len();
        Self {
            data: BytesMut::from(&data[..]),
            read_pos: 0,
            capacity,
        }
    }

    /// Exposes the unread tail as a contiguous slice, for codecs that scan
    /// without consuming (e.g. looking for `\r\n` before committing to a
    /// `get`).
    pub fn peek(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    /// Reserves room for at least one more kernel-sized read and returns a
    /// mutable tail slice of `len` zeroed bytes, growing `data` if needed.
    /// Used by socket `read()` implementations before calling
    /// `advance_after_kernel_write`.
    pub fn tail_for_write(&mut self, len: usize) -> &mut [u8] {
        let start = self.data.len();
        self.data.put_bytes(0, len);
        &mut self.data[start..]
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl Buffer for HeapBuffer {
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
        self.data.put_slice(src);
        Ok(src.len())
    }

    fn advance_after_kernel_write(&mut self, n: usize) -> Result<(), CoreError> {
        if self.data.len() + n > self.capacity {
            return Err(capacity_exceeded(self.data.len() + n, self.capacity));
        }
        // `tail_for_write` already grew `data`; here we're told how many of
        // those bytes the kernel actually filled, so nothing to extend.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut buf = HeapBuffer::new(16);
        assert_eq!(buf.put(b"hello").unwrap(), 5);
        assert_eq!(buf.size(), 5);
        let mut dst = [0u8; 5];
        assert_eq!(buf.get(&mut dst), 5);
        assert_eq!(&dst, b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn put_beyond_capacity_is_rejected() {
        let mut buf = HeapBuffer::new(4);
        assert!(buf.put(b"hello").is_err());
    }

    #[test]
    fn get_partial_when_fewer_bytes_available_than_requested() {
        let mut buf = HeapBuffer::new(16);
        buf.put(b"ab").unwrap();
        let mut dst = [0u8; 5];
        assert_eq!(buf.get(&mut dst), 2);
        assert_eq!(&dst[..2], b"ab");
    }
}
