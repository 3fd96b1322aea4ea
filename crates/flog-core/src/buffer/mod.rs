//! The buffer model: a single object-safe contract (`get`/`put`/`size`/
//! `capacity`) with three implementors — heap-backed, string-backed, and a
//! gather (iovec) view.
//!
//! Grounded on `spark_core::buffer::{ReadableBuffer, WritableBuffer}`, which
//! split read/write into two sealed traits; this runtime needs just one
//! combined contract, so the two are merged here while keeping the same
//! object-safety and `CoreError`-on-failure conventions.

mod gather;
mod heap;
mod string;

pub use gather::GatherBuffer;
pub use heap::HeapBuffer;
pub use string::StringBuffer;

use crate::error::{CoreError, ErrorCategory, codes};

/// Unified buffer contract used for every I/O submission in the runtime.
///
/// `get` is a consuming read: it copies up to `dst.len()` bytes out of the
/// buffer and advances the read cursor, returning the count actually
/// copied (which may be less than `dst.len()` if the buffer is shorter).
/// `put` is an appending write: it copies `src` into the buffer, growing
/// backing storage as capacity allows, and returns the count written.
pub trait Buffer: Send + Sync {
    /// Bytes currently available to `get`.
    fn size(&self) -> usize;

    /// Upper bound on bytes this buffer can ever hold.
    fn capacity(&self) -> usize;

    /// Copies up to `dst.len()` bytes out, consuming them. Returns the
    /// number of bytes actually copied.
    fn get(&mut self, dst: &mut [u8]) -> usize;

    /// Appends `src` to the buffer. Returns the number of bytes actually
    /// written, which is `src.len()` unless capacity was exhausted.
    fn put(&mut self, src: &[u8]) -> Result<usize, CoreError>;

    /// Advances the logical size by `n` bytes without copying any data —
    /// used after a `recvfrom`/`read` places bytes directly into the
    /// buffer's backing storage via a raw pointer.
    fn advance_after_kernel_write(&mut self, n: usize) -> Result<(), CoreError>;

    /// `true` once every byte the buffer was constructed with (or grown
    /// to) has been consumed by `get`.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

pub(crate) fn capacity_exceeded(requested: usize, capacity: usize) -> CoreError {
    CoreError::new(
        codes::BUFFER_CAPACITY_EXCEEDED,
        ErrorCategory::ResourceExhausted,
        format!("requested {requested} bytes exceeds capacity {capacity}"),
    )
}

pub(crate) fn unsupported(op: &'static str) -> CoreError {
    CoreError::new(
        codes::BUFFER_UNSUPPORTED,
        ErrorCategory::Malformed,
        format!("operation `{op}` is not supported by this buffer variant"),
    )
}
