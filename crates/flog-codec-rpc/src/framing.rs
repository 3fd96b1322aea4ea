//! ONC-RPC record-mark framing, ported from
//! `ONCRPCMessage::deserializeRecordFragmentMarker`/`deserializeRecordFragment`.
//!
//! Each record consists of one or more fragments, each prefixed by a
//! 32-bit big-endian marker whose high bit flags the last fragment of
//! the record and whose low 31 bits carry the fragment's byte length.
//! This workspace only accepts single-fragment records — a marker
//! without the last-fragment bit set is rejected rather than
//! accumulated across fragments.

use flog_core::buffer::{Buffer, StringBuffer};
use flog_core::error::{CoreError, ErrorCategory, codes};

/// The hard cap on a single fragment's length.
pub const FRAGMENT_LENGTH_CAP: usize = 32 * 1024 * 1024;

const LAST_FRAGMENT_BIT: u32 = 0x8000_0000;
const LENGTH_MASK: u32 = 0x7fff_ffff;

/// What [`RecordDecoder::feed`] did with the bytes it was handed.
#[derive(Debug, Eq, PartialEq)]
pub enum FrameDecodeOutcome {
    NeedMore,
    /// A complete single-fragment record's payload.
    Done(Vec<u8>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Marker,
    Fragment,
}

/// Restartable record-mark decoder: feed it bytes as they arrive off the
/// wire, it hands back a complete fragment payload once the marker's
/// declared length has been satisfied.
pub struct RecordDecoder {
    state: State,
    marker_buf: [u8; 4],
    marker_filled: usize,
    fragment_len: usize,
    // Accumulates into a growable string-backed buffer until the declared
    // length is reached — `StringBuffer` is the buffer model's variant
    // for exactly this (flog-core::buffer).
    fragment_buf: StringBuffer,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Marker,
            marker_buf: [0; 4],
            marker_filled: 0,
            fragment_len: 0,
            fragment_buf: StringBuffer::new(0),
        }
    }

    /// Resets state for the next record on the same connection.
    pub fn reset(&mut self) {
        self.state = State::Marker;
        self.marker_filled = 0;
        self.fragment_len = 0;
        self.fragment_buf = StringBuffer::new(0);
    }

    pub fn feed(&mut self, input: &[u8]) -> Result<(FrameDecodeOutcome, usize), CoreError> {
        let mut i = 0;
        loop {
            match self.state {
                State::Marker => {
                    while self.marker_filled < 4 && i < input.len() {
                        self.marker_buf[self.marker_filled] = input[i];
                        self.marker_filled += 1;
                        i += 1;
                    }
                    if self.marker_filled < 4 {
                        return Ok((FrameDecodeOutcome::NeedMore, i));
                    }
                    let marker = u32::from_be_bytes(self.marker_buf);
                    let is_last = marker & LAST_FRAGMENT_BIT != 0;
                    let len = (marker & LENGTH_MASK) as usize;
                    if !is_last {
                        return Err(CoreError::new(
                            codes::RPC_MULTI_FRAGMENT_UNSUPPORTED,
                            ErrorCategory::Malformed,
                            "multi-fragment ONC-RPC records are not supported",
                        ));
                    }
                    if len > FRAGMENT_LENGTH_CAP {
                        return Err(CoreError::new(
                            codes::RPC_FRAGMENT_TOO_LARGE,
                            ErrorCategory::ResourceExhausted,
                            format!("ONC-RPC fragment of {len} bytes exceeds the {FRAGMENT_LENGTH_CAP} byte cap"),
                        ));
                    }
                    self.fragment_len = len;
                    self.fragment_buf = StringBuffer::new(len);
                    self.state = State::Fragment;
                }
                State::Fragment => {
                    let need = self.fragment_len - self.fragment_buf.size();
                    let avail = input.len() - i;
                    let take = need.min(avail);
                    self.fragment_buf.put(&input[i..i + take])?;
                    i += take;
                    if self.fragment_buf.size() < self.fragment_len {
                        return Ok((FrameDecodeOutcome::NeedMore, i));
                    }
                    let payload = std::mem::replace(&mut self.fragment_buf, StringBuffer::new(0)).into_bytes();
                    self.reset();
                    return Ok((FrameDecodeOutcome::Done(payload), i));
                }
            }
        }
    }

    /// `marker || payload`, for serializing an outgoing single-fragment
    /// record.
    pub fn encode_record(payload: &[u8]) -> Result<Vec<u8>, CoreError> {
        if payload.len() > FRAGMENT_LENGTH_CAP {
            return Err(CoreError::new(
                codes::RPC_FRAGMENT_TOO_LARGE,
                ErrorCategory::ResourceExhausted,
                format!("ONC-RPC fragment of {} bytes exceeds the {FRAGMENT_LENGTH_CAP} byte cap", payload.len()),
            ));
        }
        let marker = LAST_FRAGMENT_BIT | (payload.len() as u32 & LENGTH_MASK);
        let mut out = Vec::with_capacity(4 + payload.len());
        out.extend_from_slice(&marker.to_be_bytes());
        out.extend_from_slice(payload);
        Ok(out)
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}
