//! RFC 822-style header parsing and emission, shared by the
//! HTTP codec. A small-object-optimized scratch buffer ([`Scratch`]) holds
//! parsed bytes in place; the header table ([`HeaderParser`]) is a flat
//! array of name/value ranges into that buffer.

mod parser;
mod scratch;

pub use parser::{HeaderDecodeOutcome, HeaderParser, HeaderSlot};
pub use scratch::Scratch;
