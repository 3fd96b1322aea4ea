//! Shared contracts for the Flog async transport runtime.
//!
//! `flog-core` defines the pieces every transport, codec and engine crate
//! in the workspace builds against: a buffer model, a structured error
//! type, a cancellation/deadline context, socket addresses, and the
//! completion-queue / timer-queue ports the generic client and server
//! engines drive their state machines through.

pub mod buffer;
pub mod context;
pub mod error;
pub mod reactor;
pub mod socket;
pub mod transport;
pub mod uri;

pub use error::{CoreError, ErrorCategory};

/// Result alias used throughout the workspace; mirrors `core::result::Result`
/// but keeps call sites consistent with the rest of the crates.
pub type Result<T, E = CoreError> = core::result::Result<T, E>;
