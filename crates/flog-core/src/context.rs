//! Cancellation and deadline propagation, threaded through every async
//! socket call and through the generic client's per-operation timers.
//!
//! Grounded on `spark_core::context::Context` / `spark_core::contract::{CallContext,
//! Cancellation, Deadline}`: a cheap, `Copy`-able three-field view
//! (cancellation flag, absolute deadline, and — unlike the upstream type,
//! which also threads a budget slice we have no use for here — nothing
//! else).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancellation flag. Cloning an `Cancellation` shares the same
/// underlying flag; `cancel()` from any clone is observed by all of them.
#[derive(Clone, Debug, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An absolute point in time after which an operation must be treated as
/// timed out. `None` means "no deadline".
#[derive(Clone, Copy, Debug, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn after(duration: Duration) -> Self {
        Self(Some(Instant::now() + duration))
    }

    pub fn instant(&self) -> Option<Instant> {
        self.0
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(d) if d.is_zero())
    }
}

/// A call's full cancellation/deadline context. The generic client and
/// server engines construct one per in-flight request; [`Context`] is the
/// read-only view handed to socket-level `poll_ready`/AIO calls.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    cancellation: Cancellation,
    deadline: Deadline,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(duration: Duration) -> Self {
        Self {
            cancellation: Cancellation::new(),
            deadline: Deadline::after(duration),
        }
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn as_context(&self) -> Context<'_> {
        Context {
            cancellation: &self.cancellation,
            deadline: self.deadline,
        }
    }
}

/// Read-only, `Copy` view over a [`CallContext`]'s cancellation/deadline
/// pair, used in hot paths (`poll_ready`) that don't need the owning
/// `CallContext` itself.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    cancellation: &'a Cancellation,
    deadline: Deadline,
}

impl<'a> Context<'a> {
    pub fn cancellation(&self) -> &'a Cancellation {
        self.cancellation
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }
}

impl<'a> From<&'a CallContext> for Context<'a> {
    fn from(ctx: &'a CallContext) -> Self {
        ctx.as_context()
    }
}
