use crate::error::CoreError;
use std::time::Duration;

/// Accepts control blocks and guarantees their completion callback runs
/// exactly once. `associate` attaches a socket descriptor to
/// the queue; `submit` takes ownership of a unit of async work.
///
/// This is the external-collaborator boundary: production bindings would
/// wrap IOCP/epoll/kqueue. `TokioReactor` is the one concrete binding this
/// workspace ships.
pub trait CompletionQueue: Send + Sync {
    /// Associates a socket (identified by an opaque debug label, since the
    /// actual descriptor type is transport-crate-specific) with this queue.
    /// A no-op for reactor bindings — like this crate's `TokioReactor` —
    /// that don't need per-socket registration.
    fn associate(&self, socket_label: &str);
}

/// A scheduled timer: fires once (`period = None`) or repeatedly
/// (`period = Some(d)`). `fire` is called by the queue's own
/// thread/task; a periodic timer returning `true` is rescheduled.
pub struct Timer {
    pub delay: Duration,
    pub period: Option<Duration>,
}

/// Schedules timers and fires them at or after their requested delay, never
/// early. The generic client engine uses this to pair every
/// outstanding control block with an [`crate::reactor::run_with_deadline`]
/// race rather than calling `add_timer` directly — `run_with_deadline`
/// is built on `tokio::time::sleep`, which *is* a `TimerQueue` binding, just
/// inlined rather than routed through a trait object for the hot path.
pub trait TimerQueue: Send + Sync {
    fn add_timer(&self, timer: Timer, fire: Box<dyn FnOnce() + Send>);
}

/// Helper error constructor used by reactor bindings when a control block's
/// paired timer wins the race.
pub(crate) fn timeout_error() -> CoreError {
    CoreError::timeout()
}
