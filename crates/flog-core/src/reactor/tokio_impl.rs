use super::ports::{CompletionQueue, Timer, TimerQueue};
use tracing::trace;

/// The workspace's one concrete `CompletionQueue`/`TimerQueue` binding,
/// backed by the ambient Tokio runtime. `associate` is a no-op — Tokio's
/// reactor registers interest per-future rather than per-descriptor-queue —
/// kept as a real method so call sites that want to log/trace association
/// (or, on a future IOCP/epoll binding, actually register a descriptor)
/// have a stable entry point.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioReactor;

impl TokioReactor {
    pub fn new() -> Self {
        Self
    }
}

impl CompletionQueue for TokioReactor {
    fn associate(&self, socket_label: &str) {
        trace!(target: "flog::reactor", socket = socket_label, "associated with completion queue");
    }
}

impl TimerQueue for TokioReactor {
    fn add_timer(&self, timer: Timer, fire: Box<dyn FnOnce() + Send>) {
        tokio::spawn(async move {
            tokio::time::sleep(timer.delay).await;
            fire();
            // Periodic timers are not required by any of this workspace's
            // call sites (only one-shot operation timers are used); the
            // `period` field is retained on `Timer` for port fidelity but
            // intentionally left unimplemented here.
            let _ = timer.period;
        });
    }
}
