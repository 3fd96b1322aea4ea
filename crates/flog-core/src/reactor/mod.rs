//! The completion-queue and timer-queue ports, plus
//! the control-block race that guarantees "exactly one of {onCompletion,
//! onError}".
//!
//! Both ports are external collaborators — concrete completion-queue
//! bindings are IOCP/epoll/kqueue, out of this crate's scope. This module
//! defines the ports themselves plus one concrete
//! binding (`TokioReactor`) so the workspace is runnable without pulling in
//! a platform-specific AIO library, the same way `spark_core` binds its
//! transport traits to Tokio by default via the `runtime-tokio` feature.

mod control_block;
mod ports;
mod tokio_impl;

pub use control_block::{ControlBlock, run_with_deadline};
pub use ports::{CompletionQueue, Timer, TimerQueue};
pub use tokio_impl::TokioReactor;
