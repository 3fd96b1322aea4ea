//! The control-block race: every outstanding AIO operation is paired with
//! an operation timer, and exactly one
//! of {the I/O completing, the timer firing} wins via a single
//! compare-exchange. The loser's result is silently dropped — the
//! underlying OS operation is never cancelled.

use super::ports::timeout_error;
use crate::context::CallContext;
use crate::error::CoreError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A one-shot race arbiter. `try_claim` returns `true` to at most one
/// caller; every subsequent call returns `false`. Models a single atomic
/// compare-exchange selecting the winner of {io, timer}.
#[derive(Default)]
pub struct ControlBlock {
    claimed: AtomicBool,
}

impl ControlBlock {
    pub fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// Attempts to become the single winner. Returns `true` exactly once
    /// across the lifetime of this control block.
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

/// Runs `fut` to completion, racing it against `ctx`'s deadline and
/// cancellation flag. If the deadline/cancellation fires first, returns a
/// timeout/cancelled error immediately and `fut` keeps running in the
/// background to completion — its result is computed but discarded. A
/// timeout does not cancel the underlying OS operation; the socket may
/// still deliver a completion afterwards, which is silently dropped.
///
/// `op` names the operation for the resulting `CoreError`'s code when it is
/// the transport (not the timer) that fails.
pub async fn run_with_deadline<T, F>(ctx: &CallContext, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
    T: Send + 'static,
{
    if ctx.cancellation().is_cancelled() {
        return Err(CoreError::cancelled());
    }
    if ctx.deadline().is_expired() {
        return Err(timeout_error());
    }

    let block = Arc::new(ControlBlock::new());
    let io_block = Arc::clone(&block);
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let result = fut.await;
        if io_block.try_claim() {
            // Receiver may already be gone if the timer won and the caller
            // returned — that's fine, the result is simply dropped.
            let _ = tx.send(result);
        }
    });

    match ctx.deadline().remaining() {
        None => rx.await.unwrap_or_else(|_| Err(CoreError::cancelled())),
        Some(remaining) => {
            tokio::select! {
                biased;
                result = rx => result.unwrap_or_else(|_| Err(CoreError::cancelled())),
                _ = tokio::time::sleep(remaining) => {
                    if block.try_claim() {
                        Err(timeout_error())
                    } else {
                        // I/O had already claimed the block between the
                        // scheduler picking this branch and us checking —
                        // wait for its result rather than fabricate one.
                        rx.await.unwrap_or_else(|_| Err(timeout_error()))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn io_completing_before_deadline_wins() {
        let ctx = CallContext::with_timeout(Duration::from_millis(200));
        let result = run_with_deadline(&ctx, async { Ok::<_, CoreError>(42u32) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deadline_firing_before_io_yields_timeout() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        let result = run_with_deadline(&ctx, async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, CoreError>(42u32)
        })
        .await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().category(), crate::error::ErrorCategory::Timeout);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn already_cancelled_context_short_circuits() {
        let ctx = CallContext::new();
        ctx.cancellation().cancel();
        let result = run_with_deadline(&ctx, async { Ok::<_, CoreError>(1u32) }).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().category(), crate::error::ErrorCategory::Cancelled);
    }

    #[test]
    fn control_block_claims_exactly_once() {
        let block = ControlBlock::new();
        assert!(block.try_claim());
        assert!(!block.try_claim());
        assert!(!block.try_claim());
    }
}
