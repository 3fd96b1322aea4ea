//! Mutex-protected request counters, surfaced per [`crate::engine::ClientEngine`] as
//! `ClientMetrics` rather than wired to any benchmark harness — the
//! benchmark driver itself is out of scope, but
//! the counter *pattern* is an ambient concern every engine needs for basic
//! observability.

use std::sync::Mutex;

#[derive(Debug, Default, Clone, Copy)]
pub struct ClientMetricsSnapshot {
    pub requests_sent: u64,
    pub responses_received: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    pub pool_hits: u64,
    pub pool_misses: u64,
}

#[derive(Default)]
pub struct ClientMetrics {
    inner: Mutex<ClientMetricsSnapshot>,
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ClientMetricsSnapshot {
        *self.inner.lock().expect("client metrics mutex poisoned")
    }

    pub(crate) fn record_request_sent(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").requests_sent += 1;
    }

    pub(crate) fn record_response_received(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").responses_received += 1;
    }

    pub(crate) fn record_timeout(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").timeouts += 1;
    }

    pub(crate) fn record_transport_error(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").transport_errors += 1;
    }

    pub(crate) fn record_pool_hit(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").pool_hits += 1;
    }

    pub(crate) fn record_pool_miss(&self) {
        self.inner.lock().expect("client metrics mutex poisoned").pool_misses += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = ClientMetrics::new();
        metrics.record_request_sent();
        metrics.record_request_sent();
        metrics.record_pool_hit();
        let snap = metrics.snapshot();
        assert_eq!(snap.requests_sent, 2);
        assert_eq!(snap.pool_hits, 1);
        assert_eq!(snap.responses_received, 0);
    }
}
