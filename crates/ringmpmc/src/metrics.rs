use std::sync::atomic::{AtomicU64, Ordering};

/// Optional counters for monitoring ring buffer traffic.
///
/// All counters are relaxed atomics; they are only updated when
/// [`Config::enable_metrics`](crate::Config::enable_metrics) is set.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    producer_claims: AtomicU64,
    commits: AtomicU64,
    consumer_claims: AtomicU64,
    releases: AtomicU64,
    unavailable: AtomicU64,
    backoff_snoozes: AtomicU64,
}

/// Point-in-time copy of a buffer's traffic counters, from
/// [`RingBuffer::metrics`](crate::RingBuffer::metrics).
///
/// The live counters stay inside the buffer:
///
/// ```compile_fail
/// use ringmpmc_rs::Metrics;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub producer_claims: u64,
    pub commits: u64,
    pub consumer_claims: u64,
    pub releases: u64,
    pub unavailable: u64,
    pub backoff_snoozes: u64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_producer_claims(&self, n: u64) {
        self.producer_claims.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_commits(&self, n: u64) {
        self.commits.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_consumer_claims(&self, n: u64) {
        self.consumer_claims.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_releases(&self, n: u64) {
        self.releases.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_unavailable(&self, n: u64) {
        self.unavailable.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_backoff_snoozes(&self, n: u64) {
        self.backoff_snoozes.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            producer_claims: self.producer_claims.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            consumer_claims: self.consumer_claims.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            backoff_snoozes: self.backoff_snoozes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_counters() {
        let metrics = Metrics::new();
        metrics.add_producer_claims(3);
        metrics.add_commits(2);
        metrics.add_unavailable(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.producer_claims, 3);
        assert_eq!(snapshot.commits, 2);
        assert_eq!(snapshot.unavailable, 1);
        assert_eq!(snapshot.releases, 0);

        // later updates do not reach an earlier snapshot
        metrics.add_commits(1);
        assert_eq!(snapshot.commits, 2);
        assert_eq!(metrics.snapshot().commits, 3);
    }
}
