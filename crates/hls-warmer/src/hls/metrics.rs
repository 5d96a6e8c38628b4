use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Process-wide warming counters.
///
/// All counters use relaxed atomics; they are observability only and never
/// drive control flow.
#[derive(Debug, Default)]
pub struct WarmMetrics {
    /// Segment requests issued
    pub segments_requested: AtomicU64,
    /// Segments classified as cache hits
    pub cache_hits: AtomicU64,
    /// Segments classified as cache misses
    pub cache_misses: AtomicU64,
    /// Segment transport or body read failures
    pub fetch_errors: AtomicU64,
    /// Body bytes read and discarded
    pub bytes_drained: AtomicU64,
    /// Warm cycles (single-pass or daemon ticks) that ran to completion
    pub cycles_completed: AtomicU64,
    /// Daemon ticks skipped because a cycle was still running
    pub ticks_skipped: AtomicU64,
}

/// Point-in-time copy of [`WarmMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub segments_requested: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetch_errors: u64,
    pub bytes_drained: u64,
    pub cycles_completed: u64,
    pub ticks_skipped: u64,
}

impl MetricsSnapshot {
    /// Hit percentage over classified segments, 0.0 when nothing was classified.
    pub fn hit_ratio(&self) -> f64 {
        let classified = self.cache_hits + self.cache_misses;
        if classified == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / classified as f64) * 100.0
        }
    }
}

impl WarmMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.segments_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response(&self, hit: bool, bytes: u64) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_drained.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cycle(&self) {
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_tick(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            segments_requested: self.segments_requested.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
            bytes_drained: self.bytes_drained.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        if snapshot.segments_requested == 0 && snapshot.cycles_completed == 0 {
            return;
        }

        info!(
            segments_requested = snapshot.segments_requested,
            cache_hits = snapshot.cache_hits,
            cache_misses = snapshot.cache_misses,
            fetch_errors = snapshot.fetch_errors,
            bytes_drained = snapshot.bytes_drained,
            cycles_completed = snapshot.cycles_completed,
            ticks_skipped = snapshot.ticks_skipped,
            hit_ratio = format!("{:.1}%", snapshot.hit_ratio()),
            "Warming statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = WarmMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_request();
        metrics.record_response(true, 1024);
        metrics.record_response(false, 512);
        metrics.record_error();
        metrics.record_cycle();
        metrics.record_skipped_tick();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.segments_requested, 3);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.fetch_errors, 1);
        assert_eq!(snapshot.bytes_drained, 1536);
        assert_eq!(snapshot.cycles_completed, 1);
        assert_eq!(snapshot.ticks_skipped, 1);
        assert_eq!(snapshot.hit_ratio(), 50.0);
    }

    #[test]
    fn hit_ratio_is_zero_without_samples() {
        assert_eq!(MetricsSnapshot::default().hit_ratio(), 0.0);
    }
}
