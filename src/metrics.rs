//! Run statistics for batch scoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Collects per-row statistics across one scoring run.
pub struct ScoringMetrics {
    /// Rows scored successfully.
    rows_scored: AtomicU64,
    /// Rows skipped on per-row request failures.
    rows_skipped: AtomicU64,
    /// Request round-trip times in microseconds.
    request_times: RwLock<Vec<u64>>,
    /// Start time for throughput calculation.
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            rows_scored: AtomicU64::new(0),
            rows_skipped: AtomicU64::new(0),
            request_times: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record one successfully scored row and its request latency.
    pub fn record_scored(&self, elapsed: Duration) {
        self.rows_scored.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut times) = self.request_times.write() {
            times.push(elapsed.as_micros() as u64);
        }
    }

    /// Record one skipped row.
    pub fn record_skipped(&self) {
        self.rows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rows_scored(&self) -> u64 {
        self.rows_scored.load(Ordering::Relaxed)
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped.load(Ordering::Relaxed)
    }

    /// Latency statistics over all recorded requests.
    pub fn request_stats(&self) -> RequestStats {
        let times = match self.request_times.read() {
            Ok(times) => times,
            Err(_) => return RequestStats::default(),
        };
        if times.is_empty() {
            return RequestStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        RequestStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Rows per second since the run started.
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.rows_scored() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log the end-of-run summary.
    pub fn print_summary(&self) {
        let scored = self.rows_scored();
        let skipped = self.rows_skipped();
        let stats = self.request_stats();

        info!(
            rows_scored = scored,
            rows_skipped = skipped,
            throughput = format!("{:.1} rows/s", self.throughput()),
            "scoring run summary"
        );
        if stats.count > 0 {
            info!(
                mean_us = stats.mean_us,
                p50_us = stats.p50_us,
                p95_us = stats.p95_us,
                p99_us = stats.p99_us,
                max_us = stats.max_us,
                "request latency summary"
            );
        }
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request latency statistics.
#[derive(Debug, Default)]
pub struct RequestStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
