use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::query::Backend;
use crate::results::{LatencyDistribution, LoadOutcome};

/// Incremental statistics for one backend's load run.
///
/// Owned by the generator's aggregation loop; nothing else touches it, so it
/// needs no locking.
pub struct StreamingAggregator {
    backend: Backend,
    total_requests: u64,
    successful_requests: u64,
    /// Every completed request's elapsed time, kept for exact percentiles.
    response_times: Vec<Duration>,
    min: Duration,
    max: Duration,
    sum: Duration,
    error_counts: BTreeMap<String, u64>,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl StreamingAggregator {
    /// Create a new aggregator, capturing the current wall-clock start time.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            total_requests: 0,
            successful_requests: 0,
            response_times: Vec::new(),
            min: Duration::MAX,
            max: Duration::ZERO,
            sum: Duration::ZERO,
            error_counts: BTreeMap::new(),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record the outcome of a single request.
    pub fn record(&mut self, outcome: &LoadOutcome) {
        self.total_requests += 1;
        if outcome.success {
            self.successful_requests += 1;
        } else {
            let description = outcome
                .error
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            *self.error_counts.entry(description).or_insert(0) += 1;
        }

        if let Some(elapsed) = outcome.elapsed {
            self.response_times.push(elapsed);
            self.sum = self.sum.saturating_add(elapsed);
            self.min = self.min.min(elapsed);
            self.max = self.max.max(elapsed);
        }
    }

    fn mean(&self) -> Duration {
        let n = self.response_times.len() as u128;
        if n == 0 {
            return Duration::ZERO;
        }
        let nanos = self.sum.as_nanos() / n;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Build the finished [`LatencyDistribution`] from everything recorded.
    pub fn distribution(&self) -> LatencyDistribution {
        let finished_at = Utc::now();
        let total = self.total_requests;

        let mut sorted = self.response_times.clone();
        sorted.sort_unstable();

        let min = if sorted.is_empty() { Duration::ZERO } else { self.min };

        let success_rate = if total > 0 {
            self.successful_requests as f64 / total as f64
        } else {
            0.0
        };

        let elapsed_secs = self.start_time.elapsed().as_secs_f64();
        let requests_per_second = if elapsed_secs > 0.0 {
            total as f64 / elapsed_secs
        } else {
            0.0
        };

        LatencyDistribution {
            backend: self.backend,
            started_at: self.started_at,
            finished_at,
            total_requests: total,
            successful_requests: self.successful_requests,
            timed_requests: sorted.len() as u64,
            min,
            mean: self.mean(),
            p50: nearest_rank(&sorted, 50.0),
            p95: nearest_rank(&sorted, 95.0),
            p99: nearest_rank(&sorted, 99.0),
            max: self.max,
            success_rate,
            requests_per_second,
            error_counts: self.error_counts.clone(),
        }
    }
}

/// Nearest-rank p-th percentile of an ascending sample, `p` in (0.0, 100.0].
/// Zero for an empty sample.
fn nearest_rank(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
