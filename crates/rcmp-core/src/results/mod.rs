pub mod ratio;
pub mod summary;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::Backend;

pub use ratio::{LatencyRatios, Ratio};
pub use summary::{FileReport, LoadComparison, RunSummary, SkippedFile};

/// Description tallied for requests that were still in flight when the run
/// was interrupted.
pub const ABORTED_REQUEST: &str = "request aborted before completion";

// ---------------------------------------------------------------------------
// LoadOutcome: one request issued by a load generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadOutcome {
    pub backend: Backend,
    /// Time until the request finished, successfully or not. `None` when the
    /// request never completed; such outcomes only count toward success and
    /// error accounting.
    pub elapsed: Option<Duration>,
    /// 2xx status and no transport error.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn succeeded(backend: Backend, elapsed: Duration, status: u16) -> Self {
        Self {
            backend,
            elapsed: Some(elapsed),
            success: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(
        backend: Backend,
        elapsed: Option<Duration>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            elapsed,
            success: false,
            status,
            error: Some(error.into()),
        }
    }

    pub fn aborted(backend: Backend) -> Self {
        Self::failed(backend, None, None, ABORTED_REQUEST)
    }
}

// ---------------------------------------------------------------------------
// LatencyDistribution: per-backend statistics of a load run
// ---------------------------------------------------------------------------

/// Statistical summary of every outcome a load generator produced.
///
/// Percentiles are nearest-rank over completed requests, so
/// `min <= p50 <= p95 <= p99 <= max` always holds. All durations are zero
/// when no request completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencyDistribution {
    pub backend: Backend,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Every request issued, completed or not.
    pub total_requests: u64,
    pub successful_requests: u64,
    /// Requests that completed and contributed a timing.
    pub timed_requests: u64,
    pub min: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub max: Duration,
    /// `successful_requests / total_requests`, 0.0 when nothing was issued.
    pub success_rate: f64,
    /// Achieved throughput over the generator's wall-clock run.
    pub requests_per_second: f64,
    /// Error description → occurrences.
    pub error_counts: BTreeMap<String, u64>,
}

impl LatencyDistribution {
    pub fn failed_requests(&self) -> u64 {
        self.total_requests.saturating_sub(self.successful_requests)
    }

    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}
