use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RcmpError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:6060/render";
pub const DEFAULT_RANGE_SECONDS: u64 = 300;

/// Highest load rate accepted; one request per microsecond.
pub const MAX_LOAD_RATE: f64 = 1_000_000.0;
/// Lowest load rate accepted; one request per day.
pub const MIN_LOAD_RATE: f64 = 1.0 / 86_400.0;

const MIN_TICK: Duration = Duration::from_micros(1);
const MAX_TICK: Duration = Duration::from_secs(86_400);

// ---------------------------------------------------------------------------
// RoutingConfig
// ---------------------------------------------------------------------------

/// Query parameter that selects which implementation serves a request behind
/// the shared endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoutingConfig {
    pub param: String,
    pub reference_marker: String,
    pub candidate_marker: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            param: "process".to_string(),
            reference_marker: "none".to_string(),
            candidate_marker: "any".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadConfig
// ---------------------------------------------------------------------------

/// Settings for the dual load harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadConfig {
    /// Requests per second issued by each generator.
    pub rate: f64,
    /// Wall-clock duration of each generator run in seconds.
    pub duration_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            rate: 10.0,
            duration_secs: 10,
        }
    }
}

impl LoadConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Interval between two send permits.
    ///
    /// Clamped to the range allowed by [`MIN_LOAD_RATE`] and
    /// [`MAX_LOAD_RATE`], so an unvalidated rate never yields a zero or
    /// unrepresentable tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.rate)
            .unwrap_or(MAX_TICK)
            .clamp(MIN_TICK, MAX_TICK)
    }
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Everything a run needs, constructed once at startup and passed down by
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    pub endpoint: String,
    pub range_seconds: u64,
    pub verbose: bool,
    pub compare: bool,
    pub load: bool,
    #[serde(default)]
    pub load_settings: LoadConfig,
    pub request_timeout_secs: u64,
    pub max_concurrent_comparisons: usize,
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            range_seconds: DEFAULT_RANGE_SECONDS,
            verbose: false,
            compare: true,
            load: false,
            load_settings: LoadConfig::default(),
            request_timeout_secs: 10,
            max_concurrent_comparisons: 8,
            routing: RoutingConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration and return every problem found.
    ///
    /// An empty `Vec` means the configuration is usable.
    pub fn validate(&self) -> Vec<RcmpError> {
        let mut errors = Vec::new();

        match reqwest::Url::parse(self.endpoint.trim()) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(RcmpError::Validation(format!(
                "endpoint must use http or https (got scheme: {})",
                url.scheme()
            ))),
            Err(e) => errors.push(RcmpError::Validation(format!(
                "endpoint '{}' is not a valid URL: {e}",
                self.endpoint
            ))),
        }

        if self.range_seconds == 0 {
            errors.push(RcmpError::Validation(
                "range must be at least 1 second".to_string(),
            ));
        }

        if !self.compare && !self.load {
            errors.push(RcmpError::Validation(
                "nothing to do: both comparison and load mode are disabled".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            errors.push(RcmpError::Validation(
                "request timeout must be at least 1 second".to_string(),
            ));
        }

        if self.max_concurrent_comparisons == 0 {
            errors.push(RcmpError::Validation(
                "comparison concurrency must be at least 1".to_string(),
            ));
        }

        if self.load {
            let rate = self.load_settings.rate;
            if !(MIN_LOAD_RATE..=MAX_LOAD_RATE).contains(&rate) {
                errors.push(RcmpError::Validation(format!(
                    "load rate must be between one request per day and {MAX_LOAD_RATE} requests per second (got: {rate})"
                )));
            }
            if self.load_settings.duration_secs == 0 {
                errors.push(RcmpError::Validation(
                    "load duration must be at least 1 second".to_string(),
                ));
            }
        }

        let routing = &self.routing;
        if routing.param.trim().is_empty() {
            errors.push(RcmpError::Validation(
                "routing parameter name must not be empty".to_string(),
            ));
        }
        if routing.reference_marker == routing.candidate_marker {
            errors.push(RcmpError::Validation(format!(
                "reference and candidate markers must differ (both are '{}')",
                routing.reference_marker
            )));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
