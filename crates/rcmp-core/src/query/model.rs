use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RcmpError;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Which side of the comparison a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// The established implementation, treated as ground truth.
    Reference,
    /// The implementation under test.
    Candidate,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Backend::Reference => "reference",
            Backend::Candidate => "candidate",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// TestDefinition
// ---------------------------------------------------------------------------

/// The named queries loaded from one test-definition file.
///
/// Tests are kept sorted by name so every run visits them in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestDefinition {
    /// File the definition was read from.
    pub source: PathBuf,
    /// Test name → query target.
    pub tests: BTreeMap<String, String>,
}

impl TestDefinition {
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

/// The `[from, until]` window, in Unix seconds, shared by every query of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeWindow {
    pub from: i64,
    pub until: i64,
}

impl TimeWindow {
    /// A window of `range_seconds` ending at `until`.
    pub fn ending_at(until: i64, range_seconds: u64) -> Result<Self, RcmpError> {
        if range_seconds == 0 {
            return Err(RcmpError::Validation(
                "time window must span at least 1 second".to_string(),
            ));
        }
        let range = i64::try_from(range_seconds).map_err(|_| {
            RcmpError::Validation(format!("time range too large: {range_seconds}s"))
        })?;
        let from = until.checked_sub(range).ok_or_else(|| {
            RcmpError::Validation(format!("time range too large: {range_seconds}s"))
        })?;
        Ok(Self { from, until })
    }

    /// A window of `range_seconds` ending now.
    pub fn ending_now(range_seconds: u64) -> Result<Self, RcmpError> {
        Self::ending_at(chrono::Utc::now().timestamp(), range_seconds)
    }

    pub fn span_seconds(&self) -> i64 {
        self.until - self.from
    }
}

// ---------------------------------------------------------------------------
// BuiltQuery
// ---------------------------------------------------------------------------

/// A test name with its two fully-formed request URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BuiltQuery {
    pub name: String,
    pub reference_url: String,
    pub candidate_url: String,
}

impl BuiltQuery {
    pub fn url_for(&self, backend: Backend) -> &str {
        match backend {
            Backend::Reference => &self.reference_url,
            Backend::Candidate => &self.candidate_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_display() {
        assert_eq!(Backend::Reference.to_string(), "reference");
        assert_eq!(Backend::Candidate.to_string(), "candidate");
    }

    #[test]
    fn backend_serializes_snake_case() {
        let json = serde_json::to_string(&Backend::Candidate).unwrap();
        assert_eq!(json, "\"candidate\"");
    }

    #[test]
    fn window_ending_at_subtracts_range() {
        let window = TimeWindow::ending_at(1_700_000_300, 300).unwrap();
        assert_eq!(window.from, 1_700_000_000);
        assert_eq!(window.until, 1_700_000_300);
        assert_eq!(window.span_seconds(), 300);
        assert!(window.from < window.until);
    }

    #[test]
    fn window_rejects_empty_range() {
        assert!(TimeWindow::ending_at(1_700_000_000, 0).is_err());
    }

    #[test]
    fn window_rejects_overflowing_range() {
        assert!(TimeWindow::ending_at(i64::MIN + 10, 100).is_err());
        assert!(TimeWindow::ending_at(0, u64::MAX).is_err());
    }

    #[test]
    fn window_ending_now_is_recent() {
        let before = chrono::Utc::now().timestamp();
        let window = TimeWindow::ending_now(60).unwrap();
        assert!(window.until >= before);
        assert_eq!(window.span_seconds(), 60);
    }

    #[test]
    fn built_query_url_for_selects_side() {
        let query = BuiltQuery {
            name: "cpu".to_string(),
            reference_url: "http://a/?process=none".to_string(),
            candidate_url: "http://a/?process=any".to_string(),
        };
        assert_eq!(query.url_for(Backend::Reference), "http://a/?process=none");
        assert_eq!(query.url_for(Backend::Candidate), "http://a/?process=any");
    }
}
