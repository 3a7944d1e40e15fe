use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::results::LatencyDistribution;

/// `candidate / reference` for one statistic.
///
/// A zero reference statistic has no meaningful ratio and is reported as
/// [`Ratio::Undefined`] rather than infinity or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    /// Floating-point ratio of the two durations in seconds.
    pub fn of(candidate: Duration, reference: Duration) -> Self {
        if reference.is_zero() {
            return Ratio::Undefined;
        }
        Ratio::Defined(candidate.as_secs_f64() / reference.as_secs_f64())
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{v:.2}x"),
            Ratio::Undefined => write!(f, "undefined"),
        }
    }
}

/// Candidate/reference ratios for every latency statistic of a load run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencyRatios {
    pub mean: Ratio,
    pub p50: Ratio,
    pub p95: Ratio,
    pub p99: Ratio,
    pub max: Ratio,
}

impl LatencyRatios {
    pub fn between(reference: &LatencyDistribution, candidate: &LatencyDistribution) -> Self {
        Self {
            mean: Ratio::of(candidate.mean, reference.mean),
            p50: Ratio::of(candidate.p50, reference.p50),
            p95: Ratio::of(candidate.p95, reference.p95),
            p99: Ratio::of(candidate.p99, reference.p99),
            max: Ratio::of(candidate.max, reference.max),
        }
    }

    /// `(label, ratio)` pairs in table order.
    pub fn rows(&self) -> [(&'static str, Ratio); 5] {
        [
            ("mean", self.mean),
            ("p50", self.p50),
            ("p95", self.p95),
            ("p99", self.p99),
            ("max", self.max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_statistics_give_exactly_one() {
        let d = Duration::from_millis(50);
        assert_eq!(Ratio::of(d, d), Ratio::Defined(1.0));
    }

    #[test]
    fn ratio_uses_fractional_seconds() {
        // Sub-second durations would collapse to 0 under integer division.
        let r = Ratio::of(Duration::from_millis(75), Duration::from_millis(50));
        let v = r.value().expect("ratio should be defined");
        assert!((v - 1.5).abs() < 1e-9);
    }

    #[test]
    fn zero_reference_is_undefined() {
        assert_eq!(
            Ratio::of(Duration::from_millis(10), Duration::ZERO),
            Ratio::Undefined
        );
        assert_eq!(Ratio::of(Duration::ZERO, Duration::ZERO), Ratio::Undefined);
    }

    #[test]
    fn zero_candidate_is_zero_ratio() {
        assert_eq!(
            Ratio::of(Duration::ZERO, Duration::from_millis(10)),
            Ratio::Defined(0.0)
        );
    }

    #[test]
    fn value_and_is_defined() {
        assert_eq!(Ratio::Defined(2.0).value(), Some(2.0));
        assert!(Ratio::Undefined.value().is_none());
        assert!(!Ratio::Undefined.is_defined());
    }

    #[test]
    fn display() {
        assert_eq!(Ratio::Defined(1.0).to_string(), "1.00x");
        assert_eq!(Ratio::Defined(0.456).to_string(), "0.46x");
        assert_eq!(Ratio::Undefined.to_string(), "undefined");
    }

    #[test]
    fn serializes_with_explicit_status() {
        let json = serde_json::to_string(&Ratio::Undefined).unwrap();
        assert_eq!(json, r#"{"status":"undefined"}"#);
        let json = serde_json::to_string(&Ratio::Defined(1.5)).unwrap();
        assert_eq!(json, r#"{"status":"defined","value":1.5}"#);
    }
}
