use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A fully-read response to a GET request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FetchedResponse {
    /// HTTP response status code (e.g. 200, 404).
    pub status: u16,

    /// Response body decoded as UTF-8 (replacement characters for invalid
    /// sequences).
    pub body: String,

    /// Round-trip time measured from just before `send()` to just after the
    /// body is fully received.
    pub elapsed: Duration,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16) -> FetchedResponse {
        FetchedResponse {
            status,
            body: "[]".to_string(),
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn two_hundreds_are_success() {
        assert!(make_response(200).is_success());
        assert!(make_response(204).is_success());
        assert!(make_response(299).is_success());
    }

    #[test]
    fn other_statuses_are_not_success() {
        assert!(!make_response(199).is_success());
        assert!(!make_response(301).is_success());
        assert!(!make_response(404).is_success());
        assert!(!make_response(500).is_success());
    }

    #[test]
    fn serde_roundtrip_keeps_timing() {
        let output = make_response(200);
        let json = serde_json::to_string(&output).unwrap();
        let parsed: FetchedResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, 200);
        assert_eq!(parsed.elapsed, Duration::from_millis(12));
        assert_eq!(parsed.body, "[]");
    }
}
