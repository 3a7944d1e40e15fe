use reqwest::Url;

use crate::config::RoutingConfig;
use crate::error::RcmpError;
use crate::query::model::{Backend, BuiltQuery, TestDefinition, TimeWindow};

/// Turns query targets into the pair of backend-specific request URLs.
///
/// The endpoint is parsed once here; building URLs afterwards cannot fail.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    endpoint: Url,
    routing: RoutingConfig,
    window: TimeWindow,
}

impl QueryBuilder {
    pub fn new(
        endpoint: &str,
        routing: RoutingConfig,
        window: TimeWindow,
    ) -> Result<Self, RcmpError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            RcmpError::Validation(format!("endpoint '{endpoint}' is not a valid URL: {e}"))
        })?;
        Ok(Self {
            endpoint,
            routing,
            window,
        })
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// The request URL for `target` routed to `backend`.
    ///
    /// Both sides share every parameter except the routing marker.
    pub fn url_for(&self, target: &str, backend: Backend) -> String {
        let marker = match backend {
            Backend::Reference => &self.routing.reference_marker,
            Backend::Candidate => &self.routing.candidate_marker,
        };

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("target", target)
            .append_pair("from", &self.window.from.to_string())
            .append_pair("until", &self.window.until.to_string())
            .append_pair("format", "json")
            .append_pair(&self.routing.param, marker);
        url.into()
    }

    pub fn build(&self, name: &str, target: &str) -> BuiltQuery {
        BuiltQuery {
            name: name.to_string(),
            reference_url: self.url_for(target, Backend::Reference),
            candidate_url: self.url_for(target, Backend::Candidate),
        }
    }

    /// One [`BuiltQuery`] per test, in the definition's order.
    pub fn build_all(&self, definition: &TestDefinition) -> Vec<BuiltQuery> {
        definition
            .tests
            .iter()
            .map(|(name, target)| self.build(name, target))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
