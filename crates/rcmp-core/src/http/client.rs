use std::time::{Duration, Instant};

use crate::error::RcmpError;
use crate::http::response::FetchedResponse;

/// Longest body excerpt quoted in a status error.
const STATUS_BODY_EXCERPT_LEN: usize = 200;

/// Wrapper around a reqwest Client with builder-pattern configuration and
/// connection-pool settings.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

/// Idle keep-alive connections kept per backend host.
const POOL_MAX_IDLE_PER_HOST: usize = 100;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout covering connect, send and body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient, RcmpError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .user_agent(concat!("rcmp/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(HttpClient { inner: client })
    }
}

impl HttpClient {
    /// Returns a builder for customising the client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Issue a GET and read the whole body.
    ///
    /// Only transport problems are errors here; a non-2xx status still comes
    /// back as a [`FetchedResponse`]. Use [`HttpClient::get_ok`] to treat
    /// those as failures too.
    pub async fn get(&self, url: &str) -> Result<FetchedResponse, RcmpError> {
        let start = Instant::now();
        let response = self.inner.get(url).send().await?;
        let status = response.status().as_u16();

        let body_bytes = response.bytes().await?;
        let elapsed = start.elapsed();
        let body = String::from_utf8_lossy(&body_bytes).into_owned();

        Ok(FetchedResponse {
            status,
            body,
            elapsed,
        })
    }

    /// Issue a GET and fail with a readable description on any transport
    /// error or non-2xx status.
    pub async fn get_ok(&self, url: &str) -> Result<FetchedResponse, String> {
        let response = self.get(url).await.map_err(|e| describe_error(&e))?;
        if !response.is_success() {
            return Err(describe_status(response.status, &response.body));
        }
        Ok(response)
    }
}

/// Human-readable description of a failed request.
///
/// The URL is stripped so that identical failures against different targets
/// tally under the same description.
pub fn describe_error(err: &RcmpError) -> String {
    match err {
        RcmpError::Http(e) if e.is_timeout() => "request timed out".to_string(),
        RcmpError::Http(e) if e.is_connect() => {
            format!("connection failed: {}", root_cause(e))
        }
        RcmpError::Http(e) if e.is_body() || e.is_decode() => {
            format!("error reading response body: {}", root_cause(e))
        }
        RcmpError::Http(e) => format!("network error: {}", root_cause(e)),
        other => other.to_string(),
    }
}

/// Description of a non-2xx response, quoting the start of its body.
pub fn describe_status(status: u16, body: &str) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let excerpt: String = body.trim().chars().take(STATUS_BODY_EXCERPT_LEN).collect();
    match (reason.is_empty(), excerpt.is_empty()) {
        (true, true) => format!("HTTP {status}"),
        (true, false) => format!("HTTP {status}: {excerpt}"),
        (false, true) => format!("HTTP {status} {reason}"),
        (false, false) => format!("HTTP {status} {reason}: {excerpt}"),
    }
}

/// The innermost error message in a reqwest error chain.
fn root_cause(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}
