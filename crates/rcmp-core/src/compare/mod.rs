//! The response comparator: fetch both sides of a query, normalize the
//! bodies, diff them, and classify the pair.
//!
//! Nothing here prints; the rendered diff travels back inside the
//! [`ComparisonVerdict`] for the reporter to show.

pub mod diff;
pub mod normalize;
pub mod render;

use serde::{Deserialize, Serialize};

use crate::http::HttpClient;
use crate::query::{Backend, BuiltQuery};

pub use diff::{diff, Change, ChangeKind, Delta, PathSegment};
pub use normalize::{normalize, wrap, RESPONSE_KEY};
pub use render::{render, RenderOptions};

// ---------------------------------------------------------------------------
// Verdict types
// ---------------------------------------------------------------------------

/// A failed request against one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendError {
    pub backend: Backend,
    pub message: String,
}

/// Why a pair of responses was judged non-equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerdictFailure {
    /// At least one request failed (connection, timeout, non-2xx status).
    Transport { errors: Vec<BackendError> },
    /// At least one body was not valid JSON. No diff is attempted.
    Parse { errors: Vec<BackendError> },
    /// Both bodies parsed but differ structurally.
    Divergence { changes: usize },
    /// The comparison itself could not finish.
    Internal { message: String },
}

impl std::fmt::Display for VerdictFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictFailure::Transport { errors } => {
                write!(f, "transport error: ")?;
                write_backend_errors(f, errors)
            }
            VerdictFailure::Parse { errors } => {
                write!(f, "invalid response: ")?;
                write_backend_errors(f, errors)
            }
            VerdictFailure::Divergence { changes } => {
                let noun = if *changes == 1 { "difference" } else { "differences" };
                write!(f, "{changes} {noun} found")
            }
            VerdictFailure::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

fn write_backend_errors(
    f: &mut std::fmt::Formatter<'_>,
    errors: &[BackendError],
) -> std::fmt::Result {
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{}: {}", err.backend, err.message)?;
    }
    Ok(())
}

/// Raw bodies as received, for manual inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResponseBodies {
    pub reference: String,
    pub candidate: String,
}

/// The outcome of comparing one query across both backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComparisonVerdict {
    pub name: String,
    pub equivalent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<VerdictFailure>,
    /// Rendered diff, present on divergence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_report: Option<String>,
    /// Always present on a parse failure; on divergence only when bodies are
    /// kept for verbose output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bodies: Option<ResponseBodies>,
    pub reference_url: String,
    pub candidate_url: String,
}

impl ComparisonVerdict {
    fn base(query: &BuiltQuery) -> Self {
        Self {
            name: query.name.clone(),
            equivalent: true,
            failure: None,
            diff_report: None,
            bodies: None,
            reference_url: query.reference_url.clone(),
            candidate_url: query.candidate_url.clone(),
        }
    }

    pub(crate) fn failed(query: &BuiltQuery, failure: VerdictFailure) -> Self {
        Self {
            equivalent: false,
            failure: Some(failure),
            ..Self::base(query)
        }
    }
}

// ---------------------------------------------------------------------------
// CompareOptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompareOptions {
    /// Attach raw bodies to divergent verdicts as well as parse failures.
    pub keep_bodies: bool,
    pub render: RenderOptions,
}

impl CompareOptions {
    /// Options for verbose runs: bodies kept, unchanged context rendered.
    pub fn verbose() -> Self {
        Self {
            keep_bodies: true,
            render: RenderOptions {
                include_unchanged: true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// judge: the pure half of a comparison
// ---------------------------------------------------------------------------

/// Classify two raw bodies fetched for `query`.
///
/// Bodies are normalized here; callers must pass them exactly as received.
pub fn judge(
    query: &BuiltQuery,
    reference_body: &str,
    candidate_body: &str,
    options: &CompareOptions,
) -> ComparisonVerdict {
    let reference = normalize(reference_body);
    let candidate = normalize(candidate_body);

    let (reference, candidate) = match (reference, candidate) {
        (Ok(r), Ok(c)) => (r, c),
        (r, c) => {
            let mut errors = Vec::new();
            if let Err(e) = r {
                errors.push(BackendError {
                    backend: Backend::Reference,
                    message: e.to_string(),
                });
            }
            if let Err(e) = c {
                errors.push(BackendError {
                    backend: Backend::Candidate,
                    message: e.to_string(),
                });
            }
            return ComparisonVerdict {
                bodies: Some(ResponseBodies {
                    reference: reference_body.to_string(),
                    candidate: candidate_body.to_string(),
                }),
                ..ComparisonVerdict::failed(query, VerdictFailure::Parse { errors })
            };
        }
    };

    let delta = diff(&reference, &candidate);
    if !delta.is_changed() {
        return ComparisonVerdict::base(query);
    }

    let changes = delta.changes().len();
    ComparisonVerdict {
        diff_report: Some(render(&delta, &options.render)),
        bodies: options.keep_bodies.then(|| ResponseBodies {
            reference: reference_body.to_string(),
            candidate: candidate_body.to_string(),
        }),
        ..ComparisonVerdict::failed(query, VerdictFailure::Divergence { changes })
    }
}

// ---------------------------------------------------------------------------
// Comparator
// ---------------------------------------------------------------------------

/// Fetches both sides of a query and judges them.
#[derive(Debug, Clone)]
pub struct Comparator {
    client: HttpClient,
    options: CompareOptions,
}

impl Comparator {
    pub fn new(client: HttpClient, options: CompareOptions) -> Self {
        Self { client, options }
    }

    pub async fn compare(
        &self,
        name: &str,
        reference_url: &str,
        candidate_url: &str,
    ) -> ComparisonVerdict {
        let query = BuiltQuery {
            name: name.to_string(),
            reference_url: reference_url.to_string(),
            candidate_url: candidate_url.to_string(),
        };
        self.compare_query(&query).await
    }

    /// Issue both requests concurrently and judge the bodies once both are
    /// fully read. A transport failure on either side fails the verdict
    /// without diffing.
    pub async fn compare_query(&self, query: &BuiltQuery) -> ComparisonVerdict {
        tracing::debug!(test = %query.name, url = %query.reference_url, "comparing");

        let (reference, candidate) = tokio::join!(
            self.client.get_ok(&query.reference_url),
            self.client.get_ok(&query.candidate_url),
        );

        let (reference, candidate) = match (reference, candidate) {
            (Ok(r), Ok(c)) => (r, c),
            (r, c) => {
                let mut errors = Vec::new();
                if let Err(message) = r {
                    errors.push(BackendError {
                        backend: Backend::Reference,
                        message,
                    });
                }
                if let Err(message) = c {
                    errors.push(BackendError {
                        backend: Backend::Candidate,
                        message,
                    });
                }
                let verdict =
                    ComparisonVerdict::failed(query, VerdictFailure::Transport { errors });
                tracing::debug!(test = %query.name, failure = ?verdict.failure, "request failed");
                return verdict;
            }
        };

        let verdict = judge(query, &reference.body, &candidate.body, &self.options);
        if verdict.equivalent {
            tracing::debug!(test = %query.name, "identical");
        } else {
            tracing::debug!(test = %query.name, failure = ?verdict.failure, "not equivalent");
        }
        verdict
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
