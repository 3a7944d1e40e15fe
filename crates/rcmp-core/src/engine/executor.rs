use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::LoadConfig;
use crate::engine::generator::{run_generator, GeneratorPlan};
use crate::http::HttpClient;
use crate::query::{Backend, BuiltQuery};
use crate::results::LatencyDistribution;

/// The two distributions produced by one dual load run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DualLoadResult {
    pub reference: LatencyDistribution,
    pub candidate: LatencyDistribution,
}

/// Drive both backends with matched fixed-rate GET traffic.
///
/// Two independent generators run concurrently, one over the queries'
/// reference URLs and one over their candidate URLs, each at `config.rate`
/// requests per second for `config.duration()`. Blocks until both have
/// finished and their outcome streams are drained. Never fails: unhealthy
/// backends show up as errors in the distributions.
pub async fn run_load(
    client: &HttpClient,
    queries: &[BuiltQuery],
    config: &LoadConfig,
    cancel: &CancellationToken,
) -> DualLoadResult {
    tracing::info!(
        queries = queries.len(),
        rate = config.rate,
        duration_secs = config.duration_secs,
        "starting dual load run"
    );

    let plan_for = |backend: Backend| GeneratorPlan {
        backend,
        targets: queries
            .iter()
            .map(|q| q.url_for(backend).to_string())
            .collect::<Arc<[String]>>(),
        tick: config.tick_interval(),
        duration: config.duration(),
    };

    let (reference, candidate) = tokio::join!(
        run_generator(plan_for(Backend::Reference), client.clone(), cancel.child_token()),
        run_generator(plan_for(Backend::Candidate), client.clone(), cancel.child_token()),
    );

    DualLoadResult {
        reference,
        candidate,
    }
}
