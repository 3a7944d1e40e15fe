use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::engine::aggregator::StreamingAggregator;
use crate::http::{describe_error, describe_status, HttpClient};
use crate::query::Backend;
use crate::results::{LatencyDistribution, LoadOutcome};

/// Outcome records buffered between the request tasks and the aggregation
/// loop.
const OUTCOME_CHANNEL_CAPACITY: usize = 4096;

/// What one fixed-rate generator sends, and for how long.
#[derive(Debug, Clone)]
pub struct GeneratorPlan {
    pub backend: Backend,
    /// Request URLs, cycled through in order.
    pub targets: Arc<[String]>,
    /// Time between two send permits.
    pub tick: Duration,
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run one generator to completion and return its distribution.
///
/// A producer task issues one request per tick and never waits for responses;
/// this function is the single consumer, folding every outcome into a
/// [`StreamingAggregator`]. It returns once the producer has stopped and the
/// outcome stream is fully drained.
///
/// The producer stops when `duration` has elapsed or `cancel` fires. On
/// cancellation the in-flight requests are aborted and recorded as never
/// completed.
pub async fn run_generator(
    plan: GeneratorPlan,
    client: HttpClient,
    cancel: CancellationToken,
) -> LatencyDistribution {
    let backend = plan.backend;
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<LoadOutcome>(OUTCOME_CHANNEL_CAPACITY);

    let producer = tokio::spawn(drive(plan, client, outcome_tx, cancel));

    let mut aggregator = StreamingAggregator::new(backend);
    while let Some(outcome) = outcome_rx.recv().await {
        aggregator.record(&outcome);
    }

    if let Err(e) = producer.await {
        tracing::error!(%backend, "load generator task failed: {e}");
    }

    let distribution = aggregator.distribution();
    tracing::info!(
        %backend,
        requests = distribution.total_requests,
        success_rate = distribution.success_rate,
        "load generator finished"
    );
    distribution
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// The producer: one permit per tick, each permit spawns one request.
async fn drive(
    plan: GeneratorPlan,
    client: HttpClient,
    outcome_tx: mpsc::Sender<LoadOutcome>,
    cancel: CancellationToken,
) {
    if plan.targets.is_empty() {
        return;
    }

    let mut ticker = interval(plan.tick);
    // Late ticks fire immediately so the request count tracks rate × duration.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
    let deadline = sleep(plan.duration);
    tokio::pin!(deadline);

    let backend = plan.backend;
    let mut in_flight: JoinSet<LoadOutcome> = JoinSet::new();
    let mut sent: usize = 0;

    let interrupted = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break true,
            _ = &mut deadline => break false,
            _ = ticker.tick() => {
                let url = plan.targets[sent % plan.targets.len()].clone();
                sent += 1;
                let client = client.clone();
                in_flight.spawn(async move { issue(&client, backend, &url).await });

                while let Some(joined) = in_flight.try_join_next() {
                    forward(joined, backend, &outcome_tx).await;
                }
            }
        }
    };

    if interrupted {
        tracing::warn!(%backend, in_flight = in_flight.len(), "load run interrupted");
        in_flight.abort_all();
    }

    // Drain what is still in flight; an interrupt here aborts the rest.
    let mut aborted = interrupted;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled(), if !aborted => {
                tracing::warn!(%backend, in_flight = in_flight.len(), "interrupted while draining");
                in_flight.abort_all();
                aborted = true;
            }
            joined = in_flight.join_next() => match joined {
                Some(joined) => forward(joined, backend, &outcome_tx).await,
                None => break,
            },
        }
    }
}

async fn forward(
    joined: Result<LoadOutcome, tokio::task::JoinError>,
    backend: Backend,
    outcome_tx: &mpsc::Sender<LoadOutcome>,
) {
    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => LoadOutcome::aborted(backend),
        Err(e) => LoadOutcome::failed(backend, None, None, format!("request task failed: {e}")),
    };
    // If the receiver is gone nobody is listening for outcomes any more.
    let _ = outcome_tx.send(outcome).await;
}

/// Send a single GET and turn the result into an outcome. Never fails: every
/// problem becomes an error description on the outcome.
async fn issue(client: &HttpClient, backend: Backend, url: &str) -> LoadOutcome {
    let start = Instant::now();
    match client.get(url).await {
        Ok(response) if response.is_success() => {
            LoadOutcome::succeeded(backend, response.elapsed, response.status)
        }
        Ok(response) => LoadOutcome::failed(
            backend,
            Some(response.elapsed),
            Some(response.status),
            describe_status(response.status, ""),
        ),
        Err(e) => LoadOutcome::failed(backend, Some(start.elapsed()), None, describe_error(&e)),
    }
}
