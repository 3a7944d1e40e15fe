use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::compare::{CompareOptions, Comparator, ComparisonVerdict, VerdictFailure};
use crate::config::RunConfig;
use crate::engine::run_load;
use crate::error::RcmpError;
use crate::http::HttpClient;
use crate::query::{read_definition, BuiltQuery, QueryBuilder, TimeWindow};
use crate::results::{FileReport, LoadComparison, RunSummary};

/// Drives a whole run: every file, every test, comparison and load.
pub struct Runner {
    config: RunConfig,
    client: HttpClient,
    builder: QueryBuilder,
    comparator: Comparator,
}

impl Runner {
    /// Validate `config` and prepare the shared HTTP client.
    ///
    /// This is the only fallible step of a run; everything after it folds
    /// problems into the summary.
    pub fn new(config: RunConfig, window: TimeWindow) -> Result<Self, RcmpError> {
        let problems = config.validate();
        if !problems.is_empty() {
            let messages: Vec<String> = problems
                .into_iter()
                .map(|e| match e {
                    RcmpError::Validation(msg) => msg,
                    other => other.to_string(),
                })
                .collect();
            return Err(RcmpError::Validation(messages.join("; ")));
        }

        let client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;
        let builder = QueryBuilder::new(&config.endpoint, config.routing.clone(), window)?;
        let options = if config.verbose {
            CompareOptions::verbose()
        } else {
            CompareOptions::default()
        };
        let comparator = Comparator::new(client.clone(), options);

        Ok(Self {
            config,
            client,
            builder,
            comparator,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn window(&self) -> TimeWindow {
        self.builder.window()
    }

    /// Process every file in order and fold the results.
    ///
    /// Files that cannot be loaded are recorded as skipped. When `cancel`
    /// fires the run stops at the next file boundary and the summary is
    /// marked interrupted.
    pub async fn run(&self, paths: &[PathBuf], cancel: &CancellationToken) -> RunSummary {
        let mut summary = RunSummary::new(self.window());

        for path in paths {
            if cancel.is_cancelled() {
                summary.interrupted = true;
                break;
            }
            match self.process_file(path, cancel).await {
                Ok(report) => {
                    tracing::info!(
                        file = %path.display(),
                        passed = report.passed(),
                        failed = report.failed(),
                        "file done"
                    );
                    summary.absorb(report);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), "skipping file: {e}");
                    let reason = match e {
                        RcmpError::Setup { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    summary.skip(path, reason);
                }
            }
        }

        if cancel.is_cancelled() {
            summary.interrupted = true;
        }
        summary
    }

    /// Load one definition file, then compare and/or load-test its queries.
    pub async fn process_file(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<FileReport, RcmpError> {
        tracing::info!(file = %path.display(), "testing file");
        let definition = read_definition(path).await?;
        let queries = self.builder.build_all(&definition);

        let mut report = FileReport::new(path);
        if self.config.compare {
            report.verdicts = self.compare_all(&queries).await;
        }
        if self.config.load && !cancel.is_cancelled() {
            let result = run_load(&self.client, &queries, &self.config.load_settings, cancel).await;
            report.load = Some(LoadComparison::from(result));
        }
        Ok(report)
    }

    /// Compare every query, at most `max_concurrent_comparisons` at a time.
    ///
    /// Verdicts come back in the order of `queries`.
    pub async fn compare_all(&self, queries: &[BuiltQuery]) -> Vec<ComparisonVerdict> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_comparisons));
        let mut join_set: JoinSet<(usize, ComparisonVerdict)> = JoinSet::new();

        for (index, query) in queries.iter().cloned().enumerate() {
            let comparator = self.comparator.clone();
            let permits = Arc::clone(&permits);
            join_set.spawn(async move {
                // The semaphore is never closed, so acquire only fails if it is.
                let _permit = permits.acquire_owned().await.ok();
                (index, comparator.compare_query(&query).await)
            });
        }

        let mut verdicts: Vec<Option<ComparisonVerdict>> = vec![None; queries.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, verdict)) => verdicts[index] = Some(verdict),
                Err(e) => tracing::error!("comparison task failed: {e}"),
            }
        }

        verdicts
            .into_iter()
            .zip(queries)
            .map(|(verdict, query)| {
                verdict.unwrap_or_else(|| {
                    ComparisonVerdict::failed(
                        query,
                        VerdictFailure::Internal {
                            message: "comparison task did not complete".to_string(),
                        },
                    )
                })
            })
            .collect()
    }
}
