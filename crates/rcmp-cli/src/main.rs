mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use rcmp_core::config::RunConfig;
use rcmp_core::query::TimeWindow;
use rcmp_core::runner::Runner;
use rcmp_core::RcmpError;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Exit status for a second interrupt, following the 128 + SIGINT convention.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runner = match prepare(cli.run_config()) {
        Ok(runner) => runner,
        Err(e) => {
            error!("invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };
    let window = runner.window();
    debug!(from = window.from, until = window.until, "query window");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received, stopping; press Ctrl-C again to exit immediately");
        interrupt.cancel();
        if signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });

    let summary = runner.run(&cli.files, &cancel).await;

    print!("{}", report::render_summary(&summary, cli.verbose));
    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => error!("failed to serialize summary: {e}"),
        }
    }

    if cli.strict && !summary.all_passed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Build the query window and the runner; the only fallible setup step.
fn prepare(config: RunConfig) -> Result<Runner, RcmpError> {
    let window = TimeWindow::ending_now(config.range_seconds)?;
    Runner::new(config, window)
}

/// Log to stderr so stdout carries only the report.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug output from
/// the core library with `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "warn,rcmp_core=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_accepts_default_config() {
        let runner = prepare(RunConfig::default()).expect("defaults should be valid");
        assert_eq!(runner.window().span_seconds(), 300);
    }

    #[test]
    fn prepare_rejects_zero_range_with_one_error() {
        let config = RunConfig {
            range_seconds: 0,
            ..RunConfig::default()
        };
        let err = prepare(config).err().expect("zero range should be rejected");
        assert!(matches!(err, RcmpError::Validation(_)));
    }

    #[test]
    fn prepare_reports_every_config_problem_in_one_error() {
        let config = RunConfig {
            endpoint: "nope".to_string(),
            request_timeout_secs: 0,
            ..RunConfig::default()
        };
        let msg = prepare(config)
            .err()
            .expect("config should be rejected")
            .to_string();
        assert_eq!(msg.matches("Validation error").count(), 1);
        assert!(msg.contains("not a valid URL"));
        assert!(msg.contains("request timeout"));
    }
}
