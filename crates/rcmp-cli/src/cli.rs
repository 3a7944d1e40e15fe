//! CLI argument parsing definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use rcmp_core::config::{
    LoadConfig, RoutingConfig, RunConfig, DEFAULT_ENDPOINT, DEFAULT_RANGE_SECONDS,
};

/// Compare a candidate time-series backend against the reference one.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Render endpoint shared by both backends
    #[arg(long, env = "RCMP_URL", value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub url: String,

    /// Query window length in seconds, ending now
    #[arg(long, env = "RCMP_RANGE", value_name = "SECONDS", default_value_t = DEFAULT_RANGE_SECONDS)]
    pub range: u64,

    /// Print URLs, bodies and per-file subtotals
    #[arg(short, long, env = "RCMP_VERBOSE")]
    pub verbose: bool,

    /// Compare responses of both backends (--compare=false to disable)
    #[arg(long, env = "RCMP_COMPARE", action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub compare: bool,

    /// Run the dual load harness against both backends
    #[arg(long, env = "RCMP_LOAD")]
    pub load: bool,

    /// Requests per second issued against each backend in load mode
    #[arg(long, env = "RCMP_RATE", value_name = "RPS", default_value_t = 10.0)]
    pub rate: f64,

    /// Duration of each load run in seconds
    #[arg(long, env = "RCMP_DURATION", value_name = "SECONDS", default_value_t = 10)]
    pub duration: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "RCMP_TIMEOUT", value_name = "SECONDS", default_value_t = 10)]
    pub timeout: u64,

    /// Maximum number of tests compared at once
    #[arg(long, env = "RCMP_CONCURRENCY", value_name = "N", default_value_t = 8)]
    pub concurrency: usize,

    /// Query parameter that routes a request to one implementation
    #[arg(long, env = "RCMP_ROUTING_PARAM", value_name = "NAME", default_value = "process")]
    pub routing_param: String,

    /// Routing value selecting the reference implementation
    #[arg(long, env = "RCMP_REFERENCE_MARKER", value_name = "VALUE", default_value = "none")]
    pub reference_marker: String,

    /// Routing value selecting the candidate implementation
    #[arg(long, env = "RCMP_CANDIDATE_MARKER", value_name = "VALUE", default_value = "any")]
    pub candidate_marker: String,

    /// Also print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit non-zero when any test failed
    #[arg(long, env = "RCMP_STRICT")]
    pub strict: bool,

    /// Test definition files (JSON: test name -> query target)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            endpoint: self.url.clone(),
            range_seconds: self.range,
            verbose: self.verbose,
            compare: self.compare,
            load: self.load,
            load_settings: LoadConfig {
                rate: self.rate,
                duration_secs: self.duration,
            },
            request_timeout_secs: self.timeout,
            max_concurrent_comparisons: self.concurrency,
            routing: RoutingConfig {
                param: self.routing_param.clone(),
                reference_marker: self.reference_marker.clone(),
                candidate_marker: self.candidate_marker.clone(),
            },
        }
    }
}
