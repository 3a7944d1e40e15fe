pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod query;
pub mod results;
pub mod runner;

pub use compare::{CompareOptions, Comparator, ComparisonVerdict, VerdictFailure};
pub use config::{LoadConfig, RoutingConfig, RunConfig};
pub use error::RcmpError;
pub use query::{Backend, BuiltQuery, TimeWindow};
pub use results::{FileReport, LatencyDistribution, LoadComparison, Ratio, RunSummary};
pub use runner::Runner;
