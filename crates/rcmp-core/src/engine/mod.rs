//! The dual load harness.

pub mod aggregator;
pub mod executor;
pub mod generator;

pub use aggregator::StreamingAggregator;
pub use executor::{run_load, DualLoadResult};
pub use generator::{run_generator, GeneratorPlan};
