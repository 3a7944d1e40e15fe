pub mod builder;
pub mod io;
pub mod model;

pub use builder::QueryBuilder;
pub use io::read_definition;
pub use model::{Backend, BuiltQuery, TestDefinition, TimeWindow};
