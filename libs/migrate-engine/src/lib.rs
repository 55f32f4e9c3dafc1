//! Rule registry, chain selection and the per-record migration engine.

pub mod chain;
pub mod driver;
pub mod engine;
pub mod error;
pub mod registry;

#[cfg(test)]
mod testing;

pub use chain::RuleChain;
pub use driver::{DriveStats, FailurePolicy, RecordSink, RecordSource, StreamDriver};
pub use engine::{MigrationEngine, WorkingSet};
pub use error::{BoxError, DriverError, EngineError};
pub use registry::RuleRegistry;
