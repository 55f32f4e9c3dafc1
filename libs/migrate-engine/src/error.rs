use migrate_api::{RuleError, Version};

/// Boxed error from a record source or sink collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("rules '{first}' and '{second}' both declare version {version}")]
    DuplicateVersion {
        version: Version,
        first: String,
        second: String,
    },

    #[error("rule '{name}' declares version 0 (versions start at 1)")]
    InvalidVersion { name: String },

    #[error("target version {to} precedes source version {from}")]
    InvalidRange { from: Version, to: Version },

    #[error("rule v{version} failed on topic '{topic}': {cause}")]
    RuleFailure {
        version: Version,
        topic: String,
        #[source]
        cause: RuleError,
    },
}

/// Failure while driving one stream through the engine.
///
/// `index` is the 0-based position of the record in the source stream.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("read record #{index}: {cause}")]
    Source {
        index: u64,
        #[source]
        cause: BoxError,
    },

    #[error("record #{index} (ts {ts_ns}): {cause}")]
    Rule {
        index: u64,
        ts_ns: i64,
        #[source]
        cause: EngineError,
    },

    #[error("write output of record #{index} (ts {ts_ns}): {cause}")]
    Sink {
        index: u64,
        ts_ns: i64,
        #[source]
        cause: BoxError,
    },

    #[error("cancelled before record #{index}")]
    Cancelled { index: u64 },
}
