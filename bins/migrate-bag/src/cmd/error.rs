use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MigrateBagError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Engine(#[from] migrate_engine::EngineError),

    #[error("container {}: {source}", .path.display())]
    Container {
        path: PathBuf,
        source: migrate_storage_jsonl::ContainerError,
    },

    #[error("container {}: {source}", .path.display())]
    Driver {
        path: PathBuf,
        source: migrate_engine::DriverError,
    },

    #[error("finish {}: {source}", .path.display())]
    Finish {
        path: PathBuf,
        source: migrate_engine::BoxError,
    },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "containers {} and {} both map to {}",
        .first.display(), .second.display(), .target.display()
    )]
    NameClash {
        first: PathBuf,
        second: PathBuf,
        target: PathBuf,
    },

    #[error("backup {} already exists, refusing to overwrite", .path.display())]
    BackupExists { path: PathBuf },

    #[error("worker task: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{failed} of {total} container(s) failed")]
    Failed { failed: usize, total: usize },

    #[error("interrupted; {remaining} container(s) left unmigrated")]
    Interrupted { remaining: usize },
}

impl MigrateBagError {
    pub fn config(context: &'static str, detail: impl Into<String>) -> Self {
        Self::Config { context, detail: detail.into() }
    }

    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { context, path: path.into(), source }
    }
}
