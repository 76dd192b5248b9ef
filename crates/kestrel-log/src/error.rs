//! Error types for sinks and logger configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log file {0} is not open")]
    FileClosed(PathBuf),

    #[error("log write failed: {0}")]
    Write(#[from] std::io::Error),
}
