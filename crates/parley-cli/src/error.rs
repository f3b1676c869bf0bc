//! CLI error type.

use std::{io, path::PathBuf};

use parley_app::{RuntimeError, SessionError};
use thiserror::Error;

/// Errors that abort a scripted run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Script line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        message: String,
    },

    /// Reading the script or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid session config JSON.
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        /// Config file path.
        path: PathBuf,
        /// Decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// Session refused an operation. Fatal only when starting.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<RuntimeError<io::Error>> for CliError {
    fn from(err: RuntimeError<io::Error>) -> Self {
        match err {
            RuntimeError::Session(e) => Self::Session(e),
            RuntimeError::Driver(e) => Self::Io(e),
        }
    }
}
