// Central Error Types
//
// Neither type ever reaches the driver: ProbeError is folded into a
// ProbeResult by the CommandProbe adapter, SinkError is absorbed by LogSink.

use std::path::PathBuf;
use thiserror::Error;

/// Ways a single command probe can fail
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The executable could not be located on the search path
    #[error("command not found")]
    NotFound,

    /// The process ran but returned a failing status
    #[error("exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// The process did not complete within the allotted time
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Any other failure while starting or waiting on the process
    #[error("{0}")]
    SpawnFailure(String),
}

/// Log sink write failures
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("cannot append to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;
