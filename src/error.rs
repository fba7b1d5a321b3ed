//! Error types for flowtag.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Malformed input rows are never errors; they are skipped
/// and counted in the scan statistics instead.
#[derive(Error, Debug)]
pub enum FlowTagError {
    /// Input file missing or unreadable
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while streaming an input file
    #[error("read error in {} at line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// Report could not be written
    #[error("cannot write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scan worker died before finishing its partition
    #[error("scan worker failed: {0}")]
    Worker(String),

    /// JSON serialization of the report failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for flowtag operations.
pub type Result<T> = std::result::Result<T, FlowTagError>;
