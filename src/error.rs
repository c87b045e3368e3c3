//! Error taxonomy for every build step
//!
//! Library operations return [`BuildError`]; the pipeline driver wraps them
//! with the name of the failed step before they reach `main`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the fetch, extract, transform and preprocess steps
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("error parsing JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid base64 payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("no releases found")]
    EmptyResult,

    #[error("failed to unpack archive into {}: {source}", dest.display())]
    Archive {
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(String),

    #[error("preprocessor failed: {0}")]
    Preprocess(String),

    #[error("{}: {message}", file.display())]
    Directive { file: PathBuf, message: String },
}

impl BuildError {
    /// Attach a path to an I/O failure
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
