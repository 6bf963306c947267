use thiserror::Error;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedInput(msg.into())
    }

    pub fn output<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Output { path: path.into(), source }
    }

    /// Configuration and malformed input abort the run before any output.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Output { .. })
    }
}
