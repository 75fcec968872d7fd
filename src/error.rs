//! Error types shared by the collector and the restorer.
//!
//! Per-entry errors (`Io`, `Parse`, `PathTraversal`) are reported as warnings
//! and the run continues. `FatalArgument` aborts the run.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be read or written.
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A block in the document could not be decoded into an entry.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A decoded path would resolve outside the destination root.
    #[error("line {line}: path '{path}' escapes the destination root")]
    PathTraversal { path: String, line: usize },

    /// A required command line input is missing or invalid.
    #[error("invalid {arg}: {message}")]
    FatalArgument { arg: &'static str, message: String },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
