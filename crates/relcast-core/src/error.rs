use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
