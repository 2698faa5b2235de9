use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal run failures. Anything per-cell degrades to null instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to fetch {source_url}")]
    Fetch {
        source_url: String,
        #[source]
        source: BoxError,
    },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
