use std::path::PathBuf;

use thiserror::Error;

/// Failures inside the list store. None of these reach the user: the store
/// logs them and falls back to an empty or unchanged list set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed list data")]
    Json(#[from] serde_json::Error),

    #[error("failed to fetch seed lists from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("seed request to {url} returned {status}")]
    Status { url: String, status: u16 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
