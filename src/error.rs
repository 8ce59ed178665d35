//! Error types shared across the crate

use std::path::PathBuf;

/// Failures of the persistent key-value store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode store contents: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures talking to the timer service
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("timer service is not running")]
    ServiceClosed,
}

/// Failures of a popup action, which touches both the timer and the store
#[derive(Debug, thiserror::Error)]
pub enum PopupError {
    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
