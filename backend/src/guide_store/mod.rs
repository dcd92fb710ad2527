//! Durable storage for the currently configured guide.
//!
//! The guide lives in a single small JSON file (`guide_config.json` by default):
//!
//! ```json
//! {"guide_reference": "BQACAgIAAxk...", "reference_type": "file_id"}
//! ```
//!
//! - `file`: reads and atomically rewrites that file. A missing or unreadable file is
//!   never an error for the caller, it just means no guide is configured.
//! - `state`: `GuideStore`, the shared in-memory copy handed to request handlers.

pub mod file;
pub mod state;

pub use state::GuideStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write guide config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode guide config: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("guide config writer did not finish: {0}")]
    Writer(#[from] tokio::task::JoinError),
}
