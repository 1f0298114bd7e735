//! Errors raised while loading inputs
//!
//! The parsing and reconstruction core never fails; only reading and
//! decoding what the user points the CLI at can.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: io::Error,
    },

    #[error("{source_name} is not a valid generation output: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
}
