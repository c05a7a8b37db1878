//! Error types for the acquisition pipeline.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::month::YearMonth;

pub type Result<T, E = ChirpsError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ChirpsError {
    #[error("Unknown dataset `{0}`. Run `chirps options` to see available datasets")]
    UnknownDataset(String),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: YearMonth, end: YearMonth },

    #[error("Invalid month `{0}`, expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Target directory {} is not writable: {source}", .path.display())]
    Precondition { path: PathBuf, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Decompression failed: {0}")]
    Decompress(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl ChirpsError {
    /// Transient errors worth another attempt.
    pub fn is_network(&self) -> bool {
        matches!(self, ChirpsError::Network(_))
    }
}

impl From<reqwest::Error> for ChirpsError {
    fn from(e: reqwest::Error) -> Self {
        ChirpsError::Network(e.to_string())
    }
}
