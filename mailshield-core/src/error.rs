//! Error type shared by the masking, classification and training stages.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CRF weights in {path} must have a {expected}x{expected} transition matrix")]
    InvalidWeights { path: PathBuf, expected: usize },

    #[error("Invalid model artifact: {0}")]
    Artifact(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found in dataset header")]
    MissingColumn(String),

    #[error("Dataset has no usable rows")]
    EmptyDataset,

    #[error("No terms left after tokenization and stop-word removal")]
    EmptyVocabulary,

    #[error("{texts} texts but {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },

    #[error("Smoothing alpha must be finite and greater than 0, got {0}")]
    InvalidAlpha(f64),

    #[error("Model has not been fitted")]
    NotFitted,
}

pub type Result<T> = std::result::Result<T, Error>;
