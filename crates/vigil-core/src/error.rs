//! Core error types.
//!
//! Anything touching shared startup state (corpora, trained model, key
//! material) surfaces as a fatal [`StartupError`]; the process must not
//! serve without it. Per-message failures are [`PipelineError`] and stay
//! local to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::classifier::Label;

/// Fatal errors during the single-threaded startup phase.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A training corpus file does not exist.
    #[error("training corpus missing: {}", .0.display())]
    CorpusMissing(PathBuf),

    /// A training corpus file exists but holds no usable examples.
    #[error("training corpus for {0:?} is empty")]
    CorpusEmpty(Label),

    /// IO error while reading a corpus.
    #[error("corpus IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key material could not be loaded or generated.
    #[error("key material error: {0}")]
    Key(#[from] vigil_crypto::KeyError),
}

/// Per-message pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Sealing the message content failed.
    #[error("envelope seal failed: {0}")]
    Seal(#[from] vigil_crypto::EnvelopeError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
