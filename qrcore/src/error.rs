use thiserror::Error;

/// Errors surfaced by the engine crate.
///
/// Candidate transitions that merge-conflict or fail constraint repair are
/// *not* errors: rejection is the dominant, expected outcome of the search
/// and is represented as `Option`/`bool` results instead.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] qrmodel::ModelError),
}

pub type QrResult<T> = Result<T, QrError>;
