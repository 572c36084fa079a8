//! Errors reported by external collaborators.

use thiserror::Error;

/// Failure of a vision model, places API, venue store or geolocation call.
///
/// Collaborators map their transport errors onto these variants; callers in
/// this crate log them and carry on without the data.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("venue store error: {0}")]
    Store(String),
}

pub type ProducerResult<T> = Result<T, ProducerError>;
