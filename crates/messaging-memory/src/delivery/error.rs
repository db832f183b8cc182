use pipeq_messaging::delivery::AckError;
use thiserror::Error;

/// Errors that can occur when acknowledging an in-memory delivery.
#[derive(Debug, Error)]
pub enum Error {
    /// The queue was told to reject acknowledgments.
    #[error("acknowledgment rejected")]
    Rejected,
}

impl AckError for Error {}
