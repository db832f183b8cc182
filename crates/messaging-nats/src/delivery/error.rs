use pipeq_messaging::delivery::AckError;
use thiserror::Error;

/// Errors that can occur when acknowledging a NATS delivery.
#[derive(Debug, Error)]
pub enum Error {
    /// The broker rejected or failed the acknowledgment.
    #[error("failed to acknowledge message: {0}")]
    Ack(async_nats::Error),
}

impl AckError for Error {}
