use pipeq_messaging::queue::QueueError;
use thiserror::Error;

/// Errors that can occur on an in-memory queue.
#[derive(Debug, Error)]
pub enum Error {
    /// The queue already has an active consumer.
    #[error("queue already has an active consumer")]
    AlreadyConsuming,

    /// The queue has been closed.
    #[error("queue is closed")]
    Closed,
}

impl QueueError for Error {}
