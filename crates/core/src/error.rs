use pipeq_messaging::queue::QueueError;
use thiserror::Error;

/// Errors that can occur while bridging a queue and a pair of process
/// streams.
#[derive(Debug, Error)]
pub enum Error<Q>
where
    Q: QueueError,
{
    /// Registering the consumer on the queue failed.
    #[error("failed to start consuming: {0}")]
    Consume(#[source] Q),

    /// Reading or writing a process stream failed.
    #[error("stream i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A background loop terminated abnormally.
    #[error("loop terminated abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Publishing a message failed.
    #[error("failed to publish: {0}")]
    Publish(#[source] Q),

    /// The broker connection failed while streaming messages.
    #[error("broker stream failed: {0}")]
    Stream(#[source] Q),
}
