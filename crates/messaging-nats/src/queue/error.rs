use pipeq_messaging::queue::QueueError;
use thiserror::Error;

/// Errors that can occur on a NATS queue.
#[derive(Debug, Error)]
pub enum Error {
    /// Registering the consumer failed.
    #[error("failed to create consumer: {0}")]
    Consume(async_nats::jetstream::stream::ConsumerErrorKind),

    /// The delivery stream failed.
    #[error("failed to read consumer messages: {0}")]
    Messages(async_nats::jetstream::consumer::pull::MessagesErrorKind),

    /// Publish failed.
    #[error("failed to publish: {0}")]
    Publish(async_nats::jetstream::context::PublishErrorKind),

    /// Starting the delivery stream failed.
    #[error("failed to start consumer stream: {0}")]
    Stream(async_nats::jetstream::consumer::StreamErrorKind),
}

impl QueueError for Error {}
