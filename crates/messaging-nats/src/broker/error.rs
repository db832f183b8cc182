use pipeq_messaging::broker::BrokerError;
use thiserror::Error;

/// Errors that can occur on the NATS broker.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection handshake failed.
    #[error("failed to connect to broker: {0}")]
    Connect(async_nats::ConnectErrorKind),

    /// Queue declaration failed.
    #[error("failed to declare queue: {0}")]
    Declare(async_nats::jetstream::context::CreateStreamErrorKind),
}

impl BrokerError for Error {}
