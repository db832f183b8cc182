use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

/// Marker trait for acknowledgment errors.
pub trait AckError: Debug + Error + Send + Sync + 'static {}

/// A single message handed out by a queue, together with the broker-issued
/// handle needed to confirm its processing.
#[async_trait]
pub trait Delivery
where
    Self: Debug + Send + Sync + 'static,
{
    /// The error type for acknowledgment failures.
    type Error: AckError;

    /// The message payload.
    fn payload(&self) -> &Bytes;

    /// Confirms processing of this message to the broker.
    ///
    /// Consumes the handle, so the same message cannot be confirmed twice
    /// from this process; brokers treat a repeated acknowledgment of an
    /// already-confirmed message as a no-op.
    async fn ack(self) -> Result<(), Self::Error>;
}
