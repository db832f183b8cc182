use crate::delivery::Delivery;

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

/// Marker trait for queue errors.
pub trait QueueError: Debug + Error + Send + Sync + 'static {}

/// Options for registering a consumer on a queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsumeOptions {
    /// Consider every message acknowledged on delivery instead of waiting
    /// for an explicit acknowledgment.
    pub auto_ack: bool,
}

/// A durable, named queue on a broker.
#[async_trait]
pub trait Queue
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for queue operations.
    type Error: QueueError;

    /// The delivery type handed out to consumers.
    type Delivery: Delivery;

    /// The stream of deliveries produced by [`Queue::consume`].
    type Deliveries: Stream<Item = Result<Self::Delivery, Self::Error>> + Send + Unpin + 'static;

    /// Returns the name of the queue.
    fn name(&self) -> &str;

    /// Publishes one message to the queue.
    async fn publish(&self, payload: Bytes) -> Result<(), Self::Error>;

    /// Starts delivering messages from the queue.
    ///
    /// The stream is unbounded; it ends only when the underlying connection
    /// or queue closes, and cannot be restarted.
    async fn consume(&self, options: ConsumeOptions) -> Result<Self::Deliveries, Self::Error>;
}
