use crate::queue::Queue;

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;

/// Marker trait for broker errors.
pub trait BrokerError: Debug + Error + Send + Sync + 'static {}

/// A connection to a message broker.
///
/// Establishing the connection is implementation-specific and lives on the
/// concrete types; everything past that point goes through this trait.
#[async_trait]
pub trait Broker
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for broker operations.
    type Error: BrokerError;

    /// The queue type declared by this broker.
    type Queue: Queue;

    /// Declares a durable queue, creating it if it does not exist.
    async fn declare_queue(&self, name: &str) -> Result<Self::Queue, Self::Error>;
}
