//! Abstract interface for durable message-queue brokers.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Brokers declare durable queues over an established connection.
pub mod broker;

/// Deliveries pair a payload with its acknowledgment handle.
pub mod delivery;

/// Queues publish messages and hand them out to consumers.
pub mod queue;
