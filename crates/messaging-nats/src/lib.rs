//! NATS JetStream implementation of the pipeq messaging interfaces.
//!
//! Queues map onto JetStream streams with a single subject, which gives
//! them broker-side durability; deferred acknowledgment rides on JetStream's
//! explicit ack policy.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// The NATS broker connection.
pub mod broker;

/// Deliveries handed out by NATS queues.
pub mod delivery;

/// Queues backed by JetStream streams.
pub mod queue;

pub use broker::{NatsBroker, NatsBrokerOptions};
pub use delivery::NatsDelivery;
pub use queue::NatsQueue;
