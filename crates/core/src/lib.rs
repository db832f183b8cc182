//! Engine bridging line-oriented process streams and durable message
//! queues: a publisher for the input direction, and a deferred-
//! acknowledgment consumer for the output direction.
//!
//! The consumer holds every received message in a [`pending::PendingSet`]
//! until a collaborator confirms, through an independent signal stream,
//! that the message's content was processed; only then is the message
//! acknowledged to the broker.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod ingest;
mod matcher;

pub use error::Error;

/// The deferred-acknowledgment consumer and its lifecycle.
pub mod consumer;

/// The buffer of received-but-unconfirmed deliveries.
pub mod pending;

/// The line publisher.
pub mod publisher;
