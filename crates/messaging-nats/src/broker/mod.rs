mod error;

pub use error::Error;

use crate::queue::NatsQueue;

use std::time::Duration;

use async_nats::ConnectOptions;
use async_nats::jetstream::Context as JetStreamContext;
use async_nats::jetstream::stream::Config as NatsStreamConfig;
use async_trait::async_trait;
use pipeq_messaging::broker::Broker;

/// Options for connecting to a NATS broker.
#[derive(Clone, Debug)]
pub struct NatsBrokerOptions {
    /// Timeout applied to the initial connection handshake.
    pub connection_timeout: Duration,
}

impl Default for NatsBrokerOptions {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(5),
        }
    }
}

/// A connection to a NATS broker with JetStream enabled.
#[derive(Clone, Debug)]
pub struct NatsBroker {
    jetstream_context: JetStreamContext,
}

impl NatsBroker {
    /// Connects to the broker at the given URL.
    ///
    /// Connection setup does not retry: an unreachable broker is surfaced
    /// immediately to the caller.
    pub async fn connect(url: &str, options: NatsBrokerOptions) -> Result<Self, Error> {
        let client = ConnectOptions::default()
            .connection_timeout(options.connection_timeout)
            .connect(url)
            .await
            .map_err(|e| Error::Connect(e.kind()))?;

        Ok(Self {
            jetstream_context: async_nats::jetstream::new(client),
        })
    }
}

#[async_trait]
impl Broker for NatsBroker {
    type Error = Error;

    type Queue = NatsQueue;

    async fn declare_queue(&self, name: &str) -> Result<NatsQueue, Error> {
        // File storage is the JetStream default, so the queue is durable
        // without further configuration.
        let nats_stream = self
            .jetstream_context
            .get_or_create_stream(NatsStreamConfig {
                name: name.to_string(),
                subjects: vec![name.to_string()],
                ..Default::default()
            })
            .await
            .map_err(|e| Error::Declare(e.kind()))?;

        Ok(NatsQueue::new(
            name,
            self.jetstream_context.clone(),
            nats_stream,
        ))
    }
}
