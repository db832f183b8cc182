mod error;

pub use error::Error;

use crate::delivery::NatsDelivery;

use async_nats::jetstream::Context as JetStreamContext;
use async_nats::jetstream::consumer::AckPolicy;
use async_nats::jetstream::consumer::pull::Config as NatsConsumerConfig;
use async_nats::jetstream::stream::Stream as NatsStreamType;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pipeq_messaging::queue::{ConsumeOptions, Queue};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// A durable queue backed by a JetStream stream whose single subject is the
/// queue name.
#[derive(Clone, Debug)]
pub struct NatsQueue {
    name: String,
    jetstream_context: JetStreamContext,
    nats_stream: NatsStreamType,
}

impl NatsQueue {
    pub(crate) fn new(
        name: &str,
        jetstream_context: JetStreamContext,
        nats_stream: NatsStreamType,
    ) -> Self {
        Self {
            name: name.to_string(),
            jetstream_context,
            nats_stream,
        }
    }
}

#[async_trait]
impl Queue for NatsQueue {
    type Error = Error;

    type Delivery = NatsDelivery;

    type Deliveries = ReceiverStream<Result<NatsDelivery, Error>>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, payload: Bytes) -> Result<(), Error> {
        self.jetstream_context
            .publish(self.name.clone(), payload)
            .await
            .map_err(|e| Error::Publish(e.kind()))?
            .await
            .map_err(|e| Error::Publish(e.kind()))?;

        Ok(())
    }

    async fn consume(&self, options: ConsumeOptions) -> Result<Self::Deliveries, Error> {
        // Deferred acknowledgment wants a durable consumer so redeliveries
        // survive this process; auto-ack maps onto an ephemeral consumer
        // whose messages need no confirmation at all.
        let config = if options.auto_ack {
            NatsConsumerConfig {
                ack_policy: AckPolicy::None,
                ..Default::default()
            }
        } else {
            NatsConsumerConfig {
                durable_name: Some(self.name.clone()),
                ack_policy: AckPolicy::Explicit,
                ..Default::default()
            }
        };

        let nats_consumer = self
            .nats_stream
            .create_consumer(config)
            .await
            .map_err(|e| Error::Consume(e.kind()))?;

        let mut messages = nats_consumer
            .messages()
            .await
            .map_err(|e| Error::Stream(e.kind()))?;

        let auto_ack = options.auto_ack;
        let (sender, receiver) = mpsc::channel(64);

        tokio::spawn(async move {
            while let Some(message) = messages.next().await {
                let item = message
                    .map(|message| NatsDelivery::new(message, auto_ack))
                    .map_err(|e| Error::Messages(e.kind()));
                let failed = item.is_err();

                if sender.send(item).await.is_err() {
                    debug!("delivery receiver dropped; stopping consumer pump");
                    break;
                }

                if failed {
                    break;
                }
            }
        });

        Ok(ReceiverStream::new(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::broker::{NatsBroker, NatsBrokerOptions};

    use pipeq_messaging::broker::Broker;
    use pipeq_messaging::delivery::Delivery;
    use serial_test::serial;

    async fn cleanup_stream(broker_url: &str, stream_name: &str) {
        let client = async_nats::connect(broker_url).await.unwrap();
        let js = async_nats::jetstream::new(client);
        // Ignore errors since the stream might not exist
        let _ = js.delete_stream(stream_name).await;
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running nats-server on localhost:4222"]
    async fn test_publish_consume_ack() {
        cleanup_stream("localhost:4222", "test_pipeq_roundtrip").await;

        let broker = NatsBroker::connect("localhost:4222", NatsBrokerOptions::default())
            .await
            .expect("Failed to connect to NATS");

        let queue = broker
            .declare_queue("test_pipeq_roundtrip")
            .await
            .expect("Failed to declare queue");

        queue
            .publish(Bytes::from_static(b"payload"))
            .await
            .expect("Failed to publish");

        let mut deliveries = queue
            .consume(ConsumeOptions::default())
            .await
            .expect("Failed to consume");

        let delivery = deliveries
            .next()
            .await
            .expect("Stream ended")
            .expect("Delivery failed");

        assert_eq!(delivery.payload().as_ref(), b"payload");
        delivery.ack().await.expect("Failed to acknowledge");
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running nats-server on localhost:4222"]
    async fn test_auto_ack_consume() {
        cleanup_stream("localhost:4222", "test_pipeq_auto_ack").await;

        let broker = NatsBroker::connect("localhost:4222", NatsBrokerOptions::default())
            .await
            .expect("Failed to connect to NATS");

        let queue = broker
            .declare_queue("test_pipeq_auto_ack")
            .await
            .expect("Failed to declare queue");

        queue
            .publish(Bytes::from_static(b"fire and forget"))
            .await
            .expect("Failed to publish");

        let mut deliveries = queue
            .consume(ConsumeOptions { auto_ack: true })
            .await
            .expect("Failed to consume");

        let delivery = deliveries
            .next()
            .await
            .expect("Stream ended")
            .expect("Delivery failed");

        assert_eq!(delivery.payload().as_ref(), b"fire and forget");

        // Nothing left to confirm, but attempting must be safe.
        delivery.ack().await.expect("Acknowledgment not a no-op");
    }
}
