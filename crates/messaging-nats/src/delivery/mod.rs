mod error;

pub use error::Error;

use async_nats::jetstream::Message as JetStreamMessage;
use async_trait::async_trait;
use bytes::Bytes;
use pipeq_messaging::delivery::Delivery;

/// A message delivered from a NATS queue.
#[derive(Debug)]
pub struct NatsDelivery {
    message: JetStreamMessage,
    auto_ack: bool,
}

impl NatsDelivery {
    pub(crate) const fn new(message: JetStreamMessage, auto_ack: bool) -> Self {
        Self { message, auto_ack }
    }
}

#[async_trait]
impl Delivery for NatsDelivery {
    type Error = Error;

    fn payload(&self) -> &Bytes {
        &self.message.payload
    }

    async fn ack(self) -> Result<(), Error> {
        // Under ack policy `None` the server already considers the message
        // acknowledged; there is nothing left to confirm.
        if self.auto_ack {
            return Ok(());
        }

        self.message.ack().await.map_err(Error::Ack)
    }
}
