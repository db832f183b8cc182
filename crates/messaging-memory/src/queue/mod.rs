mod error;

pub use error::Error;

use crate::delivery::MemoryDelivery;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use pipeq_messaging::queue::{ConsumeOptions, Queue};
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

#[derive(Debug, Default)]
struct QueueState {
    backlog: VecDeque<Bytes>,
    consumer: Option<mpsc::UnboundedSender<Result<MemoryDelivery, Error>>>,
    closed: bool,
}

/// An in-memory queue.
///
/// Messages published before a consumer arrives wait in a backlog and are
/// handed out ahead of live messages once one registers. At most one
/// consumer may be active at a time.
#[derive(Clone, Debug)]
pub struct MemoryQueue {
    name: String,
    state: Arc<Mutex<QueueState>>,
    journal: Arc<Mutex<Vec<Bytes>>>,
    reject_budget: Arc<AtomicUsize>,
}

impl MemoryQueue {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::new(Mutex::new(QueueState::default())),
            journal: Arc::new(Mutex::new(Vec::new())),
            reject_budget: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn delivery(&self, payload: Bytes) -> MemoryDelivery {
        MemoryDelivery::new(payload, self.journal.clone(), self.reject_budget.clone())
    }

    /// Closes the queue: the delivery stream ends once already-queued
    /// messages drain, and further publishes fail.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.consumer = None;
    }

    /// Payloads acknowledged so far, in acknowledgment order.
    pub async fn acked_payloads(&self) -> Vec<Bytes> {
        self.journal.lock().await.clone()
    }

    /// Makes the next `count` acknowledgments on this queue's deliveries
    /// fail.
    pub fn reject_next_acks(&self, count: usize) {
        self.reject_budget.store(count, Ordering::Relaxed);
    }

    /// Number of messages waiting for a consumer.
    pub async fn backlog_len(&self) -> usize {
        self.state.lock().await.backlog.len()
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    type Error = Error;

    type Delivery = MemoryDelivery;

    type Deliveries = UnboundedReceiverStream<Result<MemoryDelivery, Error>>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, payload: Bytes) -> Result<(), Error> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(Error::Closed);
        }

        if let Some(sender) = &state.consumer {
            if sender.send(Ok(self.delivery(payload.clone()))).is_ok() {
                return Ok(());
            }

            // Consumer went away; fall back to the backlog.
            state.consumer = None;
        }

        state.backlog.push_back(payload);

        Ok(())
    }

    // Auto-ack needs no state here: receipt-time acknowledgment is the
    // consumer loop's business, and the journal records it either way.
    async fn consume(&self, _options: ConsumeOptions) -> Result<Self::Deliveries, Error> {
        let mut state = self.state.lock().await;

        if state.consumer.is_some() {
            return Err(Error::AlreadyConsuming);
        }

        let (sender, receiver) = mpsc::unbounded_channel();

        // Hand out everything published before the consumer arrived.
        while let Some(payload) = state.backlog.pop_front() {
            let _ = sender.send(Ok(self.delivery(payload)));
        }

        if state.closed {
            // Stream ends right after the backlog drains.
            drop(sender);
        } else {
            state.consumer = Some(sender);
        }

        Ok(UnboundedReceiverStream::new(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;
    use pipeq_messaging::delivery::Delivery;

    #[tokio::test]
    async fn test_backlog_precedes_live_messages() {
        let queue = MemoryQueue::new("test_backlog");

        queue.publish(Bytes::from_static(b"early")).await.unwrap();

        let mut deliveries = queue.consume(ConsumeOptions::default()).await.unwrap();

        queue.publish(Bytes::from_static(b"late")).await.unwrap();

        let first = deliveries.next().await.unwrap().unwrap();
        let second = deliveries.next().await.unwrap().unwrap();
        assert_eq!(first.payload().as_ref(), b"early");
        assert_eq!(second.payload().as_ref(), b"late");
    }

    #[tokio::test]
    async fn test_single_consumer() {
        let queue = MemoryQueue::new("test_single_consumer");

        let _deliveries = queue.consume(ConsumeOptions::default()).await.unwrap();

        assert!(matches!(
            queue.consume(ConsumeOptions::default()).await,
            Err(Error::AlreadyConsuming)
        ));
    }

    #[tokio::test]
    async fn test_close_ends_stream_after_drain() {
        let queue = MemoryQueue::new("test_close");

        queue.publish(Bytes::from_static(b"last")).await.unwrap();
        queue.close().await;

        let mut deliveries = queue.consume(ConsumeOptions::default()).await.unwrap();

        let last = deliveries.next().await.unwrap().unwrap();
        assert_eq!(last.payload().as_ref(), b"last");
        assert!(deliveries.next().await.is_none());

        assert!(matches!(
            queue.publish(Bytes::from_static(b"rejected")).await,
            Err(Error::Closed)
        ));
    }

    #[tokio::test]
    async fn test_acknowledgments_are_journaled_in_order() {
        let queue = MemoryQueue::new("test_journal");

        queue.publish(Bytes::from_static(b"one")).await.unwrap();
        queue.publish(Bytes::from_static(b"two")).await.unwrap();

        let mut deliveries = queue.consume(ConsumeOptions::default()).await.unwrap();
        let one = deliveries.next().await.unwrap().unwrap();
        let two = deliveries.next().await.unwrap().unwrap();

        two.ack().await.unwrap();
        one.ack().await.unwrap();

        assert_eq!(
            queue.acked_payloads().await,
            vec![Bytes::from_static(b"two"), Bytes::from_static(b"one")]
        );
    }

    #[tokio::test]
    async fn test_rejected_acknowledgment() {
        let queue = MemoryQueue::new("test_reject");

        queue.publish(Bytes::from_static(b"doomed")).await.unwrap();

        let mut deliveries = queue.consume(ConsumeOptions::default()).await.unwrap();
        let delivery = deliveries.next().await.unwrap().unwrap();

        queue.reject_next_acks(1);
        assert!(delivery.ack().await.is_err());
        assert!(queue.acked_payloads().await.is_empty());
    }
}
