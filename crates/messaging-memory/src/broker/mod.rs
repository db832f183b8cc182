mod error;

pub use error::Error;

use crate::queue::MemoryQueue;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pipeq_messaging::broker::Broker;
use tokio::sync::Mutex;

/// An in-memory broker.
///
/// Cheap to clone; all clones share the same queues, so a publisher and a
/// consumer in the same test see each other's messages.
#[derive(Clone, Debug, Default)]
pub struct MemoryBroker {
    queues: Arc<Mutex<HashMap<String, MemoryQueue>>>,
}

impl MemoryBroker {
    /// Creates a broker with no queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    type Error = Error;

    type Queue = MemoryQueue;

    async fn declare_queue(&self, name: &str) -> Result<MemoryQueue, Error> {
        let mut queues = self.queues.lock().await;

        Ok(queues
            .entry(name.to_string())
            .or_insert_with(|| MemoryQueue::new(name))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use pipeq_messaging::queue::Queue;

    #[tokio::test]
    async fn test_declare_is_idempotent() {
        let broker = MemoryBroker::new();

        let first = broker.declare_queue("jobs").await.unwrap();
        first.publish(Bytes::from_static(b"queued")).await.unwrap();

        // Redeclaring returns the same queue, message included.
        let second = broker.declare_queue("jobs").await.unwrap();
        assert_eq!(second.backlog_len().await, 1);
    }

    #[tokio::test]
    async fn test_queues_are_independent() {
        let broker = MemoryBroker::new();

        let jobs = broker.declare_queue("jobs").await.unwrap();
        let other = broker.declare_queue("other").await.unwrap();
        jobs.publish(Bytes::from_static(b"queued")).await.unwrap();

        assert_eq!(jobs.backlog_len().await, 1);
        assert_eq!(other.backlog_len().await, 0);
    }
}
