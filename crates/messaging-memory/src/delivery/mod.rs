mod error;

pub use error::Error;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use pipeq_messaging::delivery::Delivery;
use tokio::sync::Mutex;

/// A message handed out by an in-memory queue.
///
/// Acknowledging pushes the payload onto the queue's journal, so tests can
/// assert on acknowledgment order.
#[derive(Debug)]
pub struct MemoryDelivery {
    payload: Bytes,
    journal: Arc<Mutex<Vec<Bytes>>>,
    reject_budget: Arc<AtomicUsize>,
}

impl MemoryDelivery {
    pub(crate) const fn new(
        payload: Bytes,
        journal: Arc<Mutex<Vec<Bytes>>>,
        reject_budget: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            payload,
            journal,
            reject_budget,
        }
    }
}

#[async_trait]
impl Delivery for MemoryDelivery {
    type Error = Error;

    fn payload(&self) -> &Bytes {
        &self.payload
    }

    async fn ack(self) -> Result<(), Error> {
        let rejected = self
            .reject_budget
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();

        if rejected {
            return Err(Error::Rejected);
        }

        self.journal.lock().await.push(self.payload);

        Ok(())
    }
}
