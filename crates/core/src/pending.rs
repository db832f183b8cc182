use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use pipeq_messaging::delivery::Delivery;
use tokio::sync::Mutex;

/// The in-process buffer of received-but-unconfirmed deliveries.
///
/// Keyed by payload with a FIFO sub-queue per key, so matching a signal is
/// O(1) amortized and duplicate payloads resolve oldest-first. Exactly two
/// loops touch the set: the ingestion loop inserts, the acknowledgment
/// matcher removes. A single lock linearizes the two against each other.
#[derive(Debug)]
pub struct PendingSet<D>
where
    D: Delivery,
{
    entries: Mutex<HashMap<Bytes, VecDeque<D>>>,
}

impl<D> Default for PendingSet<D>
where
    D: Delivery,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> PendingSet<D>
where
    D: Delivery,
{
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Holds a delivery until a signal for its payload arrives.
    pub async fn insert(&self, delivery: D) {
        let payload = delivery.payload().clone();
        let mut entries = self.entries.lock().await;
        entries.entry(payload).or_default().push_back(delivery);
    }

    /// Removes and returns the oldest delivery whose payload equals
    /// `payload`, if any.
    pub async fn take_matching(&self, payload: &[u8]) -> Option<D> {
        let mut entries = self.entries.lock().await;
        let queue = entries.get_mut(payload)?;
        let delivery = queue.pop_front();

        if queue.is_empty() {
            entries.remove(payload);
        }

        delivery
    }

    /// Number of deliveries awaiting confirmation.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.values().map(VecDeque::len).sum()
    }

    /// Whether no deliveries are awaiting confirmation.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
