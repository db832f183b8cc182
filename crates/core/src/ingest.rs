use crate::error::Error;
use crate::pending::PendingSet;

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use pipeq_messaging::delivery::Delivery;
use pipeq_messaging::queue::QueueError;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How the ingestion loop disposes of each delivery.
#[derive(Clone, Copy, Debug)]
pub(crate) struct IngestOptions {
    /// Acknowledge on receipt instead of holding in the pending set.
    pub auto_ack: bool,

    /// Give up waiting for the next message after this idle period.
    pub idle_timeout: Option<Duration>,
}

/// Streams deliveries into the pending set and the output sink.
///
/// Entries are inserted before their payload is emitted, so by the time a
/// downstream reader can possibly echo a payload back as a signal, the
/// matcher can already see its entry.
pub(crate) async fn run<S, D, Q, W>(
    mut deliveries: S,
    pending: Arc<PendingSet<D>>,
    mut output: W,
    options: IngestOptions,
    shutdown: CancellationToken,
) -> Result<(), Error<Q>>
where
    S: Stream<Item = Result<D, Q>> + Send + Unpin,
    D: Delivery,
    Q: QueueError,
    W: AsyncWrite + Send + Unpin,
{
    loop {
        let delivery = tokio::select! {
            () = shutdown.cancelled() => break,
            next = next_delivery(&mut deliveries, options.idle_timeout) => match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => return Err(Error::Stream(e)),
                None => break,
            },
        };

        let payload = delivery.payload().clone();
        debug!(bytes = payload.len(), "received message");

        if options.auto_ack {
            // Receipt is the acknowledgment; nothing to hold.
            if let Err(e) = delivery.ack().await {
                warn!(error = %e, "acknowledgment on receipt failed");
            }
        } else {
            pending.insert(delivery).await;
        }

        output.write_all(&payload).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    Ok(())
}

/// Next item from the stream, or `None` once the configured idle period
/// passes without one.
async fn next_delivery<S>(deliveries: &mut S, idle_timeout: Option<Duration>) -> Option<S::Item>
where
    S: Stream + Send + Unpin,
{
    match idle_timeout {
        Some(idle) => tokio::time::timeout(idle, deliveries.next())
            .await
            .unwrap_or(None),
        None => deliveries.next().await,
    }
}
