use crate::pending::PendingSet;

use std::sync::Arc;

use pipeq_messaging::delivery::Delivery;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reads acknowledgment signals, one per line, and confirms the oldest
/// matching pending delivery for each.
///
/// A signal with no matching entry is a normal outcome, not an error: the
/// emitter may echo lines that were already matched, or lines that never
/// came from this queue. A failed acknowledgment is logged and the entry
/// stays dropped; redelivery is the broker's own retry mechanism.
pub(crate) async fn run<D, R>(
    pending: Arc<PendingSet<D>>,
    input: R,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error>
where
    D: Delivery,
    R: AsyncBufRead + Send + Unpin,
{
    let mut signals = input.lines();

    loop {
        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            line = signals.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };

        match pending.take_matching(line.as_bytes()).await {
            Some(delivery) => {
                if let Err(e) = delivery.ack().await {
                    warn!(error = %e, "failed to acknowledge matched message; dropping it");
                }
            }
            None => debug!(signal = %line, "no pending delivery matches signal"),
        }
    }

    Ok(())
}
