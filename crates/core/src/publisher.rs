use crate::error::Error;

use bytes::Bytes;
use pipeq_messaging::queue::Queue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Publishes each input line as one message, echoing accepted lines to the
/// output sink. One line is one message; the line is the payload.
///
/// With an acknowledgment log attached, every published line is also
/// appended there, giving a collaborator a record it can later echo back
/// as confirmation signals.
pub async fn run<Q, R, W, L>(
    queue: &Q,
    input: R,
    mut output: W,
    mut ack_log: Option<L>,
) -> Result<(), Error<Q::Error>>
where
    Q: Queue,
    R: AsyncBufRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
    L: AsyncWrite + Send + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let payload = Bytes::from(line.into_bytes());

        queue
            .publish(payload.clone())
            .await
            .map_err(Error::Publish)?;
        debug!(queue = queue.name(), bytes = payload.len(), "published");

        output.write_all(&payload).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;

        if let Some(log) = ack_log.as_mut() {
            log.write_all(&payload).await?;
            log.write_all(b"\n").await?;
            log.flush().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    use std::io::Cursor;

    use pipeq_messaging::broker::Broker;
    use pipeq_messaging_memory::MemoryBroker;
    use tokio::io::{BufReader, Sink};

    #[tokio::test]
    async fn test_publishes_and_echoes_each_line() {
        let broker = MemoryBroker::new();
        let queue = broker.declare_queue("out").await.unwrap();

        let mut output = Cursor::new(Vec::new());
        run(
            &queue,
            BufReader::new(&b"one\ntwo\n"[..]),
            &mut output,
            None::<Sink>,
        )
        .await
        .unwrap();

        assert_eq!(output.get_ref(), b"one\ntwo\n");
        assert_eq!(queue.backlog_len().await, 2);
    }

    #[tokio::test]
    async fn test_acknowledgment_log_records_published_lines() {
        let broker = MemoryBroker::new();
        let queue = broker.declare_queue("out").await.unwrap();

        let mut log = Cursor::new(Vec::new());
        run(
            &queue,
            BufReader::new(&b"recorded\n"[..]),
            tokio::io::sink(),
            Some(&mut log),
        )
        .await
        .unwrap();

        assert_eq!(log.get_ref(), b"recorded\n");
    }

    #[tokio::test]
    async fn test_publish_failure_is_fatal() {
        let broker = MemoryBroker::new();
        let queue = broker.declare_queue("out").await.unwrap();
        queue.close().await;

        let result = run(
            &queue,
            BufReader::new(&b"rejected\n"[..]),
            tokio::io::sink(),
            None::<Sink>,
        )
        .await;

        assert!(matches!(result, Err(Error::Publish(_))));
    }
}

