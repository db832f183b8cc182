use crate::error::Error;
use crate::ingest::{self, IngestOptions};
use crate::matcher;
use crate::pending::PendingSet;

use std::sync::Arc;
use std::time::Duration;

use pipeq_messaging::queue::{ConsumeOptions, Queue};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Lifecycle states of the consumer engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Registering on the queue.
    Starting,

    /// Ingestion loop and acknowledgment matcher both active.
    Running,

    /// One source stream closed; the other loop is finishing its current
    /// unit of work.
    Draining,

    /// Both loops have exited.
    Stopped,
}

/// Options for the consumer engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsumerOptions {
    /// Acknowledge every message on receipt, bypassing the pending set.
    pub auto_ack: bool,

    /// Stop once no message arrives within this idle period.
    pub idle_timeout: Option<Duration>,
}

/// The deferred-acknowledgment consumer.
///
/// Two loops run concurrently: the ingestion loop streams deliveries into
/// the output sink, and the acknowledgment matcher reads confirmation
/// signals from the input stream. They share only the pending set. When
/// either loop's source closes, the other finishes its current unit of
/// work and both are joined before `run` returns; deliveries still pending
/// at that point stay with the broker for redelivery.
#[derive(Debug)]
pub struct PipeConsumer<Q>
where
    Q: Queue,
{
    queue: Q,
    options: ConsumerOptions,
    state: watch::Sender<State>,
}

impl<Q> PipeConsumer<Q>
where
    Q: Queue,
{
    /// Creates a consumer over the given queue.
    #[must_use]
    pub fn new(queue: Q, options: ConsumerOptions) -> Self {
        let (state, _) = watch::channel(State::Starting);

        Self {
            queue,
            options,
            state,
        }
    }

    /// Returns a receiver observing lifecycle state transitions.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Runs the consumer until both source streams have closed.
    ///
    /// `input` carries acknowledgment signals, one per line; received
    /// payloads are emitted to `output`, one per line. Line splitting is
    /// the contract on both streams, so payloads must not contain embedded
    /// newlines.
    pub async fn run<R, W>(self, input: R, output: W) -> Result<(), Error<Q::Error>>
    where
        R: AsyncBufRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let Self {
            queue,
            options,
            state,
        } = self;

        let deliveries = queue
            .consume(ConsumeOptions {
                auto_ack: options.auto_ack,
            })
            .await
            .map_err(Error::Consume)?;

        info!(queue = queue.name(), "consuming");
        state.send_replace(State::Running);

        let pending = Arc::new(PendingSet::new());
        let shutdown = CancellationToken::new();

        let mut ingest_task = tokio::spawn({
            let pending = pending.clone();
            let shutdown = shutdown.clone();
            let ingest_options = IngestOptions {
                auto_ack: options.auto_ack,
                idle_timeout: options.idle_timeout,
            };
            async move {
                let result =
                    ingest::run(deliveries, pending, output, ingest_options, shutdown.clone())
                        .await;
                shutdown.cancel();
                result
            }
        });

        if options.auto_ack {
            // The signal stream is never consulted: there is nothing left
            // to confirm once a message has been received.
            let result = ingest_task.await;
            state.send_replace(State::Stopped);
            result??;

            return Ok(());
        }

        let mut matcher_task = tokio::spawn({
            let pending = pending.clone();
            let shutdown = shutdown.clone();
            async move {
                let result = matcher::run(pending, input, shutdown.clone()).await;
                shutdown.cancel();
                result
            }
        });

        let (ingest_result, matcher_result) = tokio::select! {
            ingest = &mut ingest_task => {
                state.send_replace(State::Draining);
                (ingest, matcher_task.await)
            }
            matcher = &mut matcher_task => {
                state.send_replace(State::Draining);
                (ingest_task.await, matcher)
            }
        };

        state.send_replace(State::Stopped);
        let pending_len = pending.len().await;
        info!(pending = pending_len, "consumer stopped");

        ingest_result??;
        matcher_result??;

        Ok(())
    }
}
