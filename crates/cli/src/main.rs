//! CLI binary connecting unix pipes and durable message queues.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pipeq_core::consumer::{ConsumerOptions, PipeConsumer};
use pipeq_core::publisher;
use pipeq_messaging::broker::Broker;
use pipeq_messaging_nats::{NatsBroker, NatsBrokerOptions};
use tokio::io::BufReader;
use tracing::info;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening the acknowledgment log failed.
    #[error("failed to open acknowledgment log: {0}")]
    AckLog(#[source] std::io::Error),

    /// Broker connection or queue declaration failed.
    #[error(transparent)]
    Broker(#[from] pipeq_messaging_nats::broker::Error),

    /// The consumer or publisher engine failed.
    #[error(transparent)]
    Engine(#[from] pipeq_core::Error<pipeq_messaging_nats::queue::Error>),
}

#[derive(Clone, Debug, Parser)]
#[command(
    name = "pipeq",
    version,
    about = "Connect unix pipes and durable message queues"
)]
struct Args {
    /// Broker URL
    #[arg(
        long,
        global = true,
        default_value = "nats://localhost:4222",
        env = "PIPEQ_BROKER_URL"
    )]
    broker_url: String,

    /// Acknowledge all received messages directly
    #[arg(long, global = true, env = "PIPEQ_AUTO_ACK")]
    auto_ack: bool,

    /// Stop the consumer once the idle timeout passes without a message
    #[arg(long, global = true, env = "PIPEQ_NON_BLOCKING")]
    non_blocking: bool,

    /// Idle timeout in seconds to wait for messages
    #[arg(long, global = true, default_value_t = 1, env = "PIPEQ_TIMEOUT")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Publish messages to a queue, one per input line
    #[command(alias = "p")]
    Publish {
        /// Name of the queue
        queue: String,

        /// Also append each published line to this file
        #[arg(long, env = "PIPEQ_ACK_LOG")]
        ack_log: Option<PathBuf>,
    },

    /// Consume messages from a queue as output lines
    #[command(alias = "c")]
    Consume {
        /// Name of the queue
        queue: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!(broker_url = %args.broker_url, "connecting to broker");
    let broker = NatsBroker::connect(&args.broker_url, NatsBrokerOptions::default()).await?;

    match args.command {
        Command::Publish { queue, ack_log } => {
            let queue = broker.declare_queue(&queue).await?;

            let ack_log = match ack_log {
                Some(path) => Some(
                    tokio::fs::OpenOptions::new()
                        .append(true)
                        .create(true)
                        .open(path)
                        .await
                        .map_err(Error::AckLog)?,
                ),
                None => None,
            };

            publisher::run(
                &queue,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                ack_log,
            )
            .await?;
        }
        Command::Consume { queue } => {
            let queue = broker.declare_queue(&queue).await?;

            let options = ConsumerOptions {
                auto_ack: args.auto_ack,
                idle_timeout: args
                    .non_blocking
                    .then_some(Duration::from_secs(args.timeout)),
            };

            PipeConsumer::new(queue, options)
                .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await?;
        }
    }

    Ok(())
}
