use pipeq_messaging::broker::BrokerError;
use thiserror::Error;

/// Errors that can occur on the in-memory broker (there are none; queue
/// declaration cannot fail in memory).
#[derive(Debug, Error)]
pub enum Error {}

impl BrokerError for Error {}
