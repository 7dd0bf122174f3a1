use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the queue transport.
///
/// AWS SDK errors are stringified at the boundary so the rest of the crate
/// stays decoupled from SDK error generics.
#[derive(Debug, Error, Serialize, Clone)]
pub enum QueueError {
    #[error("SQS error: {0}")]
    SqsError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Errors that terminate the consumer loop.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A receive call failed. Receive failures are fatal to the loop; the
    /// process supervisor decides whether to restart the worker.
    #[error("queue receive failed: {0}")]
    Receive(#[source] QueueError),
}
