//! Error type shared by every stage of a chain.

use std::io;
use thiserror::Error;

/// Errors raised while wiring or driving a chain.
///
/// None of these are caught inside the chain. A failure in any stage
/// propagates back to whoever pushed the record, and the chain is then
/// considered spent.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A chain was built without a terminal consumer.
    #[error("chain has no terminal consumer")]
    MissingConsumer,

    /// A pull adapter was requested from a builder that already has a
    /// terminal consumer.
    #[error("pull adapter is its own consumer; builder already has {consumer}")]
    ConsumerOnPull { consumer: String },

    /// A record was pushed into a stage after it had been closed.
    #[error("{stage}: record pushed after close")]
    Closed { stage: String },

    /// A concrete filter or consumer rejected a record.
    #[error("{stage}: {message}")]
    Failed { stage: String, message: String },

    /// Stage list text could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ChainError {
    /// Shorthand for a [`ChainError::Failed`] raised by a named stage.
    pub fn failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        ChainError::Failed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
