//! Error types for walkpool
//!
//! Library seams return these structured errors; configuration loading and
//! callers above the library use `anyhow` for context chains.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from pushing into a [`Queue`](crate::parallel::Queue)
///
/// The rejected item is handed back so the caller can decide what to do
/// with it.
#[derive(Error, PartialEq, Eq)]
pub enum QueueError<T> {
    /// The queue was closed before the item could be delivered
    #[error("queue is closed")]
    Closed(T),

    /// A non-blocking push found the queue at capacity
    #[error("queue is full")]
    Full(T),
}

impl<T> QueueError<T> {
    /// Recover the item that could not be pushed
    pub fn into_inner(self) -> T {
        match self {
            QueueError::Closed(item) | QueueError::Full(item) => item,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, QueueError::Closed(_))
    }
}

// Manual impl so queues of non-Debug payloads (boxed jobs) still report errors
impl<T> fmt::Debug for QueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Closed(_) => f.write_str("Closed(..)"),
            QueueError::Full(_) => f.write_str("Full(..)"),
        }
    }
}

/// Worker pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was drained and accepts no more jobs
    #[error("pool has been drained")]
    Drained,

    /// A worker thread could not be spawned
    #[error("failed to spawn worker {index}: {reason}")]
    Spawn { index: usize, reason: String },
}

/// Directory walk errors
#[derive(Error, Debug)]
pub enum WalkError {
    /// The underlying directory traversal failed (unreadable directory, etc.)
    #[error("walk failed under '{root}': {source}")]
    Traverse {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// A symlink could not be resolved
    #[error("cannot resolve symlink '{path}': {source}")]
    Symlink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A queue the walk writes to was closed underneath it
    #[error("{queue} queue closed during walk")]
    QueueClosed { queue: &'static str },
}
