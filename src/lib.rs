//! # walkpool - worker pool and concurrent directory walker
//!
//! A fixed-size pool of worker threads pulls [`Job`]s from a shared bounded
//! queue and runs them until drained. On top of it sits a directory walker
//! that discovers files under a set of roots, optionally following symlinked
//! directories by feeding them back into its own work queue.
//!
//! ## Features
//!
//! - **Closeable queues**: one [`Queue`] primitive with blocking push/pop and an
//!   end-of-stream signal, shared by the pool and the walker
//! - **Fixed worker pool**: back-pressure through a small job queue, broadcast
//!   drain and single-worker retirement
//! - **Self-feeding walk**: symlinked directories are re-queued instead of
//!   recursed into, and several walkers can share one frontier
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use walkpool::parallel::{run_jobs, Job, Queue};
//! use walkpool::walk::{DirectoryWalkJob, Frontier};
//!
//! let walker = DirectoryWalkJob::new(Frontier::new(), Queue::bounded(16), true);
//! walker.directories().push("/usr/share").unwrap();
//! let files = walker.files().clone();
//!
//! let pool = run_jobs(vec![Box::new(walker) as Box<dyn Job>]).unwrap();
//! for file in &files {
//!     println!("{}", file.display());
//! }
//! pool.drain();
//! ```

pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod parallel;
pub mod walk;

pub use config::WalkpoolConfig;
pub use error::{PoolError, QueueError, WalkError};
pub use parallel::{Job, Pool, Queue, run_job, run_jobs};
pub use walk::{DirectoryWalkJob, Frontier};

/// Result type alias for walkpool operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
