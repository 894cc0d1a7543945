//! Symlink-aware concurrent directory walker
//!
//! The walk is a worklist algorithm over a [`Frontier`] of pending
//! directories:
//!
//! ```text
//!   seed dirs ──▶ ┌──────────┐   pop    ┌──────────────────┐   files   ┌──────────┐
//!                 │ Frontier │ ───────▶ │ DirectoryWalkJob │ ────────▶ │  Queue   │──▶ consumer
//!                 └──────────┘          │  (1..N clones)   │           └──────────┘
//!                      ▲                └────────┬─────────┘
//!                      └── symlinked dirs ───────┘
//! ```
//!
//! Regular subdirectories are walked inline. Symlinks to directories are only
//! re-entered when `follow_symlinks` is on, and then through the frontier.
//! Termination is reference counted: the frontier knows how many directories
//! are queued or being walked, and the walker that finishes the last one
//! closes both queues.

pub mod frontier;
pub mod job;

pub use frontier::Frontier;
pub use job::{DirectoryWalkJob, collect_files};
