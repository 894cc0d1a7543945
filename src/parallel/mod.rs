//! Worker pool and job execution
//!
//! A fixed number of worker threads pull boxed [`Job`]s from one shared,
//! bounded [`Queue`] and run them until the pool is drained.
//!
//! # Architecture
//!
//! ```text
//!  caller ── submit ──▶ ┌────────────────────┐
//!                       │  job queue (cap 1) │
//!                       └─────────┬──────────┘
//!              ┌──────────────────┼──────────────────┐
//!        ┌─────▼─────┐      ┌─────▼─────┐      ┌─────▼─────┐
//!        │ Worker 0  │      │ Worker 1  │      │ Worker N  │
//!        │ job.work()│      │ job.work()│      │ job.work()│
//!        └───────────┘      └───────────┘      └───────────┘
//!              ▲                  ▲                  ▲
//!              └──── drain (broadcast) / retire_one (single slot)
//! ```
//!
//! Workers communicate only through queues; there is no other shared mutable
//! state. A full job queue blocks the submitter, which is the pool's only
//! form of back-pressure. Nothing is ordered across jobs.
//!
//! # Example
//!
//! ```rust
//! use walkpool::parallel::{Pool, job_fn};
//!
//! let pool = Pool::new(2);
//! pool.start().unwrap();
//! pool.submit(job_fn(|| println!("hello from a worker"))).unwrap();
//! pool.drain();
//! pool.join();
//! ```

pub mod job;
pub mod pool;
pub mod queue;
pub mod worker;

pub use job::{FnJob, Job, job_fn, run_job};
pub use pool::{DEFAULT_JOB_QUEUE_CAPACITY, Pool, run_jobs};
pub use queue::Queue;
pub use worker::Worker;
