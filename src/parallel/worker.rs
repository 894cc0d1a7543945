use super::pool::PoolInner;
use crossbeam::channel::select;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

/// Thing that does jobs, lives in a pool.
///
/// A worker has no identity beyond its pool reference and the index used to
/// name its thread. Every worker spawned from one pool shares that pool's job
/// queue and stop signals.
pub struct Worker {
    id: usize,
    pool: Arc<PoolInner>,
}

/// Why a worker left its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Retired,
    Drained,
    JobQueueClosed,
}

impl Worker {
    pub(super) fn new(id: usize, pool: Arc<PoolInner>) -> Self {
        Self { id, pool }
    }

    /// Spawn the worker loop on its own named thread
    pub(super) fn start(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("walkpool-worker-{}", self.id))
            .spawn(move || self.run())
    }

    /// Grab a job from the queue and keep on running until the job queue is
    /// closed or a stop arrives
    fn run(self) {
        tracing::debug!(worker = self.id, "worker started");
        let _live = LiveGuard::enter(self.id, &self.pool);

        let reason = loop {
            select! {
                recv(self.pool.jobs.receiver()) -> job => match job {
                    Ok(mut job) => {
                        // A drain that raced with this receive wins
                        if self.pool.is_drained() {
                            break StopReason::Drained;
                        }
                        tracing::trace!(worker = self.id, "running job");
                        job.work();
                    }
                    Err(_) => break StopReason::JobQueueClosed,
                },
                recv(self.pool.retire_rx) -> _ => break StopReason::Retired,
                recv(self.pool.shutdown_rx) -> _ => break StopReason::Drained,
            }
        };

        tracing::debug!(worker = self.id, ?reason, "worker stopped");
    }
}

/// Counts a worker as live until its thread leaves `run`, by return or by
/// unwinding out of a panicking job
struct LiveGuard<'a> {
    id: usize,
    pool: &'a PoolInner,
}

impl<'a> LiveGuard<'a> {
    fn enter(id: usize, pool: &'a PoolInner) -> Self {
        pool.live.fetch_add(1, Ordering::SeqCst);
        Self { id, pool }
    }
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        let remaining = self.pool.live.fetch_sub(1, Ordering::SeqCst) - 1;
        if thread::panicking() {
            tracing::error!(
                worker = self.id,
                remaining,
                "worker lost to a panicking job, pool is running short"
            );
        }
    }
}
