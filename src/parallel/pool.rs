use super::job::Job;
use super::queue::Queue;
use super::worker::Worker;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crossbeam::channel::{Receiver, Sender, bounded, select};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// Default number of buffered jobs before `submit` blocks
pub const DEFAULT_JOB_QUEUE_CAPACITY: usize = 1;

/// State shared by a pool handle and every worker it spawned
pub(super) struct PoolInner {
    pub(super) jobs: Queue<Box<dyn Job>>,
    /// Single stop slot: one token retires exactly one worker
    retire_tx: Sender<()>,
    pub(super) retire_rx: Receiver<()>,
    /// Never sent on; dropping the sender broadcasts the stop to every worker
    shutdown_tx: Mutex<Option<Sender<()>>>,
    pub(super) shutdown_rx: Receiver<()>,
    drained: AtomicBool,
    worker_concurrency: usize,
    spawned: AtomicUsize,
    /// Workers currently inside their loop
    pub(super) live: AtomicUsize,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl PoolInner {
    pub(super) fn is_drained(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }
}

/// Fixed-size group of workers sharing one job queue and one stop signal
///
/// The handle is cheap to clone; clones refer to the same pool.
///
/// # Lifecycle
///
/// ```text
/// new ──▶ start ──▶ submit* ──▶ drain ──▶ (workers exit) ──▶ join
/// ```
///
/// `submit` may happen before `start`, but with the small default queue the
/// caller will block until a worker exists to take the job. Submitting from
/// a separate thread (as [`run_jobs`] does) avoids that.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Create a pool with `worker_concurrency` workers and the default job
    /// queue capacity. Zero workers is allowed and yields a pool that never
    /// runs anything.
    pub fn new(worker_concurrency: usize) -> Self {
        Self::with_capacity(worker_concurrency, DEFAULT_JOB_QUEUE_CAPACITY)
    }

    pub fn with_capacity(worker_concurrency: usize, job_queue_capacity: usize) -> Self {
        let (retire_tx, retire_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded(0);

        Self {
            inner: Arc::new(PoolInner {
                jobs: Queue::bounded(job_queue_capacity),
                retire_tx,
                retire_rx,
                shutdown_tx: Mutex::new(Some(shutdown_tx)),
                shutdown_rx,
                drained: AtomicBool::new(false),
                worker_concurrency,
                spawned: AtomicUsize::new(0),
                live: AtomicUsize::new(0),
                handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Size a pool from configuration and the cores available on this host
    pub fn from_config(config: &PoolConfig) -> Self {
        let workers = Self::calculate_optimal_workers(config.max_threads, config.thread_percentage);
        Self::with_capacity(workers, config.job_queue_capacity)
    }

    /// Workers allowed by available cores, a core percentage and a hard limit
    ///
    /// ```text
    /// 1. Detect available CPU cores: num_cpus::get()
    /// 2. Apply percentage: cores * thread_percentage / 100
    /// 3. Apply config limit when max_threads > 0
    /// 4. Ensure minimum: max(1, result)
    /// ```
    pub fn calculate_optimal_workers(max_threads: usize, thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();

        let workers_by_percentage =
            std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        // 0 means use percentage calculation only
        if max_threads > 0 {
            std::cmp::min(max_threads, workers_by_percentage)
        } else {
            workers_by_percentage
        }
    }

    /// Enqueue one job, blocking while the job queue is full
    pub fn submit<J>(&self, job: J) -> Result<(), PoolError>
    where
        J: Job + 'static,
    {
        self.submit_boxed(Box::new(job))
    }

    pub fn submit_boxed(&self, job: Box<dyn Job>) -> Result<(), PoolError> {
        if self.inner.is_drained() {
            return Err(PoolError::Drained);
        }
        let Some(sender) = self.inner.jobs.sender() else {
            return Err(PoolError::Drained);
        };

        // A submitter blocked on a full queue is released by drain
        select! {
            send(sender, job) -> sent => sent.map_err(|_| PoolError::Drained),
            recv(self.inner.shutdown_rx) -> _ => Err(PoolError::Drained),
        }
    }

    /// Spawn `worker_concurrency` workers bound to this pool.
    ///
    /// Calling this again spawns another full set of workers on the same
    /// queues.
    pub fn start(&self) -> Result<(), PoolError> {
        for _ in 0..self.inner.worker_concurrency {
            let index = self.inner.spawned.fetch_add(1, Ordering::SeqCst);
            let handle = Worker::new(index, Arc::clone(&self.inner))
                .start()
                .map_err(|e| PoolError::Spawn {
                    index,
                    reason: e.to_string(),
                })?;
            self.inner.handles.lock().push(handle);
        }

        tracing::debug!(
            workers = self.inner.worker_concurrency,
            total = self.inner.spawned.load(Ordering::SeqCst),
            "started workers"
        );
        Ok(())
    }

    /// Tell every worker to stop.
    ///
    /// Workers finish the job they are running and then exit; jobs still
    /// sitting in the queue are dropped. Further submits fail with
    /// [`PoolError::Drained`]. Draining twice is a no-op.
    pub fn drain(&self) {
        if self.inner.drained.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.shutdown_tx.lock().take();
        self.inner.jobs.close();
        tracing::debug!("pool drained");
    }

    /// Put a single stop token in the pool's one-slot stop channel.
    ///
    /// Exactly one worker receives it and exits; the others keep running.
    /// Returns `false` if a token is already waiting or the pool is drained.
    pub fn retire_one(&self) -> bool {
        if self.inner.is_drained() {
            return false;
        }
        self.inner.retire_tx.try_send(()).is_ok()
    }

    /// Wait for every spawned worker thread to exit.
    ///
    /// Only returns once all workers have stopped, so call it after
    /// [`Pool::drain`] (or enough [`Pool::retire_one`] calls).
    pub fn join(&self) {
        let handles: Vec<_> = self.inner.handles.lock().drain(..).collect();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                tracing::error!("{} exited by panic", name);
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.inner.worker_concurrency
    }

    /// Workers currently running their loop. Drops below the spawned count
    /// when workers stop or a job panics.
    pub fn live_workers(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Jobs waiting in the queue
    pub fn pending_jobs(&self) -> usize {
        self.inner.jobs.len()
    }

    pub fn is_drained(&self) -> bool {
        self.inner.is_drained()
    }
}

/// Convenience: hand jobs to a pool with one worker per available core and
/// start it.
///
/// Each job is submitted from its own thread so submission never deadlocks on
/// the small job queue. The returned handle can be drained later.
pub fn run_jobs(jobs: Vec<Box<dyn Job>>) -> Result<Pool, PoolError> {
    let pool = Pool::new(num_cpus::get());

    for (index, job) in jobs.into_iter().enumerate() {
        let submitter = pool.clone();
        thread::Builder::new()
            .name(format!("walkpool-submit-{}", index))
            .spawn(move || {
                if let Err(e) = submitter.submit_boxed(job) {
                    tracing::warn!("job {} not submitted: {}", index, e);
                }
            })
            .map_err(|e| PoolError::Spawn {
                index,
                reason: e.to_string(),
            })?;
    }

    pool.start()?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::job_fn;
    use std::time::Duration;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl Job + 'static {
        let counter = Arc::clone(counter);
        job_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_every_job_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = crossbeam::channel::unbounded();
        let pool = Pool::new(3);
        pool.start().unwrap();

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            let done_tx = done_tx.clone();
            pool.submit(job_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = done_tx.send(());
            }))
            .unwrap();
        }
        for _ in 0..20 {
            done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }

        pool.drain();
        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
        assert!(done_rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_workers_is_inert() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = Pool::new(0);
        pool.start().unwrap();
        pool.submit(counting_job(&counter)).unwrap();

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(pool.pending_jobs(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_submit_after_drain_fails() {
        let pool = Pool::new(1);
        pool.start().unwrap();
        pool.drain();
        pool.drain();
        assert!(pool.is_drained());
        assert_eq!(pool.submit(job_fn(|| {})), Err(PoolError::Drained));
        pool.join();
    }

    #[test]
    fn test_drain_releases_blocked_submitter() {
        let pool = Pool::new(0);
        pool.submit(job_fn(|| {})).unwrap();

        let blocked = {
            let pool = pool.clone();
            std::thread::spawn(move || pool.submit(job_fn(|| {})))
        };

        std::thread::sleep(Duration::from_millis(20));
        pool.drain();
        assert_eq!(blocked.join().unwrap(), Err(PoolError::Drained));
    }

    #[test]
    fn test_retire_one_stops_single_worker() {
        let pool = Pool::new(2);
        pool.start().unwrap();

        assert!(pool.retire_one());

        // The remaining worker still takes jobs
        let (tx, rx) = crossbeam::channel::unbounded();
        for _ in 0..2 {
            let tx = tx.clone();
            pool.submit(job_fn(move || {
                let _ = tx.send(());
            }))
            .unwrap();
        }
        for _ in 0..2 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }

        pool.drain();
        assert!(!pool.retire_one());
        pool.join();
    }

    #[test]
    fn test_panicking_job_takes_down_only_its_worker() {
        let pool = Pool::new(2);
        pool.start().unwrap();
        wait_for_live(&pool, 2);

        pool.submit(job_fn(|| panic!("job failed"))).unwrap();
        wait_for_live(&pool, 1);

        // The survivor keeps taking jobs
        let (tx, rx) = crossbeam::channel::unbounded();
        pool.submit(job_fn(move || {
            let _ = tx.send(());
        }))
        .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        pool.drain();
        pool.join();
        assert_eq!(pool.live_workers(), 0);
    }

    fn wait_for_live(pool: &Pool, expected: usize) {
        for _ in 0..500 {
            if pool.live_workers() == expected {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("expected {} live workers, have {}", expected, pool.live_workers());
    }

    #[test]
    fn test_calculate_optimal_workers() {
        assert!(Pool::calculate_optimal_workers(0, 75) >= 1);
        assert!(Pool::calculate_optimal_workers(2, 100) <= 2);
        assert_eq!(Pool::calculate_optimal_workers(1, 1), 1);
    }

    #[test]
    fn test_start_twice_doubles_workers() {
        let pool = Pool::new(2);
        pool.start().unwrap();
        pool.start().unwrap();
        assert_eq!(pool.inner.spawned.load(Ordering::SeqCst), 4);
        assert_eq!(pool.worker_count(), 2);
        pool.drain();
        pool.join();
    }
}
