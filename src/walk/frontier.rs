use crate::error::QueueError;
use crate::parallel::Queue;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Directories still to be walked
///
/// A queue of pending directories plus a count of outstanding work. The count
/// goes up before a directory is queued and comes down only once that
/// directory has been walked completely, including anything the walk pushed
/// back. When it reaches zero nobody holds or can produce more directories,
/// which is the only safe moment to close the queues.
///
/// Clones share the same queue and counter.
#[derive(Clone)]
pub struct Frontier {
    queue: Queue<PathBuf>,
    outstanding: Arc<AtomicUsize>,
    seen: Option<Arc<Mutex<HashSet<PathBuf>>>>,
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    /// Unbounded frontier. A walker pushing symlinked directories back onto
    /// a full bounded frontier that only it drains would wait on itself.
    pub fn new() -> Self {
        Self::from_queue(Queue::unbounded())
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::from_queue(Queue::bounded(capacity))
    }

    /// Bounded by `capacity`, or unbounded when it is zero
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            Self::new()
        } else {
            Self::bounded(capacity)
        }
    }

    fn from_queue(queue: Queue<PathBuf>) -> Self {
        Self {
            queue,
            outstanding: Arc::new(AtomicUsize::new(0)),
            seen: None,
        }
    }

    /// Skip directories whose canonical path was already queued once.
    ///
    /// Without this a symlink cycle (a → b → a) is walked forever.
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.seen = enabled.then(|| Arc::new(Mutex::new(HashSet::new())));
        self
    }

    pub fn detects_cycles(&self) -> bool {
        self.seen.is_some()
    }

    /// Queue a directory, blocking while a bounded frontier is full.
    ///
    /// Returns `Ok(false)` when cycle detection skipped the directory.
    pub fn push(&self, dir: impl Into<PathBuf>) -> Result<bool, QueueError<PathBuf>> {
        let dir = dir.into();

        let mut key = None;
        if let Some(seen) = &self.seen {
            let canonical = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
            if !seen.lock().insert(canonical.clone()) {
                tracing::trace!("already queued, skipping {}", dir.display());
                return Ok(false);
            }
            key = Some(canonical);
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        match self.queue.push(dir) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.outstanding.fetch_sub(1, Ordering::SeqCst);
                // Never queued, so it must not count as seen
                if let (Some(seen), Some(key)) = (&self.seen, key) {
                    seen.lock().remove(&key);
                }
                Err(e)
            }
        }
    }

    /// Next directory, blocking until one is queued or the frontier closes
    pub fn pop(&self) -> Option<PathBuf> {
        self.queue.pop()
    }

    pub fn try_pop(&self) -> Option<PathBuf> {
        self.queue.try_pop()
    }

    /// Mark one popped directory as fully walked; returns what is still
    /// outstanding
    pub fn complete_one(&self) -> usize {
        match self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    /// Directories queued or being walked
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.queue.close();
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Directories waiting in the queue (not counting ones being walked)
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_outstanding_tracks_push_and_complete() {
        let frontier = Frontier::new();
        assert_eq!(frontier.outstanding(), 0);

        frontier.push("/a").unwrap();
        frontier.push("/b").unwrap();
        assert_eq!(frontier.outstanding(), 2);

        // Popping does not finish the work
        assert_eq!(frontier.pop(), Some(PathBuf::from("/a")));
        assert_eq!(frontier.outstanding(), 2);

        assert_eq!(frontier.complete_one(), 1);
        assert_eq!(frontier.try_pop(), Some(PathBuf::from("/b")));
        assert_eq!(frontier.complete_one(), 0);
        assert_eq!(frontier.complete_one(), 0);
    }

    #[test]
    fn test_push_after_close_keeps_count() {
        let frontier = Frontier::bounded(1);
        frontier.close();
        assert!(frontier.push("/a").unwrap_err().is_closed());
        assert_eq!(frontier.outstanding(), 0);
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_cycle_detection_skips_repeats() {
        let temp_dir = TempDir::new().unwrap();
        let frontier = Frontier::new().with_cycle_detection(true);
        assert!(frontier.detects_cycles());

        assert!(frontier.push(temp_dir.path()).unwrap());
        // Same directory spelled differently
        assert!(!frontier.push(temp_dir.path().join(".")).unwrap());
        assert_eq!(frontier.outstanding(), 1);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_rejected_push_is_not_remembered() {
        let temp_dir = TempDir::new().unwrap();
        let frontier = Frontier::new().with_cycle_detection(true);
        frontier.close();

        assert!(frontier.push(temp_dir.path()).unwrap_err().is_closed());
        let seen = frontier.seen.as_ref().unwrap();
        assert!(seen.lock().is_empty());

        // The retry reaches the queue instead of being skipped as a repeat
        assert!(frontier.push(temp_dir.path()).unwrap_err().is_closed());
    }

    #[test]
    fn test_with_capacity_zero_is_unbounded() {
        let frontier = Frontier::with_capacity(0);
        for i in 0..100 {
            frontier.push(format!("/dir/{}", i)).unwrap();
        }
        assert_eq!(frontier.len(), 100);
    }
}
