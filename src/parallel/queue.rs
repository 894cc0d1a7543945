use crate::error::QueueError;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe, optionally bounded, closeable FIFO queue
///
/// Every clone is a handle onto the same channel, so producers and consumers
/// wired to a queue at construction time simply share clones of it.
///
/// Closing drops the queue's stored sender. Items already buffered stay
/// readable; once they are drained, [`Queue::pop`] returns `None` right away
/// instead of blocking. Pushes that were already in flight on another thread
/// when the queue was closed still complete because they hold their own
/// sender for the duration of the send.
pub struct Queue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    sender: RwLock<Option<Sender<T>>>,
    receiver: Receiver<T>,
    capacity: Option<usize>,
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Queue<T> {
    /// Create a bounded queue. A capacity of zero is raised to one.
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = channel::bounded(capacity);
        Self::from_parts(sender, receiver, Some(capacity))
    }

    /// Create a queue that never blocks producers
    pub fn unbounded() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self::from_parts(sender, receiver, None)
    }

    fn from_parts(sender: Sender<T>, receiver: Receiver<T>, capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                sender: RwLock::new(Some(sender)),
                receiver,
                capacity,
            }),
        }
    }

    pub(crate) fn sender(&self) -> Option<Sender<T>> {
        self.inner.sender.read().clone()
    }

    /// Push an item, blocking while the queue is full
    pub fn push(&self, item: T) -> Result<(), QueueError<T>> {
        match self.sender() {
            Some(sender) => sender.send(item).map_err(|e| QueueError::Closed(e.into_inner())),
            None => Err(QueueError::Closed(item)),
        }
    }

    /// Push without blocking
    pub fn try_push(&self, item: T) -> Result<(), QueueError<T>> {
        match self.sender() {
            Some(sender) => sender.try_send(item).map_err(|e| match e {
                TrySendError::Full(item) => QueueError::Full(item),
                TrySendError::Disconnected(item) => QueueError::Closed(item),
            }),
            None => Err(QueueError::Closed(item)),
        }
    }

    /// Take the next item, blocking until one arrives.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        self.inner.receiver.recv().ok()
    }

    /// Take the next item if one is immediately available
    pub fn try_pop(&self) -> Option<T> {
        self.inner.receiver.try_recv().ok()
    }

    /// Close the queue. Closing twice is a no-op.
    pub fn close(&self) {
        self.inner.sender.write().take();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.sender.read().is_none()
    }

    pub fn len(&self) -> usize {
        self.inner.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.receiver.is_empty()
    }

    /// Queue capacity, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.inner.capacity
    }

    /// Blocking iterator that ends at end-of-stream
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self }
    }

    pub(crate) fn receiver(&self) -> &Receiver<T> {
        &self.inner.receiver
    }
}

impl<T> std::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Iterator returned by [`Queue::iter`]
pub struct Iter<'a, T> {
    queue: &'a Queue<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = Queue::bounded(3);
        queue.push("Larry").unwrap();
        queue.push("Moe").unwrap();
        queue.push("Curly").unwrap();
        queue.close();

        let items: Vec<_> = queue.iter().collect();
        assert_eq!(items, vec!["Larry", "Moe", "Curly"]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let queue: Queue<u8> = Queue::bounded(0);
        assert_eq!(queue.capacity(), Some(1));
        assert!(queue.try_push(1).is_ok());
        assert_eq!(queue.try_push(2), Err(QueueError::Full(2)));
    }

    #[test]
    fn test_push_after_close_returns_item() {
        let queue = Queue::unbounded();
        queue.close();
        queue.close();
        assert!(queue.is_closed());
        assert_eq!(queue.push(7), Err(QueueError::Closed(7)));
        assert_eq!(queue.try_push(8), Err(QueueError::Closed(8)));
    }

    #[test]
    fn test_buffered_items_survive_close() {
        let queue = Queue::bounded(2);
        queue.push(1).unwrap();
        queue.close();
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let queue: Queue<u32> = Queue::bounded(1);
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.iter().count())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(consumer.join().unwrap(), 0);
    }

    #[test]
    fn test_push_blocks_until_consumed() {
        let queue = Queue::bounded(1);
        queue.push(1).unwrap();

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(2))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(1));
        producer.join().unwrap().unwrap();
        assert_eq!(queue.pop(), Some(2));
    }
}
