//! Bounded handoff buffer between pipeline stages

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Single-producer/single-consumer relay between two pipeline stages.
///
/// The buffer holds at most `capacity` items. When a `push` would exceed
/// that, the *oldest* buffered item is discarded to make room: a slow
/// consumer sees fresher data at the cost of dropped frames, and the
/// producer is never blocked or backlogged. `pop` blocks until an item is
/// available.
///
/// Overflow policy is drop-oldest, not drop-newest: the newest item always
/// eventually wins, bounding staleness.
pub struct HandoffBuffer<T> {
    queue: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> HandoffBuffer<T> {
    /// Create a buffer holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "handoff buffer needs room for at least one item");
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Insert the newest item, discarding the oldest one on overflow.
    /// Never blocks.
    pub fn push(&self, item: T) {
        let mut queue = self.queue.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(item);
        self.not_empty.notify_one();
    }

    /// Remove and return the oldest buffered item, blocking until one
    /// exists.
    pub fn pop(&self) -> T {
        let mut queue = self.queue.lock();
        loop {
            if let Some(item) = queue.pop_front() {
                return item;
            }
            self.not_empty.wait(&mut queue);
        }
    }

    /// Like [`pop`](Self::pop), but gives up after `timeout` so workers
    /// can re-check their shutdown flag instead of parking forever.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.queue.lock();
        loop {
            if let Some(item) = queue.pop_front() {
                return Some(item);
            }
            if self.not_empty.wait_until(&mut queue, deadline).timed_out() {
                return queue.pop_front();
            }
        }
    }

    /// Number of currently buffered items.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the buffer is currently empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_within_capacity() {
        let buffer = HandoffBuffer::new(2);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.pop(), 1);
        assert_eq!(buffer.pop(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overflow_discards_oldest() {
        let buffer = HandoffBuffer::new(2);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.pop(), 2);
        assert_eq!(buffer.pop(), 3);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let buffer = Arc::new(HandoffBuffer::new(2));

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                buffer.push(42);
            })
        };

        let start = Instant::now();
        assert_eq!(buffer.pop(), 42);
        assert!(start.elapsed() >= Duration::from_millis(40));

        producer.join().unwrap();
    }

    #[test]
    fn test_pop_timeout_on_empty() {
        let buffer: HandoffBuffer<u8> = HandoffBuffer::new(2);

        let start = Instant::now();
        assert_eq!(buffer.pop_timeout(Duration::from_millis(30)), None);
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    proptest! {
        #[test]
        fn overflow_retains_two_newest(items in prop::collection::vec(0u32..1000, 0..20)) {
            let buffer = HandoffBuffer::new(2);
            for &item in &items {
                buffer.push(item);
            }

            let retained: Vec<u32> = std::iter::from_fn(|| buffer.pop_timeout(Duration::ZERO)).collect();
            let expected: Vec<u32> = items.iter().rev().take(2).rev().copied().collect();
            prop_assert_eq!(retained, expected);
        }
    }
}
