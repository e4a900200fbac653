//! A bounded, blocking, multi-producer/multi-consumer FIFO queue of owned
//! strings.
//!
//! This queue blocks its caller on a full enqueue or an empty dequeue,
//! rather than failing fast with `try_send`/`try_recv`: that is the
//! substrate the staging model needs, so there is exactly one backend, a
//! `Mutex`-guarded ring plus a `Condvar` for each direction of waiting.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use thiserror::Error;

/// Errors returned by [`BoundedQueue`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was asked to enqueue with a non-positive capacity.
    #[error("queue capacity must be at least 1")]
    InvalidCapacity,

    /// `enqueue` was attempted on a queue whose `finished` flag is set.
    #[error("cannot enqueue into a finished queue")]
    Finished,
}

struct QueueState {
    records: VecDeque<String>,
    capacity: usize,
    finished: bool,
}

/// A fixed-capacity FIFO of owned `String`s with blocking enqueue/dequeue
/// and a sticky `finished` flag.
///
/// Invariant: `0 <= records.len() <= capacity` at all times. Once
/// `finished` becomes true it never becomes false, and no further
/// enqueues are accepted, but records already buffered remain
/// dequeuable until drained.
pub struct BoundedQueue {
    state: Mutex<QueueState>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl BoundedQueue {
    /// Allocates a queue with room for `capacity` records. Fails if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        Ok(Self {
            state: Mutex::new(QueueState {
                records: VecDeque::with_capacity(capacity),
                capacity,
                finished: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    /// Enqueues a record, blocking while the queue is full and not yet
    /// finished. Fails with [`QueueError::Finished`] if the queue is (or
    /// becomes) finished before room is available; never blocks once
    /// finished.
    pub fn enqueue(&self, record: String) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if state.finished {
                return Err(QueueError::Finished);
            }
            if state.records.len() < state.capacity {
                break;
            }
            state = self.not_full.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.records.push_back(record);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeues the oldest record, blocking while the queue is empty and
    /// not yet finished. Returns `None` once the queue is empty *and*
    /// finished, the terminal marker signaling exhaustion.
    pub fn dequeue(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(record) = state.records.pop_front() {
                self.not_full.notify_one();
                return Some(record);
            }
            if state.finished {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Marks the queue finished and wakes every waiter on both
    /// directions. Idempotent. Queued records are not dropped; they
    /// remain dequeuable until drained.
    pub fn signal_finished(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.finished = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Returns true once `signal_finished` has been called.
    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).finished
    }

    /// Current number of buffered records. Non-blocking; for
    /// diagnostics and tests only, the value may be stale the instant
    /// it is read under concurrent use.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).records.len()
    }

    /// True if no records are currently buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity this queue was constructed with.
    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(BoundedQueue::new(0).unwrap_err(), QueueError::InvalidCapacity);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let q = BoundedQueue::new(4).unwrap();
        q.enqueue("a".into()).unwrap();
        q.enqueue("b".into()).unwrap();
        q.enqueue("c".into()).unwrap();
        assert_eq!(q.dequeue().unwrap(), "a");
        assert_eq!(q.dequeue().unwrap(), "b");
        assert_eq!(q.dequeue().unwrap(), "c");
    }

    #[test]
    fn dequeue_from_empty_finished_queue_returns_terminal_marker() {
        let q = BoundedQueue::new(2).unwrap();
        q.signal_finished();
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn enqueue_into_finished_queue_always_fails() {
        let q = BoundedQueue::new(2).unwrap();
        q.signal_finished();
        assert_eq!(q.enqueue("x".into()).unwrap_err(), QueueError::Finished);
    }

    #[test]
    fn finished_queue_still_drains_buffered_records() {
        let q = BoundedQueue::new(2).unwrap();
        q.enqueue("a".into()).unwrap();
        q.signal_finished();
        assert_eq!(q.dequeue().as_deref(), Some("a"));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn signal_finished_is_monotonic_and_idempotent() {
        let q = BoundedQueue::new(2).unwrap();
        q.signal_finished();
        q.signal_finished();
        assert!(q.is_finished());
    }

    #[test]
    fn end_marker_string_is_stored_like_any_other_record() {
        let q = BoundedQueue::new(2).unwrap();
        q.enqueue("<END>".into()).unwrap();
        assert_eq!(q.dequeue().as_deref(), Some("<END>"));
    }

    #[test]
    fn capacity_one_blocks_on_every_transition() {
        let q = Arc::new(BoundedQueue::new(1).unwrap());
        q.enqueue("a".into()).unwrap();

        let producer = Arc::clone(&q);
        let handle = thread::spawn(move || {
            producer.enqueue("b".into()).unwrap();
        });

        thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished(), "enqueue should block while full");

        assert_eq!(q.dequeue().as_deref(), Some("a"));
        handle.join().unwrap();
        assert_eq!(q.dequeue().as_deref(), Some("b"));
    }

    #[test]
    fn dequeue_blocks_until_a_record_arrives() {
        let q = Arc::new(BoundedQueue::new(2).unwrap());
        let consumer = Arc::clone(&q);
        let handle = thread::spawn(move || consumer.dequeue());

        thread::sleep(Duration::from_millis(20));
        q.enqueue("late".into()).unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("late"));
    }

    #[test]
    fn slow_consumer_fast_producer_never_loses_or_duplicates() {
        let q = Arc::new(BoundedQueue::new(2).unwrap());
        const N: usize = 500;

        let producer_q = Arc::clone(&q);
        let producer = thread::spawn(move || {
            for i in 0..N {
                producer_q.enqueue(i.to_string()).unwrap();
            }
            producer_q.signal_finished();
        });

        let mut seen = Vec::with_capacity(N);
        while let Some(record) = q.dequeue() {
            seen.push(record.parse::<usize>().unwrap());
        }
        producer.join().unwrap();

        assert_eq!(seen.len(), N);
        assert_eq!(seen, (0..N).collect::<Vec<_>>());
    }
}
