//! Lock-free message queues between the control loop and the worker.
//!
//! Both queues are unbounded at construction. The outbound side never drops;
//! pacing is the sender's job. The inbound side enforces an admission limit
//! so a stalled poller cannot grow memory without bound: once the limit is
//! reached the oldest messages stay and each new arrival is discarded.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;
use fes_protocol::WireMessage;
use tracing::warn;

/// FIFO of messages waiting to be written to the device.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    queue: SegQueue<WireMessage>,
}

impl OutboundQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `msg`. Never fails and never drops.
    pub fn push(&self, msg: WireMessage) {
        self.queue.push(msg);
    }

    /// Oldest pending message.
    pub fn pop(&self) -> Option<WireMessage> {
        self.queue.pop()
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// FIFO of messages received from the device, capped at `max_unread`.
#[derive(Debug)]
pub struct InboundQueue {
    queue: SegQueue<WireMessage>,
    // Admitted messages, counted before they are pushed. Never below the
    // number actually in `queue`.
    unread: AtomicUsize,
    max_unread: usize,
    dropped: AtomicU64,
}

impl InboundQueue {
    /// Queue that holds at most `max_unread` messages.
    pub fn new(max_unread: usize) -> Self {
        Self {
            queue: SegQueue::new(),
            unread: AtomicUsize::new(0),
            max_unread,
            dropped: AtomicU64::new(0),
        }
    }

    /// Offer `msg`. Returns `false` and logs a warning if the queue is full.
    pub fn offer(&self, msg: WireMessage) -> bool {
        // reserve the slot before the push so a concurrent poll never sees
        // a message the counter does not cover
        let reserved = self
            .unread
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |unread| {
                (unread < self.max_unread).then_some(unread + 1)
            })
            .is_ok();
        if !reserved {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                max_unread = self.max_unread,
                dropped,
                len = msg.len(),
                "Inbound queue full, dropping message"
            );
            return false;
        }
        self.queue.push(msg);
        true
    }

    /// Oldest unread message.
    pub fn poll(&self) -> Option<WireMessage> {
        let msg = self.queue.pop()?;
        self.unread.fetch_sub(1, Ordering::AcqRel);
        Some(msg)
    }

    /// Messages currently waiting.
    pub fn len(&self) -> usize {
        self.unread.load(Ordering::Acquire)
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Admission limit.
    pub fn max_unread(&self) -> usize {
        self.max_unread
    }

    /// Messages discarded since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
