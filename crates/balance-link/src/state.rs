//! Link state and counters shared with the control loop.

use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use serde::Serialize;

/// Lifecycle of the worker's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum LinkState {
    /// Worker not yet running
    Idle = 0,
    /// Opening the device
    Connecting = 1,
    /// Device open, loop running
    Open = 2,
    /// Stop requested; flushing and closing
    Closing = 3,
    /// Device error; closing
    Faulted = 4,
    /// Worker finished
    Stopped = 5,
}

impl LinkState {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => LinkState::Idle,
            1 => LinkState::Connecting,
            2 => LinkState::Open,
            3 => LinkState::Closing,
            4 => LinkState::Faulted,
            _ => LinkState::Stopped,
        }
    }

    /// Whether the worker has finished or is finishing.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            LinkState::Closing | LinkState::Faulted | LinkState::Stopped
        )
    }
}

impl core::fmt::Display for LinkState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            LinkState::Idle => "idle",
            LinkState::Connecting => "connecting",
            LinkState::Open => "open",
            LinkState::Closing => "closing",
            LinkState::Faulted => "faulted",
            LinkState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Lock-free cell holding a [`LinkState`]. Written only by the worker.
#[derive(Debug)]
pub(crate) struct AtomicLinkState(AtomicU8);

impl AtomicLinkState {
    pub(crate) const fn new(state: LinkState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub(crate) fn load(&self) -> LinkState {
        LinkState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn store(&self, state: LinkState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Snapshot of the link counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Messages written to the device
    pub sent: u64,
    /// Inbound messages accepted into the queue
    pub received: u64,
    /// Inbound messages dropped by the unread limit
    pub dropped: u64,
    /// Outbound messages that timed out or failed while flushing
    pub write_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct LinkCounters {
    pub(crate) sent: AtomicU64,
    pub(crate) received: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) write_failures: AtomicU64,
}

impl LinkCounters {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> LinkStats {
        LinkStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_state_roundtrip() {
        let cell = AtomicLinkState::new(LinkState::Idle);
        for state in [
            LinkState::Connecting,
            LinkState::Open,
            LinkState::Closing,
            LinkState::Faulted,
            LinkState::Stopped,
        ] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LinkState::Open.is_terminal());
        assert!(!LinkState::Connecting.is_terminal());
        assert!(LinkState::Faulted.is_terminal());
        assert!(LinkState::Stopped.is_terminal());
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = LinkCounters::default();
        LinkCounters::bump(&counters.sent);
        LinkCounters::bump(&counters.sent);
        LinkCounters::bump(&counters.dropped);
        let stats = counters.snapshot();
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.received, 0);
    }
}
