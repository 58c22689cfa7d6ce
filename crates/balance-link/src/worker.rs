//! The link worker loop. Sole owner of the port.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use balance_errors::{LinkError, LinkResult};
use crossbeam::sync::Parker;
use fes_protocol::WireMessage;
use tracing::{debug, error, info, trace, warn};

use crate::config::LinkConfig;
use crate::port::{PortConnector, SerialPort, is_timeout};
use crate::queue::{InboundQueue, OutboundQueue};
use crate::state::{AtomicLinkState, LinkCounters, LinkState};

/// State shared between the link handle and its worker.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) outbound: OutboundQueue,
    pub(crate) inbound: InboundQueue,
    pub(crate) state: AtomicLinkState,
    pub(crate) counters: LinkCounters,
    pub(crate) stop: AtomicBool,
    pub(crate) read_enabled: AtomicBool,
}

impl Shared {
    pub(crate) fn new(config: &LinkConfig) -> Self {
        Self {
            outbound: OutboundQueue::new(),
            inbound: InboundQueue::new(config.max_unread_messages),
            state: AtomicLinkState::new(LinkState::Idle),
            counters: LinkCounters::default(),
            stop: AtomicBool::new(false),
            read_enabled: AtomicBool::new(config.read_enabled),
        }
    }
}

/// Splits the inbound byte stream into delimiter-terminated messages.
///
/// The delimiter is stripped and empty messages are skipped. A partial
/// message longer than `max_len` is discarded up to the next delimiter.
#[derive(Debug)]
pub(crate) struct LineFramer {
    delimiter: u8,
    max_len: usize,
    partial: Vec<u8>,
    discarding: bool,
}

impl LineFramer {
    pub(crate) fn new(delimiter: u8, max_len: usize) -> Self {
        Self {
            delimiter,
            max_len,
            partial: Vec::with_capacity(max_len),
            discarding: false,
        }
    }

    pub(crate) fn push(&mut self, bytes: &[u8], mut emit: impl FnMut(&[u8])) {
        let delimiter = self.delimiter;
        for chunk in bytes.split_inclusive(|b| *b == delimiter) {
            match chunk.split_last() {
                Some((&last, body)) if last == delimiter => {
                    if self.discarding {
                        self.discarding = false;
                    } else if self.partial.is_empty() {
                        if !body.is_empty() {
                            emit(body);
                        }
                    } else {
                        self.partial.extend_from_slice(body);
                        if self.partial.len() > self.max_len {
                            warn!(len = self.partial.len(), max = self.max_len, "Dropping oversized inbound message");
                        } else {
                            emit(&self.partial);
                        }
                    }
                    self.partial.clear();
                }
                _ => {
                    if self.discarding {
                        continue;
                    }
                    self.partial.extend_from_slice(chunk);
                    if self.partial.len() > self.max_len {
                        warn!(len = self.partial.len(), max = self.max_len, "Dropping oversized inbound message");
                        self.partial.clear();
                        self.discarding = true;
                    }
                }
            }
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.partial.len()
    }
}

/// Worker entry point. Returns once stopped; the result is surfaced by `join`.
pub(crate) fn run<C: PortConnector>(
    mut connector: C,
    config: LinkConfig,
    shared: Arc<Shared>,
    parker: Parker,
) -> LinkResult<()> {
    let device = connector.describe();
    shared.state.store(LinkState::Connecting);
    debug!(%device, timeout_ms = config.connect_timeout_ms, "Opening device");

    let mut port = match connector.open(config.connect_timeout()) {
        Ok(port) => port,
        Err(e) => {
            error!(%device, error = %e, "Failed to open device");
            shared.state.store(LinkState::Faulted);
            shared.state.store(LinkState::Stopped);
            return Err(LinkError::connect_failed(device, e.to_string()));
        }
    };

    shared.state.store(LinkState::Open);
    info!(%device, "Serial link open");

    let outcome = run_open(&mut port, &device, &config, &shared, &parker);

    match &outcome {
        Ok(()) => {
            shared.state.store(LinkState::Closing);
            drain(&mut port, &device, &config, &shared);
        }
        Err(e) => {
            shared.state.store(LinkState::Faulted);
            error!(%device, error = %e, "Serial link faulted");
        }
    }

    if let Err(e) = port.close() {
        debug!(%device, error = %e, "Ignoring error while closing device");
    }
    shared.state.store(LinkState::Stopped);
    info!(%device, stats = ?shared.counters.snapshot(), "Serial link stopped");
    outcome
}

fn run_open<P: SerialPort>(
    port: &mut P,
    device: &str,
    config: &LinkConfig,
    shared: &Shared,
    parker: &Parker,
) -> LinkResult<()> {
    let mut framer = LineFramer::new(config.delimiter, config.read_buffer_len);
    let mut buf = vec![0u8; config.read_buffer_len];

    while !shared.stop.load(Ordering::Acquire) {
        let mut busy = false;

        if let Some(msg) = shared.outbound.pop() {
            busy = true;
            write_one(port, device, config, shared, &msg)?;
        }

        if shared.read_enabled.load(Ordering::Acquire) {
            busy = true;
            match port.read(&mut buf, config.read_timeout()) {
                Ok(n) => framer.push(buf.get(..n).unwrap_or(buf.as_slice()), |frame| {
                    deliver(shared, frame);
                }),
                Err(e) if is_timeout(&e) => trace!(%device, "Read timeout"),
                Err(e) => {
                    return Err(LinkError::disconnected(format!("{device}: {e}")));
                }
            }
        }

        if !busy {
            parker.park_timeout(config.read_timeout());
        }
    }
    Ok(())
}

fn write_one<P: SerialPort>(
    port: &mut P,
    device: &str,
    config: &LinkConfig,
    shared: &Shared,
    msg: &WireMessage,
) -> LinkResult<()> {
    match port.write_all(msg.as_bytes(), config.write_timeout()) {
        Ok(()) => {
            LinkCounters::bump(&shared.counters.sent);
            Ok(())
        }
        Err(e) if is_timeout(&e) => {
            LinkCounters::bump(&shared.counters.write_failures);
            warn!(%device, ?msg, timeout_ms = config.write_timeout_ms, "Write timed out, message dropped");
            Ok(())
        }
        Err(e) => Err(LinkError::io(device, &e)),
    }
}

fn deliver(shared: &Shared, frame: &[u8]) {
    if shared.inbound.offer(WireMessage::from(frame)) {
        LinkCounters::bump(&shared.counters.received);
    } else {
        LinkCounters::bump(&shared.counters.dropped);
    }
}

/// Best-effort flush of whatever the control loop queued before stopping.
fn drain<P: SerialPort>(port: &mut P, device: &str, config: &LinkConfig, shared: &Shared) {
    let pending = shared.outbound.len();
    if pending > 0 {
        info!(%device, pending, "Draining outbound queue");
    }
    while let Some(msg) = shared.outbound.pop() {
        if let Err(e) = write_one(port, device, config, shared, &msg) {
            LinkCounters::bump(&shared.counters.write_failures);
            let mut abandoned = 0usize;
            while shared.outbound.pop().is_some() {
                LinkCounters::bump(&shared.counters.write_failures);
                abandoned += 1;
            }
            warn!(%device, error = %e, abandoned, "Drain aborted");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(framer: &mut LineFramer, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        framer.push(bytes, |f| out.push(f.to_vec()));
        out
    }

    #[test]
    fn test_splits_on_delimiter() {
        let mut framer = LineFramer::new(b'\n', 16);
        let out = frames(&mut framer, b"a07\nb12\n");
        assert_eq!(out, vec![b"a07".to_vec(), b"b12".to_vec()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_partial_frames_span_reads() {
        let mut framer = LineFramer::new(b'\n', 16);
        assert!(frames(&mut framer, b"ok").is_empty());
        assert_eq!(framer.pending(), 2);
        let out = frames(&mut framer, b"ay\nre");
        assert_eq!(out, vec![b"okay".to_vec()]);
        assert_eq!(framer.pending(), 2);
    }

    #[test]
    fn test_skips_empty_frames() {
        let mut framer = LineFramer::new(b'\n', 16);
        let out = frames(&mut framer, b"\n\nx\n");
        assert_eq!(out, vec![b"x".to_vec()]);
    }

    #[test]
    fn test_discards_oversized_until_delimiter() {
        let mut framer = LineFramer::new(b';', 4);
        assert!(frames(&mut framer, b"abcdef").is_empty());
        assert_eq!(framer.pending(), 0);
        let out = frames(&mut framer, b"gh;ok;");
        assert_eq!(out, vec![b"ok".to_vec()]);
    }

    #[test]
    fn test_oversized_completion_is_dropped() {
        let mut framer = LineFramer::new(b'\n', 4);
        assert!(frames(&mut framer, b"abc").is_empty());
        let out = frames(&mut framer, b"de\nf\n");
        assert_eq!(out, vec![b"f".to_vec()]);
    }
}
