//! Scripted in-memory serial port.
//!
//! [`MockPort`] is a cheap handle to shared state, so a test keeps one clone
//! for inspection while the link worker owns another.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use balance_link::{PortConnector, SerialPort};
use parking_lot::Mutex;

/// Longest a scripted timeout actually sleeps.
const MOCK_TIMEOUT_SLEEP: Duration = Duration::from_millis(1);

/// One scripted result for [`SerialPort::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Deliver these bytes
    Data(Vec<u8>),
    /// Report a read timeout
    Timeout,
    /// Fail with this error kind
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct MockState {
    written: Vec<Vec<u8>>,
    reads: VecDeque<ReadStep>,
    write_failures: VecDeque<io::ErrorKind>,
    write_delay: Option<Duration>,
    fail_close: bool,
    closed: bool,
    read_calls: usize,
    close_calls: usize,
}

/// In-memory port recording writes and replaying scripted reads.
///
/// An exhausted read script behaves like a quiet device: every read times out.
#[derive(Debug, Clone, Default)]
pub struct MockPort {
    state: Arc<Mutex<MockState>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk of inbound bytes.
    pub fn push_data(&self, bytes: impl AsRef<[u8]>) {
        self.script_read(ReadStep::Data(bytes.as_ref().to_vec()));
    }

    /// Queue an arbitrary read result.
    pub fn script_read(&self, step: ReadStep) {
        self.state.lock().reads.push_back(step);
    }

    /// Make the next write fail with `kind`.
    pub fn fail_next_write(&self, kind: io::ErrorKind) {
        self.state.lock().write_failures.push_back(kind);
    }

    /// Sleep this long inside every write.
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    /// Make `close` return an error.
    pub fn fail_close(&self) {
        self.state.lock().fail_close = true;
    }

    /// Every successful write, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    /// Successful writes joined into one byte string.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.state.lock().written.concat()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    /// Scripted reads not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.len()
    }
}

impl SerialPort for MockPort {
    fn write_all(&mut self, bytes: &[u8], _timeout: Duration) -> io::Result<()> {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut state = self.state.lock();
        if let Some(kind) = state.write_failures.pop_front() {
            return Err(io::Error::from(kind));
        }
        if state.closed {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        state.written.push(bytes.to_vec());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let step = {
            let mut state = self.state.lock();
            state.read_calls += 1;
            state.reads.pop_front()
        };
        match step {
            Some(ReadStep::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes.split_off(n);
                    self.state.lock().reads.push_front(ReadStep::Data(rest));
                }
                Ok(n)
            }
            Some(ReadStep::Error(kind)) => Err(io::Error::from(kind)),
            Some(ReadStep::Timeout) | None => {
                std::thread::sleep(timeout.min(MOCK_TIMEOUT_SLEEP));
                Err(io::Error::from(io::ErrorKind::TimedOut))
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        state.closed = true;
        if state.fail_close {
            return Err(io::Error::other("mock close failure"));
        }
        Ok(())
    }
}

/// Connector handing out clones of one [`MockPort`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    port: MockPort,
    fail_open: Option<io::ErrorKind>,
}

impl MockConnector {
    pub fn new(port: MockPort) -> Self {
        Self {
            port,
            fail_open: None,
        }
    }

    /// Connector whose `open` always fails with `kind`.
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            port: MockPort::new(),
            fail_open: Some(kind),
        }
    }
}

impl PortConnector for MockConnector {
    type Port = MockPort;

    fn open(&mut self, _timeout: Duration) -> io::Result<MockPort> {
        match self.fail_open {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(self.port.clone()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let port = MockPort::new();
        let mut worker_side = port.clone();
        worker_side.write_all(b"a10\n", Duration::from_millis(1)).unwrap();
        worker_side.write_all(b"b00\n", Duration::from_millis(1)).unwrap();
        assert_eq!(port.written(), vec![b"a10\n".to_vec(), b"b00\n".to_vec()]);
        assert_eq!(port.written_bytes(), b"a10\nb00\n".to_vec());
    }

    #[test]
    fn test_scripted_reads_split_to_buffer() {
        let mut port = MockPort::new();
        port.push_data(b"hello\n");
        let mut buf = [0u8; 4];
        assert_eq!(port.read(&mut buf, Duration::from_millis(1)).unwrap(), 4);
        assert_eq!(&buf, b"hell");
        assert_eq!(port.read(&mut buf, Duration::from_millis(1)).unwrap(), 2);
        assert_eq!(&buf[..2], b"o\n");
    }

    #[test]
    fn test_empty_script_times_out() {
        let mut port = MockPort::new();
        let mut buf = [0u8; 8];
        let err = port.read(&mut buf, Duration::from_millis(50)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert_eq!(port.read_calls(), 1);
    }

    #[test]
    fn test_failed_write_is_not_recorded() {
        let mut port = MockPort::new();
        port.fail_next_write(io::ErrorKind::BrokenPipe);
        let err = port.write_all(b"x", Duration::from_millis(1)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(port.written().is_empty());
        port.write_all(b"y", Duration::from_millis(1)).unwrap();
        assert_eq!(port.written().len(), 1);
    }

    #[test]
    fn test_failing_connector() {
        let mut connector = MockConnector::failing(io::ErrorKind::NotFound);
        assert_eq!(
            connector.open(Duration::from_millis(1)).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
