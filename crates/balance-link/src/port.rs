//! Port abstraction owned by the link worker.

use std::io;
use std::time::Duration;

/// A byte-oriented device connection with per-call timeouts.
///
/// Implementations report an expired deadline as
/// [`io::ErrorKind::TimedOut`] or [`io::ErrorKind::WouldBlock`]; the worker
/// treats every other error as a fault.
pub trait SerialPort: Send {
    /// Write every byte of `bytes` within `timeout`.
    ///
    /// # Errors
    ///
    /// A timeout error if the deadline passes, otherwise the device error.
    fn write_all(&mut self, bytes: &[u8], timeout: Duration) -> io::Result<()>;

    /// Read whatever is available into `buf`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// A timeout error if nothing arrived in time, otherwise the device error.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;

    /// Release the device.
    ///
    /// # Errors
    ///
    /// Whatever the device reports; callers on the shutdown path ignore it.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens a [`SerialPort`]. Moved into the worker thread by [`SerialLink::start`](crate::SerialLink::start).
pub trait PortConnector: Send + 'static {
    /// Port type produced on success.
    type Port: SerialPort + 'static;

    /// Open the device within `timeout`.
    ///
    /// # Errors
    ///
    /// Any error preventing the device from opening.
    fn open(&mut self, timeout: Duration) -> io::Result<Self::Port>;

    /// Human-readable device name for logs and errors.
    fn describe(&self) -> String;
}

/// Whether `err` is an expired deadline rather than a device fault.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_kinds() {
        assert!(is_timeout(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(is_timeout(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
