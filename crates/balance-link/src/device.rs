//! Port backed by a system serial device through the `serialport` crate.
//!
//! Reads and writes block for at most the per-call timeout. A read that
//! returns no bytes means the device hung up and is reported as
//! [`io::ErrorKind::UnexpectedEof`], never as a timeout.

use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::debug;

use crate::port::{PortConnector, SerialPort};

/// Opens a [`DevicePort`] for a device path at a fixed baud rate.
#[derive(Debug, Clone)]
pub struct DeviceConnector {
    path: String,
    baud_rate: u32,
}

impl DeviceConnector {
    /// Connector for `path`, e.g. `/dev/ttyUSB0` or `COM3`.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }

    /// Device path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Line speed used when opening.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl PortConnector for DeviceConnector {
    type Port = DevicePort;

    fn open(&mut self, timeout: Duration) -> io::Result<DevicePort> {
        let port = serialport::new(&self.path, self.baud_rate)
            .timeout(timeout)
            .open()?;
        debug!(path = %self.path, baud = self.baud_rate, "Device opened");
        Ok(DevicePort::new(port))
    }

    fn describe(&self) -> String {
        self.path.clone()
    }
}

/// An open serial device.
pub struct DevicePort {
    port: Option<Box<dyn serialport::SerialPort>>,
    name: String,
}

impl std::fmt::Debug for DevicePort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevicePort")
            .field("name", &self.name)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl DevicePort {
    /// Wrap an already opened port.
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        let name = port.name().unwrap_or_else(|| "serial".to_string());
        Self {
            port: Some(port),
            name,
        }
    }

    /// Device name as reported by the driver.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether [`close`](SerialPort::close) has run.
    pub fn is_closed(&self) -> bool {
        self.port.is_none()
    }

    fn port(&mut self, timeout: Duration) -> io::Result<&mut Box<dyn serialport::SerialPort>> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        if port.timeout() != timeout {
            port.set_timeout(timeout)?;
        }
        Ok(port)
    }
}

impl SerialPort for DevicePort {
    fn write_all(&mut self, bytes: &[u8], timeout: Duration) -> io::Result<()> {
        let port = self.port(timeout)?;
        port.write_all(bytes)?;
        port.flush()
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let port = self.port(timeout)?;
        match port.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "device hung up",
            )),
            n => Ok(n),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut port) = self.port.take() {
            port.flush()?;
        }
        Ok(())
    }
}
