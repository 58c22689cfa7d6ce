//! Link over a pseudo-terminal pair.
#![cfg(unix)]

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use balance_errors::LinkError;
use balance_link::{DevicePort, LinkConfig, PortConnector, SerialLink};
use balance_test_helpers::{eventually, must, must_err, must_some};
use fes_protocol::StimCodec;
use serialport::TTYPort;

const WAIT: Duration = Duration::from_secs(2);

/// Hands out the slave end of a pty pair once.
struct PtyConnector(Option<TTYPort>);

impl PortConnector for PtyConnector {
    type Port = DevicePort;

    fn open(&mut self, _timeout: Duration) -> io::Result<DevicePort> {
        self.0
            .take()
            .map(|tty| DevicePort::new(Box::new(tty)))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn describe(&self) -> String {
        "pty".to_string()
    }
}

fn pty_link(config: LinkConfig) -> (TTYPort, SerialLink) {
    let (master, slave) = must(TTYPort::pair());
    let link = must(SerialLink::start(PtyConnector(Some(slave)), config));
    (master, link)
}

fn read_lines(master: &mut TTYPort, count: usize) -> Vec<String> {
    let deadline = Instant::now() + WAIT;
    let mut bytes = Vec::new();
    let mut buf = [0u8; 64];
    while bytes.iter().filter(|b| **b == b'\n').count() < count && Instant::now() < deadline {
        if let Ok(n) = master.read(&mut buf) {
            bytes.extend_from_slice(&buf[..n]);
        }
    }
    String::from_utf8_lossy(&bytes)
        .lines()
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect()
}

#[test]
fn frames_reach_the_device() {
    let (mut master, link) = pty_link(LinkConfig::default());
    let codec = StimCodec::default();
    for msg in codec.encode_frame([10, 20, 0, 0]).into_iter().chain(codec.shutdown_burst()) {
        must(link.send(msg));
    }

    let lines = read_lines(&mut master, 8);
    assert_eq!(lines, ["a10", "b20", "c00", "d00", "a00", "b00", "c00", "d00"]);
    must(link.join());
}

#[test]
fn device_replies_are_framed() {
    let (mut master, link) = pty_link(LinkConfig {
        read_timeout_ms: 5,
        read_enabled: true,
        ..LinkConfig::default()
    });
    must(master.write_all(b"ready\n"));
    must(master.flush());

    assert!(eventually(WAIT, || link.unread() == 1));
    let msg = must_some(link.poll(), "inbound line");
    assert_eq!(msg.as_bytes(), b"ready");

    // quiet line: reads time out and the link stays open
    std::thread::sleep(Duration::from_millis(30));
    assert!(!link.is_stopped());
    must(link.join());
}

#[test]
fn hangup_ends_the_link() {
    let (master, link) = pty_link(LinkConfig {
        read_timeout_ms: 5,
        read_enabled: true,
        ..LinkConfig::default()
    });
    drop(master);

    assert!(eventually(WAIT, || link.is_stopped()));
    assert!(matches!(must_err(link.join()), LinkError::Disconnected(_)));
}
