//! The control-loop side of the serial link.

use core::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use balance_errors::{LinkError, LinkResult};
use crossbeam::sync::{Parker, Unparker};
use fes_protocol::WireMessage;
use tracing::{debug, error, info, warn};

use crate::config::LinkConfig;
use crate::port::PortConnector;
use crate::state::{LinkState, LinkStats};
use crate::worker::{self, Shared};

/// Handle to a running link worker.
///
/// Every method is non-blocking except [`join`](Self::join). Dropping the
/// handle requests a stop and waits for the worker to finish.
#[derive(Debug)]
pub struct SerialLink {
    shared: Arc<Shared>,
    unparker: Unparker,
    device: String,
    handle: Option<JoinHandle<LinkResult<()>>>,
}

impl SerialLink {
    /// Validate `config` and spawn the worker. The device is opened on the
    /// worker thread; watch [`state`](Self::state) or [`join`](Self::join)
    /// to learn whether that succeeded.
    ///
    /// # Errors
    ///
    /// [`LinkError::InvalidConfig`] for a rejected configuration,
    /// [`LinkError::SpawnFailed`] if the thread cannot be created.
    pub fn start<C: PortConnector>(connector: C, config: LinkConfig) -> LinkResult<Self> {
        config
            .validate()
            .map_err(|e| LinkError::InvalidConfig(e.to_string()))?;

        let device = connector.describe();
        let shared = Arc::new(Shared::new(&config));
        let parker = Parker::new();
        let unparker = parker.unparker().clone();

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("balance-link".to_string())
            .spawn(move || worker::run(connector, config, worker_shared, parker))
            .map_err(|e| LinkError::SpawnFailed(e.to_string()))?;

        info!(%device, "Serial link worker started");
        Ok(Self {
            shared,
            unparker,
            device,
            handle: Some(handle),
        })
    }

    /// Queue `msg` for the device. Messages reach the wire in send order.
    ///
    /// # Errors
    ///
    /// [`LinkError::NotRunning`] once a stop was requested or the worker ended.
    pub fn send(&self, msg: WireMessage) -> LinkResult<()> {
        if self.shared.stop.load(Ordering::Acquire) || self.state().is_terminal() {
            return Err(LinkError::NotRunning);
        }
        self.shared.outbound.push(msg);
        self.unparker.unpark();
        Ok(())
    }

    /// Oldest unread inbound message, if any.
    pub fn poll(&self) -> Option<WireMessage> {
        self.shared.inbound.poll()
    }

    /// Ask the worker to flush, close and exit. Returns immediately.
    pub fn request_stop(&self) {
        if !self.shared.stop.swap(true, Ordering::AcqRel) {
            debug!(device = %self.device, "Stop requested");
        }
        self.unparker.unpark();
    }

    /// Turn device reads on or off.
    pub fn set_read_enabled(&self, enabled: bool) {
        self.shared.read_enabled.store(enabled, Ordering::Release);
        self.unparker.unpark();
    }

    /// Whether the worker is reading.
    pub fn is_read_enabled(&self) -> bool {
        self.shared.read_enabled.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LinkState {
        self.shared.state.load()
    }

    /// Whether the worker has exited.
    pub fn is_stopped(&self) -> bool {
        self.state() == LinkState::Stopped
    }

    /// Counter snapshot.
    pub fn stats(&self) -> LinkStats {
        self.shared.counters.snapshot()
    }

    /// Messages queued but not yet written.
    pub fn pending_outbound(&self) -> usize {
        self.shared.outbound.len()
    }

    /// Inbound messages waiting for [`poll`](Self::poll).
    pub fn unread(&self) -> usize {
        self.shared.inbound.len()
    }

    /// Device name given by the connector.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Request a stop and wait for the worker.
    ///
    /// # Errors
    ///
    /// The error that ended the worker ([`LinkError::ConnectFailed`],
    /// [`LinkError::Disconnected`], [`LinkError::Io`]), or
    /// [`LinkError::WorkerPanicked`].
    pub fn join(mut self) -> LinkResult<()> {
        self.request_stop();
        self.join_worker()
    }

    fn join_worker(&mut self) -> LinkResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!(device = %self.device, "Link worker panicked");
                Err(LinkError::WorkerPanicked)
            }
        }
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.request_stop();
        if let Err(e) = self.join_worker() {
            warn!(device = %self.device, error = %e, "Link worker ended with error");
        }
    }
}
