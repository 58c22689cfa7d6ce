//! Immutable wire payloads.

use std::sync::Arc;

/// An opaque, immutable byte payload.
///
/// Cloning is a reference-count bump, so a message can be handed from the
/// control loop to the link worker without copying.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WireMessage(Arc<[u8]>);

impl WireMessage {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for WireMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for WireMessage {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<Vec<u8>> for WireMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&str> for WireMessage {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}

impl core::fmt::Debug for WireMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "WireMessage({:?})", self.0.escape_ascii().to_string())
    }
}
