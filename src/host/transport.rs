//! Bus transport boundary.
//!
//! How bytes physically reach the firmware is the embedder's concern; the
//! session only needs a way to hand over an encoded message.

use thiserror::Error;

/// Errors reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("transport closed")]
    Closed,
}

/// Host-to-target byte pipe.
pub trait Transport {
    /// Send one encoded message to the target.
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }
}
