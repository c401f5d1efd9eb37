//! Host Session
//!
//! Ties the pieces together for one firmware instance: runs the version
//! handshake over a [`Transport`], publishes the negotiated capabilities,
//! decodes indications with the negotiated address width and routes wake
//! events to the dispatcher.

mod envelope;
mod transport;
#[cfg(test)]
mod tests;

pub use envelope::{
    htt_envelope, parse_envelope, wake_envelope, EventId, FirmwareEvent, HTT_HEADER_LEN,
    WAKE_HEADER_LEN,
};
pub use transport::{Transport, TransportError};

use crate::bitfield::FieldOverflow;
use crate::config::Config;
use crate::negotiate::{
    Capabilities, NegotiatedCaps, NegotiationError, NegotiationState, Negotiator, SessionCaps,
};
use crate::protocol::h2t::VersionReq;
use crate::protocol::{decode_t2h, CodecError, H2tMessage, T2hMessage, T2hMsgType};
use crate::wake::{
    DecodedEvent, DispatchConfig, DispatchError, Dispatcher, ReasonHandler, WakeReason,
    WakeStatsSnapshot,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from a host session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("negotiation error: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("encode error: {0}")]
    Encode(#[from] FieldOverflow),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// What a delivered firmware event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome<'a> {
    /// VERSION_CONF completed the handshake.
    Negotiated(NegotiatedCaps),
    /// Any other target-to-host indication.
    Indication { vdev_id: u8, message: T2hMessage },
    /// A dispatched wake event.
    Wake(DecodedEvent<'a>),
}

/// One host/firmware session.
pub struct HostSession<T: Transport> {
    transport: T,
    negotiator: Negotiator,
    caps: Arc<SessionCaps>,
    dispatcher: Dispatcher,
}

impl<T: Transport> HostSession<T> {
    /// Session configured from a loaded [`Config`].
    pub fn new(config: &Config, transport: T) -> Self {
        Self::with_parts(config.capabilities, config.host.dispatch(), transport)
    }

    pub fn with_parts(local: Capabilities, dispatch: DispatchConfig, transport: T) -> Self {
        let caps = Arc::new(SessionCaps::new());
        Self {
            transport,
            negotiator: Negotiator::new(local),
            dispatcher: Dispatcher::with_session_caps(dispatch, Arc::clone(&caps)),
            caps,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current capabilities; defaults until the handshake completes.
    pub fn caps(&self) -> NegotiatedCaps {
        self.caps.get()
    }

    /// Shared handle for readers on other threads.
    pub fn session_caps(&self) -> Arc<SessionCaps> {
        Arc::clone(&self.caps)
    }

    pub fn handshake_state(&self) -> NegotiationState {
        self.negotiator.state()
    }

    pub fn is_negotiated(&self) -> bool {
        self.caps.is_negotiated()
    }

    /// Send VERSION_REQ with the local capability TLVs.
    pub fn start_handshake(&mut self) -> Result<(), SessionError> {
        let options = self.negotiator.build_request()?;
        let msg = H2tMessage::from(VersionReq { options });
        // VERSION_REQ carries no addresses; width is irrelevant here.
        self.transport.send(&msg.encode(self.caps.address_width())?)?;
        debug!(caps = ?self.negotiator.local_caps(), "Sent version request");
        Ok(())
    }

    /// Encode with the session's address width and send.
    pub fn send_message(&self, msg: &H2tMessage) -> Result<(), SessionError> {
        let width = self.caps.address_width();
        let bytes = msg.encode(width)?;
        self.transport.send(&bytes)?;
        debug!(msg_type = %msg.msg_type().name(), len = bytes.len(), width = %width, "Sent message");
        Ok(())
    }

    /// Handle one buffer delivered by the bus.
    pub fn on_event<'a>(&mut self, data: &'a [u8]) -> Result<EventOutcome<'a>, SessionError> {
        match parse_envelope(data)? {
            FirmwareEvent::Htt { vdev_id, message } => {
                if message.first() == Some(&T2hMsgType::VersionConf.to_byte()) {
                    let caps = self.negotiator.complete_from_bytes(message)?;
                    if self.caps.publish(caps).is_err() {
                        return Err(NegotiationError::AlreadyNegotiated.into());
                    }
                    info!(caps = %caps, "Session capabilities published");
                    return Ok(EventOutcome::Negotiated(caps));
                }
                let message = decode_t2h(message, self.caps.address_width())?;
                debug!(vdev_id = vdev_id, msg_type = %message.msg_type().name(), "Indication");
                Ok(EventOutcome::Indication { vdev_id, message })
            }
            FirmwareEvent::Wake(event) => Ok(EventOutcome::Wake(self.dispatcher.dispatch(&event)?)),
        }
    }

    pub fn register_reason_handler(&mut self, reason: WakeReason, handler: ReasonHandler) {
        self.dispatcher.register_reason_handler(reason, handler);
    }

    pub fn get_wake_stats(&self, vdev_id: u8) -> WakeStatsSnapshot {
        self.dispatcher.get_wake_stats(vdev_id)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
