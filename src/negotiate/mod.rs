//! Version Handshake Negotiation
//!
//! The host opens the session with VERSION_REQ carrying one option TLV per
//! capability it wants; the target answers with VERSION_CONF carrying its
//! own. Both sides resolve the two lists with the same rules, so they agree
//! without a third message.
//!
//! ```text
//! Idle --build_request--> AwaitingPeerTlvs --complete--> Negotiated
//! Idle --respond-------------------------------------> Negotiated
//! ```

mod caps;

pub use caps::{Capabilities, NegotiatedCaps, SessionCaps, TxCompletionMode};

use crate::protocol::{
    AddressWidth, CodecError, Message, OptionTlv, ProtocolVersion, PROTOCOL_VERSION,
};
use crate::protocol::t2h::VersionConf;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Errors from the version handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("unexpected handshake step in state {0}")]
    UnexpectedState(NegotiationState),

    #[error("capabilities already negotiated")]
    AlreadyNegotiated,

    #[error("protocol version mismatch: local {local}, peer {peer}")]
    VersionMismatch {
        local: ProtocolVersion,
        peer: ProtocolVersion,
    },

    #[error("bad version message: {0}")]
    Codec(#[from] CodecError),
}

/// Handshake progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    AwaitingPeerTlvs,
    Negotiated,
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::AwaitingPeerTlvs => "awaiting-peer-tlvs",
            NegotiationState::Negotiated => "negotiated",
        };
        write!(f, "{}", name)
    }
}

/// One side of the version handshake.
#[derive(Debug)]
pub struct Negotiator {
    local: Capabilities,
    version: ProtocolVersion,
    state: NegotiationState,
    result: Option<NegotiatedCaps>,
}

impl Negotiator {
    /// Negotiator speaking this crate's protocol version.
    pub fn new(local: Capabilities) -> Self {
        Self::with_version(local, PROTOCOL_VERSION)
    }

    pub fn with_version(local: Capabilities, version: ProtocolVersion) -> Self {
        Self {
            local,
            version,
            state: NegotiationState::Idle,
            result: None,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn local_caps(&self) -> &Capabilities {
        &self.local
    }

    /// The agreed configuration once negotiated.
    pub fn result(&self) -> Option<NegotiatedCaps> {
        self.result
    }

    /// Initiator: produce the TLVs for VERSION_REQ.
    pub fn build_request(&mut self) -> Result<Vec<OptionTlv>, NegotiationError> {
        match self.state {
            NegotiationState::Idle => {
                self.state = NegotiationState::AwaitingPeerTlvs;
                Ok(self.local.to_tlvs())
            }
            NegotiationState::Negotiated => Err(NegotiationError::AlreadyNegotiated),
            state => Err(NegotiationError::UnexpectedState(state)),
        }
    }

    /// Resolve a peer's TLVs against the local capabilities.
    ///
    /// Pure: absent tags take their defaults and unknown tags are skipped.
    /// Does not move the state machine.
    pub fn parse(&self, tlvs: &[OptionTlv], peer_version: ProtocolVersion) -> NegotiatedCaps {
        self.local.resolve(&Capabilities::from_tlvs(tlvs), peer_version)
    }

    /// Initiator: finish with the peer's version and TLVs.
    pub fn complete(
        &mut self,
        peer_version: ProtocolVersion,
        tlvs: &[OptionTlv],
    ) -> Result<NegotiatedCaps, NegotiationError> {
        match self.state {
            NegotiationState::AwaitingPeerTlvs => {}
            NegotiationState::Negotiated => return Err(NegotiationError::AlreadyNegotiated),
            state => return Err(NegotiationError::UnexpectedState(state)),
        }
        self.finish(peer_version, tlvs)
    }

    /// Initiator: finish from raw VERSION_CONF bytes.
    pub fn complete_from_bytes(&mut self, data: &[u8]) -> Result<NegotiatedCaps, NegotiationError> {
        // The confirmation carries no addresses, so width does not matter.
        let conf = VersionConf::decode(data, AddressWidth::Addr32)?;
        self.complete(conf.version, &conf.options)
    }

    /// Responder: accept a VERSION_REQ and produce the TLVs for the reply.
    pub fn respond(
        &mut self,
        peer_version: ProtocolVersion,
        tlvs: &[OptionTlv],
    ) -> Result<(NegotiatedCaps, Vec<OptionTlv>), NegotiationError> {
        match self.state {
            NegotiationState::Idle => {}
            NegotiationState::Negotiated => return Err(NegotiationError::AlreadyNegotiated),
            state => return Err(NegotiationError::UnexpectedState(state)),
        }
        let caps = self.finish(peer_version, tlvs)?;
        Ok((caps, self.local.to_tlvs()))
    }

    fn finish(
        &mut self,
        peer_version: ProtocolVersion,
        tlvs: &[OptionTlv],
    ) -> Result<NegotiatedCaps, NegotiationError> {
        if !self.version.is_compatible(&peer_version) {
            return Err(NegotiationError::VersionMismatch {
                local: self.version,
                peer: peer_version,
            });
        }

        let caps = self.parse(tlvs, peer_version);
        self.state = NegotiationState::Negotiated;
        self.result = Some(caps);

        info!(
            peer_version = %peer_version,
            address_width = %caps.address_width,
            tx_completion = %caps.tx_completion,
            queue_groups = caps.max_tx_queue_groups,
            desc_ext = caps.tx_msdu_desc_ext,
            "Version handshake complete"
        );
        Ok(caps)
    }
}
