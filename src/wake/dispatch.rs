//! Wake event dispatch.

use super::event::{decode_piggyback, PiggybackEvent};
use super::reason::{FrameFormat, Payload, WakeReason};
use super::stats::{WakeStats, WakeStatsSnapshot};
use crate::negotiate::SessionCaps;
use crate::packet::{classify, summarize, summarize_mgmt, MgmtSummary, PacketSummary, ProtocolClassification};
use crate::protocol::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Length prefix of a WoW packet buffer.
pub const WOW_PACKET_HEADER: usize = 4;

/// Errors from dispatching a wake event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("malformed event (tag {tag:#04x}) piggybacked on {reason}: {source}")]
    BadPiggyback {
        reason: WakeReason,
        tag: u8,
        source: CodecError,
    },

    #[error("wake event for interface {vdev_id}, only {max} configured")]
    InvalidInterface { vdev_id: u8, max: u8 },
}

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Interfaces `0..max_interfaces` are accepted.
    #[serde(default = "DispatchConfig::default_max_interfaces")]
    pub max_interfaces: u8,
}

impl DispatchConfig {
    fn default_max_interfaces() -> u8 {
        4
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_interfaces: Self::default_max_interfaces(),
        }
    }
}

/// A wake notification as firmware delivered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WakeEvent<'a> {
    pub vdev_id: u8,
    pub reason: WakeReason,
    pub payload: &'a [u8],
}

/// What the wake payload turned out to hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventBody<'a> {
    None,
    /// `None` when firmware attached no event.
    Piggyback(Option<PiggybackEvent>),
    Packet {
        frame: &'a [u8],
        protocol: ProtocolClassification,
        summary: PacketSummary,
    },
    Management {
        frame: &'a [u8],
        summary: Option<MgmtSummary>,
    },
}

/// A dispatched wake event. Raw frames borrow from the original payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEvent<'a> {
    pub vdev_id: u8,
    pub reason: WakeReason,
    pub body: EventBody<'a>,
}

impl fmt::Display for DecodedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vdev={} reason={}", self.vdev_id, self.reason)?;
        match &self.body {
            EventBody::None => Ok(()),
            EventBody::Piggyback(None) => write!(f, " event=none"),
            EventBody::Piggyback(Some(event)) => write!(f, " event={}", event.name()),
            EventBody::Packet {
                protocol, summary, ..
            } => write!(f, " protocol={} {}", protocol, summary),
            EventBody::Management {
                summary: Some(summary),
                ..
            } => write!(f, " {}", summary),
            EventBody::Management { frame, summary: None } => {
                write!(f, " mgmt len={} (unparsed)", frame.len())
            }
        }
    }
}

/// Frame inside a WoW packet buffer; a declared length beyond the buffer is
/// clipped to the bytes present.
pub fn wow_packet(payload: &[u8]) -> &[u8] {
    let [a, b, c, d, frame @ ..] = payload else {
        return &[];
    };
    let declared = u32::from_le_bytes([*a, *b, *c, *d]) as usize;
    if declared > frame.len() {
        debug!(declared = declared, available = frame.len(), "Clipping wake packet");
    }
    &frame[..declared.min(frame.len())]
}

/// Callback for one wake reason.
pub type ReasonHandler = Box<dyn Fn(&DecodedEvent<'_>) + Send + Sync>;

/// Decodes wake events, keeps statistics and calls per-reason handlers.
pub struct Dispatcher {
    config: DispatchConfig,
    caps: Arc<SessionCaps>,
    handlers: HashMap<WakeReason, ReasonHandler>,
    stats: WakeStats,
}

impl Dispatcher {
    /// Dispatcher with its own, never negotiated, session capabilities.
    pub fn new(config: DispatchConfig) -> Self {
        Self::with_session_caps(config, Arc::new(SessionCaps::new()))
    }

    /// Dispatcher decoding HTT piggybacks with a shared session's width.
    pub fn with_session_caps(config: DispatchConfig, caps: Arc<SessionCaps>) -> Self {
        Self {
            config,
            caps,
            handlers: HashMap::new(),
            stats: WakeStats::new(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Install the handler for `reason`, replacing any previous one.
    pub fn register_reason_handler(&mut self, reason: WakeReason, handler: ReasonHandler) {
        if self.handlers.insert(reason, handler).is_some() {
            debug!(reason = %reason, "Replaced wake reason handler");
        }
    }

    pub fn get_wake_stats(&self, vdev_id: u8) -> WakeStatsSnapshot {
        self.stats.snapshot(vdev_id)
    }

    pub fn rejected_events(&self) -> u64 {
        self.stats.rejected_events()
    }

    pub fn stats(&self) -> &WakeStats {
        &self.stats
    }

    /// Decode one wake event, count it and hand it to its reason handler.
    ///
    /// Statistics are updated exactly once per call, failures included.
    pub fn dispatch<'a>(&self, event: &WakeEvent<'a>) -> Result<DecodedEvent<'a>, DispatchError> {
        let WakeEvent {
            vdev_id,
            reason,
            payload,
        } = *event;

        if vdev_id >= self.config.max_interfaces {
            self.stats.record_rejected();
            warn!(
                vdev_id = vdev_id,
                max = self.config.max_interfaces,
                reason = %reason,
                "Wake event for unknown interface"
            );
            return Err(DispatchError::InvalidInterface {
                vdev_id,
                max: self.config.max_interfaces,
            });
        }

        if !reason.is_known() {
            warn!(vdev_id = vdev_id, reason = reason.code(), "Unknown wake reason");
        }

        let (body, protocol, destination) = match reason.payload() {
            Payload::None => (EventBody::None, None, None),
            Payload::Piggybacked(embedded) => {
                let width = self.caps.address_width();
                match decode_piggyback(embedded, payload, width) {
                    Ok(piggyback) => (EventBody::Piggyback(piggyback), None, None),
                    Err(source) => {
                        self.stats.record_malformed(vdev_id, reason);
                        let tag = payload.first().copied().unwrap_or(0);
                        warn!(
                            vdev_id = vdev_id,
                            reason = %reason,
                            tag = tag,
                            len = payload.len(),
                            error = %source,
                            "Malformed piggybacked event"
                        );
                        return Err(DispatchError::BadPiggyback { reason, tag, source });
                    }
                }
            }
            Payload::RawPacket(FrameFormat::Ethernet) => {
                let frame = wow_packet(payload);
                let protocol = classify(frame);
                let summary = summarize(frame);
                let destination = summary.dest_class();
                trace!(vdev_id = vdev_id, reason = %reason, protocol = %protocol, packet = %summary, "Wake packet");
                (
                    EventBody::Packet {
                        frame,
                        protocol,
                        summary,
                    },
                    Some(protocol),
                    destination,
                )
            }
            Payload::RawPacket(FrameFormat::Ieee80211) => {
                let frame = wow_packet(payload);
                let summary = summarize_mgmt(frame);
                if let Some(s) = &summary {
                    trace!(vdev_id = vdev_id, reason = %reason, frame = %s, "Wake management frame");
                }
                (EventBody::Management { frame, summary }, None, None)
            }
        };

        self.stats.record(vdev_id, reason, protocol, destination);

        let decoded = DecodedEvent {
            vdev_id,
            reason,
            body,
        };

        match self.handlers.get(&reason) {
            Some(handler) => handler(&decoded),
            None => debug!(reason = %reason, "No handler for wake reason"),
        }

        Ok(decoded)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("handlers", &self.handlers.len())
            .field("stats", &self.stats)
            .finish()
    }
}
