//! HTT-WoW: host/target transport messages and wake-on-wireless events
//!
//! Codec and dispatch layer between a WLAN host driver and its radio
//! firmware: the bit-packed message catalog in both directions, the
//! option-TLV version handshake, and decoding of the events firmware uses
//! to wake a sleeping host.

pub mod bitfield;
pub mod config;
pub mod host;
pub mod negotiate;
pub mod packet;
pub mod protocol;
pub mod wake;

// Re-export bitfield types
pub use bitfield::{FieldOverflow, FieldSpec};

// Re-export config types
pub use config::{Config, ConfigError, HostConfig};

// Re-export protocol types
pub use protocol::{
    AddressWidth, BusAddr, CodecError, DecodedMessage, Direction, H2tMessage, H2tMsgType,
    Message, MessageType, OptionTlv, ProtocolVersion, T2hMessage, T2hMsgType, PROTOCOL_VERSION,
};

// Re-export negotiation types
pub use negotiate::{
    Capabilities, NegotiatedCaps, NegotiationError, NegotiationState, Negotiator, SessionCaps,
    TxCompletionMode,
};

// Re-export wake types
pub use wake::{
    DecodedEvent, DispatchConfig, DispatchError, Dispatcher, EventBody, PiggybackEvent, WakeEvent,
    WakeReason, WakeStatsSnapshot,
};

// Re-export packet types
pub use packet::{classify, DestClass, PacketSummary, ProtocolClassification};

// Re-export host types
pub use host::{EventOutcome, HostSession, SessionError, Transport, TransportError};
