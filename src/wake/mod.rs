//! Wake-on-Wireless Events
//!
//! When the host sleeps, firmware wakes it with a reason code and,
//! depending on the reason, either an embedded event or the frame that
//! triggered the wake. This module names the reasons, decodes the
//! payloads and keeps per-interface counts.
//!
//! ## Payloads
//!
//! ```text
//! none:         reason only
//! piggybacked:  [tag:8][...] event or target-to-host message
//! raw packet:   [frame_len:32 LE][frame...]
//! ```

mod dispatch;
mod event;
mod reason;
mod stats;

pub use dispatch::{
    wow_packet, DecodedEvent, DispatchConfig, DispatchError, Dispatcher, EventBody, ReasonHandler,
    WakeEvent, WOW_PACKET_HEADER,
};
pub use event::{
    decode_piggyback, ChipPowerFailure, CsaSwitch, EventTag, ExtscanEvent, NanEvent, NloMatch,
    NloScanComplete, OemResponse, P2pListenOffloadStop, PiggybackEvent, RoamEvent, RoamSynch,
    RssiBreach, TdlsEvent,
};
pub use reason::{Embedded, FrameFormat, Payload, PayloadClass, ReasonInfo, WakeReason};
pub use stats::{WakeStats, WakeStatsSnapshot};
