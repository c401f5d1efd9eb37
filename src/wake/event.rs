//! Events piggybacked on wake notifications.
//!
//! Embedded events use the same word codec as the message catalog, with
//! the event tag in place of the message type:
//!
//! ```text
//! w0: [tag:8][...:24]
//! ```

use super::reason::Embedded;
use crate::bitfield::{FieldOverflow, FieldSpec};
use crate::protocol::layout::{
    mac_from_words, mac_hi, mac_lo, named, type_code, MacAddr, Message, MessageLayout, NamedField,
    RecordLayout, WordLayout, WordReader, WordWriter, FULL_WORD, HIGH_HALF, LOW_HALF, MAC_HI,
    MAC_LO, TYPE_FIELD,
};
use crate::protocol::{decode_t2h, AddressWidth, CodecError, T2hMessage};
use std::fmt;

/// Embedded event tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventTag {
    RoamEvent = 0x01,
    RoamSynch = 0x02,
    NloMatch = 0x10,
    NloScanComplete = 0x11,
    RssiBreach = 0x20,
    ExtscanEvent = 0x21,
    CsaSwitch = 0x30,
    TdlsEvent = 0x40,
    NanEvent = 0x50,
    OemResponse = 0x60,
    ChipPowerFailure = 0x70,
    P2pListenOffloadStop = 0x71,
}

impl EventTag {
    pub const ALL: [EventTag; 12] = [
        EventTag::RoamEvent,
        EventTag::RoamSynch,
        EventTag::NloMatch,
        EventTag::NloScanComplete,
        EventTag::RssiBreach,
        EventTag::ExtscanEvent,
        EventTag::CsaSwitch,
        EventTag::TdlsEvent,
        EventTag::NanEvent,
        EventTag::OemResponse,
        EventTag::ChipPowerFailure,
        EventTag::P2pListenOffloadStop,
    ];

    pub fn from_byte(b: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| *t as u8 == b)
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            EventTag::RoamEvent => "ROAM_EVENT",
            EventTag::RoamSynch => "ROAM_SYNCH",
            EventTag::NloMatch => "NLO_MATCH",
            EventTag::NloScanComplete => "NLO_SCAN_COMPLETE",
            EventTag::RssiBreach => "RSSI_BREACH",
            EventTag::ExtscanEvent => "EXTSCAN_EVENT",
            EventTag::CsaSwitch => "CSA_SWITCH",
            EventTag::TdlsEvent => "TDLS_EVENT",
            EventTag::NanEvent => "NAN_EVENT",
            EventTag::OemResponse => "OEM_RESPONSE",
            EventTag::ChipPowerFailure => "CHIP_POWER_FAILURE",
            EventTag::P2pListenOffloadStop => "P2P_LISTEN_OFFLOAD_STOP",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Fields shared by most events.
const VDEV_ID: FieldSpec = FieldSpec::uint(8, 8);
const BYTE2: FieldSpec = FieldSpec::uint(16, 8);
const RSSI_HI: FieldSpec = FieldSpec::int(24, 8);

// ============================================================================
// Roaming
// ============================================================================

mod roam {
    use super::*;

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("roam_reason", BYTE2),
        named("rssi", RSSI_HI),
    ];

    pub const CHAN_FREQ: NamedField = named("chan_freq", HIGH_HALF);
    pub const W1: &[NamedField] = &[named("bssid_lo", FULL_WORD)];
    pub const W2: &[NamedField] = &[named("bssid_hi", LOW_HALF), CHAN_FREQ];

    pub const AUTH_STATUS: FieldSpec = FieldSpec::uint(0, 8);
    pub const KCK_LEN: FieldSpec = FieldSpec::uint(8, 8);
    pub const KEK_LEN: FieldSpec = FieldSpec::uint(16, 8);
    pub const W3: &[NamedField] = &[
        named("auth_status", AUTH_STATUS),
        named("kck_len", KCK_LEN),
        named("kek_len", KEK_LEN),
    ];
}

/// Firmware-initiated roam or roam candidate notice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoamEvent {
    pub vdev_id: u8,
    pub roam_reason: u8,
    pub rssi: i8,
}

impl Message for RoamEvent {
    const CODE: u8 = EventTag::RoamEvent as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "ROAM_EVENT",
        header: &[WordLayout::Fields(roam::W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (BYTE2, i64::from(self.roam_reason)),
            (RSSI_HI, i64::from(self.rssi)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            roam_reason: BYTE2.read_u32(w0) as u8,
            rssi: RSSI_HI.read_i32(w0) as i8,
        })
    }
}

/// Roam completed in firmware; host must resynchronize keys and state.
///
/// ```text
/// w0: [tag:8][vdev_id:8][roam_reason:8][rssi:8]
/// w1: [bssid[0..4]:32]
/// w2: [bssid[4..6]:16][chan_freq:16]
/// w3: [auth_status:8][kck_len:8][kek_len:8][reserved:8]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoamSynch {
    pub vdev_id: u8,
    pub roam_reason: u8,
    pub rssi: i8,
    pub bssid: MacAddr,
    pub chan_freq: u16,
    pub auth_status: u8,
    pub kck_len: u8,
    pub kek_len: u8,
}

impl Message for RoamSynch {
    const CODE: u8 = EventTag::RoamSynch as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "ROAM_SYNCH",
        header: &[
            WordLayout::Fields(roam::W0),
            WordLayout::Fields(roam::W1),
            WordLayout::Fields(roam::W2),
            WordLayout::Fields(roam::W3),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (BYTE2, i64::from(self.roam_reason)),
            (RSSI_HI, i64::from(self.rssi)),
        ])?;
        w.raw(mac_lo(&self.bssid));
        w.word(&[
            (MAC_HI.spec, mac_hi(&self.bssid)),
            (roam::CHAN_FREQ.spec, i64::from(self.chan_freq)),
        ])?;
        w.word(&[
            (roam::AUTH_STATUS, i64::from(self.auth_status)),
            (roam::KCK_LEN, i64::from(self.kck_len)),
            (roam::KEK_LEN, i64::from(self.kek_len)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let w2 = r.word()?;
        let w3 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            roam_reason: BYTE2.read_u32(w0) as u8,
            rssi: RSSI_HI.read_i32(w0) as i8,
            bssid: mac_from_words(w1, w2),
            chan_freq: roam::CHAN_FREQ.spec.read_u32(w2) as u16,
            auth_status: roam::AUTH_STATUS.read_u32(w3) as u8,
            kck_len: roam::KCK_LEN.read_u32(w3) as u8,
            kek_len: roam::KEK_LEN.read_u32(w3) as u8,
        })
    }
}

// ============================================================================
// Network List Offload
// ============================================================================

mod nlo {
    use super::*;

    pub const RSSI: FieldSpec = FieldSpec::int(16, 8);
    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("network_index", HIGH_HALF),
    ];
    pub const W1: &[NamedField] = &[named("chan_freq", LOW_HALF), named("rssi", RSSI)];
    pub const COMPLETE_W0: &[NamedField] = &[TYPE_FIELD, named("vdev_id", VDEV_ID)];
}

/// A preferred network was found during offloaded scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NloMatch {
    pub vdev_id: u8,
    pub network_index: u16,
    pub chan_freq: u16,
    pub rssi: i8,
}

impl Message for NloMatch {
    const CODE: u8 = EventTag::NloMatch as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "NLO_MATCH",
        header: &[WordLayout::Fields(nlo::W0), WordLayout::Fields(nlo::W1)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (HIGH_HALF, i64::from(self.network_index)),
        ])?;
        w.word(&[
            (LOW_HALF, i64::from(self.chan_freq)),
            (nlo::RSSI, i64::from(self.rssi)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            network_index: HIGH_HALF.read_u32(w0) as u16,
            chan_freq: LOW_HALF.read_u32(w1) as u16,
            rssi: nlo::RSSI.read_i32(w1) as i8,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NloScanComplete {
    pub vdev_id: u8,
}

impl Message for NloScanComplete {
    const CODE: u8 = EventTag::NloScanComplete as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "NLO_SCAN_COMPLETE",
        header: &[WordLayout::Fields(nlo::COMPLETE_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (VDEV_ID, i64::from(self.vdev_id))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
        })
    }
}

// ============================================================================
// RSSI Breach / Extscan
// ============================================================================

mod rssi_breach {
    use super::*;

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("event_mask", BYTE2),
        named("rssi", RSSI_HI),
    ];
    pub const W1: &[NamedField] = &[named("request_id", FULL_WORD)];
    pub const W2: &[NamedField] = &[MAC_LO];
    pub const W3: &[NamedField] = &[MAC_HI];
}

/// Monitored RSSI crossed a configured threshold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RssiBreach {
    pub vdev_id: u8,
    pub event_mask: u8,
    pub rssi: i8,
    pub request_id: u32,
    pub bssid: MacAddr,
}

impl Message for RssiBreach {
    const CODE: u8 = EventTag::RssiBreach as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RSSI_BREACH",
        header: &[
            WordLayout::Fields(rssi_breach::W0),
            WordLayout::Fields(rssi_breach::W1),
            WordLayout::Fields(rssi_breach::W2),
            WordLayout::Fields(rssi_breach::W3),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (BYTE2, i64::from(self.event_mask)),
            (RSSI_HI, i64::from(self.rssi)),
        ])?;
        w.raw(self.request_id);
        w.raw(mac_lo(&self.bssid));
        w.word(&[(MAC_HI.spec, mac_hi(&self.bssid))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let request_id = r.word()?;
        let lo = r.word()?;
        let hi = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            event_mask: BYTE2.read_u32(w0) as u8,
            rssi: RSSI_HI.read_i32(w0) as i8,
            request_id,
            bssid: mac_from_words(lo, hi),
        })
    }
}

mod extscan {
    use super::*;

    pub const EVENT_TYPE: FieldSpec = FieldSpec::uint(8, 8);
    pub const W0: &[NamedField] = &[TYPE_FIELD, named("event_type", EVENT_TYPE)];
    pub const W1: &[NamedField] = &[named("request_id", FULL_WORD)];
    pub const W2: &[NamedField] = &[named("bucket_id", LOW_HALF)];
}

/// Extended scan progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtscanEvent {
    pub event_type: u8,
    pub request_id: u32,
    pub bucket_id: u16,
}

impl Message for ExtscanEvent {
    const CODE: u8 = EventTag::ExtscanEvent as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "EXTSCAN_EVENT",
        header: &[
            WordLayout::Fields(extscan::W0),
            WordLayout::Fields(extscan::W1),
            WordLayout::Fields(extscan::W2),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (extscan::EVENT_TYPE, i64::from(self.event_type)),
        ])?;
        w.raw(self.request_id);
        w.word(&[(LOW_HALF, i64::from(self.bucket_id))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let request_id = r.word()?;
        let w2 = r.word()?;
        Ok(Self {
            event_type: extscan::EVENT_TYPE.read_u32(w0) as u8,
            request_id,
            bucket_id: LOW_HALF.read_u32(w2) as u16,
        })
    }
}

// ============================================================================
// Channel Switch / TDLS
// ============================================================================

mod csa {
    use super::*;

    pub const SWITCH_COUNT: FieldSpec = FieldSpec::uint(8, 8);
    pub const W0: &[NamedField] = &[TYPE_FIELD, named("switch_count", SWITCH_COUNT)];
    pub const W1: &[NamedField] = &[named("new_chan_freq", LOW_HALF)];
    pub const W2: &[NamedField] = &[MAC_LO];
    pub const W3: &[NamedField] = &[MAC_HI];
}

/// The AP announced a channel switch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsaSwitch {
    pub switch_count: u8,
    pub new_chan_freq: u16,
    pub bssid: MacAddr,
}

impl Message for CsaSwitch {
    const CODE: u8 = EventTag::CsaSwitch as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "CSA_SWITCH",
        header: &[
            WordLayout::Fields(csa::W0),
            WordLayout::Fields(csa::W1),
            WordLayout::Fields(csa::W2),
            WordLayout::Fields(csa::W3),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (csa::SWITCH_COUNT, i64::from(self.switch_count)),
        ])?;
        w.word(&[(LOW_HALF, i64::from(self.new_chan_freq))])?;
        w.raw(mac_lo(&self.bssid));
        w.word(&[(MAC_HI.spec, mac_hi(&self.bssid))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let lo = r.word()?;
        let hi = r.word()?;
        Ok(Self {
            switch_count: csa::SWITCH_COUNT.read_u32(w0) as u8,
            new_chan_freq: LOW_HALF.read_u32(w1) as u16,
            bssid: mac_from_words(lo, hi),
        })
    }
}

mod tdls {
    use super::*;

    pub const REASON: FieldSpec = FieldSpec::uint(24, 8);
    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("event_type", BYTE2),
        named("reason", REASON),
    ];
    pub const W1: &[NamedField] = &[MAC_LO];
    pub const W2: &[NamedField] = &[MAC_HI];
}

/// TDLS connection tracker asks the host to set up or tear down a link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TdlsEvent {
    pub vdev_id: u8,
    pub event_type: u8,
    pub reason: u8,
    pub peer: MacAddr,
}

impl Message for TdlsEvent {
    const CODE: u8 = EventTag::TdlsEvent as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "TDLS_EVENT",
        header: &[
            WordLayout::Fields(tdls::W0),
            WordLayout::Fields(tdls::W1),
            WordLayout::Fields(tdls::W2),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (BYTE2, i64::from(self.event_type)),
            (tdls::REASON, i64::from(self.reason)),
        ])?;
        w.raw(mac_lo(&self.peer));
        w.word(&[(MAC_HI.spec, mac_hi(&self.peer))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let lo = r.word()?;
        let hi = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            event_type: BYTE2.read_u32(w0) as u8,
            reason: tdls::REASON.read_u32(w0) as u8,
            peer: mac_from_words(lo, hi),
        })
    }
}

// ============================================================================
// Opaque Data Events
// ============================================================================

mod data_event {
    use super::*;

    pub const NAN_W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("data_len", HIGH_HALF),
    ];
    pub const OEM_W0: &[NamedField] = &[TYPE_FIELD, named("data_len", HIGH_HALF)];
}

fn read_data(r: &mut WordReader<'_>, w0: u32) -> Result<Vec<u8>, CodecError> {
    let len = HIGH_HALF.read_u32(w0) as usize;
    r.expect_records(len, 1)?;
    Ok(r.bytes(len)?.to_vec())
}

/// Neighbor awareness networking event; the body is opaque to the host
/// datapath.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NanEvent {
    pub vdev_id: u8,
    pub data: Vec<u8>,
}

impl Message for NanEvent {
    const CODE: u8 = EventTag::NanEvent as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "NAN_EVENT",
        header: &[WordLayout::Fields(data_event::NAN_W0)],
        records: RecordLayout::Bytes(1),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (HIGH_HALF, self.data.len() as i64),
        ])?;
        w.bytes_padded(&self.data);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            data: read_data(r, w0)?,
        })
    }
}

/// Vendor response addressed to an OEM host component.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OemResponse {
    pub data: Vec<u8>,
}

impl Message for OemResponse {
    const CODE: u8 = EventTag::OemResponse as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "OEM_RESPONSE",
        header: &[WordLayout::Fields(data_event::OEM_W0)],
        records: RecordLayout::Bytes(1),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (HIGH_HALF, self.data.len() as i64)])?;
        w.bytes_padded(&self.data);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            data: read_data(r, w0)?,
        })
    }
}

// ============================================================================
// Power / P2P
// ============================================================================

mod misc {
    use super::*;

    pub const TAG_ONLY: &[NamedField] = &[TYPE_FIELD];
    pub const P2P_W0: &[NamedField] = &[
        TYPE_FIELD,
        named("vdev_id", VDEV_ID),
        named("reason", BYTE2),
    ];
}

/// Chip lost power while the host slept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChipPowerFailure;

impl Message for ChipPowerFailure {
    const CODE: u8 = EventTag::ChipPowerFailure as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "CHIP_POWER_FAILURE",
        header: &[WordLayout::Fields(misc::TAG_ONLY)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        Ok(Self)
    }
}

/// Offloaded P2P listen stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct P2pListenOffloadStop {
    pub vdev_id: u8,
    pub reason: u8,
}

impl Message for P2pListenOffloadStop {
    const CODE: u8 = EventTag::P2pListenOffloadStop as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "P2P_LISTEN_OFFLOAD_STOP",
        header: &[WordLayout::Fields(misc::P2P_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (VDEV_ID, i64::from(self.vdev_id)),
            (BYTE2, i64::from(self.reason)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            vdev_id: VDEV_ID.read_u32(w0) as u8,
            reason: BYTE2.read_u32(w0) as u8,
        })
    }
}

// ============================================================================
// Decoded Piggyback
// ============================================================================

/// A decoded embedded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PiggybackEvent {
    RoamEvent(RoamEvent),
    RoamSynch(RoamSynch),
    NloMatch(NloMatch),
    NloScanComplete(NloScanComplete),
    RssiBreach(RssiBreach),
    ExtscanEvent(ExtscanEvent),
    CsaSwitch(CsaSwitch),
    TdlsEvent(TdlsEvent),
    NanEvent(NanEvent),
    OemResponse(OemResponse),
    ChipPowerFailure(ChipPowerFailure),
    P2pListenOffloadStop(P2pListenOffloadStop),
    /// Target-to-host message carried by HTT_EVENT.
    Htt(T2hMessage),
}

impl PiggybackEvent {
    /// Event tag, or the message type code for HTT indications.
    pub fn tag(&self) -> u8 {
        match self {
            PiggybackEvent::RoamEvent(_) => RoamEvent::CODE,
            PiggybackEvent::RoamSynch(_) => RoamSynch::CODE,
            PiggybackEvent::NloMatch(_) => NloMatch::CODE,
            PiggybackEvent::NloScanComplete(_) => NloScanComplete::CODE,
            PiggybackEvent::RssiBreach(_) => RssiBreach::CODE,
            PiggybackEvent::ExtscanEvent(_) => ExtscanEvent::CODE,
            PiggybackEvent::CsaSwitch(_) => CsaSwitch::CODE,
            PiggybackEvent::TdlsEvent(_) => TdlsEvent::CODE,
            PiggybackEvent::NanEvent(_) => NanEvent::CODE,
            PiggybackEvent::OemResponse(_) => OemResponse::CODE,
            PiggybackEvent::ChipPowerFailure(_) => ChipPowerFailure::CODE,
            PiggybackEvent::P2pListenOffloadStop(_) => P2pListenOffloadStop::CODE,
            PiggybackEvent::Htt(msg) => msg.msg_type().to_byte(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PiggybackEvent::Htt(msg) => msg.msg_type().name(),
            other => EventTag::from_byte(other.tag())
                .map(EventTag::name)
                .unwrap_or("UNKNOWN"),
        }
    }

    /// Encode for the wire; HTT indications use `width`.
    pub fn encode(&self, width: AddressWidth) -> Result<Vec<u8>, FieldOverflow> {
        match self {
            PiggybackEvent::RoamEvent(e) => e.encode(width),
            PiggybackEvent::RoamSynch(e) => e.encode(width),
            PiggybackEvent::NloMatch(e) => e.encode(width),
            PiggybackEvent::NloScanComplete(e) => e.encode(width),
            PiggybackEvent::RssiBreach(e) => e.encode(width),
            PiggybackEvent::ExtscanEvent(e) => e.encode(width),
            PiggybackEvent::CsaSwitch(e) => e.encode(width),
            PiggybackEvent::TdlsEvent(e) => e.encode(width),
            PiggybackEvent::NanEvent(e) => e.encode(width),
            PiggybackEvent::OemResponse(e) => e.encode(width),
            PiggybackEvent::ChipPowerFailure(e) => e.encode(width),
            PiggybackEvent::P2pListenOffloadStop(e) => e.encode(width),
            PiggybackEvent::Htt(msg) => msg.encode(width),
        }
    }
}

fn decode_tagged(tag: EventTag, data: &[u8], width: AddressWidth) -> Result<PiggybackEvent, CodecError> {
    Ok(match tag {
        EventTag::RoamEvent => PiggybackEvent::RoamEvent(RoamEvent::decode(data, width)?),
        EventTag::RoamSynch => PiggybackEvent::RoamSynch(RoamSynch::decode(data, width)?),
        EventTag::NloMatch => PiggybackEvent::NloMatch(NloMatch::decode(data, width)?),
        EventTag::NloScanComplete => {
            PiggybackEvent::NloScanComplete(NloScanComplete::decode(data, width)?)
        }
        EventTag::RssiBreach => PiggybackEvent::RssiBreach(RssiBreach::decode(data, width)?),
        EventTag::ExtscanEvent => PiggybackEvent::ExtscanEvent(ExtscanEvent::decode(data, width)?),
        EventTag::CsaSwitch => PiggybackEvent::CsaSwitch(CsaSwitch::decode(data, width)?),
        EventTag::TdlsEvent => PiggybackEvent::TdlsEvent(TdlsEvent::decode(data, width)?),
        EventTag::NanEvent => PiggybackEvent::NanEvent(NanEvent::decode(data, width)?),
        EventTag::OemResponse => PiggybackEvent::OemResponse(OemResponse::decode(data, width)?),
        EventTag::ChipPowerFailure => {
            PiggybackEvent::ChipPowerFailure(ChipPowerFailure::decode(data, width)?)
        }
        EventTag::P2pListenOffloadStop => {
            PiggybackEvent::P2pListenOffloadStop(P2pListenOffloadStop::decode(data, width)?)
        }
    })
}

/// Decode the event piggybacked on a wake notification.
///
/// An empty payload means firmware attached nothing and yields `Ok(None)`.
/// A tag the reason does not allow is reported as `UnknownType`.
pub fn decode_piggyback(
    embedded: Embedded,
    payload: &[u8],
    width: AddressWidth,
) -> Result<Option<PiggybackEvent>, CodecError> {
    let Some(&tag) = payload.first() else {
        return Ok(None);
    };

    if !embedded.allows(tag) {
        return Err(CodecError::UnknownType(tag));
    }

    match embedded {
        Embedded::Htt => decode_t2h(payload, width).map(|msg| Some(PiggybackEvent::Htt(msg))),
        Embedded::Events(_) => {
            let tag = EventTag::from_byte(tag).ok_or(CodecError::UnknownType(tag))?;
            decode_tagged(tag, payload, width).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::t2h::PeerUnmap;
    use crate::wake::reason::{Payload, WakeReason};

    const W32: AddressWidth = AddressWidth::Addr32;

    fn roam_events() -> Embedded {
        match WakeReason::LOW_RSSI.payload() {
            Payload::Piggybacked(e) => e,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_event_tags_round_trip() {
        for tag in EventTag::ALL {
            assert_eq!(EventTag::from_byte(tag.to_byte()), Some(tag));
        }
        assert_eq!(EventTag::from_byte(0x03), None);
    }

    #[test]
    fn test_roam_event_negative_rssi() {
        let event = RoamEvent {
            vdev_id: 1,
            roam_reason: 4,
            rssi: -80,
        };
        let bytes = event.encode(W32).unwrap();
        assert_eq!(bytes, [0x01, 0x01, 0x04, (-80i8) as u8]);
        assert_eq!(RoamEvent::decode(&bytes, W32).unwrap(), event);
    }

    #[test]
    fn test_roam_synch_layout() {
        let event = RoamSynch {
            vdev_id: 0,
            roam_reason: 1,
            rssi: -60,
            bssid: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            chan_freq: 5180,
            auth_status: 1,
            kck_len: 16,
            kek_len: 16,
        };
        let bytes = event.encode(W32).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &[0x00, 0x11, 0x22, 0x33]);
        assert_eq!(&bytes[8..10], &[0x44, 0x55]);
        assert_eq!(u16::from_le_bytes([bytes[10], bytes[11]]), 5180);
        assert_eq!(RoamSynch::decode(&bytes, W32).unwrap(), event);
    }

    #[test]
    fn test_nan_event_data() {
        let event = NanEvent {
            vdev_id: 2,
            data: vec![1, 2, 3, 4, 5],
        };
        let bytes = event.encode(W32).unwrap();
        assert_eq!(bytes.len(), 4 + 8);
        assert_eq!(NanEvent::decode(&bytes, W32).unwrap(), event);

        let mut short = bytes.clone();
        short[2] = 0x40;
        assert!(matches!(
            NanEvent::decode(&short, W32),
            Err(CodecError::TruncatedRecords { count: 0x40, .. })
        ));
    }

    #[test]
    fn test_decode_piggyback_allowed_tag() {
        let bytes = RoamEvent {
            vdev_id: 3,
            roam_reason: 2,
            rssi: -70,
        }
        .encode(W32)
        .unwrap();
        let event = decode_piggyback(roam_events(), &bytes, W32)
            .unwrap()
            .unwrap();
        assert_eq!(event.tag(), 0x01);
        assert_eq!(event.name(), "ROAM_EVENT");
    }

    #[test]
    fn test_decode_piggyback_rejects_foreign_tag() {
        let bytes = NloScanComplete { vdev_id: 0 }.encode(W32).unwrap();
        assert_eq!(
            decode_piggyback(roam_events(), &bytes, W32),
            Err(CodecError::UnknownType(0x11))
        );
    }

    #[test]
    fn test_decode_piggyback_empty() {
        assert_eq!(
            decode_piggyback(roam_events(), &[], W32),
            Ok(None)
        );
    }

    #[test]
    fn test_decode_piggyback_truncated() {
        assert_eq!(
            decode_piggyback(roam_events(), &[0x02, 0x00], W32),
            Err(CodecError::TooShort {
                expected: 16,
                got: 2
            })
        );
    }

    #[test]
    fn test_decode_piggyback_htt() {
        let msg = T2hMessage::from(PeerUnmap { peer_id: 7 });
        let bytes = msg.encode(W32).unwrap();
        let event = decode_piggyback(Embedded::Htt, &bytes, W32)
            .unwrap()
            .unwrap();
        assert_eq!(event, PiggybackEvent::Htt(msg));
        assert_eq!(event.encode(W32).unwrap(), bytes);
    }
}
