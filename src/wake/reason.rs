//! Wake reason table.
//!
//! Firmware tags every wake-up with a signed reason code. The table maps
//! each code to its name and to what the accompanying payload holds.
//! Codes not in the table are valid input: they classify as carrying no
//! payload.

use super::event::EventTag;
use std::fmt;

/// Firmware wake reason code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WakeReason(pub i32);

impl WakeReason {
    pub const UNSPECIFIED: WakeReason = WakeReason(-1);
    pub const NLOD: WakeReason = WakeReason(0);
    pub const AP_ASSOC_LOST: WakeReason = WakeReason(1);
    pub const LOW_RSSI: WakeReason = WakeReason(2);
    pub const DEAUTH_RECVD: WakeReason = WakeReason(3);
    pub const DISASSOC_RECVD: WakeReason = WakeReason(4);
    pub const GTK_HS_ERR: WakeReason = WakeReason(5);
    pub const EAP_REQ: WakeReason = WakeReason(6);
    pub const FOURWAY_HS_RECV: WakeReason = WakeReason(7);
    pub const TIMER_INTR_RECV: WakeReason = WakeReason(8);
    pub const PATTERN_MATCH_FOUND: WakeReason = WakeReason(9);
    pub const RECV_MAGIC_PATTERN: WakeReason = WakeReason(10);
    pub const P2P_DISC: WakeReason = WakeReason(11);
    pub const WLAN_HB: WakeReason = WakeReason(12);
    pub const CSA_EVENT: WakeReason = WakeReason(13);
    pub const PROBE_REQ_WPS_IE_RECV: WakeReason = WakeReason(14);
    pub const AUTH_REQ_RECV: WakeReason = WakeReason(15);
    pub const ASSOC_REQ_RECV: WakeReason = WakeReason(16);
    pub const HTT_EVENT: WakeReason = WakeReason(17);
    pub const RA_MATCH: WakeReason = WakeReason(18);
    pub const HOST_AUTO_SHUTDOWN: WakeReason = WakeReason(19);
    pub const IOAC_MAGIC: WakeReason = WakeReason(20);
    pub const IOAC_SHORT: WakeReason = WakeReason(21);
    pub const IOAC_EXTEND: WakeReason = WakeReason(22);
    pub const IOAC_TIMER: WakeReason = WakeReason(23);
    pub const ROAM_HO: WakeReason = WakeReason(24);
    pub const DFS_PHYERR: WakeReason = WakeReason(25);
    pub const BEACON_RECV: WakeReason = WakeReason(26);
    pub const CLIENT_KICKOUT: WakeReason = WakeReason(27);
    pub const NAN_EVENT: WakeReason = WakeReason(28);
    pub const EXTSCAN: WakeReason = WakeReason(29);
    pub const RSSI_BREACH: WakeReason = WakeReason(30);
    pub const IOAC_REV_KA_FAIL: WakeReason = WakeReason(31);
    pub const IOAC_SOCK: WakeReason = WakeReason(32);
    pub const NLO_SCAN_COMPLETE: WakeReason = WakeReason(33);
    pub const PACKET_FILTER_MATCH: WakeReason = WakeReason(34);
    pub const ASSOC_RES_RECV: WakeReason = WakeReason(35);
    pub const REASSOC_REQ_RECV: WakeReason = WakeReason(36);
    pub const REASSOC_RES_RECV: WakeReason = WakeReason(37);
    pub const ACTION_FRAME_RECV: WakeReason = WakeReason(38);
    pub const BPF_ALLOW: WakeReason = WakeReason(39);
    pub const NAN_DATA: WakeReason = WakeReason(40);
    pub const OEM_RESPONSE: WakeReason = WakeReason(41);
    pub const TDLS_CONN_TRACKER: WakeReason = WakeReason(42);
    pub const CRITICAL_LOG: WakeReason = WakeReason(43);
    pub const P2P_LISTEN_OFFLOAD: WakeReason = WakeReason(44);
    pub const NAN_WAKE_HOST: WakeReason = WakeReason(45);
    pub const CHIP_POWER_FAILURE: WakeReason = WakeReason(46);
    pub const DEBUG_TEST: WakeReason = WakeReason(255);

    /// Raw code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Table entry, if the code is known.
    pub fn info(self) -> Option<&'static ReasonInfo> {
        REASONS
            .binary_search_by_key(&self.0, |entry| entry.reason.0)
            .ok()
            .map(|i| &REASONS[i])
    }

    pub fn is_known(self) -> bool {
        self.info().is_some()
    }

    /// Upper-case name, `UNKNOWN` for codes not in the table.
    pub fn name(self) -> &'static str {
        self.info().map(|i| i.name).unwrap_or("UNKNOWN")
    }

    /// What the payload of this reason holds.
    pub fn payload(self) -> Payload {
        self.info().map(|i| i.payload).unwrap_or(Payload::None)
    }

    pub fn classify(self) -> PayloadClass {
        self.payload().class()
    }

    /// Every known reason in code order.
    pub fn all() -> impl Iterator<Item = WakeReason> {
        REASONS.iter().map(|entry| entry.reason)
    }
}

impl From<i32> for WakeReason {
    fn from(code: i32) -> Self {
        WakeReason(code)
    }
}

impl fmt::Display for WakeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.info() {
            Some(info) => write!(f, "{}", info.name),
            None => write!(f, "UNKNOWN({})", self.0),
        }
    }
}

// ============================================================================
// Payload Classification
// ============================================================================

/// Link-layer format of a raw wake packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameFormat {
    /// Ethernet II, converted from 802.11 data by firmware.
    Ethernet,
    /// 802.11 management frame as received.
    Ieee80211,
}

/// Which embedded messages a piggybacking reason may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Embedded {
    /// One of these event tags.
    Events(&'static [EventTag]),
    /// Any target-to-host catalog message.
    Htt,
}

impl Embedded {
    pub fn allows(&self, tag: u8) -> bool {
        match self {
            Embedded::Events(tags) => tags.iter().any(|t| t.to_byte() == tag),
            Embedded::Htt => true,
        }
    }
}

/// What follows the reason in a wake notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    None,
    Piggybacked(Embedded),
    RawPacket(FrameFormat),
}

impl Payload {
    pub fn class(&self) -> PayloadClass {
        match self {
            Payload::None => PayloadClass::None,
            Payload::Piggybacked(_) => PayloadClass::Piggybacked,
            Payload::RawPacket(_) => PayloadClass::RawPacket,
        }
    }
}

/// Coarse payload classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadClass {
    None,
    Piggybacked,
    RawPacket,
}

impl fmt::Display for PayloadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadClass::None => "none",
            PayloadClass::Piggybacked => "piggybacked",
            PayloadClass::RawPacket => "raw-packet",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Table
// ============================================================================

/// One row of the wake reason table.
#[derive(Debug)]
pub struct ReasonInfo {
    pub reason: WakeReason,
    pub name: &'static str,
    pub payload: Payload,
}

const fn none(reason: WakeReason, name: &'static str) -> ReasonInfo {
    ReasonInfo {
        reason,
        name,
        payload: Payload::None,
    }
}

const fn events(reason: WakeReason, name: &'static str, tags: &'static [EventTag]) -> ReasonInfo {
    ReasonInfo {
        reason,
        name,
        payload: Payload::Piggybacked(Embedded::Events(tags)),
    }
}

const fn eth(reason: WakeReason, name: &'static str) -> ReasonInfo {
    ReasonInfo {
        reason,
        name,
        payload: Payload::RawPacket(FrameFormat::Ethernet),
    }
}

const fn mgmt(reason: WakeReason, name: &'static str) -> ReasonInfo {
    ReasonInfo {
        reason,
        name,
        payload: Payload::RawPacket(FrameFormat::Ieee80211),
    }
}

const ROAM: &[EventTag] = &[EventTag::RoamEvent, EventTag::RoamSynch];
const NAN: &[EventTag] = &[EventTag::NanEvent];

/// Sorted by code for binary search.
static REASONS: &[ReasonInfo] = &[
    none(WakeReason::UNSPECIFIED, "UNSPECIFIED"),
    events(WakeReason::NLOD, "NLOD", &[EventTag::NloMatch]),
    none(WakeReason::AP_ASSOC_LOST, "AP_ASSOC_LOST"),
    events(WakeReason::LOW_RSSI, "LOW_RSSI", ROAM),
    mgmt(WakeReason::DEAUTH_RECVD, "DEAUTH_RECVD"),
    mgmt(WakeReason::DISASSOC_RECVD, "DISASSOC_RECVD"),
    none(WakeReason::GTK_HS_ERR, "GTK_HS_ERR"),
    eth(WakeReason::EAP_REQ, "EAP_REQ"),
    eth(WakeReason::FOURWAY_HS_RECV, "FOURWAY_HS_RECV"),
    none(WakeReason::TIMER_INTR_RECV, "TIMER_INTR_RECV"),
    eth(WakeReason::PATTERN_MATCH_FOUND, "PATTERN_MATCH_FOUND"),
    eth(WakeReason::RECV_MAGIC_PATTERN, "RECV_MAGIC_PATTERN"),
    none(WakeReason::P2P_DISC, "P2P_DISC"),
    none(WakeReason::WLAN_HB, "WLAN_HB"),
    events(WakeReason::CSA_EVENT, "CSA_EVENT", &[EventTag::CsaSwitch]),
    mgmt(WakeReason::PROBE_REQ_WPS_IE_RECV, "PROBE_REQ_WPS_IE_RECV"),
    mgmt(WakeReason::AUTH_REQ_RECV, "AUTH_REQ_RECV"),
    mgmt(WakeReason::ASSOC_REQ_RECV, "ASSOC_REQ_RECV"),
    ReasonInfo {
        reason: WakeReason::HTT_EVENT,
        name: "HTT_EVENT",
        payload: Payload::Piggybacked(Embedded::Htt),
    },
    eth(WakeReason::RA_MATCH, "RA_MATCH"),
    none(WakeReason::HOST_AUTO_SHUTDOWN, "HOST_AUTO_SHUTDOWN"),
    none(WakeReason::IOAC_MAGIC, "IOAC_MAGIC"),
    none(WakeReason::IOAC_SHORT, "IOAC_SHORT"),
    none(WakeReason::IOAC_EXTEND, "IOAC_EXTEND"),
    none(WakeReason::IOAC_TIMER, "IOAC_TIMER"),
    events(WakeReason::ROAM_HO, "ROAM_HO", ROAM),
    none(WakeReason::DFS_PHYERR, "DFS_PHYERR"),
    mgmt(WakeReason::BEACON_RECV, "BEACON_RECV"),
    none(WakeReason::CLIENT_KICKOUT, "CLIENT_KICKOUT"),
    events(WakeReason::NAN_EVENT, "NAN_EVENT", NAN),
    events(WakeReason::EXTSCAN, "EXTSCAN", &[EventTag::ExtscanEvent]),
    events(WakeReason::RSSI_BREACH, "RSSI_BREACH", &[EventTag::RssiBreach]),
    none(WakeReason::IOAC_REV_KA_FAIL, "IOAC_REV_KA_FAIL"),
    none(WakeReason::IOAC_SOCK, "IOAC_SOCK"),
    events(WakeReason::NLO_SCAN_COMPLETE, "NLO_SCAN_COMPLETE", &[EventTag::NloScanComplete]),
    eth(WakeReason::PACKET_FILTER_MATCH, "PACKET_FILTER_MATCH"),
    mgmt(WakeReason::ASSOC_RES_RECV, "ASSOC_RES_RECV"),
    mgmt(WakeReason::REASSOC_REQ_RECV, "REASSOC_REQ_RECV"),
    mgmt(WakeReason::REASSOC_RES_RECV, "REASSOC_RES_RECV"),
    mgmt(WakeReason::ACTION_FRAME_RECV, "ACTION_FRAME_RECV"),
    eth(WakeReason::BPF_ALLOW, "BPF_ALLOW"),
    events(WakeReason::NAN_DATA, "NAN_DATA", NAN),
    events(WakeReason::OEM_RESPONSE, "OEM_RESPONSE", &[EventTag::OemResponse]),
    events(WakeReason::TDLS_CONN_TRACKER, "TDLS_CONN_TRACKER", &[EventTag::TdlsEvent]),
    none(WakeReason::CRITICAL_LOG, "CRITICAL_LOG"),
    events(WakeReason::P2P_LISTEN_OFFLOAD, "P2P_LISTEN_OFFLOAD", &[EventTag::P2pListenOffloadStop]),
    events(WakeReason::NAN_WAKE_HOST, "NAN_WAKE_HOST", NAN),
    events(WakeReason::CHIP_POWER_FAILURE, "CHIP_POWER_FAILURE", &[EventTag::ChipPowerFailure]),
    none(WakeReason::DEBUG_TEST, "DEBUG_TEST"),
];
