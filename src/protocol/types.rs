//! Message type codes for both directions.
//!
//! Codes are append-only: once a code ships in a protocol minor version
//! its meaning never changes. Retired messages keep their code and stay
//! decodable; they are reported by `is_deprecated()`. Renamed identifiers
//! survive as deprecated associated constants.

use std::fmt;

// ============================================================================
// Protocol Version
// ============================================================================

/// Protocol major.minor version exchanged in the version handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Two versions interoperate when their major numbers match.
    pub fn is_compatible(&self, other: &ProtocolVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version implemented by this crate.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(3, 60);

/// Direction a message travels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    HostToTarget,
    TargetToHost,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::HostToTarget => "h2t",
            Direction::TargetToHost => "t2h",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Host -> Target
// ============================================================================

/// Host-to-target message type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum H2tMsgType {
    /// Version request carrying the host's option TLVs.
    VersionReq = 0x00,
    /// Transmit a frame by descriptor.
    TxFrm = 0x01,
    /// Configure receive rings.
    RxRingCfg = 0x02,
    /// Request statistics upload.
    StatsReq = 0x03,
    /// Synchronize on a host counter.
    Sync = 0x04,
    /// Aggregation limits.
    AggrCfg = 0x05,
    /// Configure fragment descriptor banks.
    FragDescBankCfg = 0x06,
    /// Management frame transmit, superseded by TX_FRM.
    MgmtTx = 0x07,
    /// Data path offload operation request.
    WdiIpaOpReq = 0x09,
    /// Extended aggregation limits.
    AggrCfgEx = 0x0a,
}

impl H2tMsgType {
    /// All codes in wire order.
    pub const ALL: &'static [H2tMsgType] = &[
        H2tMsgType::VersionReq,
        H2tMsgType::TxFrm,
        H2tMsgType::RxRingCfg,
        H2tMsgType::StatsReq,
        H2tMsgType::Sync,
        H2tMsgType::AggrCfg,
        H2tMsgType::FragDescBankCfg,
        H2tMsgType::MgmtTx,
        H2tMsgType::WdiIpaOpReq,
        H2tMsgType::AggrCfgEx,
    ];

    /// Former name of [`H2tMsgType::WdiIpaOpReq`].
    #[deprecated(note = "renamed to `WdiIpaOpReq`")]
    pub const IPA_OP_REQ: H2tMsgType = H2tMsgType::WdiIpaOpReq;

    /// Try to convert from a byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(H2tMsgType::VersionReq),
            0x01 => Some(H2tMsgType::TxFrm),
            0x02 => Some(H2tMsgType::RxRingCfg),
            0x03 => Some(H2tMsgType::StatsReq),
            0x04 => Some(H2tMsgType::Sync),
            0x05 => Some(H2tMsgType::AggrCfg),
            0x06 => Some(H2tMsgType::FragDescBankCfg),
            0x07 => Some(H2tMsgType::MgmtTx),
            0x09 => Some(H2tMsgType::WdiIpaOpReq),
            0x0a => Some(H2tMsgType::AggrCfgEx),
            _ => None,
        }
    }

    /// Convert to a byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Minor protocol version that introduced this code.
    pub fn since(self) -> ProtocolVersion {
        let minor = match self {
            H2tMsgType::VersionReq
            | H2tMsgType::TxFrm
            | H2tMsgType::RxRingCfg
            | H2tMsgType::StatsReq
            | H2tMsgType::Sync
            | H2tMsgType::AggrCfg => 0,
            H2tMsgType::MgmtTx => 2,
            H2tMsgType::FragDescBankCfg => 14,
            H2tMsgType::WdiIpaOpReq => 30,
            H2tMsgType::AggrCfgEx => 45,
        };
        ProtocolVersion::new(PROTOCOL_VERSION.major, minor)
    }

    /// Retired but still decodable.
    pub fn is_deprecated(self) -> bool {
        matches!(self, H2tMsgType::MgmtTx)
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            H2tMsgType::VersionReq => "VERSION_REQ",
            H2tMsgType::TxFrm => "TX_FRM",
            H2tMsgType::RxRingCfg => "RX_RING_CFG",
            H2tMsgType::StatsReq => "STATS_REQ",
            H2tMsgType::Sync => "SYNC",
            H2tMsgType::AggrCfg => "AGGR_CFG",
            H2tMsgType::FragDescBankCfg => "FRAG_DESC_BANK_CFG",
            H2tMsgType::MgmtTx => "MGMT_TX",
            H2tMsgType::WdiIpaOpReq => "WDI_IPA_OP_REQ",
            H2tMsgType::AggrCfgEx => "AGGR_CFG_EX",
        }
    }
}

impl fmt::Display for H2tMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Target -> Host
// ============================================================================

/// Target-to-host message type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum T2hMsgType {
    /// Version confirmation carrying the target's option TLVs.
    VersionConf = 0x00,
    /// Flush buffered rx MPDUs.
    RxFlush = 0x02,
    /// Firmware assigned a peer id.
    PeerMap = 0x03,
    /// Firmware released a peer id.
    PeerUnmap = 0x04,
    /// Block-ack session added.
    RxAddba = 0x05,
    /// Block-ack session deleted.
    RxDelba = 0x06,
    /// Per-frame tx completion.
    TxComplInd = 0x07,
    /// Rate control update, no longer sent by current firmware.
    RcUpdateInd = 0x0c,
    /// Management frame tx completion.
    MgmtTxComplInd = 0x0e,
    /// Bulk tx credit update.
    TxCreditUpdateInd = 0x0f,
    /// Rx packet number check request.
    RxPnInd = 0x10,
    /// In-order rx delivery by physical address.
    RxInOrdPaddrInd = 0x12,
    /// Operating channel changed.
    ChanChange = 0x14,
    /// Tx flow pools created.
    FlowPoolMap = 0x18,
    /// Tx flow pool removed.
    FlowPoolUnmap = 0x19,
}

impl T2hMsgType {
    /// All codes in wire order.
    pub const ALL: &'static [T2hMsgType] = &[
        T2hMsgType::VersionConf,
        T2hMsgType::RxFlush,
        T2hMsgType::PeerMap,
        T2hMsgType::PeerUnmap,
        T2hMsgType::RxAddba,
        T2hMsgType::RxDelba,
        T2hMsgType::TxComplInd,
        T2hMsgType::RcUpdateInd,
        T2hMsgType::MgmtTxComplInd,
        T2hMsgType::TxCreditUpdateInd,
        T2hMsgType::RxPnInd,
        T2hMsgType::RxInOrdPaddrInd,
        T2hMsgType::ChanChange,
        T2hMsgType::FlowPoolMap,
        T2hMsgType::FlowPoolUnmap,
    ];

    /// Former name of [`T2hMsgType::RxInOrdPaddrInd`].
    #[deprecated(note = "renamed to `RxInOrdPaddrInd`")]
    pub const RX_PADDR_IND: T2hMsgType = T2hMsgType::RxInOrdPaddrInd;

    /// Former name of [`T2hMsgType::TxCreditUpdateInd`].
    #[deprecated(note = "renamed to `TxCreditUpdateInd`")]
    pub const TX_CREDIT_IND: T2hMsgType = T2hMsgType::TxCreditUpdateInd;

    /// Try to convert from a byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x00 => Some(T2hMsgType::VersionConf),
            0x02 => Some(T2hMsgType::RxFlush),
            0x03 => Some(T2hMsgType::PeerMap),
            0x04 => Some(T2hMsgType::PeerUnmap),
            0x05 => Some(T2hMsgType::RxAddba),
            0x06 => Some(T2hMsgType::RxDelba),
            0x07 => Some(T2hMsgType::TxComplInd),
            0x0c => Some(T2hMsgType::RcUpdateInd),
            0x0e => Some(T2hMsgType::MgmtTxComplInd),
            0x0f => Some(T2hMsgType::TxCreditUpdateInd),
            0x10 => Some(T2hMsgType::RxPnInd),
            0x12 => Some(T2hMsgType::RxInOrdPaddrInd),
            0x14 => Some(T2hMsgType::ChanChange),
            0x18 => Some(T2hMsgType::FlowPoolMap),
            0x19 => Some(T2hMsgType::FlowPoolUnmap),
            _ => None,
        }
    }

    /// Convert to a byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Minor protocol version that introduced this code.
    pub fn since(self) -> ProtocolVersion {
        let minor = match self {
            T2hMsgType::VersionConf
            | T2hMsgType::RxFlush
            | T2hMsgType::PeerMap
            | T2hMsgType::PeerUnmap
            | T2hMsgType::RxAddba
            | T2hMsgType::RxDelba
            | T2hMsgType::TxComplInd
            | T2hMsgType::RcUpdateInd => 0,
            T2hMsgType::MgmtTxComplInd => 2,
            T2hMsgType::TxCreditUpdateInd => 3,
            T2hMsgType::RxPnInd => 8,
            T2hMsgType::RxInOrdPaddrInd => 18,
            T2hMsgType::ChanChange => 22,
            T2hMsgType::FlowPoolMap | T2hMsgType::FlowPoolUnmap => 31,
        };
        ProtocolVersion::new(PROTOCOL_VERSION.major, minor)
    }

    /// Retired but still decodable.
    pub fn is_deprecated(self) -> bool {
        matches!(self, T2hMsgType::RcUpdateInd)
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            T2hMsgType::VersionConf => "VERSION_CONF",
            T2hMsgType::RxFlush => "RX_FLUSH",
            T2hMsgType::PeerMap => "PEER_MAP",
            T2hMsgType::PeerUnmap => "PEER_UNMAP",
            T2hMsgType::RxAddba => "RX_ADDBA",
            T2hMsgType::RxDelba => "RX_DELBA",
            T2hMsgType::TxComplInd => "TX_COMPL_IND",
            T2hMsgType::RcUpdateInd => "RC_UPDATE_IND",
            T2hMsgType::MgmtTxComplInd => "MGMT_TX_COMPL_IND",
            T2hMsgType::TxCreditUpdateInd => "TX_CREDIT_UPDATE_IND",
            T2hMsgType::RxPnInd => "RX_PN_IND",
            T2hMsgType::RxInOrdPaddrInd => "RX_IN_ORD_PADDR_IND",
            T2hMsgType::ChanChange => "CHAN_CHANGE",
            T2hMsgType::FlowPoolMap => "FLOW_POOL_MAP",
            T2hMsgType::FlowPoolUnmap => "FLOW_POOL_UNMAP",
        }
    }
}

impl fmt::Display for T2hMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Either Direction
// ============================================================================

/// A message type code qualified by its direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    H2t(H2tMsgType),
    T2h(T2hMsgType),
}

impl MessageType {
    /// Resolve a code in the given direction's namespace.
    pub fn from_byte(direction: Direction, b: u8) -> Option<Self> {
        match direction {
            Direction::HostToTarget => H2tMsgType::from_byte(b).map(MessageType::H2t),
            Direction::TargetToHost => T2hMsgType::from_byte(b).map(MessageType::T2h),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            MessageType::H2t(t) => t.to_byte(),
            MessageType::T2h(t) => t.to_byte(),
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            MessageType::H2t(_) => Direction::HostToTarget,
            MessageType::T2h(_) => Direction::TargetToHost,
        }
    }

    pub fn since(self) -> ProtocolVersion {
        match self {
            MessageType::H2t(t) => t.since(),
            MessageType::T2h(t) => t.since(),
        }
    }

    pub fn is_deprecated(self) -> bool {
        match self {
            MessageType::H2t(t) => t.is_deprecated(),
            MessageType::T2h(t) => t.is_deprecated(),
        }
    }

    /// Check whether a peer speaking `version` knows this code.
    pub fn is_supported_by(self, version: ProtocolVersion) -> bool {
        let since = self.since();
        version.major == since.major && version.minor >= since.minor
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::H2t(t) => write!(f, "h2t:{}", t),
            MessageType::T2h(t) => write!(f, "t2h:{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h2t_roundtrip_all() {
        for &t in H2tMsgType::ALL {
            assert_eq!(H2tMsgType::from_byte(t.to_byte()), Some(t));
        }
        assert_eq!(H2tMsgType::from_byte(0x08), None);
        assert_eq!(H2tMsgType::from_byte(0xff), None);
    }

    #[test]
    fn test_t2h_roundtrip_all() {
        for &t in T2hMsgType::ALL {
            assert_eq!(T2hMsgType::from_byte(t.to_byte()), Some(t));
        }
        assert_eq!(T2hMsgType::from_byte(0x01), None);
        assert_eq!(T2hMsgType::from_byte(0x11), None);
    }

    #[test]
    fn test_codes_strictly_ascending() {
        // Appending keeps the tables sorted by code.
        assert!(H2tMsgType::ALL.windows(2).all(|w| w[0].to_byte() < w[1].to_byte()));
        assert!(T2hMsgType::ALL.windows(2).all(|w| w[0].to_byte() < w[1].to_byte()));
    }

    #[test]
    #[allow(deprecated)]
    fn test_deprecated_aliases_resolve() {
        assert_eq!(H2tMsgType::IPA_OP_REQ, H2tMsgType::WdiIpaOpReq);
        assert_eq!(T2hMsgType::RX_PADDR_IND.to_byte(), 0x12);
        assert_eq!(T2hMsgType::TX_CREDIT_IND, T2hMsgType::TxCreditUpdateInd);
        assert!(H2tMsgType::MgmtTx.is_deprecated());
        assert!(T2hMsgType::RcUpdateInd.is_deprecated());
        assert!(!T2hMsgType::PeerMap.is_deprecated());
    }

    #[test]
    fn test_supported_by_version() {
        let t = MessageType::T2h(T2hMsgType::FlowPoolMap);
        assert!(t.is_supported_by(PROTOCOL_VERSION));
        assert!(!t.is_supported_by(ProtocolVersion::new(3, 30)));
        assert!(!t.is_supported_by(ProtocolVersion::new(2, 60)));
        assert!(MessageType::H2t(H2tMsgType::VersionReq).is_supported_by(ProtocolVersion::new(3, 0)));
    }

    #[test]
    fn test_since_never_exceeds_current() {
        for &t in H2tMsgType::ALL {
            assert!(MessageType::H2t(t).is_supported_by(PROTOCOL_VERSION));
        }
        for &t in T2hMsgType::ALL {
            assert!(MessageType::T2h(t).is_supported_by(PROTOCOL_VERSION));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(MessageType::T2h(T2hMsgType::PeerMap).to_string(), "t2h:PEER_MAP");
        assert_eq!(H2tMsgType::TxFrm.to_string(), "TX_FRM");
        assert_eq!(PROTOCOL_VERSION.to_string(), "3.60");
        assert_eq!(Direction::HostToTarget.to_string(), "h2t");
    }
}
