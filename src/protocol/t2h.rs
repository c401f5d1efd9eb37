//! Target-to-host messages.

use super::address::BusAddr;
use super::layout::{
    mac_from_words, mac_hi, mac_lo, named, type_code, MacAddr, Message, MessageLayout, NamedField,
    RecordLayout, WordLayout, WordReader, WordWriter, FULL_WORD, HIGH_HALF, LOW_HALF, MAC_HI, MAC_LO,
    TYPE_FIELD,
};
use super::tlv::{decode_tlvs, write_tlvs, OptionTlv};
use super::types::{ProtocolVersion, T2hMsgType};
use super::CodecError;
use crate::bitfield::{FieldOverflow, FieldSpec};

/// Peer id in bits 23:8, shared by several indications.
const PEER_ID_24: FieldSpec = FieldSpec::uint(8, 16);

// ============================================================================
// VERSION_CONF
// ============================================================================

mod version_conf {
    use super::*;

    pub const MINOR: FieldSpec = FieldSpec::uint(8, 8);
    pub const MAJOR: FieldSpec = FieldSpec::uint(16, 8);
    pub const W0: &[NamedField] = &[TYPE_FIELD, named("minor", MINOR), named("major", MAJOR)];
}

/// Version confirmation, the target's answer to VERSION_REQ.
///
/// ```text
/// w0: [type:8][minor:8][major:8][reserved:8]
/// option TLVs...
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionConf {
    pub version: ProtocolVersion,
    pub options: Vec<OptionTlv>,
}

impl Message for VersionConf {
    const CODE: u8 = T2hMsgType::VersionConf as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "VERSION_CONF",
        header: &[WordLayout::Fields(version_conf::W0)],
        records: RecordLayout::OptionTlvs,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (version_conf::MINOR, i64::from(self.version.minor)),
            (version_conf::MAJOR, i64::from(self.version.major)),
        ])?;
        write_tlvs(w, &self.options)
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let base = r.position();
        let options = decode_tlvs(r.rest()).map_err(|e| match e {
            CodecError::MalformedTlv { offset } => CodecError::MalformedTlv {
                offset: base + offset,
            },
            other => other,
        })?;
        Ok(Self {
            version: ProtocolVersion::new(
                version_conf::MAJOR.read_u32(w0) as u8,
                version_conf::MINOR.read_u32(w0) as u8,
            ),
            options,
        })
    }
}

// ============================================================================
// RX_FLUSH
// ============================================================================

mod rx_flush {
    use super::*;

    pub const TID: FieldSpec = FieldSpec::uint(24, 8);
    pub const MPDU_STATUS: FieldSpec = FieldSpec::uint(0, 8);
    pub const SEQ_START: FieldSpec = FieldSpec::uint(8, 6);
    pub const SEQ_END: FieldSpec = FieldSpec::uint(16, 6);

    pub const W0: &[NamedField] = &[TYPE_FIELD, named("peer_id", PEER_ID_24), named("tid", TID)];
    pub const W1: &[NamedField] = &[
        named("mpdu_status", MPDU_STATUS),
        named("seq_start", SEQ_START),
        named("seq_end", SEQ_END),
    ];
}

/// Release or discard a range of buffered rx MPDUs.
///
/// ```text
/// w0: [type:8][peer_id:16][tid:8]
/// w1: [mpdu_status:8][seq_start:6][rsvd:2][seq_end:6][reserved:10]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxFlush {
    pub peer_id: u16,
    pub tid: u8,
    pub mpdu_status: u8,
    pub seq_start: u8,
    pub seq_end: u8,
}

impl Message for RxFlush {
    const CODE: u8 = T2hMsgType::RxFlush as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_FLUSH",
        header: &[WordLayout::Fields(rx_flush::W0), WordLayout::Fields(rx_flush::W1)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (PEER_ID_24, i64::from(self.peer_id)),
            (rx_flush::TID, i64::from(self.tid)),
        ])?;
        w.word(&[
            (rx_flush::MPDU_STATUS, i64::from(self.mpdu_status)),
            (rx_flush::SEQ_START, i64::from(self.seq_start)),
            (rx_flush::SEQ_END, i64::from(self.seq_end)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        Ok(Self {
            peer_id: PEER_ID_24.read_u32(w0) as u16,
            tid: rx_flush::TID.read_u32(w0) as u8,
            mpdu_status: rx_flush::MPDU_STATUS.read_u32(w1) as u8,
            seq_start: rx_flush::SEQ_START.read_u32(w1) as u8,
            seq_end: rx_flush::SEQ_END.read_u32(w1) as u8,
        })
    }
}

// ============================================================================
// PEER_MAP / PEER_UNMAP
// ============================================================================

mod peer_map {
    use super::*;

    pub const VDEV_ID: FieldSpec = FieldSpec::uint(8, 8);
    pub const W0: &[NamedField] = &[TYPE_FIELD, named("vdev_id", VDEV_ID), named("peer_id", HIGH_HALF)];
    pub const W1: &[NamedField] = &[MAC_LO];
    pub const W2: &[NamedField] = &[MAC_HI, named("hw_peer_id", HIGH_HALF)];
    pub const UNMAP_W0: &[NamedField] = &[TYPE_FIELD, named("peer_id", PEER_ID_24)];
}

/// Firmware assigned `peer_id` to a station on `vdev_id`.
///
/// ```text
/// w0: [type:8][vdev_id:8][peer_id:16]
/// w1: mac[0..4]
/// w2: [mac[4..6]:16][hw_peer_id:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerMap {
    pub vdev_id: u8,
    pub peer_id: u16,
    pub mac: MacAddr,
    pub hw_peer_id: u16,
}

impl Message for PeerMap {
    const CODE: u8 = T2hMsgType::PeerMap as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "PEER_MAP",
        header: &[
            WordLayout::Fields(peer_map::W0),
            WordLayout::Fields(peer_map::W1),
            WordLayout::Fields(peer_map::W2),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (peer_map::VDEV_ID, i64::from(self.vdev_id)),
            (HIGH_HALF, i64::from(self.peer_id)),
        ])?;
        w.raw(mac_lo(&self.mac));
        w.word(&[
            (MAC_HI.spec, mac_hi(&self.mac)),
            (HIGH_HALF, i64::from(self.hw_peer_id)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let w2 = r.word()?;
        Ok(Self {
            vdev_id: peer_map::VDEV_ID.read_u32(w0) as u8,
            peer_id: HIGH_HALF.read_u32(w0) as u16,
            mac: mac_from_words(w1, w2),
            hw_peer_id: HIGH_HALF.read_u32(w2) as u16,
        })
    }
}

/// Firmware released `peer_id`.
///
/// ```text
/// w0: [type:8][peer_id:16][reserved:8]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerUnmap {
    pub peer_id: u16,
}

impl Message for PeerUnmap {
    const CODE: u8 = T2hMsgType::PeerUnmap as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "PEER_UNMAP",
        header: &[WordLayout::Fields(peer_map::UNMAP_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (PEER_ID_24, i64::from(self.peer_id))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            peer_id: PEER_ID_24.read_u32(w0) as u16,
        })
    }
}

// ============================================================================
// RX_ADDBA / RX_DELBA
// ============================================================================

mod block_ack {
    use super::*;

    pub const PEER_ID: FieldSpec = FieldSpec::uint(8, 12);
    pub const TID: FieldSpec = FieldSpec::uint(20, 4);
    pub const WIN_SIZE: FieldSpec = FieldSpec::uint(24, 8);
    pub const INITIATOR: FieldSpec = FieldSpec::flag(24);

    pub const ADDBA_W0: &[NamedField] = &[
        TYPE_FIELD,
        named("peer_id", PEER_ID),
        named("tid", TID),
        named("win_size", WIN_SIZE),
    ];
    pub const DELBA_W0: &[NamedField] = &[
        TYPE_FIELD,
        named("peer_id", PEER_ID),
        named("tid", TID),
        named("initiator", INITIATOR),
    ];
}

/// Block-ack session established.
///
/// ```text
/// w0: [type:8][peer_id:12][tid:4][win_size:8]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxAddba {
    pub peer_id: u16,
    pub tid: u8,
    pub win_size: u8,
}

impl Message for RxAddba {
    const CODE: u8 = T2hMsgType::RxAddba as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_ADDBA",
        header: &[WordLayout::Fields(block_ack::ADDBA_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (block_ack::PEER_ID, i64::from(self.peer_id)),
            (block_ack::TID, i64::from(self.tid)),
            (block_ack::WIN_SIZE, i64::from(self.win_size)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            peer_id: block_ack::PEER_ID.read_u32(w0) as u16,
            tid: block_ack::TID.read_u32(w0) as u8,
            win_size: block_ack::WIN_SIZE.read_u32(w0) as u8,
        })
    }
}

/// Block-ack session torn down.
///
/// ```text
/// w0: [type:8][peer_id:12][tid:4][initiator:1][reserved:7]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxDelba {
    pub peer_id: u16,
    pub tid: u8,
    /// The local side initiated the teardown.
    pub initiator: bool,
}

impl Message for RxDelba {
    const CODE: u8 = T2hMsgType::RxDelba as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_DELBA",
        header: &[WordLayout::Fields(block_ack::DELBA_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (block_ack::PEER_ID, i64::from(self.peer_id)),
            (block_ack::TID, i64::from(self.tid)),
            (block_ack::INITIATOR, i64::from(self.initiator)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            peer_id: block_ack::PEER_ID.read_u32(w0) as u16,
            tid: block_ack::TID.read_u32(w0) as u8,
            initiator: block_ack::INITIATOR.read_bool(w0),
        })
    }
}

// ============================================================================
// TX_COMPL_IND
// ============================================================================

mod tx_compl {
    use super::*;

    pub const STATUS: FieldSpec = FieldSpec::uint(8, 3);
    pub const TID: FieldSpec = FieldSpec::uint(11, 4);
    pub const TID_INVALID: FieldSpec = FieldSpec::flag(15);
    pub const NUM_MSDUS: FieldSpec = FieldSpec::uint(16, 8);

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("status", STATUS),
        named("tid", TID),
        named("tid_invalid", TID_INVALID),
        named("num_msdus", NUM_MSDUS),
    ];
}

/// Tx completion status codes.
pub mod tx_status {
    pub const OK: u8 = 0;
    pub const DISCARD: u8 = 1;
    pub const NO_ACK: u8 = 2;
    pub const POSTPONE: u8 = 3;
    pub const PEER_DEL: u8 = 4;
}

/// Per-frame tx completion.
///
/// ```text
/// w0: [type:8][status:3][tid:4][tid_invalid:1][num_msdus:8][reserved:8]
/// msdu ids: u16 each, two per word, zero-padded
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxComplInd {
    pub status: u8,
    pub tid: u8,
    pub tid_invalid: bool,
    pub msdu_ids: Vec<u16>,
}

impl Message for TxComplInd {
    const CODE: u8 = T2hMsgType::TxComplInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "TX_COMPL_IND",
        header: &[WordLayout::Fields(tx_compl::W0)],
        records: RecordLayout::Bytes(2),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (tx_compl::STATUS, i64::from(self.status)),
            (tx_compl::TID, i64::from(self.tid)),
            (tx_compl::TID_INVALID, i64::from(self.tid_invalid)),
            (tx_compl::NUM_MSDUS, self.msdu_ids.len() as i64),
        ])?;
        let ids: Vec<u8> = self.msdu_ids.iter().flat_map(|id| id.to_le_bytes()).collect();
        w.bytes_padded(&ids);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let count = tx_compl::NUM_MSDUS.read_u32(w0) as usize;
        r.expect_records(count, 2)?;
        let msdu_ids = (0..count).map(|_| r.u16()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            status: tx_compl::STATUS.read_u32(w0) as u8,
            tid: tx_compl::TID.read_u32(w0) as u8,
            tid_invalid: tx_compl::TID_INVALID.read_bool(w0),
            msdu_ids,
        })
    }
}

// ============================================================================
// RC_UPDATE_IND (deprecated)
// ============================================================================

mod rc_update {
    use super::*;

    pub const NUM_ELEMS: FieldSpec = FieldSpec::uint(24, 8);
    pub const RATE_CODE: FieldSpec = FieldSpec::uint(0, 8);
    pub const FLAGS: FieldSpec = FieldSpec::uint(8, 8);
    pub const TRIES: FieldSpec = FieldSpec::uint(0, 8);

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("peer_id", PEER_ID_24),
        named("num_elems", NUM_ELEMS),
    ];
    pub const REC_RATE: &[NamedField] = &[named("rate_code", RATE_CODE), named("flags", FLAGS)];
    pub const REC_TRIES: &[NamedField] = &[named("tries", TRIES)];
    pub const RECORD: &[WordLayout] = &[WordLayout::Fields(REC_RATE), WordLayout::Fields(REC_TRIES)];
}

/// One rate control entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateEntry {
    pub rate_code: u8,
    pub flags: u8,
    pub tries: u8,
}

/// Rate control update. Current firmware no longer sends this.
///
/// ```text
/// w0: [type:8][peer_id:16][num_elems:8]
/// per entry: [rate_code:8][flags:8][reserved:16], [tries:8][reserved:24]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RcUpdateInd {
    pub peer_id: u16,
    pub entries: Vec<RateEntry>,
}

impl Message for RcUpdateInd {
    const CODE: u8 = T2hMsgType::RcUpdateInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RC_UPDATE_IND",
        header: &[WordLayout::Fields(rc_update::W0)],
        records: RecordLayout::Words(rc_update::RECORD),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (PEER_ID_24, i64::from(self.peer_id)),
            (rc_update::NUM_ELEMS, self.entries.len() as i64),
        ])?;
        for entry in &self.entries {
            w.word(&[
                (rc_update::RATE_CODE, i64::from(entry.rate_code)),
                (rc_update::FLAGS, i64::from(entry.flags)),
            ])?;
            w.word(&[(rc_update::TRIES, i64::from(entry.tries))])?;
        }
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let count = rc_update::NUM_ELEMS.read_u32(w0) as usize;
        r.expect_records(count, Self::LAYOUT.record_len(r.width()).unwrap_or(0))?;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let rate = r.word()?;
            let tries = r.word()?;
            entries.push(RateEntry {
                rate_code: rc_update::RATE_CODE.read_u32(rate) as u8,
                flags: rc_update::FLAGS.read_u32(rate) as u8,
                tries: rc_update::TRIES.read_u32(tries) as u8,
            });
        }
        Ok(Self {
            peer_id: PEER_ID_24.read_u32(w0) as u16,
            entries,
        })
    }
}

// ============================================================================
// MGMT_TX_COMPL_IND
// ============================================================================

const MGMT_COMPL_W1: &[NamedField] = &[named("desc_id", FULL_WORD)];
const MGMT_COMPL_W2: &[NamedField] = &[named("status", FULL_WORD)];

/// Management frame tx completion.
///
/// ```text
/// w0: [type:8][reserved:24]
/// w1: desc_id
/// w2: status
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MgmtTxComplInd {
    pub desc_id: u32,
    pub status: u32,
}

impl Message for MgmtTxComplInd {
    const CODE: u8 = T2hMsgType::MgmtTxComplInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "MGMT_TX_COMPL_IND",
        header: &[
            WordLayout::Fields(&[TYPE_FIELD]),
            WordLayout::Fields(MGMT_COMPL_W1),
            WordLayout::Fields(MGMT_COMPL_W2),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])?;
        w.raw(self.desc_id);
        w.raw(self.status);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        Ok(Self {
            desc_id: r.word()?,
            status: r.word()?,
        })
    }
}

// ============================================================================
// TX_CREDIT_UPDATE_IND
// ============================================================================

/// Signed credit delta in bits 31:16.
const CREDIT_DELTA: FieldSpec = FieldSpec::int(16, 16);
const CREDIT_W0: &[NamedField] = &[TYPE_FIELD, named("credit_delta", CREDIT_DELTA)];

/// Bulk tx credit update. Negative deltas reclaim credit.
///
/// ```text
/// w0: [type:8][reserved:8][credit_delta:16, signed]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxCreditUpdateInd {
    pub credit_delta: i16,
}

impl Message for TxCreditUpdateInd {
    const CODE: u8 = T2hMsgType::TxCreditUpdateInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "TX_CREDIT_UPDATE_IND",
        header: &[WordLayout::Fields(CREDIT_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (CREDIT_DELTA, i64::from(self.credit_delta))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            credit_delta: CREDIT_DELTA.read_i32(w0) as i16,
        })
    }
}

// ============================================================================
// RX_PN_IND
// ============================================================================

mod rx_pn {
    use super::*;

    pub const TID: FieldSpec = FieldSpec::uint(24, 5);
    pub const PN_IE_COUNT: FieldSpec = FieldSpec::uint(0, 8);

    pub const W0: &[NamedField] = &[TYPE_FIELD, named("peer_id", PEER_ID_24), named("tid", TID)];
    pub const W1: &[NamedField] = &[named("seq_start", LOW_HALF), named("seq_end", HIGH_HALF)];
    pub const W2: &[NamedField] = &[named("pn_ie_count", PN_IE_COUNT)];
}

/// Ask the host to check packet numbers on a sequence range.
///
/// ```text
/// w0: [type:8][peer_id:16][tid:5][reserved:3]
/// w1: [seq_start:16][seq_end:16]
/// w2: [pn_ie_count:8][reserved:24]
/// pn ies: u8 each, zero-padded
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxPnInd {
    pub peer_id: u16,
    pub tid: u8,
    pub seq_start: u16,
    pub seq_end: u16,
    /// Indices of MPDUs whose packet numbers need checking.
    pub pn_ies: Vec<u8>,
}

impl Message for RxPnInd {
    const CODE: u8 = T2hMsgType::RxPnInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_PN_IND",
        header: &[
            WordLayout::Fields(rx_pn::W0),
            WordLayout::Fields(rx_pn::W1),
            WordLayout::Fields(rx_pn::W2),
        ],
        records: RecordLayout::Bytes(1),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (PEER_ID_24, i64::from(self.peer_id)),
            (rx_pn::TID, i64::from(self.tid)),
        ])?;
        w.word(&[
            (LOW_HALF, i64::from(self.seq_start)),
            (HIGH_HALF, i64::from(self.seq_end)),
        ])?;
        w.word(&[(rx_pn::PN_IE_COUNT, self.pn_ies.len() as i64)])?;
        w.bytes_padded(&self.pn_ies);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let w2 = r.word()?;
        let count = rx_pn::PN_IE_COUNT.read_u32(w2) as usize;
        r.expect_records(count, 1)?;
        let pn_ies = r.bytes(count)?.to_vec();
        Ok(Self {
            peer_id: PEER_ID_24.read_u32(w0) as u16,
            tid: rx_pn::TID.read_u32(w0) as u8,
            seq_start: LOW_HALF.read_u32(w1) as u16,
            seq_end: HIGH_HALF.read_u32(w1) as u16,
            pn_ies,
        })
    }
}

// ============================================================================
// RX_IN_ORD_PADDR_IND
// ============================================================================

mod rx_in_ord {
    use super::*;

    pub const OFFLOAD: FieldSpec = FieldSpec::flag(8);
    pub const FRAG: FieldSpec = FieldSpec::flag(9);
    pub const TID: FieldSpec = FieldSpec::uint(0, 5);
    pub const FW_DESC: FieldSpec = FieldSpec::uint(0, 8);
    pub const MSDU_LEN: FieldSpec = FieldSpec::uint(16, 14);

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("offload", OFFLOAD),
        named("frag", FRAG),
        named("peer_id", HIGH_HALF),
    ];
    pub const W1: &[NamedField] = &[named("tid", TID), named("msdu_count", HIGH_HALF)];
    pub const REC_DESC: &[NamedField] = &[named("fw_desc", FW_DESC), named("msdu_len", MSDU_LEN)];
    pub const RECORD: &[WordLayout] = &[WordLayout::Address("msdu_paddr"), WordLayout::Fields(REC_DESC)];
}

/// One in-order rx MSDU.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InOrderMsdu {
    pub paddr: BusAddr,
    pub fw_desc: u8,
    pub msdu_len: u16,
}

/// In-order rx delivery by physical address.
///
/// ```text
/// w0: [type:8][offload:1][frag:1][reserved:6][peer_id:16]
/// w1: [tid:5][reserved:11][msdu_count:16]
/// per msdu: addr msdu_paddr, [fw_desc:8][rsvd:8][msdu_len:14][rsvd:2]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxInOrdPaddrInd {
    /// Frames belong to an offloaded flow and are not for the host stack.
    pub offload: bool,
    pub frag: bool,
    pub peer_id: u16,
    pub tid: u8,
    pub msdus: Vec<InOrderMsdu>,
}

impl Message for RxInOrdPaddrInd {
    const CODE: u8 = T2hMsgType::RxInOrdPaddrInd as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_IN_ORD_PADDR_IND",
        header: &[WordLayout::Fields(rx_in_ord::W0), WordLayout::Fields(rx_in_ord::W1)],
        records: RecordLayout::Words(rx_in_ord::RECORD),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (rx_in_ord::OFFLOAD, i64::from(self.offload)),
            (rx_in_ord::FRAG, i64::from(self.frag)),
            (HIGH_HALF, i64::from(self.peer_id)),
        ])?;
        w.word(&[
            (rx_in_ord::TID, i64::from(self.tid)),
            (HIGH_HALF, self.msdus.len() as i64),
        ])?;
        for msdu in &self.msdus {
            w.addr(msdu.paddr)?;
            w.word(&[
                (rx_in_ord::FW_DESC, i64::from(msdu.fw_desc)),
                (rx_in_ord::MSDU_LEN, i64::from(msdu.msdu_len)),
            ])?;
        }
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let count = HIGH_HALF.read_u32(w1) as usize;
        r.expect_records(count, Self::LAYOUT.record_len(r.width()).unwrap_or(0))?;

        let mut msdus = Vec::with_capacity(count);
        for _ in 0..count {
            let paddr = r.addr()?;
            let desc = r.word()?;
            msdus.push(InOrderMsdu {
                paddr,
                fw_desc: rx_in_ord::FW_DESC.read_u32(desc) as u8,
                msdu_len: rx_in_ord::MSDU_LEN.read_u32(desc) as u16,
            });
        }
        Ok(Self {
            offload: rx_in_ord::OFFLOAD.read_bool(w0),
            frag: rx_in_ord::FRAG.read_bool(w0),
            peer_id: HIGH_HALF.read_u32(w0) as u16,
            tid: rx_in_ord::TID.read_u32(w1) as u8,
            msdus,
        })
    }
}

// ============================================================================
// CHAN_CHANGE
// ============================================================================

const CHAN_W1: &[NamedField] = &[named("primary_mhz", FULL_WORD)];
const CHAN_W2: &[NamedField] = &[named("center_freq1", FULL_WORD)];
const CHAN_W3: &[NamedField] = &[named("center_freq2", FULL_WORD)];
const CHAN_W4: &[NamedField] = &[named("phy_mode", FULL_WORD)];

/// Operating channel changed.
///
/// ```text
/// w0: [type:8][reserved:24]
/// w1: primary_mhz
/// w2: center_freq1
/// w3: center_freq2
/// w4: phy_mode
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChanChange {
    pub primary_mhz: u32,
    pub center_freq1: u32,
    pub center_freq2: u32,
    pub phy_mode: u32,
}

impl Message for ChanChange {
    const CODE: u8 = T2hMsgType::ChanChange as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "CHAN_CHANGE",
        header: &[
            WordLayout::Fields(&[TYPE_FIELD]),
            WordLayout::Fields(CHAN_W1),
            WordLayout::Fields(CHAN_W2),
            WordLayout::Fields(CHAN_W3),
            WordLayout::Fields(CHAN_W4),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])?;
        w.raw(self.primary_mhz);
        w.raw(self.center_freq1);
        w.raw(self.center_freq2);
        w.raw(self.phy_mode);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        Ok(Self {
            primary_mhz: r.word()?,
            center_freq1: r.word()?,
            center_freq2: r.word()?,
            phy_mode: r.word()?,
        })
    }
}

// ============================================================================
// FLOW_POOL_MAP / FLOW_POOL_UNMAP
// ============================================================================

mod flow_pool {
    use super::*;

    pub const NUM_FLOWS: FieldSpec = FieldSpec::uint(8, 8);

    pub const W0: &[NamedField] = &[TYPE_FIELD, named("num_flows", NUM_FLOWS)];
    pub const FLOW: &[NamedField] = &[named("flow_type", LOW_HALF), named("flow_id", HIGH_HALF)];
    pub const POOL: &[NamedField] = &[named("pool_id", LOW_HALF), named("pool_size", HIGH_HALF)];
    pub const POOL_ID: &[NamedField] = &[named("pool_id", LOW_HALF)];
    pub const RECORD: &[WordLayout] = &[WordLayout::Fields(FLOW), WordLayout::Fields(POOL)];
}

/// One flow-to-pool assignment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowPool {
    pub flow_type: u16,
    pub flow_id: u16,
    pub pool_id: u16,
    pub pool_size: u16,
}

/// Tx flow pools created.
///
/// ```text
/// w0: [type:8][num_flows:8][reserved:16]
/// per flow: [flow_type:16][flow_id:16], [pool_id:16][pool_size:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowPoolMap {
    pub flows: Vec<FlowPool>,
}

impl Message for FlowPoolMap {
    const CODE: u8 = T2hMsgType::FlowPoolMap as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "FLOW_POOL_MAP",
        header: &[WordLayout::Fields(flow_pool::W0)],
        records: RecordLayout::Words(flow_pool::RECORD),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (flow_pool::NUM_FLOWS, self.flows.len() as i64),
        ])?;
        for flow in &self.flows {
            w.word(&[
                (LOW_HALF, i64::from(flow.flow_type)),
                (HIGH_HALF, i64::from(flow.flow_id)),
            ])?;
            w.word(&[
                (LOW_HALF, i64::from(flow.pool_id)),
                (HIGH_HALF, i64::from(flow.pool_size)),
            ])?;
        }
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let count = flow_pool::NUM_FLOWS.read_u32(w0) as usize;
        r.expect_records(count, Self::LAYOUT.record_len(r.width()).unwrap_or(0))?;

        let mut flows = Vec::with_capacity(count);
        for _ in 0..count {
            let flow = r.word()?;
            let pool = r.word()?;
            flows.push(FlowPool {
                flow_type: LOW_HALF.read_u32(flow) as u16,
                flow_id: HIGH_HALF.read_u32(flow) as u16,
                pool_id: LOW_HALF.read_u32(pool) as u16,
                pool_size: HIGH_HALF.read_u32(pool) as u16,
            });
        }
        Ok(Self { flows })
    }
}

/// Tx flow pool removed.
///
/// ```text
/// w0: [type:8][reserved:24]
/// w1: [flow_type:16][flow_id:16]
/// w2: [pool_id:16][reserved:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowPoolUnmap {
    pub flow_type: u16,
    pub flow_id: u16,
    pub pool_id: u16,
}

impl Message for FlowPoolUnmap {
    const CODE: u8 = T2hMsgType::FlowPoolUnmap as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "FLOW_POOL_UNMAP",
        header: &[
            WordLayout::Fields(&[TYPE_FIELD]),
            WordLayout::Fields(flow_pool::FLOW),
            WordLayout::Fields(flow_pool::POOL_ID),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])?;
        w.word(&[
            (LOW_HALF, i64::from(self.flow_type)),
            (HIGH_HALF, i64::from(self.flow_id)),
        ])?;
        w.word(&[(LOW_HALF, i64::from(self.pool_id))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        let flow = r.word()?;
        let pool = r.word()?;
        Ok(Self {
            flow_type: LOW_HALF.read_u32(flow) as u16,
            flow_id: HIGH_HALF.read_u32(flow) as u16,
            pool_id: LOW_HALF.read_u32(pool) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::address::AddressWidth;

    const W32: AddressWidth = AddressWidth::Addr32;
    const W64: AddressWidth = AddressWidth::Addr64;

    #[test]
    fn test_peer_map_wire_bytes() {
        let msg = PeerMap {
            vdev_id: 2,
            peer_id: 0x0107,
            mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            hw_peer_id: 0x0abc,
        };
        let bytes = msg.encode(W32).unwrap();
        assert_eq!(
            bytes,
            [
                0x03, 0x02, 0x07, 0x01, // type, vdev, peer_id
                0x00, 0x11, 0x22, 0x33, // mac[0..4]
                0x44, 0x55, 0xbc, 0x0a, // mac[4..6], hw_peer_id
            ]
        );
        assert_eq!(PeerMap::decode(&bytes, W32).unwrap(), msg);
    }

    #[test]
    fn test_credit_delta_sign_extended() {
        let bytes = [0x0f, 0x00, 0xfb, 0xff];
        let msg = TxCreditUpdateInd::decode(&bytes, W32).unwrap();
        assert_eq!(msg.credit_delta, -5);
        assert_eq!(msg.encode(W32).unwrap(), bytes);

        let max = TxCreditUpdateInd {
            credit_delta: i16::MIN,
        };
        assert_eq!(TxCreditUpdateInd::decode(&max.encode(W32).unwrap(), W32).unwrap(), max);
    }

    #[test]
    fn test_tx_compl_odd_count_padded() {
        let msg = TxComplInd {
            status: tx_status::NO_ACK,
            tid: 6,
            tid_invalid: false,
            msdu_ids: vec![0x0101, 0x0202, 0x0303],
        };
        let bytes = msg.encode(W32).unwrap();
        assert_eq!(bytes.len(), 4 + 8);
        assert_eq!(&bytes[4..], &[0x01, 0x01, 0x02, 0x02, 0x03, 0x03, 0x00, 0x00]);
        assert_eq!(TxComplInd::decode(&bytes, W32).unwrap(), msg);
    }

    #[test]
    fn test_tx_compl_count_beyond_buffer() {
        // num_msdus = 4, only two ids present
        let bytes = [0x07, 0x00, 0x04, 0x00, 0x01, 0x00, 0x02, 0x00];
        assert_eq!(
            TxComplInd::decode(&bytes, W32),
            Err(CodecError::TruncatedRecords {
                count: 4,
                record_len: 2,
                available: 4
            })
        );
    }

    #[test]
    fn test_in_order_paddr_by_width() {
        let msg = RxInOrdPaddrInd {
            offload: true,
            frag: false,
            peer_id: 12,
            tid: 3,
            msdus: vec![
                InOrderMsdu {
                    paddr: BusAddr::new(0x8000_0000),
                    fw_desc: 0x11,
                    msdu_len: 1514,
                },
                InOrderMsdu {
                    paddr: BusAddr::new(0x8000_0800),
                    fw_desc: 0x22,
                    msdu_len: 0x3fff,
                },
            ],
        };
        let narrow = msg.encode(W32).unwrap();
        let wide = msg.encode(W64).unwrap();
        assert_eq!(narrow.len(), 8 + 2 * 8);
        assert_eq!(wide.len(), 8 + 2 * 12);
        assert_eq!(RxInOrdPaddrInd::decode(&narrow, W32).unwrap(), msg);
        assert_eq!(RxInOrdPaddrInd::decode(&wide, W64).unwrap(), msg);

        // A 32-bit reader sees the wide records as a different message.
        assert_ne!(RxInOrdPaddrInd::decode(&wide, W32).ok(), Some(msg));
    }

    #[test]
    fn test_rx_pn_ind() {
        let msg = RxPnInd {
            peer_id: 9,
            tid: 17,
            seq_start: 100,
            seq_end: 163,
            pn_ies: vec![1, 5, 9, 13, 17],
        };
        let bytes = msg.encode(W32).unwrap();
        assert_eq!(bytes.len(), 12 + 8);
        assert_eq!(RxPnInd::decode(&bytes, W32).unwrap(), msg);
    }

    #[test]
    fn test_version_conf_fields() {
        let msg = VersionConf {
            version: ProtocolVersion::new(3, 58),
            options: vec![OptionTlv::inline(0x01, 1)],
        };
        let bytes = msg.encode(W32).unwrap();
        assert_eq!(&bytes[..4], &[0x00, 58, 3, 0x00]);
        assert_eq!(VersionConf::decode(&bytes, W32).unwrap(), msg);
    }

    #[test]
    fn test_delba_initiator_bit() {
        let msg = RxDelba {
            peer_id: 0xfff,
            tid: 0xf,
            initiator: true,
        };
        let bytes = msg.encode(W32).unwrap();
        assert_eq!(bytes, [0x06, 0xff, 0xff, 0x01]);
        assert_eq!(RxDelba::decode(&bytes, W32).unwrap(), msg);
        assert!(RxDelba { peer_id: 0x1000, ..msg }.encode(W32).is_err());
    }
}
