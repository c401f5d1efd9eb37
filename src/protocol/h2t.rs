//! Host-to-target messages.

use super::address::BusAddr;
use super::layout::{
    named, type_code, Message, MessageLayout, NamedField, RecordLayout, WordLayout, WordReader,
    WordWriter, FULL_WORD, HIGH_HALF, LOW_HALF, TYPE_FIELD,
};
use super::tlv::{decode_tlvs, write_tlvs, OptionTlv};
use super::types::H2tMsgType;
use super::CodecError;
use crate::bitfield::{FieldOverflow, FieldSpec};

// ============================================================================
// VERSION_REQ
// ============================================================================

/// Version request, first message of the handshake.
///
/// ```text
/// w0: [type:8][reserved:24]
/// option TLVs...
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionReq {
    pub options: Vec<OptionTlv>,
}

impl Message for VersionReq {
    const CODE: u8 = H2tMsgType::VersionReq as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "VERSION_REQ",
        header: &[WordLayout::Fields(&[TYPE_FIELD])],
        records: RecordLayout::OptionTlvs,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])?;
        write_tlvs(w, &self.options)
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        let base = r.position();
        let options = decode_tlvs(r.rest()).map_err(|e| match e {
            CodecError::MalformedTlv { offset } => CodecError::MalformedTlv {
                offset: base + offset,
            },
            other => other,
        })?;
        Ok(Self { options })
    }
}

// ============================================================================
// TX_FRM
// ============================================================================

mod tx_frm {
    use super::*;

    pub const PKT_SUBTYPE: FieldSpec = FieldSpec::uint(8, 5);
    pub const PKT_TYPE: FieldSpec = FieldSpec::uint(13, 3);
    pub const VDEV_ID: FieldSpec = FieldSpec::uint(16, 6);
    pub const EXT_TID: FieldSpec = FieldSpec::uint(22, 5);
    pub const POSTPONED: FieldSpec = FieldSpec::flag(27);
    pub const EXTENSION: FieldSpec = FieldSpec::flag(28);
    pub const CKSUM_OFFLOAD: FieldSpec = FieldSpec::uint(29, 2);
    pub const TX_COMPL_REQ: FieldSpec = FieldSpec::flag(31);

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("pkt_subtype", PKT_SUBTYPE),
        named("pkt_type", PKT_TYPE),
        named("vdev_id", VDEV_ID),
        named("ext_tid", EXT_TID),
        named("postponed", POSTPONED),
        named("extension", EXTENSION),
        named("cksum_offload", CKSUM_OFFLOAD),
        named("tx_compl_req", TX_COMPL_REQ),
    ];
    pub const W1: &[NamedField] = &[named("frame_len", LOW_HALF), named("msdu_id", HIGH_HALF)];
    pub const W3: &[NamedField] = &[named("peer_id", LOW_HALF), named("chan_freq", HIGH_HALF)];
}

/// Transmit one frame by fragment-descriptor address.
///
/// ```text
/// w0: [type:8][pkt_subtype:5][pkt_type:3][vdev_id:6][ext_tid:5][postponed:1][extension:1][cksum:2][compl_req:1]
/// w1: [frame_len:16][msdu_id:16]
/// addr: frag_desc_paddr
/// w3: [peer_id:16][chan_freq:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxFrm {
    pub pkt_subtype: u8,
    pub pkt_type: u8,
    pub vdev_id: u8,
    pub ext_tid: u8,
    pub postponed: bool,
    /// An extended MSDU descriptor follows the fragment list.
    pub extension: bool,
    pub cksum_offload: u8,
    pub tx_compl_req: bool,
    pub frame_len: u16,
    pub msdu_id: u16,
    pub frag_desc_paddr: BusAddr,
    pub peer_id: u16,
    pub chan_freq: u16,
}

impl Message for TxFrm {
    const CODE: u8 = H2tMsgType::TxFrm as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "TX_FRM",
        header: &[
            WordLayout::Fields(tx_frm::W0),
            WordLayout::Fields(tx_frm::W1),
            WordLayout::Address("frag_desc_paddr"),
            WordLayout::Fields(tx_frm::W3),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (tx_frm::PKT_SUBTYPE, i64::from(self.pkt_subtype)),
            (tx_frm::PKT_TYPE, i64::from(self.pkt_type)),
            (tx_frm::VDEV_ID, i64::from(self.vdev_id)),
            (tx_frm::EXT_TID, i64::from(self.ext_tid)),
            (tx_frm::POSTPONED, i64::from(self.postponed)),
            (tx_frm::EXTENSION, i64::from(self.extension)),
            (tx_frm::CKSUM_OFFLOAD, i64::from(self.cksum_offload)),
            (tx_frm::TX_COMPL_REQ, i64::from(self.tx_compl_req)),
        ])?;
        w.word(&[
            (LOW_HALF, i64::from(self.frame_len)),
            (HIGH_HALF, i64::from(self.msdu_id)),
        ])?;
        w.addr(self.frag_desc_paddr)?;
        w.word(&[
            (LOW_HALF, i64::from(self.peer_id)),
            (HIGH_HALF, i64::from(self.chan_freq)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let frag_desc_paddr = r.addr()?;
        let w3 = r.word()?;
        Ok(Self {
            pkt_subtype: tx_frm::PKT_SUBTYPE.read_u32(w0) as u8,
            pkt_type: tx_frm::PKT_TYPE.read_u32(w0) as u8,
            vdev_id: tx_frm::VDEV_ID.read_u32(w0) as u8,
            ext_tid: tx_frm::EXT_TID.read_u32(w0) as u8,
            postponed: tx_frm::POSTPONED.read_bool(w0),
            extension: tx_frm::EXTENSION.read_bool(w0),
            cksum_offload: tx_frm::CKSUM_OFFLOAD.read_u32(w0) as u8,
            tx_compl_req: tx_frm::TX_COMPL_REQ.read_bool(w0),
            frame_len: LOW_HALF.read_u32(w1) as u16,
            msdu_id: HIGH_HALF.read_u32(w1) as u16,
            frag_desc_paddr,
            peer_id: LOW_HALF.read_u32(w3) as u16,
            chan_freq: HIGH_HALF.read_u32(w3) as u16,
        })
    }
}

// ============================================================================
// RX_RING_CFG
// ============================================================================

mod rx_ring_cfg {
    use super::*;

    pub const NUM_RINGS: FieldSpec = FieldSpec::uint(8, 8);

    pub const W0: &[NamedField] = &[TYPE_FIELD, named("num_rings", NUM_RINGS)];
    pub const REC_LEN: &[NamedField] = &[named("ring_len", LOW_HALF), named("buf_size", HIGH_HALF)];
    pub const REC_FLAGS: &[NamedField] = &[
        named("enabled_flags", LOW_HALF),
        named("rx_pkt_offset", HIGH_HALF),
    ];
    pub const RECORD: &[WordLayout] = &[
        WordLayout::Address("idx_shadow_paddr"),
        WordLayout::Address("base_paddr"),
        WordLayout::Fields(REC_LEN),
        WordLayout::Fields(REC_FLAGS),
    ];
}

/// Configuration of one rx ring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxRingConfig {
    /// Where the target shadows its write index.
    pub idx_shadow_paddr: BusAddr,
    pub base_paddr: BusAddr,
    pub ring_len: u16,
    pub buf_size: u16,
    pub enabled_flags: u16,
    pub rx_pkt_offset: u16,
}

/// Rx ring configuration.
///
/// ```text
/// w0: [type:8][num_rings:8][reserved:16]
/// per ring: addr idx_shadow, addr base, [ring_len:16][buf_size:16], [flags:16][pkt_offset:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RxRingCfg {
    pub rings: Vec<RxRingConfig>,
}

impl Message for RxRingCfg {
    const CODE: u8 = H2tMsgType::RxRingCfg as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "RX_RING_CFG",
        header: &[WordLayout::Fields(rx_ring_cfg::W0)],
        records: RecordLayout::Words(rx_ring_cfg::RECORD),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (rx_ring_cfg::NUM_RINGS, self.rings.len() as i64),
        ])?;
        for ring in &self.rings {
            w.addr(ring.idx_shadow_paddr)?;
            w.addr(ring.base_paddr)?;
            w.word(&[
                (LOW_HALF, i64::from(ring.ring_len)),
                (HIGH_HALF, i64::from(ring.buf_size)),
            ])?;
            w.word(&[
                (LOW_HALF, i64::from(ring.enabled_flags)),
                (HIGH_HALF, i64::from(ring.rx_pkt_offset)),
            ])?;
        }
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let count = rx_ring_cfg::NUM_RINGS.read_u32(w0) as usize;
        let record_len = Self::LAYOUT.record_len(r.width()).unwrap_or(0);
        r.expect_records(count, record_len)?;

        let mut rings = Vec::with_capacity(count);
        for _ in 0..count {
            let idx_shadow_paddr = r.addr()?;
            let base_paddr = r.addr()?;
            let len = r.word()?;
            let flags = r.word()?;
            rings.push(RxRingConfig {
                idx_shadow_paddr,
                base_paddr,
                ring_len: LOW_HALF.read_u32(len) as u16,
                buf_size: HIGH_HALF.read_u32(len) as u16,
                enabled_flags: LOW_HALF.read_u32(flags) as u16,
                rx_pkt_offset: HIGH_HALF.read_u32(flags) as u16,
            });
        }
        Ok(Self { rings })
    }
}

// ============================================================================
// STATS_REQ
// ============================================================================

mod stats_req {
    use super::*;

    pub const UPLOAD_TYPES: FieldSpec = FieldSpec::uint(8, 24);
    pub const RESET_TYPES: FieldSpec = FieldSpec::uint(0, 24);
    pub const STAT_TYPE: FieldSpec = FieldSpec::uint(0, 8);

    pub const W0: &[NamedField] = &[TYPE_FIELD, named("upload_types", UPLOAD_TYPES)];
    pub const W1: &[NamedField] = &[named("reset_types", RESET_TYPES)];
    pub const W2: &[NamedField] = &[named("stat_type", STAT_TYPE)];
    pub const W3: &[NamedField] = &[named("config_param", FULL_WORD)];
    pub const W4: &[NamedField] = &[named("cookie_lo", FULL_WORD)];
    pub const W5: &[NamedField] = &[named("cookie_hi", FULL_WORD)];
}

/// Statistics request.
///
/// ```text
/// w0: [type:8][upload_types:24]
/// w1: [reset_types:24][reserved:8]
/// w2: [stat_type:8][reserved:24]
/// w3: config_param
/// w4: cookie_lo
/// w5: cookie_hi
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsReq {
    pub upload_types: u32,
    pub reset_types: u32,
    pub stat_type: u8,
    pub config_param: u32,
    /// Echoed back by the target in the confirmation.
    pub cookie: u64,
}

impl Message for StatsReq {
    const CODE: u8 = H2tMsgType::StatsReq as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "STATS_REQ",
        header: &[
            WordLayout::Fields(stats_req::W0),
            WordLayout::Fields(stats_req::W1),
            WordLayout::Fields(stats_req::W2),
            WordLayout::Fields(stats_req::W3),
            WordLayout::Fields(stats_req::W4),
            WordLayout::Fields(stats_req::W5),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (stats_req::UPLOAD_TYPES, i64::from(self.upload_types)),
        ])?;
        w.word(&[(stats_req::RESET_TYPES, i64::from(self.reset_types))])?;
        w.word(&[(stats_req::STAT_TYPE, i64::from(self.stat_type))])?;
        w.raw(self.config_param);
        w.raw(self.cookie as u32);
        w.raw((self.cookie >> 32) as u32);
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let w1 = r.word()?;
        let w2 = r.word()?;
        let config_param = r.word()?;
        let lo = r.word()?;
        let hi = r.word()?;
        Ok(Self {
            upload_types: stats_req::UPLOAD_TYPES.read_u32(w0),
            reset_types: stats_req::RESET_TYPES.read_u32(w1),
            stat_type: stats_req::STAT_TYPE.read_u32(w2) as u8,
            config_param,
            cookie: u64::from(lo) | (u64::from(hi) << 32),
        })
    }
}

// ============================================================================
// SYNC
// ============================================================================

mod sync {
    use super::*;

    pub const SYNC_COUNT: FieldSpec = FieldSpec::uint(8, 8);
    pub const W0: &[NamedField] = &[TYPE_FIELD, named("sync_count", SYNC_COUNT)];
}

/// Ask the target to echo a sync count once prior messages are processed.
///
/// ```text
/// w0: [type:8][sync_count:8][reserved:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReq {
    pub sync_count: u8,
}

impl Message for SyncReq {
    const CODE: u8 = H2tMsgType::Sync as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "SYNC",
        header: &[WordLayout::Fields(sync::W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (sync::SYNC_COUNT, i64::from(self.sync_count))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            sync_count: sync::SYNC_COUNT.read_u32(w0) as u8,
        })
    }
}

// ============================================================================
// AGGR_CFG / AGGR_CFG_EX
// ============================================================================

mod aggr_cfg {
    use super::*;

    pub const MAX_AMPDU: FieldSpec = FieldSpec::uint(8, 5);
    pub const MAX_AMSDU: FieldSpec = FieldSpec::uint(16, 4);
    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("max_ampdu", MAX_AMPDU),
        named("max_amsdu", MAX_AMSDU),
    ];

    pub const EX_MAX_AMPDU: FieldSpec = FieldSpec::uint(8, 8);
    pub const EX_MAX_AMSDU: FieldSpec = FieldSpec::uint(16, 8);
    pub const EX_W0: &[NamedField] = &[
        TYPE_FIELD,
        named("max_ampdu", EX_MAX_AMPDU),
        named("max_amsdu", EX_MAX_AMSDU),
    ];
}

/// Aggregation limits.
///
/// ```text
/// w0: [type:8][max_ampdu:5][rsvd:3][max_amsdu:4][reserved:12]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggrCfg {
    pub max_ampdu_subframes: u8,
    pub max_amsdu_subframes: u8,
}

impl Message for AggrCfg {
    const CODE: u8 = H2tMsgType::AggrCfg as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "AGGR_CFG",
        header: &[WordLayout::Fields(aggr_cfg::W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (aggr_cfg::MAX_AMPDU, i64::from(self.max_ampdu_subframes)),
            (aggr_cfg::MAX_AMSDU, i64::from(self.max_amsdu_subframes)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            max_ampdu_subframes: aggr_cfg::MAX_AMPDU.read_u32(w0) as u8,
            max_amsdu_subframes: aggr_cfg::MAX_AMSDU.read_u32(w0) as u8,
        })
    }
}

/// Aggregation limits with full 8-bit ranges.
///
/// ```text
/// w0: [type:8][max_ampdu:8][max_amsdu:8][reserved:8]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggrCfgEx {
    pub max_ampdu_subframes: u8,
    pub max_amsdu_subframes: u8,
}

impl Message for AggrCfgEx {
    const CODE: u8 = H2tMsgType::AggrCfgEx as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "AGGR_CFG_EX",
        header: &[WordLayout::Fields(aggr_cfg::EX_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (aggr_cfg::EX_MAX_AMPDU, i64::from(self.max_ampdu_subframes)),
            (aggr_cfg::EX_MAX_AMSDU, i64::from(self.max_amsdu_subframes)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            max_ampdu_subframes: aggr_cfg::EX_MAX_AMPDU.read_u32(w0) as u8,
            max_amsdu_subframes: aggr_cfg::EX_MAX_AMSDU.read_u32(w0) as u8,
        })
    }
}

// ============================================================================
// FRAG_DESC_BANK_CFG
// ============================================================================

mod frag_desc_bank_cfg {
    use super::*;

    pub const PDEV_ID: FieldSpec = FieldSpec::uint(8, 2);
    pub const SWAP: FieldSpec = FieldSpec::flag(10);
    pub const NUM_BANKS: FieldSpec = FieldSpec::uint(16, 8);

    pub const W0: &[NamedField] = &[
        TYPE_FIELD,
        named("pdev_id", PDEV_ID),
        named("swap", SWAP),
        named("num_banks", NUM_BANKS),
    ];
    pub const REC_IDS: &[NamedField] = &[named("min_id", LOW_HALF), named("max_id", HIGH_HALF)];
    pub const RECORD: &[WordLayout] = &[WordLayout::Address("bank_base_paddr"), WordLayout::Fields(REC_IDS)];
}

/// One fragment descriptor bank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragDescBank {
    pub base_paddr: BusAddr,
    pub min_id: u16,
    pub max_id: u16,
}

/// Fragment descriptor bank configuration.
///
/// ```text
/// w0: [type:8][pdev_id:2][swap:1][rsvd:5][num_banks:8][reserved:8]
/// per bank: addr base, [min_id:16][max_id:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragDescBankCfg {
    pub pdev_id: u8,
    /// Descriptors are byte-swapped by the target.
    pub swap: bool,
    pub banks: Vec<FragDescBank>,
}

impl Message for FragDescBankCfg {
    const CODE: u8 = H2tMsgType::FragDescBankCfg as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "FRAG_DESC_BANK_CFG",
        header: &[WordLayout::Fields(frag_desc_bank_cfg::W0)],
        records: RecordLayout::Words(frag_desc_bank_cfg::RECORD),
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[
            type_code::<Self>(),
            (frag_desc_bank_cfg::PDEV_ID, i64::from(self.pdev_id)),
            (frag_desc_bank_cfg::SWAP, i64::from(self.swap)),
            (frag_desc_bank_cfg::NUM_BANKS, self.banks.len() as i64),
        ])?;
        for bank in &self.banks {
            w.addr(bank.base_paddr)?;
            w.word(&[
                (LOW_HALF, i64::from(bank.min_id)),
                (HIGH_HALF, i64::from(bank.max_id)),
            ])?;
        }
        Ok(())
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        let count = frag_desc_bank_cfg::NUM_BANKS.read_u32(w0) as usize;
        let record_len = Self::LAYOUT.record_len(r.width()).unwrap_or(0);
        r.expect_records(count, record_len)?;

        let mut banks = Vec::with_capacity(count);
        for _ in 0..count {
            let base_paddr = r.addr()?;
            let ids = r.word()?;
            banks.push(FragDescBank {
                base_paddr,
                min_id: LOW_HALF.read_u32(ids) as u16,
                max_id: HIGH_HALF.read_u32(ids) as u16,
            });
        }
        Ok(Self {
            pdev_id: frag_desc_bank_cfg::PDEV_ID.read_u32(w0) as u8,
            swap: frag_desc_bank_cfg::SWAP.read_bool(w0),
            banks,
        })
    }
}

// ============================================================================
// MGMT_TX (deprecated)
// ============================================================================

mod mgmt_tx {
    use super::*;

    pub const LEN: FieldSpec = FieldSpec::uint(0, 16);
    pub const VDEV_ID: FieldSpec = FieldSpec::uint(16, 8);

    pub const W1: &[NamedField] = &[named("desc_id", FULL_WORD)];
    pub const W3: &[NamedField] = &[named("len", LEN), named("vdev_id", VDEV_ID)];
}

/// Management frame transmit. Superseded by [`TxFrm`]; kept so traces
/// from older hosts still decode.
///
/// ```text
/// w0: [type:8][reserved:24]
/// w1: desc_id
/// addr: frag_paddr
/// w3: [len:16][vdev_id:8][reserved:8]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MgmtTx {
    pub desc_id: u32,
    pub frag_paddr: BusAddr,
    pub len: u16,
    pub vdev_id: u8,
}

impl Message for MgmtTx {
    const CODE: u8 = H2tMsgType::MgmtTx as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "MGMT_TX",
        header: &[
            WordLayout::Fields(&[TYPE_FIELD]),
            WordLayout::Fields(mgmt_tx::W1),
            WordLayout::Address("frag_paddr"),
            WordLayout::Fields(mgmt_tx::W3),
        ],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>()])?;
        w.raw(self.desc_id);
        w.addr(self.frag_paddr)?;
        w.word(&[
            (mgmt_tx::LEN, i64::from(self.len)),
            (mgmt_tx::VDEV_ID, i64::from(self.vdev_id)),
        ])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        r.word()?;
        let desc_id = r.word()?;
        let frag_paddr = r.addr()?;
        let w3 = r.word()?;
        Ok(Self {
            desc_id,
            frag_paddr,
            len: mgmt_tx::LEN.read_u32(w3) as u16,
            vdev_id: mgmt_tx::VDEV_ID.read_u32(w3) as u8,
        })
    }
}

// ============================================================================
// WDI_IPA_OP_REQ
// ============================================================================

/// Data path offload operation request.
///
/// ```text
/// w0: [type:8][reserved:8][op_code:16]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WdiIpaOpReq {
    pub op_code: u16,
}

const WDI_IPA_OP_W0: &[NamedField] = &[TYPE_FIELD, named("op_code", HIGH_HALF)];

impl Message for WdiIpaOpReq {
    const CODE: u8 = H2tMsgType::WdiIpaOpReq as u8;
    const LAYOUT: MessageLayout = MessageLayout {
        name: "WDI_IPA_OP_REQ",
        header: &[WordLayout::Fields(WDI_IPA_OP_W0)],
        records: RecordLayout::None,
    };

    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow> {
        w.word(&[type_code::<Self>(), (HIGH_HALF, i64::from(self.op_code))])
    }

    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError> {
        let w0 = r.word()?;
        Ok(Self {
            op_code: HIGH_HALF.read_u32(w0) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::address::AddressWidth;

    #[test]
    fn test_tx_frm_layout_by_width() {
        let msg = TxFrm {
            vdev_id: 3,
            ext_tid: 31,
            tx_compl_req: true,
            frame_len: 1500,
            msdu_id: 0x1234,
            frag_desc_paddr: BusAddr::new(0x1_2345_6789),
            peer_id: 7,
            chan_freq: 5180,
            ..Default::default()
        };

        assert!(msg.encode(AddressWidth::Addr32).is_err());

        let bytes = msg.encode(AddressWidth::Addr64).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[0], 0x01);
        // vdev_id 3 at bits 21:16, ext_tid 31 at bits 26:22, compl_req at bit 31.
        let w0 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(w0, 0x01 | (3 << 16) | (31 << 22) | (1 << 31));
        assert_eq!(&bytes[8..16], &[0x89, 0x67, 0x45, 0x23, 0x01, 0, 0, 0]);
        assert_eq!(TxFrm::decode(&bytes, AddressWidth::Addr64).unwrap(), msg);
    }

    #[test]
    fn test_tx_frm_rejects_oversized_vdev() {
        let msg = TxFrm {
            vdev_id: 64,
            ..Default::default()
        };
        let err = msg.encode(AddressWidth::Addr32).unwrap_err();
        assert_eq!(err.width, 6);
    }

    #[test]
    fn test_rx_ring_cfg_record_length_by_width() {
        let ring = RxRingConfig {
            idx_shadow_paddr: BusAddr::new(0x1000),
            base_paddr: BusAddr::new(0x2000),
            ring_len: 1024,
            buf_size: 2048,
            enabled_flags: 0x3ff,
            rx_pkt_offset: 64,
        };
        let msg = RxRingCfg {
            rings: vec![ring.clone(), ring],
        };

        let narrow = msg.encode(AddressWidth::Addr32).unwrap();
        let wide = msg.encode(AddressWidth::Addr64).unwrap();
        assert_eq!(narrow.len(), 4 + 2 * 16);
        assert_eq!(wide.len(), 4 + 2 * 24);
        assert_eq!(RxRingCfg::decode(&narrow, AddressWidth::Addr32).unwrap(), msg);
        assert_eq!(RxRingCfg::decode(&wide, AddressWidth::Addr64).unwrap(), msg);
    }

    #[test]
    fn test_rx_ring_cfg_truncated_records() {
        let msg = RxRingCfg {
            rings: vec![RxRingConfig::default(); 3],
        };
        let bytes = msg.encode(AddressWidth::Addr64).unwrap();
        let cut = &bytes[..bytes.len() - 1];
        assert_eq!(
            RxRingCfg::decode(cut, AddressWidth::Addr64),
            Err(CodecError::TruncatedRecords {
                count: 3,
                record_len: 24,
                available: 71
            })
        );
    }

    #[test]
    fn test_stats_req_cookie_split() {
        let msg = StatsReq {
            upload_types: 0x00ff_ffff,
            reset_types: 0x0000_0003,
            stat_type: 2,
            config_param: 0xdead_beef,
            cookie: 0x0102_0304_0506_0708,
        };
        let bytes = msg.encode(AddressWidth::Addr32).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[16..24], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(StatsReq::decode(&bytes, AddressWidth::Addr32).unwrap(), msg);
    }

    #[test]
    fn test_aggr_cfg_limits() {
        let ok = AggrCfg {
            max_ampdu_subframes: 31,
            max_amsdu_subframes: 15,
        };
        assert!(ok.encode(AddressWidth::Addr32).is_ok());
        let too_big = AggrCfg {
            max_ampdu_subframes: 32,
            max_amsdu_subframes: 0,
        };
        assert!(too_big.encode(AddressWidth::Addr32).is_err());
        let ex = AggrCfgEx {
            max_ampdu_subframes: 64,
            max_amsdu_subframes: 7,
        };
        let bytes = ex.encode(AddressWidth::Addr32).unwrap();
        assert_eq!(bytes, [0x0a, 64, 7, 0]);
    }

    #[test]
    fn test_version_req_with_options() {
        let msg = VersionReq {
            options: vec![OptionTlv::inline(0x01, 1), OptionTlv::with_value(0x90, 0, &[0xaa; 4])],
        };
        let bytes = msg.encode(AddressWidth::Addr32).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(VersionReq::decode(&bytes, AddressWidth::Addr32).unwrap(), msg);
    }

    #[test]
    fn test_version_req_bad_tlv_offset_is_absolute() {
        let bytes = [0x00, 0, 0, 0, 0x01, 0x00, 0, 0];
        assert_eq!(
            VersionReq::decode(&bytes, AddressWidth::Addr32),
            Err(CodecError::MalformedTlv { offset: 4 })
        );
    }

    #[test]
    fn test_wrong_code_rejected() {
        let bytes = SyncReq { sync_count: 1 }.encode(AddressWidth::Addr32).unwrap();
        assert_eq!(
            AggrCfg::decode(&bytes, AddressWidth::Addr32),
            Err(CodecError::UnknownType(0x04))
        );
    }
}
