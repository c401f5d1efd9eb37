//! Capability sets and their option TLV encoding.

use crate::protocol::{AddressWidth, OptionTag, OptionTlv, ProtocolVersion, PROTOCOL_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// How the target reports transmit completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxCompletionMode {
    /// One TX_COMPL_IND per frame.
    #[default]
    PerFrame,
    /// Per-frame completions suppressed; TX_CREDIT_UPDATE_IND in bulk.
    BulkCredit,
}

impl fmt::Display for TxCompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxCompletionMode::PerFrame => "per-frame",
            TxCompletionMode::BulkCredit => "bulk-credit",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// What one side advertises in its version message.
///
/// This is also the `capabilities.*` configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Bus address width (`capabilities.address_width`).
    #[serde(default)]
    pub address_width: AddressWidth,
    /// Requested completion mode (`capabilities.tx_completion`).
    #[serde(default)]
    pub tx_completion: TxCompletionMode,
    /// Supported tx queue groups (`capabilities.max_tx_queue_groups`).
    #[serde(default)]
    pub max_tx_queue_groups: u16,
    /// Extended tx MSDU descriptors (`capabilities.tx_msdu_desc_ext`).
    #[serde(default)]
    pub tx_msdu_desc_ext: bool,
}

impl Default for Capabilities {
    /// The value assumed for a peer that sends no TLVs at all.
    fn default() -> Self {
        Self {
            address_width: AddressWidth::Addr32,
            tx_completion: TxCompletionMode::PerFrame,
            max_tx_queue_groups: 0,
            tx_msdu_desc_ext: false,
        }
    }
}

impl Capabilities {
    /// One TLV per capability, in tag order.
    pub fn to_tlvs(&self) -> Vec<OptionTlv> {
        let addr = match self.address_width {
            AddressWidth::Addr32 => 0,
            AddressWidth::Addr64 => 1,
        };
        let bulk = match self.tx_completion {
            TxCompletionMode::PerFrame => 0,
            TxCompletionMode::BulkCredit => 1,
        };
        vec![
            OptionTlv::inline(OptionTag::BusAddrSize.to_byte(), addr),
            OptionTlv::inline(OptionTag::SuppressTxComplInd.to_byte(), bulk),
            OptionTlv::inline(OptionTag::MaxTxQueueGroups.to_byte(), self.max_tx_queue_groups),
            OptionTlv::inline(OptionTag::TxMsduDescExt.to_byte(), u16::from(self.tx_msdu_desc_ext)),
        ]
    }

    /// Read a peer's advertised capabilities.
    ///
    /// Absent tags keep their defaults. Unknown tags are skipped. When a
    /// known tag repeats, the first occurrence counts.
    pub fn from_tlvs(tlvs: &[OptionTlv]) -> Self {
        let mut caps = Self::default();
        let mut seen: Vec<OptionTag> = Vec::with_capacity(4);

        for tlv in tlvs {
            let Some(tag) = tlv.known_tag() else {
                debug!(tag = tlv.tag, words = tlv.length_in_words(), "Skipping unknown option TLV");
                continue;
            };
            if seen.contains(&tag) {
                debug!(%tag, "Ignoring repeated option TLV");
                continue;
            }
            seen.push(tag);

            match tag {
                OptionTag::BusAddrSize => {
                    caps.address_width = if tlv.param == 1 {
                        AddressWidth::Addr64
                    } else {
                        AddressWidth::Addr32
                    };
                }
                OptionTag::SuppressTxComplInd => {
                    caps.tx_completion = if tlv.param == 1 {
                        TxCompletionMode::BulkCredit
                    } else {
                        TxCompletionMode::PerFrame
                    };
                }
                OptionTag::MaxTxQueueGroups => caps.max_tx_queue_groups = tlv.param,
                OptionTag::TxMsduDescExt => caps.tx_msdu_desc_ext = tlv.param == 1,
            }
        }

        caps
    }

    /// Combine with the peer's capabilities.
    ///
    /// Each optional feature is enabled only when both sides ask for it;
    /// the queue-group limit is the lower of the two.
    pub fn resolve(&self, peer: &Capabilities, peer_version: ProtocolVersion) -> NegotiatedCaps {
        let addr64 = self.address_width == AddressWidth::Addr64 && peer.address_width == AddressWidth::Addr64;
        let bulk = self.tx_completion == TxCompletionMode::BulkCredit
            && peer.tx_completion == TxCompletionMode::BulkCredit;

        NegotiatedCaps {
            peer_version,
            address_width: if addr64 { AddressWidth::Addr64 } else { AddressWidth::Addr32 },
            tx_completion: if bulk {
                TxCompletionMode::BulkCredit
            } else {
                TxCompletionMode::PerFrame
            },
            max_tx_queue_groups: self.max_tx_queue_groups.min(peer.max_tx_queue_groups),
            tx_msdu_desc_ext: self.tx_msdu_desc_ext && peer.tx_msdu_desc_ext,
        }
    }
}

// ============================================================================
// Negotiated Result
// ============================================================================

/// The configuration both sides agreed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedCaps {
    pub peer_version: ProtocolVersion,
    pub address_width: AddressWidth,
    pub tx_completion: TxCompletionMode,
    pub max_tx_queue_groups: u16,
    pub tx_msdu_desc_ext: bool,
}

impl Default for NegotiatedCaps {
    /// What a session uses before the handshake completes.
    fn default() -> Self {
        Capabilities::default().resolve(&Capabilities::default(), PROTOCOL_VERSION)
    }
}

impl fmt::Display for NegotiatedCaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} {} addr, {} completion, {} queue groups, desc ext {}",
            self.peer_version,
            self.address_width,
            self.tx_completion,
            self.max_tx_queue_groups,
            if self.tx_msdu_desc_ext { "on" } else { "off" }
        )
    }
}

/// Session-wide negotiated capabilities.
///
/// Written once when the handshake completes and read-only afterwards.
/// Readers on any thread see either the defaults or the complete
/// negotiated value.
#[derive(Debug, Default)]
pub struct SessionCaps {
    cell: OnceLock<NegotiatedCaps>,
}

impl SessionCaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the negotiated value. Returns the rejected value if one was
    /// already published.
    pub fn publish(&self, caps: NegotiatedCaps) -> Result<(), NegotiatedCaps> {
        self.cell.set(caps)
    }

    /// Current capabilities, defaults before negotiation.
    pub fn get(&self) -> NegotiatedCaps {
        self.cell.get().copied().unwrap_or_default()
    }

    pub fn is_negotiated(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Address width for encode/decode calls.
    pub fn address_width(&self) -> AddressWidth {
        self.get().address_width
    }
}
