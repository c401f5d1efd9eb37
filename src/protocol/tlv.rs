//! Option TLV wire format.
//!
//! Option TLVs trail the version handshake messages. Each TLV starts with
//! a one-word header and carries `length - 1` further words of value:
//!
//! ```text
//! [tag:8][length:8][param:16]   length counts words, header included
//! [value: 4 * (length - 1) bytes]
//! ```
//!
//! Simple capabilities fit in the 16-bit inline `param`. The tag registry
//! is open and append-only; unknown tags are carried through untouched so
//! the negotiator can skip them.

use super::layout::{WordReader, WordWriter};
use super::CodecError;
use crate::bitfield::FieldSpec;
use std::fmt;

/// Tag field of the TLV header.
pub const TLV_TAG: FieldSpec = FieldSpec::uint(0, 8);
/// Length field of the TLV header, in words.
pub const TLV_LENGTH: FieldSpec = FieldSpec::uint(8, 8);
/// Inline parameter of the TLV header.
pub const TLV_PARAM: FieldSpec = FieldSpec::uint(16, 16);

/// Size of the TLV header in bytes.
pub const TLV_HEADER_SIZE: usize = 4;

/// Known option tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionTag {
    /// Bus address width: param 0 = 32-bit, 1 = 64-bit.
    BusAddrSize = 0x01,
    /// Suppress per-frame tx completions in favour of bulk credit updates.
    SuppressTxComplInd = 0x02,
    /// Maximum number of tx queue groups.
    MaxTxQueueGroups = 0x03,
    /// Extended tx MSDU descriptors supported.
    TxMsduDescExt = 0x04,
}

impl OptionTag {
    /// Try to convert from a byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(OptionTag::BusAddrSize),
            0x02 => Some(OptionTag::SuppressTxComplInd),
            0x03 => Some(OptionTag::MaxTxQueueGroups),
            0x04 => Some(OptionTag::TxMsduDescExt),
            _ => None,
        }
    }

    /// Convert to a byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for OptionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionTag::BusAddrSize => "BUS_ADDR_SIZE",
            OptionTag::SuppressTxComplInd => "SUPPRESS_TX_COMPL_IND",
            OptionTag::MaxTxQueueGroups => "MAX_TX_QUEUE_GROUPS",
            OptionTag::TxMsduDescExt => "TX_MSDU_DESC_EXT",
        };
        write!(f, "{}", name)
    }
}

/// One option TLV.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionTlv {
    /// Raw tag byte, possibly unknown to this side.
    pub tag: u8,
    /// Inline 16-bit parameter.
    pub param: u16,
    /// Trailing value bytes; always a multiple of 4 long.
    value: Vec<u8>,
}

impl OptionTlv {
    /// A header-only TLV carrying its value inline.
    pub fn inline(tag: u8, param: u16) -> Self {
        Self {
            tag,
            param,
            value: Vec::new(),
        }
    }

    /// A TLV with trailing value bytes, zero-padded to a word boundary.
    pub fn with_value(tag: u8, param: u16, value: &[u8]) -> Self {
        let mut value = value.to_vec();
        while value.len() % 4 != 0 {
            value.push(0);
        }
        Self { tag, param, value }
    }

    /// Known tag, if any.
    pub fn known_tag(&self) -> Option<OptionTag> {
        OptionTag::from_byte(self.tag)
    }

    /// Trailing value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Total length in words, header included.
    pub fn length_in_words(&self) -> usize {
        1 + self.value.len() / 4
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        self.length_in_words() * 4
    }
}

/// Append TLVs to a message being written.
///
/// A TLV longer than 255 words cannot be expressed and is reported as a
/// length-field overflow.
pub fn write_tlvs(w: &mut WordWriter, tlvs: &[OptionTlv]) -> Result<(), crate::bitfield::FieldOverflow> {
    for tlv in tlvs {
        w.word(&[
            (TLV_TAG, i64::from(tlv.tag)),
            (TLV_LENGTH, tlv.length_in_words() as i64),
            (TLV_PARAM, i64::from(tlv.param)),
        ])?;
        w.bytes_padded(&tlv.value);
    }
    Ok(())
}

/// Encode TLVs on their own.
pub fn encode_tlvs(tlvs: &[OptionTlv]) -> Result<Vec<u8>, crate::bitfield::FieldOverflow> {
    let mut w = WordWriter::new(Default::default());
    write_tlvs(&mut w, tlvs)?;
    Ok(w.finish())
}

/// Parse all TLVs in `data`.
///
/// Unknown tags are returned as-is; their length field is what moves the
/// cursor past them. A zero length, a TLV overrunning the buffer or a
/// trailing fragment shorter than a header is malformed.
pub fn decode_tlvs(data: &[u8]) -> Result<Vec<OptionTlv>, CodecError> {
    let mut r = WordReader::new(data, Default::default());
    let mut tlvs = Vec::new();

    while !r.remaining().is_empty() {
        let offset = r.position();
        let header = r.word().map_err(|_| CodecError::MalformedTlv { offset })?;
        let length = TLV_LENGTH.read_u32(header) as usize;
        if length == 0 {
            return Err(CodecError::MalformedTlv { offset });
        }
        let value = r
            .bytes((length - 1) * 4)
            .map_err(|_| CodecError::MalformedTlv { offset })?;
        tlvs.push(OptionTlv {
            tag: TLV_TAG.read_u32(header) as u8,
            param: TLV_PARAM.read_u32(header) as u16,
            value: value.to_vec(),
        });
    }

    Ok(tlvs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_tlv_encoding() {
        let bytes = encode_tlvs(&[OptionTlv::inline(OptionTag::BusAddrSize.to_byte(), 1)]).unwrap();
        assert_eq!(bytes, [0x01, 0x01, 0x01, 0x00]);
    }

    #[test]
    fn test_value_tlv_padded() {
        let tlv = OptionTlv::with_value(0x7e, 0xBEEF, &[1, 2, 3, 4, 5]);
        assert_eq!(tlv.length_in_words(), 3);
        assert_eq!(tlv.value().len(), 8);

        let bytes = encode_tlvs(&[tlv.clone()]).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..4], &[0x7e, 0x03, 0xEF, 0xBE]);
        assert_eq!(decode_tlvs(&bytes).unwrap(), vec![tlv]);
    }

    #[test]
    fn test_unknown_tag_skipped_by_length() {
        // Unknown tag with two words of arbitrary value, then a known tag.
        let mut bytes = vec![0xA5, 0x03, 0xFF, 0xFF];
        bytes.extend_from_slice(&[0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01]);
        bytes.extend_from_slice(&[0x03, 0x01, 0x08, 0x00]);

        let tlvs = decode_tlvs(&bytes).unwrap();
        assert_eq!(tlvs.len(), 2);
        assert_eq!(tlvs[0].known_tag(), None);
        assert_eq!(tlvs[1].known_tag(), Some(OptionTag::MaxTxQueueGroups));
        assert_eq!(tlvs[1].param, 8);
    }

    #[test]
    fn test_zero_length_rejected() {
        let bytes = [0x01, 0x00, 0x00, 0x00];
        assert_eq!(decode_tlvs(&bytes), Err(CodecError::MalformedTlv { offset: 0 }));
    }

    #[test]
    fn test_overrun_rejected() {
        let bytes = [0x01, 0x01, 0x00, 0x00, 0x09, 0x04, 0x00, 0x00, 0xAA, 0xAA];
        assert_eq!(decode_tlvs(&bytes), Err(CodecError::MalformedTlv { offset: 4 }));
    }

    #[test]
    fn test_trailing_fragment_rejected() {
        let bytes = [0x01, 0x01, 0x00, 0x00, 0x02];
        assert_eq!(decode_tlvs(&bytes), Err(CodecError::MalformedTlv { offset: 4 }));
    }

    #[test]
    fn test_empty_is_empty_list() {
        assert!(decode_tlvs(&[]).unwrap().is_empty());
    }
}
