//! Host/Target Messages
//!
//! Wire format definitions for the command and indication messages
//! exchanged between the host driver and the radio firmware.
//!
//! ## Layout
//!
//! Every message is a sequence of little-endian 32-bit words. Word 0
//! carries the 8-bit type code in bits 7:0; the rest of each word is split
//! into sub-fields described by [`FieldSpec`](crate::bitfield::FieldSpec)
//! tables rather than packed structs.
//!
//! ## Address width
//!
//! Bus addresses are one word or a low-first pair of words, depending on
//! what the version handshake negotiated. Messages are written once and
//! parameterized by [`AddressWidth`]; the catalog never exposes separate
//! 32-bit and 64-bit shapes.
//!
//! ## Versioning
//!
//! Type codes are append-only within a major version. Retired messages
//! stay decodable and renamed identifiers survive as deprecated aliases.

mod address;
mod catalog;
mod error;
pub mod h2t;
pub mod layout;
pub mod t2h;
mod tlv;
mod types;
#[cfg(test)]
mod tests;

pub use address::{read_addr, write_addr, AddressWidth, BusAddr};
pub use catalog::{decode, decode_t2h, layout_of, layouts, DecodedMessage, H2tMessage, T2hMessage};
pub use error::CodecError;
pub use layout::{
    mac_from_words, MacAddr, Message, MessageLayout, NamedField, RecordLayout, WordLayout, WordReader,
    WordWriter,
};
pub use tlv::{decode_tlvs, encode_tlvs, OptionTag, OptionTlv, TLV_HEADER_SIZE};
pub use types::{Direction, H2tMsgType, MessageType, ProtocolVersion, T2hMsgType, PROTOCOL_VERSION};
