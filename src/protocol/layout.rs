//! Word layouts and the shared encode/decode machinery.
//!
//! Each message declares its wire shape as a [`MessageLayout`]: a list of
//! header words (either sub-field tables or address slots), followed by an
//! optional run of fixed-size records or option TLVs. The layout is the
//! single source of truth for minimum lengths and is what the catalog
//! registry exposes for introspection.
//!
//! ```text
//! word 0: [type:8][..fields..]
//! word 1: [..fields..]
//! addr  : [lo:32] or [lo:32][hi:32]
//! recs  : count x record
//! ```

use super::address::{read_addr, write_addr, AddressWidth, BusAddr};
use super::CodecError;
use crate::bitfield::{FieldOverflow, FieldSpec};

/// Type code, bits 7:0 of word 0 in every message.
pub const MSG_TYPE: FieldSpec = FieldSpec::uint(0, 8);

/// Whole-word field.
pub const FULL_WORD: FieldSpec = FieldSpec::full();

/// Low half-word.
pub const LOW_HALF: FieldSpec = FieldSpec::uint(0, 16);

/// High half-word.
pub const HIGH_HALF: FieldSpec = FieldSpec::uint(16, 16);

// ============================================================================
// Layout Tables
// ============================================================================

/// A named sub-field of a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedField {
    pub name: &'static str,
    pub spec: FieldSpec,
}

/// Build a [`NamedField`].
pub const fn named(name: &'static str, spec: FieldSpec) -> NamedField {
    NamedField { name, spec }
}

/// The type-code entry shared by every word-0 table.
pub const TYPE_FIELD: NamedField = named("msg_type", MSG_TYPE);

/// One slot in a header or record.
#[derive(Clone, Copy, Debug)]
pub enum WordLayout {
    /// A single word split into sub-fields.
    Fields(&'static [NamedField]),
    /// A bus address, one or two words depending on the session width.
    Address(&'static str),
}

impl WordLayout {
    /// Number of words this slot occupies.
    pub fn words(&self, width: AddressWidth) -> usize {
        match self {
            WordLayout::Fields(_) => 1,
            WordLayout::Address(_) => width.words(),
        }
    }
}

/// What follows the fixed header.
#[derive(Clone, Copy, Debug)]
pub enum RecordLayout {
    /// Nothing.
    None,
    /// `count` records of whole words.
    Words(&'static [WordLayout]),
    /// `count` packed little-endian units of the given byte size, padded
    /// to a word boundary.
    Bytes(usize),
    /// Option TLVs until the end of the message.
    OptionTlvs,
}

/// Wire shape of one message.
#[derive(Clone, Copy, Debug)]
pub struct MessageLayout {
    pub name: &'static str,
    pub header: &'static [WordLayout],
    pub records: RecordLayout,
}

impl MessageLayout {
    /// Fixed header length in bytes.
    pub fn header_len(&self, width: AddressWidth) -> usize {
        self.header.iter().map(|w| w.words(width)).sum::<usize>() * 4
    }

    /// Size of one trailing record in bytes, if the message has records.
    pub fn record_len(&self, width: AddressWidth) -> Option<usize> {
        match self.records {
            RecordLayout::None | RecordLayout::OptionTlvs => None,
            RecordLayout::Words(words) => Some(words.iter().map(|w| w.words(width)).sum::<usize>() * 4),
            RecordLayout::Bytes(n) => Some(n),
        }
    }

    /// All sub-field tables, header first, then record words.
    pub fn field_words(&self) -> impl Iterator<Item = &'static [NamedField]> {
        let header: &'static [WordLayout] = self.header;
        let records: &'static [WordLayout] = match self.records {
            RecordLayout::Words(words) => words,
            _ => &[],
        };
        header.iter().chain(records.iter()).filter_map(|w| match w {
            WordLayout::Fields(fields) => Some(*fields),
            WordLayout::Address(_) => None,
        })
    }

    /// Number of address slots per header and per record.
    pub fn address_slots(&self) -> usize {
        let records: &[WordLayout] = match self.records {
            RecordLayout::Words(words) => words,
            _ => &[],
        };
        self.header
            .iter()
            .chain(records.iter())
            .filter(|w| matches!(w, WordLayout::Address(_)))
            .count()
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Sequential little-endian word writer.
#[derive(Debug)]
pub struct WordWriter {
    buf: Vec<u8>,
    width: AddressWidth,
}

impl WordWriter {
    pub fn new(width: AddressWidth) -> Self {
        Self {
            buf: Vec::with_capacity(32),
            width,
        }
    }

    /// Address width this writer encodes with.
    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Append one word assembled from `(field, value)` pairs.
    pub fn word(&mut self, fields: &[(FieldSpec, i64)]) -> Result<(), FieldOverflow> {
        let mut word = 0u32;
        for (spec, value) in fields {
            spec.write(&mut word, *value)?;
        }
        self.raw(word);
        Ok(())
    }

    /// Append a pre-assembled word.
    pub fn raw(&mut self, word: u32) {
        self.buf.extend_from_slice(&word.to_le_bytes());
    }

    /// Append a bus address in the session width.
    pub fn addr(&mut self, addr: BusAddr) -> Result<(), FieldOverflow> {
        write_addr(&mut self.buf, addr, self.width)
    }

    /// Append raw bytes and zero-pad to the next word boundary.
    pub fn bytes_padded(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    /// Zero-pad to the next word boundary.
    pub fn pad(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Sequential little-endian word reader over a borrowed buffer.
///
/// Every read is bounds-checked; running off the end is a
/// [`CodecError::TooShort`].
#[derive(Debug)]
pub struct WordReader<'a> {
    data: &'a [u8],
    pos: usize,
    width: AddressWidth,
}

impl<'a> WordReader<'a> {
    pub fn new(data: &'a [u8], width: AddressWidth) -> Self {
        Self {
            data,
            pos: 0,
            width,
        }
    }

    /// Address width this reader decodes with.
    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    fn too_short(&self, needed: usize) -> CodecError {
        CodecError::TooShort {
            expected: self.pos + needed,
            got: self.data.len(),
        }
    }

    /// Read the next word.
    pub fn word(&mut self) -> Result<u32, CodecError> {
        let rest = self.remaining();
        if rest.len() < 4 {
            return Err(self.too_short(4));
        }
        let word = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
        self.pos += 4;
        Ok(word)
    }

    /// Read the next bus address.
    pub fn addr(&mut self) -> Result<BusAddr, CodecError> {
        let addr = read_addr(self.remaining(), self.width).ok_or_else(|| self.too_short(self.width.bytes()))?;
        self.pos += self.width.bytes();
        Ok(addr)
    }

    /// Read `n` raw bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let rest = self.remaining();
        if rest.len() < n {
            return Err(self.too_short(n));
        }
        self.pos += n;
        Ok(&rest[..n])
    }

    /// Read a little-endian u16.
    pub fn u16(&mut self) -> Result<u16, CodecError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Consume everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        self.pos = self.data.len();
        rest
    }

    /// Confirm that `count` records of `record_len` bytes are present
    /// before any of them is read.
    pub fn expect_records(&self, count: usize, record_len: usize) -> Result<(), CodecError> {
        let available = self.remaining().len();
        let fits = count
            .checked_mul(record_len)
            .map(|needed| needed <= available)
            .unwrap_or(false);
        if fits {
            Ok(())
        } else {
            Err(CodecError::TruncatedRecords {
                count,
                record_len,
                available,
            })
        }
    }
}

// ============================================================================
// Message Trait
// ============================================================================

/// A fixed-layout message with a type code in bits 7:0 of word 0.
pub trait Message: Sized {
    /// Type code in word 0.
    const CODE: u8;

    /// Wire layout.
    const LAYOUT: MessageLayout;

    /// Write every word, including word 0 with the type code.
    fn write(&self, w: &mut WordWriter) -> Result<(), FieldOverflow>;

    /// Read every word, including word 0. The buffer has already been
    /// checked against the fixed header length and type code.
    fn read(r: &mut WordReader<'_>) -> Result<Self, CodecError>;

    /// Encode to wire bytes.
    fn encode(&self, width: AddressWidth) -> Result<Vec<u8>, FieldOverflow> {
        let mut w = WordWriter::new(width);
        self.write(&mut w)?;
        Ok(w.finish())
    }

    /// Decode from wire bytes.
    fn decode(data: &[u8], width: AddressWidth) -> Result<Self, CodecError> {
        let expected = Self::LAYOUT.header_len(width);
        if data.len() < expected {
            return Err(CodecError::TooShort {
                expected,
                got: data.len(),
            });
        }
        if data[0] != Self::CODE {
            return Err(CodecError::UnknownType(data[0]));
        }
        Self::read(&mut WordReader::new(data, width))
    }
}

/// Shorthand for the `(MSG_TYPE, code)` pair at the start of word 0.
pub fn type_code<M: Message>() -> (FieldSpec, i64) {
    (MSG_TYPE, i64::from(M::CODE))
}

// ============================================================================
// MAC Address Words
// ============================================================================

/// A 6-byte hardware address.
pub type MacAddr = [u8; 6];

/// Layout entry for the word holding MAC bytes 0..4.
pub const MAC_LO: NamedField = named("mac_lo", FULL_WORD);

/// Layout entry for MAC bytes 4..6 in bits 15:0.
pub const MAC_HI: NamedField = named("mac_hi", LOW_HALF);

/// MAC bytes 0..4 as a little-endian word.
pub fn mac_lo(mac: &MacAddr) -> u32 {
    u32::from_le_bytes([mac[0], mac[1], mac[2], mac[3]])
}

/// MAC bytes 4..6 as the value of [`MAC_HI`].
pub fn mac_hi(mac: &MacAddr) -> i64 {
    i64::from(u16::from_le_bytes([mac[4], mac[5]]))
}

/// Reassemble a MAC from its two words.
pub fn mac_from_words(lo: u32, hi: u32) -> MacAddr {
    let lo = lo.to_le_bytes();
    let hi = (MAC_HI.spec.read_u32(hi) as u16).to_le_bytes();
    [lo[0], lo[1], lo[2], lo[3], hi[0], hi[1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    const W0: &[NamedField] = &[TYPE_FIELD, named("count", FieldSpec::uint(8, 8))];
    const REC: &[WordLayout] = &[WordLayout::Address("paddr"), WordLayout::Fields(&[named("len", LOW_HALF)])];
    const LAYOUT: MessageLayout = MessageLayout {
        name: "TEST",
        header: &[WordLayout::Fields(W0), WordLayout::Address("base")],
        records: RecordLayout::Words(REC),
    };

    #[test]
    fn test_layout_lengths_follow_width() {
        assert_eq!(LAYOUT.header_len(AddressWidth::Addr32), 8);
        assert_eq!(LAYOUT.header_len(AddressWidth::Addr64), 12);
        assert_eq!(LAYOUT.record_len(AddressWidth::Addr32), Some(8));
        assert_eq!(LAYOUT.record_len(AddressWidth::Addr64), Some(12));
        assert_eq!(LAYOUT.address_slots(), 2);
        assert_eq!(LAYOUT.field_words().count(), 2);
    }

    #[test]
    fn test_writer_reader_words() {
        let mut w = WordWriter::new(AddressWidth::Addr64);
        w.word(&[(MSG_TYPE, 0x42), (FieldSpec::uint(8, 8), 3)]).unwrap();
        w.addr(BusAddr::new(0xAABB_CCDD_0011_2233)).unwrap();
        w.bytes_padded(&[1, 2, 3]);
        let buf = w.finish();
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf[..4], &[0x42, 0x03, 0x00, 0x00]);

        let mut r = WordReader::new(&buf, AddressWidth::Addr64);
        assert_eq!(r.word().unwrap(), 0x0342);
        assert_eq!(r.addr().unwrap(), BusAddr::new(0xAABB_CCDD_0011_2233));
        assert_eq!(r.bytes(3).unwrap(), &[1, 2, 3]);
        assert_eq!(r.rest(), &[0]);
        assert!(matches!(r.word(), Err(CodecError::TooShort { expected: 20, got: 16 })));
    }

    #[test]
    fn test_expect_records() {
        let buf = [0u8; 10];
        let r = WordReader::new(&buf, AddressWidth::Addr32);
        assert!(r.expect_records(5, 2).is_ok());
        assert_eq!(
            r.expect_records(3, 4),
            Err(CodecError::TruncatedRecords {
                count: 3,
                record_len: 4,
                available: 10
            })
        );
        assert!(r.expect_records(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_mac_words() {
        let mac = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        let lo = mac_lo(&mac);
        let mut hi = 0u32;
        MAC_HI.spec.write(&mut hi, mac_hi(&mac)).unwrap();
        assert_eq!(mac_from_words(lo, hi), mac);
    }
}
