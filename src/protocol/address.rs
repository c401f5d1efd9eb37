//! Bus address width adapter.
//!
//! Descriptor pointers, ring base addresses and index-shadow registers are
//! carried either as one 32-bit word or as two consecutive little-endian
//! words (low word first). The width is negotiated once per session; every
//! address-bearing message goes through [`write_addr`] and [`read_addr`] so
//! callers only ever see a single [`BusAddr`].

use crate::bitfield::FieldOverflow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of bus addresses on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressWidth {
    /// One 32-bit word.
    #[default]
    Addr32,
    /// Two little-endian 32-bit words, low word first.
    Addr64,
}

impl AddressWidth {
    /// Number of 32-bit words one address occupies.
    pub fn words(self) -> usize {
        match self {
            AddressWidth::Addr32 => 1,
            AddressWidth::Addr64 => 2,
        }
    }

    /// Number of bytes one address occupies.
    pub fn bytes(self) -> usize {
        self.words() * 4
    }

    /// Largest representable address.
    pub fn max_addr(self) -> u64 {
        match self {
            AddressWidth::Addr32 => u64::from(u32::MAX),
            AddressWidth::Addr64 => u64::MAX,
        }
    }
}

impl fmt::Display for AddressWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressWidth::Addr32 => "32-bit",
            AddressWidth::Addr64 => "64-bit",
        };
        write!(f, "{}", name)
    }
}

/// A DMA-visible bus address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusAddr(u64);

impl BusAddr {
    /// Create from a raw address.
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Assemble from the low and high wire words.
    pub fn from_parts(lo: u32, hi: u32) -> Self {
        Self(u64::from(lo) | (u64::from(hi) << 32))
    }

    /// Raw address value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Low 32 bits.
    pub fn lo(&self) -> u32 {
        self.0 as u32
    }

    /// High 32 bits.
    pub fn hi(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Check whether the address is representable at `width`.
    pub fn fits(&self, width: AddressWidth) -> bool {
        self.0 <= width.max_addr()
    }
}

impl fmt::Display for BusAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for BusAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

/// Append an address to `buf` in the given width.
///
/// A 32-bit session cannot carry an address above 4 GiB; that is reported
/// as an overflow of the 32-bit field rather than silently truncated.
pub fn write_addr(buf: &mut Vec<u8>, addr: BusAddr, width: AddressWidth) -> Result<(), FieldOverflow> {
    if !addr.fits(width) {
        return Err(FieldOverflow {
            value: i64::try_from(addr.as_u64()).unwrap_or(i64::MAX),
            width: 32,
            signed: false,
        });
    }
    buf.extend_from_slice(&addr.lo().to_le_bytes());
    if width == AddressWidth::Addr64 {
        buf.extend_from_slice(&addr.hi().to_le_bytes());
    }
    Ok(())
}

/// Read an address from the start of `data`.
///
/// Returns None if fewer than `width.bytes()` bytes are available.
pub fn read_addr(data: &[u8], width: AddressWidth) -> Option<BusAddr> {
    if data.len() < width.bytes() {
        return None;
    }
    let lo = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let hi = match width {
        AddressWidth::Addr32 => 0,
        AddressWidth::Addr64 => u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
    };
    Some(BusAddr::from_parts(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_sizes() {
        assert_eq!(AddressWidth::Addr32.words(), 1);
        assert_eq!(AddressWidth::Addr64.words(), 2);
        assert_eq!(AddressWidth::Addr64.bytes(), 8);
        assert_eq!(AddressWidth::default(), AddressWidth::Addr32);
    }

    #[test]
    fn test_addr64_low_word_first() {
        let addr = BusAddr::new(0x1122_3344_5566_7788);
        let mut buf = Vec::new();
        write_addr(&mut buf, addr, AddressWidth::Addr64).unwrap();
        assert_eq!(buf, [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
        assert_eq!(read_addr(&buf, AddressWidth::Addr64), Some(addr));
    }

    #[test]
    fn test_addr32_rejects_high_address() {
        let mut buf = Vec::new();
        let err = write_addr(&mut buf, BusAddr::new(1 << 32), AddressWidth::Addr32).unwrap_err();
        assert_eq!(err.width, 32);
        assert!(buf.is_empty());

        write_addr(&mut buf, BusAddr::new(0xFFFF_FFFF), AddressWidth::Addr32).unwrap();
        assert_eq!(buf.len(), 4);
        assert_eq!(read_addr(&buf, AddressWidth::Addr32), Some(BusAddr::new(0xFFFF_FFFF)));
    }

    #[test]
    fn test_read_addr_short() {
        assert_eq!(read_addr(&[1, 2, 3], AddressWidth::Addr32), None);
        assert_eq!(read_addr(&[0; 7], AddressWidth::Addr64), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(BusAddr::new(0x1000).to_string(), "0x1000");
        assert_eq!(AddressWidth::Addr64.to_string(), "64-bit");
    }
}
