//! Bit-field access over 32-bit message words.
//!
//! Every sub-field of a host/target message lives at a fixed bit offset
//! and width inside one little-endian 32-bit word. Instead of packed
//! struct members, fields are described by a [`FieldSpec`] and all
//! reads and writes go through [`get`] and [`set`], which never touch bits
//! outside the declared range.
//!
//! ## Domain
//!
//! A spec is in range when `width >= 1` and `offset + width <= 32`. Specs
//! that reach past bit 31 are clipped to the bits that exist; a zero-width
//! field reads as 0 and only accepts 0.

use thiserror::Error;

/// Number of bits in a message word.
pub const WORD_BITS: u8 = 32;

/// A value did not fit in the bit width of the field it was written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("value {value} does not fit in {width}-bit {} field", signedness(.signed))]
pub struct FieldOverflow {
    /// The rejected value.
    pub value: i64,
    /// Effective width of the field in bits.
    pub width: u8,
    /// Whether the field is two's-complement signed.
    pub signed: bool,
}

fn signedness(signed: &bool) -> &'static str {
    if *signed {
        "signed"
    } else {
        "unsigned"
    }
}

/// Position of one sub-field inside a 32-bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Bit offset of the least significant bit.
    pub offset: u8,
    /// Width in bits.
    pub width: u8,
    /// Two's-complement signed field.
    pub signed: bool,
}

impl FieldSpec {
    /// Unsigned field of `width` bits starting at `offset`.
    pub const fn uint(offset: u8, width: u8) -> Self {
        Self {
            offset,
            width,
            signed: false,
        }
    }

    /// Signed field of `width` bits starting at `offset`.
    pub const fn int(offset: u8, width: u8) -> Self {
        Self {
            offset,
            width,
            signed: true,
        }
    }

    /// Single-bit flag at `offset`.
    pub const fn flag(offset: u8) -> Self {
        Self::uint(offset, 1)
    }

    /// Whole 32-bit word as one unsigned field.
    pub const fn full() -> Self {
        Self::uint(0, WORD_BITS)
    }

    /// Width actually available inside the word.
    pub fn effective_width(&self) -> u8 {
        effective_width(self.offset, self.width)
    }

    /// Bit mask of this field in place within the word.
    pub fn mask(&self) -> u32 {
        let width = self.effective_width();
        if width == 0 {
            return 0;
        }
        low_mask(width) << self.offset
    }

    /// Smallest value the field can hold.
    pub fn min_value(&self) -> i64 {
        let width = self.effective_width();
        if self.signed && width > 0 {
            -(1i64 << (width - 1))
        } else {
            0
        }
    }

    /// Largest value the field can hold.
    pub fn max_value(&self) -> i64 {
        let width = self.effective_width();
        if width == 0 {
            0
        } else if self.signed {
            (1i64 << (width - 1)) - 1
        } else {
            i64::from(low_mask(width))
        }
    }

    /// Check whether two fields share any bit.
    pub fn overlaps(&self, other: &FieldSpec) -> bool {
        self.mask() & other.mask() != 0
    }

    /// Read the field, sign-extending when signed.
    pub fn read(&self, word: u32) -> i64 {
        get(word, self.offset, self.width, self.signed)
    }

    /// Read an unsigned field as raw bits.
    pub fn read_u32(&self, word: u32) -> u32 {
        get(word, self.offset, self.width, false) as u32
    }

    /// Read a signed field.
    pub fn read_i32(&self, word: u32) -> i32 {
        get(word, self.offset, self.width, true) as i32
    }

    /// Read a flag.
    pub fn read_bool(&self, word: u32) -> bool {
        self.read_u32(word) != 0
    }

    /// Write `value` into the field, leaving every other bit untouched.
    pub fn write(&self, word: &mut u32, value: i64) -> Result<(), FieldOverflow> {
        set(word, self.offset, self.width, self.signed, value)
    }
}

fn effective_width(offset: u8, width: u8) -> u8 {
    if offset >= WORD_BITS {
        0
    } else {
        width.min(WORD_BITS - offset)
    }
}

fn low_mask(width: u8) -> u32 {
    if width >= WORD_BITS {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

fn sign_extend(raw: u32, width: u8) -> i64 {
    let shift = 64 - u32::from(width);
    (i64::from(raw) << shift) >> shift
}

/// Check whether `value` is representable in `width` bits.
pub fn fits(value: i64, width: u8, signed: bool) -> bool {
    if width == 0 {
        return value == 0;
    }
    if signed {
        let half = 1i64 << (width.min(WORD_BITS) - 1);
        value >= -half && value < half
    } else {
        value >= 0 && value <= i64::from(low_mask(width))
    }
}

/// Extract a field from `word`.
///
/// Signed fields are sign-extended from bit `offset + width - 1`.
pub fn get(word: u32, offset: u8, width: u8, signed: bool) -> i64 {
    let width = effective_width(offset, width);
    if width == 0 {
        return 0;
    }
    let raw = (word >> offset) & low_mask(width);
    if signed {
        sign_extend(raw, width)
    } else {
        i64::from(raw)
    }
}

/// Insert `value` into a field of `word`.
///
/// Fails without modifying `word` if the value is not representable.
/// On success only the field's bits change.
pub fn set(
    word: &mut u32,
    offset: u8,
    width: u8,
    signed: bool,
    value: i64,
) -> Result<(), FieldOverflow> {
    let width = effective_width(offset, width);
    if !fits(value, width, signed) {
        return Err(FieldOverflow {
            value,
            width,
            signed,
        });
    }
    if width == 0 {
        return Ok(());
    }
    let mask = low_mask(width);
    let bits = (value as u32) & mask;
    *word = (*word & !(mask << offset)) | (bits << offset);
    Ok(())
}
