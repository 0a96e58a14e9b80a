//! Bounded bit reader for frame bodies.
//!
//! A read that would run past the end of the input, start mid-byte where a
//! whole byte is required, or skip over set padding bits fails with a
//! [`BitError`]. Hostile frames never cause a panic.

use crate::error::{BitError, BitResult};

/// Reads the layout produced by [`BitWriter`](crate::BitWriter), MSB first
/// within each byte and little-endian for aligned integers.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Unread bits left in the input.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Cursor offset in bits from the start of the input.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let byte = self.data[self.bit_pos / 8];
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads `bits` (at most 64) bits, most significant first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(usize::from(bits))?;

        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Skips to the next byte boundary. The skipped padding must be zero, so
    /// every value has exactly one accepted encoding.
    pub fn align_to_byte(&mut self) -> BitResult<()> {
        let rem = self.bit_pos % 8;
        if rem == 0 {
            return Ok(());
        }
        let skip = 8 - rem;
        self.ensure_bits(skip)?;
        let bit_position = self.bit_pos;
        let padding = self.read_bits(skip as u8)?;
        if padding != 0 {
            return Err(BitError::NonZeroPadding { bit_position });
        }
        Ok(())
    }

    pub fn read_u8_aligned(&mut self) -> BitResult<u8> {
        let [byte] = self.read_aligned_bytes::<1>()?;
        Ok(byte)
    }

    /// Little-endian.
    pub fn read_u16_aligned(&mut self) -> BitResult<u16> {
        Ok(u16::from_le_bytes(self.read_aligned_bytes::<2>()?))
    }

    /// Little-endian.
    pub fn read_u32_aligned(&mut self) -> BitResult<u32> {
        Ok(u32::from_le_bytes(self.read_aligned_bytes::<4>()?))
    }

    /// LEB128 `u32`: at most five bytes, the fifth carrying only four bits.
    pub fn read_varu32(&mut self) -> BitResult<u32> {
        self.ensure_aligned()?;
        let mut result = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8_aligned()?;
            if shift == 28 && byte > 0x0F {
                return Err(BitError::InvalidVarint);
            }
            result |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(BitError::InvalidVarint)
    }

    /// Zigzag-mapped [`read_varu32`](Self::read_varu32).
    pub fn read_vars32(&mut self) -> BitResult<i32> {
        let value = self.read_varu32()?;
        Ok(((value >> 1) as i32) ^ (-((value & 1) as i32)))
    }

    /// Reads a varint length prefix and borrows that many bytes.
    ///
    /// `max_len` is checked before the body is touched.
    pub fn read_bytes_aligned(&mut self, max_len: usize) -> BitResult<&'a [u8]> {
        let len = self.read_varu32()? as usize;
        if len > max_len {
            return Err(BitError::ValueOutOfRange {
                value: len as u64,
                bits: usize_bits(max_len),
            });
        }
        self.ensure_bits(len.saturating_mul(8))?;
        let idx = self.bit_pos / 8;
        let data: &'a [u8] = self.data;
        self.bit_pos += len * 8;
        Ok(&data[idx..idx + len])
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_pos % 8 != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bit_pos,
            });
        }
        Ok(())
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    fn read_aligned_bytes<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        self.ensure_aligned()?;
        self.ensure_bits(N * 8)?;
        let idx = self.bit_pos / 8;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[idx..idx + N]);
        self.bit_pos += N * 8;
        Ok(out)
    }
}

fn usize_bits(value: usize) -> u8 {
    (usize::BITS - value.leading_zeros()) as u8
}
