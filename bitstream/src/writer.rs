//! Bit-level writer for encoding packed frame data.

use crate::error::{BitError, BitResult};

/// A growable bit-level writer.
///
/// Bits are packed MSB-first. Byte-aligned writes (`*_aligned`, varints and
/// byte blobs) require the writer to sit on a byte boundary; call
/// [`align_to_byte`](Self::align_to_byte) after any run of sub-byte fields.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Completed bytes.
    bytes: Vec<u8>,
    /// Current byte being written (not yet pushed to bytes).
    current_byte: u8,
    /// Number of bits written to `current_byte` (0-7).
    bit_count: u8,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Returns `true` if the next write starts on a byte boundary.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.bit_count == 0
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        self.current_byte = (self.current_byte << 1) | u8::from(value);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// Writes up to 64 bits from an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(());
        }
        if bits < 64 && value >= (1u64 << bits) {
            return Err(BitError::ValueOutOfRange { value, bits });
        }

        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Pads the current byte with zero bits.
    pub fn align_to_byte(&mut self) {
        while self.bit_count != 0 {
            self.write_bit(false);
        }
    }

    /// Writes a byte-aligned `u8`.
    pub fn write_u8_aligned(&mut self, value: u8) -> BitResult<()> {
        self.ensure_aligned()?;
        self.bytes.push(value);
        Ok(())
    }

    /// Writes a byte-aligned `u16` (little-endian).
    pub fn write_u16_aligned(&mut self, value: u16) -> BitResult<()> {
        self.ensure_aligned()?;
        self.bytes.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a byte-aligned `u32` (little-endian).
    pub fn write_u32_aligned(&mut self, value: u32) -> BitResult<()> {
        self.ensure_aligned()?;
        self.bytes.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a byte-aligned varint `u32`.
    pub fn write_varu32(&mut self, mut value: u32) -> BitResult<()> {
        self.ensure_aligned()?;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.bytes.push(byte);
            if value == 0 {
                return Ok(());
            }
        }
    }

    /// Writes a byte-aligned zigzag varint `i32`.
    pub fn write_vars32(&mut self, value: i32) -> BitResult<()> {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        self.write_varu32(zigzag)
    }

    /// Writes a varint length prefix followed by the raw bytes.
    pub fn write_bytes_aligned(&mut self, bytes: &[u8]) -> BitResult<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| BitError::LengthOverflow {
            length: bytes.len(),
        })?;
        self.write_varu32(len)?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, it is padded with zeros on the right.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.current_byte <<= 8 - self.bit_count;
            self.bytes.push(self.current_byte);
        }
        self.bytes
    }

    fn ensure_aligned(&self) -> BitResult<()> {
        if self.bit_count != 0 {
            return Err(BitError::MisalignedAccess {
                bit_position: self.bits_written(),
            });
        }
        Ok(())
    }
}
