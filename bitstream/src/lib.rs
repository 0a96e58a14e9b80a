//! Bit packing primitives for regionsync frames.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding
//! and decoding, plus the byte-aligned varints and length-prefixed blobs the
//! frame layout is built from.
//!
//! # Design Principles
//!
//! - **No unsafe code**
//! - **Bounded reads** - Every read is bounds-checked against the input.
//! - **No domain knowledge** - This crate knows nothing about regions or entities.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.write_varu32(300).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_varu32().unwrap(), 300);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = BitWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = BitReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn bits_roundtrip_various_sizes() {
        let test_cases = [
            (0b1010u64, 4),
            (0xFFu64, 8),
            (0x7FFu64, 11),
            (0xABCDu64, 16),
            (0x1234_5678u64, 32),
            (u64::MAX, 64),
        ];

        for (value, bits) in test_cases {
            let mut writer = BitWriter::new();
            writer.write_bits(value, bits).unwrap();
            let bytes = writer.finish();

            let mut reader = BitReader::new(&bytes);
            let read_value = reader.read_bits(bits).unwrap();
            assert_eq!(
                read_value, value,
                "roundtrip failed for {bits}-bit value {value}"
            );
        }
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b1010, 4).unwrap();
        writer.align_to_byte();
        writer.write_u16_aligned(0x0201).unwrap();
        writer.write_vars32(-89).unwrap();
        writer.write_bytes_aligned(b"pony").unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        reader.align_to_byte().unwrap();
        assert_eq!(reader.read_u16_aligned().unwrap(), 0x0201);
        assert_eq!(reader.read_vars32().unwrap(), -89);
        assert_eq!(reader.read_bytes_aligned(8).unwrap(), b"pony");
        assert!(reader.is_empty());
    }
}
