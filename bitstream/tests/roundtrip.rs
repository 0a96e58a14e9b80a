use bitstream::{BitError, BitReader, BitWriter};

#[test]
fn writer_roundtrip_mixed() {
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    writer.write_bits(0b1010, 4).unwrap();
    writer.align_to_byte();
    writer.write_u16_aligned(0xBEEF).unwrap();
    writer.write_varu32(300).unwrap();
    writer.write_vars32(-1).unwrap();
    writer.write_u32_aligned(0x0102_0304).unwrap();
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert!(reader.read_bit().unwrap());
    assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
    reader.align_to_byte().unwrap();
    assert_eq!(reader.read_u16_aligned().unwrap(), 0xBEEF);
    assert_eq!(reader.read_varu32().unwrap(), 300);
    assert_eq!(reader.read_vars32().unwrap(), -1);
    assert_eq!(reader.read_u32_aligned().unwrap(), 0x0102_0304);
    assert!(reader.is_empty());
}

#[test]
fn truncated_input_is_an_error_not_a_panic() {
    let mut writer = BitWriter::new();
    writer.write_u32_aligned(7).unwrap();
    let bytes = writer.finish();

    for cut in 0..bytes.len() {
        let mut reader = BitReader::new(&bytes[..cut]);
        assert!(matches!(
            reader.read_u32_aligned(),
            Err(BitError::UnexpectedEof { .. })
        ));
    }
}
