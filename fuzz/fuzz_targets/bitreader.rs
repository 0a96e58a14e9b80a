#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let mut reader = BitReader::new(rest);

    // The selector byte drives the read sequence; the cursor never moves back.
    for step in 0..512u32 {
        let before = reader.bit_position();
        let op = (u32::from(selector).rotate_left(step % 8) ^ step) % 8;
        let ok = match op {
            0 => reader.read_bit().is_ok(),
            1 => reader.read_bits((step % 64) as u8 + 1).is_ok(),
            2 => reader.align_to_byte().is_ok(),
            3 => reader.read_u16_aligned().is_ok(),
            4 => reader.read_u32_aligned().is_ok(),
            5 => reader.read_varu32().is_ok(),
            6 => reader.read_vars32().is_ok(),
            _ => reader.read_bytes_aligned(rest.len()).is_ok(),
        };
        assert!(reader.bit_position() >= before);
        if !ok && reader.is_empty() {
            break;
        }
    }
});
