//! Deterministic fingerprint of the field layout.

use blake3::Hasher;

use crate::fields::PLAYER_STATE_BITS;
use crate::fixed::{POSITION_SCALE, VELOCITY_BITS, VELOCITY_LIMIT};
use crate::options::OptionKey;
use crate::UpdateFlags;

/// Bumped whenever a group's byte layout changes without touching the tables below.
const LAYOUT_REVISION: u32 = 1;

/// Computes the protocol fingerprint carried by full frames.
///
/// Covers the flag table, group layouts, quantization constants and the
/// option key set.
#[must_use]
pub fn protocol_hash() -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, LAYOUT_REVISION);

    write_u32(&mut hasher, UpdateFlags::GROUPS.len() as u32);
    for bit in UpdateFlags::GROUPS {
        write_u16(&mut hasher, bit);
    }
    write_u16(&mut hasher, UpdateFlags::SWITCH_REGION);

    write_u32(&mut hasher, POSITION_SCALE as u32);
    write_u32(&mut hasher, VELOCITY_LIMIT.to_bits());
    write_u8(&mut hasher, VELOCITY_BITS);
    write_u8(&mut hasher, PLAYER_STATE_BITS);

    write_u32(&mut hasher, OptionKey::ALL.len() as u32);
    for key in OptionKey::ALL {
        write_u8(&mut hasher, key as u8);
        write_u8(&mut hasher, option_width(key));
    }

    let hash = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(out)
}

const fn option_width(key: OptionKey) -> u8 {
    match key {
        OptionKey::Tag | OptionKey::Extra => 1,
        OptionKey::Toy | OptionKey::Hold => 2,
        OptionKey::Expr => 4,
    }
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_hash_is_stable() {
        assert_eq!(protocol_hash(), protocol_hash());
    }

    #[test]
    fn protocol_hash_is_not_trivial() {
        let hash = protocol_hash();
        assert_ne!(hash, 0);
        assert_ne!(hash, u64::MAX);
    }

    #[test]
    fn option_widths_match_packing() {
        assert_eq!(option_width(OptionKey::Tag), 1);
        assert_eq!(option_width(OptionKey::Expr), 4);
        assert_eq!(option_width(OptionKey::Hold), 2);
    }
}
