//! Frame header types and constants.

/// Incremental frame header size in bytes: flags + region x + region y.
pub const INCREMENTAL_HEADER_SIZE: usize = 1 + 2 + 2;

/// Full frame header size in bytes: incremental header + protocol hash.
pub const FULL_HEADER_SIZE: usize = INCREMENTAL_HEADER_SIZE + 8;

/// Frame flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameFlags(u8);

impl FrameFlags {
    /// Flag indicating a full (keyframe) frame.
    pub const FULL: u8 = 1 << 0;

    /// Flag indicating an incremental frame.
    pub const INCREMENTAL: u8 = 1 << 1;

    /// Reserved bits mask (must be zero).
    const RESERVED_MASK: u8 = !0b11;

    /// Creates new flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if this is a full frame.
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 & Self::FULL != 0
    }

    /// Returns `true` if this is an incremental frame.
    #[must_use]
    pub const fn is_incremental(self) -> bool {
        self.0 & Self::INCREMENTAL != 0
    }

    /// Returns `true` if exactly one kind bit is set and no reserved bits are.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        let has_reserved = self.0 & Self::RESERVED_MASK != 0;
        (self.is_full() ^ self.is_incremental()) && !has_reserved
    }

    /// Creates flags for a full frame.
    #[must_use]
    pub const fn full() -> Self {
        Self(Self::FULL)
    }

    /// Creates flags for an incremental frame.
    #[must_use]
    pub const fn incremental() -> Self {
        Self(Self::INCREMENTAL)
    }
}

/// Frame header.
///
/// `protocol_hash` is only carried by full frames and is `0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: FrameFlags,
    pub region_x: i16,
    pub region_y: i16,
    pub protocol_hash: u64,
}

impl FrameHeader {
    /// Creates a header for an incremental frame.
    #[must_use]
    pub const fn incremental(region_x: i16, region_y: i16) -> Self {
        Self {
            flags: FrameFlags::incremental(),
            region_x,
            region_y,
            protocol_hash: 0,
        }
    }

    /// Creates a header for a full frame.
    #[must_use]
    pub const fn full(region_x: i16, region_y: i16, protocol_hash: u64) -> Self {
        Self {
            flags: FrameFlags::full(),
            region_x,
            region_y,
            protocol_hash,
        }
    }

    /// Encoded size of this header in bytes.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        if self.flags.is_full() {
            FULL_HEADER_SIZE
        } else {
            INCREMENTAL_HEADER_SIZE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes() {
        assert_eq!(INCREMENTAL_HEADER_SIZE, 5);
        assert_eq!(FULL_HEADER_SIZE, 13);
    }

    #[test]
    fn flags_full() {
        let flags = FrameFlags::full();
        assert!(flags.is_full());
        assert!(!flags.is_incremental());
        assert!(flags.is_valid());
        assert_eq!(flags.raw(), 0b01);
    }

    #[test]
    fn flags_incremental() {
        let flags = FrameFlags::incremental();
        assert!(!flags.is_full());
        assert!(flags.is_incremental());
        assert!(flags.is_valid());
        assert_eq!(flags.raw(), 0b10);
    }

    #[test]
    fn flags_invalid_neither_or_both() {
        assert!(!FrameFlags::from_raw(0).is_valid());
        assert!(!FrameFlags::from_raw(0b11).is_valid());
        assert!(!FrameFlags::default().is_valid());
    }

    #[test]
    fn flags_invalid_reserved_bits() {
        assert!(!FrameFlags::from_raw(0b101).is_valid());
        assert!(!FrameFlags::from_raw(0x81).is_valid());
    }

    #[test]
    fn header_constructors() {
        let inc = FrameHeader::incremental(1, 2);
        assert!(inc.flags.is_incremental());
        assert_eq!(inc.protocol_hash, 0);
        assert_eq!(inc.encoded_len(), INCREMENTAL_HEADER_SIZE);

        let full = FrameHeader::full(-3, 4, 0xABCD);
        assert!(full.flags.is_full());
        assert_eq!(full.region_x, -3);
        assert_eq!(full.protocol_hash, 0xABCD);
        assert_eq!(full.encoded_len(), FULL_HEADER_SIZE);
    }

    #[test]
    fn header_const_constructible() {
        const HEADER: FrameHeader = FrameHeader::incremental(0, 0);
        assert_eq!(HEADER.region_x, 0);
    }
}
