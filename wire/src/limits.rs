//! Configurable limits for bounded decoding.

/// Wire-level limits for frame decoding.
///
/// These limits are enforced before any section body is parsed. Body-level
/// limits (entity counts, blob sizes) belong to the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum frame size in bytes.
    pub max_frame_bytes: usize,

    /// Maximum number of sections in a frame.
    pub max_sections: usize,

    /// Maximum length of a single section body in bytes.
    pub max_section_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Full frames for crowded regions are the largest payloads.
            max_frame_bytes: 256 * 1024,

            // Removes, tiles, tile data, updates.
            max_sections: 4,
            max_section_len: 192 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frame_bytes: 8192,
            max_sections: 4,
            max_section_len: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frame_bytes: usize::MAX,
            max_sections: usize::MAX,
            max_section_len: usize::MAX,
        }
    }
}
