//! Limits for frame encoding and decoding.

/// Codec-level limits enforced by both the encoder and the decoder.
///
/// Counts are checked before anything is allocated for them, so a hostile
/// count cannot force a large allocation. The encoder applies the same
/// limits, which keeps every frame it emits decodable by a peer using them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecLimits {
    /// Maximum number of ids in a Removes section.
    pub max_removes: usize,
    /// Maximum number of edits in a Tiles section.
    pub max_tile_edits: usize,
    /// Maximum number of records in an Updates section.
    pub max_updates: usize,
    /// Maximum length of a name in bytes.
    pub max_name_bytes: usize,
    /// Maximum length of an info blob in bytes.
    pub max_info_bytes: usize,
    /// Maximum number of bytes in a section body.
    pub max_section_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_removes: 1024,
            max_tile_edits: crate::tiles::TILE_COUNT,
            max_updates: 1024,
            max_name_bytes: 128,
            max_info_bytes: 1024,
            max_section_bytes: 128 * 1024,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_removes: 32,
            max_tile_edits: crate::tiles::TILE_COUNT,
            max_updates: 32,
            max_name_bytes: 32,
            max_info_bytes: 64,
            max_section_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_removes: usize::MAX,
            max_tile_edits: usize::MAX,
            max_updates: usize::MAX,
            max_name_bytes: usize::MAX,
            max_info_bytes: usize::MAX,
            max_section_bytes: usize::MAX,
        }
    }
}
