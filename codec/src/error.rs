//! Error types for codec operations.

use std::fmt;

use bitstream::BitError;
use quant::QuantError;
use thiserror::Error;
use wire::SectionTag;

use crate::types::EntityId;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a frame.
///
/// Any error aborts the whole frame; nothing is partially written or applied.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Wire framing error.
    #[error("wire: {0}")]
    Wire(#[from] wire::DecodeError),

    /// Header or section could not be framed.
    #[error("wire encode: {0}")]
    WireEncode(#[from] wire::EncodeError),

    /// Bitstream error.
    #[error("bitstream: {0}")]
    Bitstream(#[from] BitError),

    /// Field quantization or validation error.
    #[error("field: {0}")]
    Field(#[from] QuantError),

    /// Tile grid or tile edit error.
    #[error("tiles: {0}")]
    Tile(#[from] TileError),

    /// Full frame built from a different field layout.
    #[error("protocol mismatch: expected {expected:#018x}, found {found:#018x}")]
    ProtocolMismatch { expected: u64, found: u64 },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Section body had trailing bits after parsing.
    #[error("{remaining_bits} trailing bits in {section:?} section")]
    TrailingSectionData {
        section: SectionTag,
        remaining_bits: usize,
    },

    /// Section not allowed in this frame kind.
    #[error("unexpected {section:?} section")]
    UnexpectedSection { section: SectionTag },

    /// Section appears more than once.
    #[error("duplicate {section:?} section")]
    DuplicateSection { section: SectionTag },

    /// A section the frame kind always carries is absent.
    #[error("missing {section:?} section")]
    MissingSection { section: SectionTag },

    /// Sections present but not in their fixed order.
    #[error("{section:?} section out of order")]
    SectionOutOfOrder { section: SectionTag },

    /// Full-frame record without every field group.
    #[error("full frame record for entity {id} lacks field groups")]
    IncompleteFullRecord { id: EntityId },

    /// Same entity appears twice in one update list.
    #[error("entity {id} appears twice in one frame")]
    DuplicateEntity { id: EntityId },
}

/// Specific codec limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Removes,
    TileEdits,
    Updates,
    SectionBytes,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Removes => "removes",
            Self::TileEdits => "tile edits",
            Self::Updates => "updates",
            Self::SectionBytes => "section bytes",
        };
        write!(f, "{name}")
    }
}

/// Errors raised by tile grid access and tile compression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Coordinate outside the region.
    #[error("tile ({x}, {y}) is outside the region")]
    OutOfBounds { x: u8, y: u8 },

    /// A run of zero tiles.
    #[error("zero-length run at tile {offset}")]
    ZeroRun { offset: usize },

    /// Runs cover more or fewer tiles than the grid holds.
    #[error("runs cover {actual} tiles, grid holds {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Bytes left after the last run.
    #[error("{remaining} trailing bytes after tile runs")]
    TrailingBytes { remaining: usize },

    /// Underlying bitstream failure.
    #[error(transparent)]
    Bit(#[from] BitError),
}

/// Errors raised while accumulating a region's per-tick changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Update carries no field groups.
    #[error("update for entity {id} has no changes")]
    EmptyUpdate { id: EntityId },

    /// Entity is not live in this region.
    #[error("entity {id} is not in this region")]
    UnknownEntity { id: EntityId },

    /// Tile coordinate outside the region.
    #[error("tile ({x}, {y}) is outside the region")]
    TileOutOfBounds { x: u8, y: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_display() {
        let err = CodecError::LimitsExceeded {
            kind: LimitKind::Updates,
            limit: 4,
            actual: 9,
        };
        assert_eq!(err.to_string(), "updates limit exceeded: 9 > 4");
    }

    #[test]
    fn protocol_mismatch_display() {
        let err = CodecError::ProtocolMismatch {
            expected: 1,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x0000000000000001"));
        assert!(msg.contains("0x0000000000000002"));
    }

    #[test]
    fn lower_errors_convert() {
        let err: CodecError = BitError::InvalidVarint.into();
        assert!(matches!(err, CodecError::Bitstream(_)));
        let err: CodecError = QuantError::InvalidFlags { flags: 0 }.into();
        assert!(matches!(err, CodecError::Field(_)));
        let err: CodecError = TileError::ZeroRun { offset: 3 }.into();
        assert!(matches!(err, CodecError::Tile(_)));
    }

    #[test]
    fn region_error_display() {
        assert_eq!(
            RegionError::EmptyUpdate {
                id: EntityId::new(5)
            }
            .to_string(),
            "update for entity 5 has no changes"
        );
    }
}
