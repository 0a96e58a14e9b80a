//! Quantization and field validation errors.

use std::fmt;

use bitstream::BitError;
use thiserror::Error;

/// Result type for quantization operations.
pub type QuantResult<T> = Result<T, QuantError>;

/// Axis of a two-dimensional quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Length-prefixed blob fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobField {
    Name,
    Info,
}

/// Errors raised while quantizing, packing or unpacking entity fields.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum QuantError {
    /// Position is not finite or does not fit the fixed-point range.
    #[error("position {axis} = {value} is outside the fixed-point range")]
    PositionOutOfRange { axis: Axis, value: f32 },

    /// Velocity magnitude reaches the protocol maximum.
    #[error("velocity {axis} = {value} exceeds the protocol limit of {limit}", limit = crate::VELOCITY_LIMIT)]
    VelocityOutOfRange { axis: Axis, value: f32 },

    /// Player sub-state does not fit in its bit width.
    #[error("player state {value} does not fit in {bits} bits", bits = crate::PLAYER_STATE_BITS)]
    InvalidPlayerState { value: u8 },

    /// Player bits set while the presence bit is clear.
    #[error("player state bits {value} set without a player state")]
    StrayPlayerState { value: u8 },

    /// Flags are zero, use reserved bits, or carry a region switch without a state.
    #[error("invalid update flags: 0x{flags:04X}")]
    InvalidFlags { flags: u16 },

    /// Option key outside the closed key set.
    #[error("unknown option key: {key}")]
    UnknownOptionKey { key: u8 },

    /// Option tag outside the closed tag set.
    #[error("unknown option tag: {value}")]
    UnknownOptionTag { value: u8 },

    /// Option count exceeds the number of known keys.
    #[error("option count {count} exceeds the {max} known keys")]
    TooManyOptions { count: u8, max: usize },

    /// Option keys are duplicated or not ascending.
    #[error("option key {key} follows key {previous}")]
    UnorderedOptions { previous: u8, key: u8 },

    /// Boolean byte is neither 0 nor 1.
    #[error("invalid boolean byte: {value}")]
    InvalidBool { value: u8 },

    /// Blob length exceeds the configured maximum.
    #[error("{field} is {len} bytes, limit is {max}")]
    BlobTooLong {
        field: BlobField,
        len: usize,
        max: usize,
    },

    /// Underlying bitstream failure.
    #[error(transparent)]
    Bit(#[from] BitError),
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

impl fmt::Display for BlobField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Info => write!(f, "info"),
        }
    }
}
