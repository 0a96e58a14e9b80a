//! Error types for wire format operations.

use std::fmt;

use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// High-level decode errors for frame framing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Frame is too small to contain the required header.
    #[error("frame too small: {actual} bytes, need at least {required}")]
    FrameTooSmall { actual: usize, required: usize },

    /// Invalid flags combination.
    #[error("invalid frame flags: 0x{flags:02X}")]
    InvalidFlags { flags: u8 },

    /// Unknown section tag encountered.
    #[error("unknown section tag: {tag}")]
    UnknownSectionTag { tag: u8 },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Section framing error.
    #[error("section framing error: {0}")]
    SectionFraming(SectionFramingError),
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameBytes,
    SectionCount,
    SectionLength,
}

/// Errors that can occur while framing sections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionFramingError {
    #[error("invalid varint")]
    InvalidVarint,
    #[error("truncated section: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("invalid frame flags: 0x{flags:02X}")]
    InvalidFlags { flags: u8 },
    #[error("length overflow: {length}")]
    LengthOverflow { length: usize },
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrameBytes => "frame bytes",
            Self::SectionCount => "section count",
            Self::SectionLength => "section length",
        };
        write!(f, "{name}")
    }
}
