//! The update flags table shared by encoder and decoder.

use crate::error::{QuantError, QuantResult};

/// Bitmask naming the field groups present in an entity record.
///
/// Bit 2 and every bit above `SWITCH_REGION` are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpdateFlags(u16);

impl UpdateFlags {
    pub const POSITION: u16 = 1;
    pub const STATE: u16 = 4;
    pub const EXPRESSION: u16 = 8;
    pub const TYPE: u16 = 16;
    pub const OPTIONS: u16 = 32;
    pub const INFO: u16 = 64;
    pub const ACTION: u16 = 128;
    pub const NAME: u16 = 256;
    /// Region switch marker. Only legal together with `STATE`.
    pub const SWITCH_REGION: u16 = 512;

    /// Every field group bit, in canonical wire order.
    pub const GROUPS: [u16; 8] = [
        Self::POSITION,
        Self::STATE,
        Self::EXPRESSION,
        Self::TYPE,
        Self::OPTIONS,
        Self::INFO,
        Self::ACTION,
        Self::NAME,
    ];

    /// Union of every field group bit.
    pub const ALL_GROUPS: u16 = Self::POSITION
        | Self::STATE
        | Self::EXPRESSION
        | Self::TYPE
        | Self::OPTIONS
        | Self::INFO
        | Self::ACTION
        | Self::NAME;

    const KNOWN_MASK: u16 = Self::ALL_GROUPS | Self::SWITCH_REGION;

    /// Creates flags with no bits set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Creates flags from raw bits without validation.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Parses raw bits, rejecting anything [`is_valid`](Self::is_valid) refuses.
    pub const fn parse(raw: u16) -> QuantResult<Self> {
        let flags = Self(raw);
        if flags.is_valid() {
            Ok(flags)
        } else {
            Err(QuantError::InvalidFlags { flags: raw })
        }
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit in `bits` is set.
    #[must_use]
    pub const fn contains(self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    /// Returns these flags with `bits` added.
    #[must_use]
    pub const fn with(self, bits: u16) -> Self {
        Self(self.0 | bits)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Non-zero, no reserved bits, and a region switch only alongside a state.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        if self.0 == 0 || self.0 & !Self::KNOWN_MASK != 0 {
            return false;
        }
        !(self.contains(Self::SWITCH_REGION) && !self.contains(Self::STATE))
    }
}
