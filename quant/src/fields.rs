//! Field value types for the entity record groups.

use crate::error::{QuantError, QuantResult};

/// Bit width of [`PlayerState`].
pub const PLAYER_STATE_BITS: u8 = 3;

/// Position and velocity, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Motion {
    #[must_use]
    pub const fn new(x: f32, y: f32, vx: f32, vy: f32) -> Self {
        Self { x, y, vx, vy }
    }

    /// A motion at rest.
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }
}

/// Raw entity state bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityState(pub u8);

/// Player-specific sub-state carried alongside [`EntityState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState(u8);

impl PlayerState {
    /// Creates a player state, rejecting values wider than [`PLAYER_STATE_BITS`].
    pub const fn new(value: u8) -> QuantResult<Self> {
        if value >> PLAYER_STATE_BITS != 0 {
            return Err(QuantError::InvalidPlayerState { value });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// State group payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateValue {
    pub state: EntityState,
    /// Present only for entity kinds that carry a player sub-state.
    pub player_state: Option<PlayerState>,
}

impl StateValue {
    #[must_use]
    pub const fn new(state: u8) -> Self {
        Self {
            state: EntityState(state),
            player_state: None,
        }
    }

    #[must_use]
    pub const fn with_player_state(mut self, player_state: PlayerState) -> Self {
        self.player_state = Some(player_state);
        self
    }
}

/// A state change, optionally reporting that the entity switched region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateChange {
    Plain(StateValue),
    WithRegionSwitch(StateValue),
}

impl StateChange {
    #[must_use]
    pub const fn value(&self) -> StateValue {
        match self {
            Self::Plain(value) | Self::WithRegionSwitch(value) => *value,
        }
    }

    #[must_use]
    pub const fn switches_region(&self) -> bool {
        matches!(self, Self::WithRegionSwitch(_))
    }
}

/// Facial expression bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expression(pub u32);

/// Entity type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityType(pub u16);

/// Identity tag of the logical entity behind a (possibly reused) id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crc(pub u16);

impl Crc {
    /// The tag for the next logical entity reusing the same id.
    #[must_use]
    pub const fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Type group payload: `(kind, crc)` identifies a logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    pub kind: EntityType,
    pub crc: Crc,
}

impl Identity {
    #[must_use]
    pub const fn new(kind: u16, crc: u16) -> Self {
        Self {
            kind: EntityType(kind),
            crc: Crc(crc),
        }
    }
}

/// One-shot action code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action(pub u8);

/// Pre-encoded display name.
///
/// The bytes reach every viewer unchanged; `filter` tells presentation
/// whether to obscure them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    pub bytes: Vec<u8>,
    pub filter: bool,
}

impl Name {
    pub fn new(bytes: impl Into<Vec<u8>>, filter: bool) -> Self {
        Self {
            bytes: bytes.into(),
            filter,
        }
    }
}

/// Opaque pre-encrypted info blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Info(pub Vec<u8>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_state_width() {
        assert_eq!(PlayerState::new(7).unwrap().get(), 7);
        assert!(matches!(
            PlayerState::new(8),
            Err(QuantError::InvalidPlayerState { value: 8 })
        ));
    }

    #[test]
    fn state_change_accessors() {
        let value = StateValue::new(123).with_player_state(PlayerState::new(2).unwrap());
        let plain = StateChange::Plain(value);
        let switch = StateChange::WithRegionSwitch(value);
        assert!(!plain.switches_region());
        assert!(switch.switches_region());
        assert_eq!(switch.value().state, EntityState(123));
        assert_eq!(switch.value().player_state.map(PlayerState::get), Some(2));
    }

    #[test]
    fn crc_bump_wraps() {
        assert_eq!(Crc(4).bump(), Crc(5));
        assert_eq!(Crc(u16::MAX).bump(), Crc(0));
    }

    #[test]
    fn identity_distinguishes_crc() {
        assert_ne!(Identity::new(3, 1), Identity::new(3, 2));
    }

    #[test]
    fn name_from_str_bytes() {
        let name = Name::new("pony", true);
        assert_eq!(name.bytes, b"pony");
        assert!(name.filter);
    }
}
