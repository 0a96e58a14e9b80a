//! Core identifier types for the codec.

use std::fmt;

use crate::tiles::TileType;

/// An entity identifier.
///
/// Ids are small and reused once freed; the `(id, crc)` pair identifies a
/// logical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw entity ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Region-space coordinate of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RegionCoord {
    pub x: i16,
    pub y: i16,
}

impl RegionCoord {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Account identifier of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId(u32);

impl AccountId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A single tile change within a region, in region-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileEdit {
    pub x: u8,
    pub y: u8,
    pub tile: TileType,
}

impl TileEdit {
    #[must_use]
    pub const fn new(x: u8, y: u8, tile: TileType) -> Self {
        Self { x, y, tile }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_roundtrip() {
        let id = EntityId::new(123);
        assert_eq!(id.raw(), 123);
        assert_eq!(u32::from(id), 123);
        assert_eq!(EntityId::from(123), id);
        assert_eq!(id.to_string(), "123");
    }

    #[test]
    fn entity_id_ordering() {
        assert!(EntityId::new(1) < EntityId::new(2));
        assert_eq!(EntityId::default().raw(), 0);
    }

    #[test]
    fn region_coord_display() {
        assert_eq!(RegionCoord::new(1, -2).to_string(), "(1, -2)");
    }

    #[test]
    fn account_id() {
        assert_eq!(AccountId::from(9).raw(), 9);
        assert_ne!(AccountId::new(1), AccountId::new(2));
    }
}
