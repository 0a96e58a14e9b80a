//! Decoded frame contents.

use crate::record::EntityUpdate;
use crate::tiles::TileGrid;
use crate::types::{EntityId, RegionCoord, TileEdit};

/// Which encoder mode produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Only the tick's dirty queues.
    Incremental,
    /// The whole visible entity set plus the compressed tile grid.
    Full,
}

/// A decoded region frame.
///
/// Consumers apply `removes` before `updates`: an id can be removed and then
/// reused by a new entity (with a new crc) within one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMessage {
    pub region: RegionCoord,
    pub kind: FrameKind,
    pub removes: Vec<EntityId>,
    /// Tile edits; always empty for full frames.
    pub tiles: Vec<TileEdit>,
    /// The whole tile grid; present only in full frames.
    pub tile_data: Option<TileGrid>,
    pub updates: Vec<EntityUpdate>,
}

impl FrameMessage {
    /// An empty message of the given kind.
    #[must_use]
    pub const fn new(region: RegionCoord, kind: FrameKind) -> Self {
        Self {
            region,
            kind,
            removes: Vec::new(),
            tiles: Vec::new(),
            tile_data: None,
            updates: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.kind == FrameKind::Full
    }

    /// Returns `true` if the frame carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty()
            && self.tiles.is_empty()
            && self.tile_data.is_none()
            && self.updates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_is_empty() {
        let message = FrameMessage::new(RegionCoord::new(1, 2), FrameKind::Incremental);
        assert!(message.is_empty());
        assert!(!message.is_full());
    }

    #[test]
    fn full_message_with_tiles_is_not_empty() {
        let mut message = FrameMessage::new(RegionCoord::new(0, 0), FrameKind::Full);
        message.tile_data = Some(TileGrid::default());
        assert!(message.is_full());
        assert!(!message.is_empty());
    }
}
