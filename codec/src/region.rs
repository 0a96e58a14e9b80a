//! Regions and their per-tick dirty queues.

use tracing::trace;

use crate::entity::Entity;
use crate::error::RegionError;
use crate::record::{EntityUpdate, FieldChanges};
use crate::tiles::{in_bounds, TileGrid, TileType};
use crate::types::{EntityId, RegionCoord, TileEdit};

/// A spatial partition: its live entities, its tiles, and the changes
/// accumulated during the current tick.
///
/// Queues are drained by [`reset`](Self::reset), which the caller runs once
/// per tick after every subscriber of the region has been served. Encoding
/// only reads the region.
#[derive(Debug, Clone, Default)]
pub struct Region {
    coord: RegionCoord,
    tiles: TileGrid,
    entities: Vec<Entity>,
    updates: Vec<EntityUpdate>,
    removes: Vec<EntityId>,
    tile_edits: Vec<TileEdit>,
}

impl Region {
    #[must_use]
    pub fn new(coord: RegionCoord) -> Self {
        Self {
            coord,
            ..Self::default()
        }
    }

    /// Creates a region with loaded terrain. Loading does not queue edits.
    #[must_use]
    pub fn with_tiles(coord: RegionCoord, tiles: TileGrid) -> Self {
        Self {
            coord,
            tiles,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn coord(&self) -> RegionCoord {
        self.coord
    }

    #[must_use]
    pub const fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    /// Live entities in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// Adds a live entity, replacing (and returning) any entity with the same id.
    ///
    /// Does not queue anything; announce a new entity with
    /// [`queue_update`](Self::queue_update).
    pub fn insert_entity(&mut self, entity: Entity) -> Option<Entity> {
        match self.position(entity.id) {
            Some(index) => Some(std::mem::replace(&mut self.entities[index], entity)),
            None => {
                self.entities.push(entity);
                None
            }
        }
    }

    /// Removes a live entity without queueing a removal (e.g. when it moves
    /// to another region that will announce it).
    pub fn take_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.position(id)?;
        Some(self.entities.remove(index))
    }

    /// Removes a live entity and queues its removal.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.take_entity(id)?;
        self.queue_removal(id);
        Some(entity)
    }

    /// Applies changes to a live entity and queues them.
    pub fn update_entity(&mut self, id: EntityId, changes: FieldChanges) -> Result<(), RegionError> {
        if changes.is_empty() {
            return Err(RegionError::EmptyUpdate { id });
        }
        let entity = self
            .entity_mut(id)
            .ok_or(RegionError::UnknownEntity { id })?;
        entity.apply(&changes);
        self.queue_update(EntityUpdate::new(id, changes))
    }

    /// Queues an update, merging into an already pending update for the same id.
    pub fn queue_update(&mut self, update: EntityUpdate) -> Result<(), RegionError> {
        if update.changes.is_empty() {
            return Err(RegionError::EmptyUpdate { id: update.id });
        }
        match self.updates.iter_mut().find(|pending| pending.id == update.id) {
            Some(pending) => pending.changes.merge(update.changes),
            None => self.updates.push(update),
        }
        Ok(())
    }

    /// Queues a removal and drops updates queued earlier this tick for the id.
    ///
    /// Updates queued after this call (id reuse) are kept; consumers apply
    /// removals before updates.
    pub fn queue_removal(&mut self, id: EntityId) {
        self.updates.retain(|pending| pending.id != id);
        if !self.removes.contains(&id) {
            self.removes.push(id);
        }
    }

    /// Sets a tile and queues the edit. The last write to a coordinate wins.
    pub fn queue_tile_change(&mut self, x: u8, y: u8, tile: TileType) -> Result<(), RegionError> {
        if !in_bounds(x, y) {
            return Err(RegionError::TileOutOfBounds { x, y });
        }
        self.tiles
            .set(x, y, tile)
            .map_err(|_| RegionError::TileOutOfBounds { x, y })?;
        match self
            .tile_edits
            .iter_mut()
            .find(|edit| edit.x == x && edit.y == y)
        {
            Some(edit) => edit.tile = tile,
            None => self.tile_edits.push(TileEdit::new(x, y, tile)),
        }
        Ok(())
    }

    #[must_use]
    pub fn pending_updates(&self) -> &[EntityUpdate] {
        &self.updates
    }

    #[must_use]
    pub fn pending_removes(&self) -> &[EntityId] {
        &self.removes
    }

    #[must_use]
    pub fn pending_tile_edits(&self) -> &[TileEdit] {
        &self.tile_edits
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.updates.is_empty() || !self.removes.is_empty() || !self.tile_edits.is_empty()
    }

    /// Clears the dirty queues. Live entities and tiles are kept.
    pub fn reset(&mut self) {
        trace!(
            region = %self.coord,
            updates = self.updates.len(),
            removes = self.removes.len(),
            tiles = self.tile_edits.len(),
            "region reset"
        );
        self.updates.clear();
        self.removes.clear();
        self.tile_edits.clear();
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant::{Action, Identity, Motion, StateChange, StateValue};

    fn coord() -> RegionCoord {
        RegionCoord::new(1, 2)
    }

    fn entity(id: u32) -> Entity {
        Entity::new(EntityId::new(id), Identity::new(1, 0))
    }

    fn motion_update(id: u32, x: f32) -> EntityUpdate {
        EntityUpdate::new(EntityId::new(id), FieldChanges::new().with_motion(Motion::at(x, 0.0)))
    }

    #[test]
    fn insert_preserves_order_and_replaces() {
        let mut region = Region::new(coord());
        assert!(region.insert_entity(entity(5)).is_none());
        assert!(region.insert_entity(entity(2)).is_none());
        let old = region.insert_entity(entity(5).with_motion(Motion::at(1.0, 1.0)));
        assert!(old.is_some());
        let ids: Vec<_> = region.entities().iter().map(|e| e.id.raw()).collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(
            region.entity(EntityId::new(5)).map(|e| e.motion),
            Some(Motion::at(1.0, 1.0))
        );
        assert!(!region.has_pending());
    }

    #[test]
    fn updates_for_same_id_merge() {
        let mut region = Region::new(coord());
        region.queue_update(motion_update(1, 1.0)).unwrap();
        region
            .queue_update(EntityUpdate::new(
                EntityId::new(1),
                FieldChanges::new().with_action(Action(2)),
            ))
            .unwrap();
        region.queue_update(motion_update(1, 3.0)).unwrap();

        assert_eq!(region.pending_updates().len(), 1);
        let changes = &region.pending_updates()[0].changes;
        assert_eq!(changes.motion, Some(Motion::at(3.0, 0.0)));
        assert_eq!(changes.action, Some(Action(2)));
    }

    #[test]
    fn empty_update_is_rejected() {
        let mut region = Region::new(coord());
        let err = region
            .queue_update(EntityUpdate::new(EntityId::new(4), FieldChanges::new()))
            .unwrap_err();
        assert_eq!(err, RegionError::EmptyUpdate { id: EntityId::new(4) });
        assert!(!region.has_pending());
    }

    #[test]
    fn removal_drops_earlier_updates_and_keeps_later() {
        let mut region = Region::new(coord());
        region.queue_update(motion_update(1, 1.0)).unwrap();
        region.queue_update(motion_update(2, 1.0)).unwrap();
        region.queue_removal(EntityId::new(1));
        assert_eq!(region.pending_updates().len(), 1);
        assert_eq!(region.pending_updates()[0].id, EntityId::new(2));

        region.queue_update(motion_update(1, 9.0)).unwrap();
        region.queue_removal(EntityId::new(3));
        region.queue_removal(EntityId::new(3));
        assert_eq!(region.pending_removes(), &[EntityId::new(1), EntityId::new(3)]);
        assert_eq!(region.pending_updates().len(), 2);
    }

    #[test]
    fn remove_entity_queues_removal() {
        let mut region = Region::new(coord());
        region.insert_entity(entity(8));
        assert!(region.remove_entity(EntityId::new(8)).is_some());
        assert!(region.entities().is_empty());
        assert_eq!(region.pending_removes(), &[EntityId::new(8)]);
        assert!(region.remove_entity(EntityId::new(8)).is_none());
    }

    #[test]
    fn take_entity_does_not_queue() {
        let mut region = Region::new(coord());
        region.insert_entity(entity(8));
        assert!(region.take_entity(EntityId::new(8)).is_some());
        assert!(!region.has_pending());
    }

    #[test]
    fn update_entity_applies_and_queues() {
        let mut region = Region::new(coord());
        region.insert_entity(entity(3));
        let changes = FieldChanges::new().with_state(StateChange::Plain(StateValue::new(48)));
        region.update_entity(EntityId::new(3), changes).unwrap();
        assert_eq!(
            region.entity(EntityId::new(3)).map(|e| e.state),
            Some(StateValue::new(48))
        );
        assert_eq!(region.pending_updates().len(), 1);

        let err = region
            .update_entity(EntityId::new(99), FieldChanges::new().with_action(Action(1)))
            .unwrap_err();
        assert_eq!(err, RegionError::UnknownEntity { id: EntityId::new(99) });
    }

    #[test]
    fn tile_changes_last_write_wins() {
        let mut region = Region::new(coord());
        region.queue_tile_change(1, 1, TileType(2)).unwrap();
        region.queue_tile_change(0, 3, TileType(4)).unwrap();
        region.queue_tile_change(1, 1, TileType(5)).unwrap();
        assert_eq!(
            region.pending_tile_edits(),
            &[
                TileEdit::new(1, 1, TileType(5)),
                TileEdit::new(0, 3, TileType(4))
            ]
        );
        assert_eq!(region.tiles().get(1, 1).unwrap(), TileType(5));
    }

    #[test]
    fn tile_change_out_of_bounds() {
        let mut region = Region::new(coord());
        assert_eq!(
            region.queue_tile_change(8, 0, TileType(1)),
            Err(RegionError::TileOutOfBounds { x: 8, y: 0 })
        );
        assert!(!region.has_pending());
    }

    #[test]
    fn reset_clears_queues_only() {
        let mut region = Region::new(coord());
        region.insert_entity(entity(1));
        region.queue_update(motion_update(1, 1.0)).unwrap();
        region.queue_removal(EntityId::new(2));
        region.queue_tile_change(0, 0, TileType(3)).unwrap();
        assert!(region.has_pending());

        region.reset();
        assert!(!region.has_pending());
        assert_eq!(region.entities().len(), 1);
        assert_eq!(region.tiles().get(0, 0).unwrap(), TileType(3));

        region.reset();
        assert!(!region.has_pending());
    }
}
