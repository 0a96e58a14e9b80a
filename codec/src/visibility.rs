//! Per-viewer visibility filtering.
//!
//! Visibility is only evaluated when a full frame is built. Incremental
//! frames carry whatever the viewer was subscribed to; a change in hides or
//! shadow state is handled by sending that viewer a fresh full frame.

use std::collections::HashSet;

use crate::entity::Entity;
use crate::region::Region;
use crate::types::AccountId;

/// Moderation state of the client owning an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner {
    pub account: AccountId,
    /// Hidden from everyone except themselves.
    pub shadowed: bool,
}

impl Owner {
    #[must_use]
    pub const fn new(account: AccountId) -> Self {
        Self {
            account,
            shadowed: false,
        }
    }
}

/// The requesting client's view settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Viewer {
    pub account: AccountId,
    /// Accounts this viewer has chosen not to see.
    pub hides: HashSet<AccountId>,
    /// Whether this viewer is itself shadow banned.
    pub shadowed: bool,
}

impl Viewer {
    #[must_use]
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            hides: HashSet::new(),
            shadowed: false,
        }
    }

    #[must_use]
    pub fn hiding(mut self, account: AccountId) -> Self {
        self.hides.insert(account);
        self
    }
}

/// Returns `true` if `viewer` may see `entity`.
///
/// Unowned entities are always visible and owners always see their own
/// entity. Otherwise the entity is hidden if its owner is shadowed or is in
/// the viewer's hide list.
#[must_use]
pub fn is_visible(entity: &Entity, viewer: &Viewer) -> bool {
    match entity.owner {
        None => true,
        Some(owner) if owner.account == viewer.account => true,
        Some(owner) => !owner.shadowed && !viewer.hides.contains(&owner.account),
    }
}

/// Live entities of `region` that `viewer` may see, in region order.
pub fn visible_entities<'a>(
    region: &'a Region,
    viewer: &'a Viewer,
) -> impl Iterator<Item = &'a Entity> + 'a {
    region
        .entities()
        .iter()
        .filter(move |entity| is_visible(entity, viewer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityId;
    use quant::Identity;

    fn owned(id: u32, account: u32, shadowed: bool) -> Entity {
        Entity::new(EntityId::new(id), Identity::new(1, 0)).with_owner(Owner {
            account: AccountId::new(account),
            shadowed,
        })
    }

    #[test]
    fn unowned_is_visible_to_everyone() {
        let entity = Entity::new(EntityId::new(1), Identity::new(1, 0));
        let viewer = Viewer::new(AccountId::new(5)).hiding(AccountId::new(0));
        assert!(is_visible(&entity, &viewer));
    }

    #[test]
    fn hidden_account_is_filtered() {
        let entity = owned(1, 7, false);
        assert!(!is_visible(&entity, &Viewer::new(AccountId::new(5)).hiding(AccountId::new(7))));
        assert!(is_visible(&entity, &Viewer::new(AccountId::new(5))));
    }

    #[test]
    fn shadowed_owner_is_filtered_for_others() {
        let entity = owned(1, 7, true);
        assert!(!is_visible(&entity, &Viewer::new(AccountId::new(5))));
    }

    #[test]
    fn owner_always_sees_self() {
        let entity = owned(1, 7, true);
        let me = Viewer::new(AccountId::new(7)).hiding(AccountId::new(7));
        assert!(is_visible(&entity, &me));
    }

    #[test]
    fn viewer_shadow_does_not_limit_what_it_sees() {
        let entity = owned(1, 7, false);
        let mut viewer = Viewer::new(AccountId::new(5));
        viewer.shadowed = true;
        assert!(is_visible(&entity, &viewer));
    }
}
