//! Live entity state held by a region.

use quant::{
    Action, EntityOptions, Expression, Identity, Info, Motion, Name, StateChange, StateValue,
};

use crate::record::FieldChanges;
use crate::types::EntityId;
use crate::visibility::Owner;

/// An entity as the simulation last left it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub identity: Identity,
    pub motion: Motion,
    pub state: StateValue,
    pub expression: Expression,
    pub options: EntityOptions,
    pub info: Option<Info>,
    pub name: Option<Name>,
    /// Owning client, for player-controlled entities.
    pub owner: Option<Owner>,
}

impl Entity {
    /// Creates an unowned entity at rest at the origin.
    #[must_use]
    pub fn new(id: EntityId, identity: Identity) -> Self {
        Self {
            id,
            identity,
            motion: Motion::default(),
            state: StateValue::default(),
            expression: Expression::default(),
            options: EntityOptions::new(),
            info: None,
            name: None,
            owner: None,
        }
    }

    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Every field group, for a full frame. Missing name, info and options
    /// become present-but-empty values; the action is the idle action.
    #[must_use]
    pub fn full_changes(&self) -> FieldChanges {
        FieldChanges {
            motion: Some(self.motion),
            state: Some(StateChange::Plain(self.state)),
            expression: Some(self.expression),
            identity: Some(self.identity),
            options: Some(self.options),
            info: Some(self.info.clone().unwrap_or_default()),
            action: Some(Action::default()),
            name: Some(self.name.clone().unwrap_or_default()),
        }
    }

    /// Applies the persistent groups of a change set. Actions are one-shot
    /// and are not stored.
    pub fn apply(&mut self, changes: &FieldChanges) {
        if let Some(motion) = changes.motion {
            self.motion = motion;
        }
        if let Some(state) = changes.state {
            self.state = state.value();
        }
        if let Some(expression) = changes.expression {
            self.expression = expression;
        }
        if let Some(identity) = changes.identity {
            self.identity = identity;
        }
        if let Some(options) = changes.options {
            self.options = options;
        }
        if let Some(info) = &changes.info {
            self.info = Some(info.clone());
        }
        if let Some(name) = &changes.name {
            self.name = Some(name.clone());
        }
    }
}
