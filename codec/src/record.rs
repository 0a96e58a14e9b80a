//! Entity update records.
//!
//! A record is `flags: u16`, `id: varu32`, then each flagged group in the
//! canonical order of [`UpdateFlags::GROUPS`].

use bitstream::{BitReader, BitWriter};
use quant::packing;
use quant::{
    Action, EntityOptions, Expression, Identity, Info, Motion, Name, StateChange, UpdateFlags,
};

use crate::error::CodecResult;
use crate::limits::CodecLimits;
use crate::types::EntityId;

/// Changed field groups of one entity. `None` means the group is absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldChanges {
    pub motion: Option<Motion>,
    pub state: Option<StateChange>,
    pub expression: Option<Expression>,
    pub identity: Option<Identity>,
    pub options: Option<EntityOptions>,
    pub info: Option<Info>,
    pub action: Option<Action>,
    pub name: Option<Name>,
}

impl FieldChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: StateChange) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EntityOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_info(mut self, info: Info) -> Self {
        self.info = Some(info);
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    /// Flags naming the present groups.
    #[must_use]
    pub const fn flags(&self) -> UpdateFlags {
        let mut bits = 0u16;
        if self.motion.is_some() {
            bits |= UpdateFlags::POSITION;
        }
        if let Some(state) = &self.state {
            bits |= UpdateFlags::STATE;
            if state.switches_region() {
                bits |= UpdateFlags::SWITCH_REGION;
            }
        }
        if self.expression.is_some() {
            bits |= UpdateFlags::EXPRESSION;
        }
        if self.identity.is_some() {
            bits |= UpdateFlags::TYPE;
        }
        if self.options.is_some() {
            bits |= UpdateFlags::OPTIONS;
        }
        if self.info.is_some() {
            bits |= UpdateFlags::INFO;
        }
        if self.action.is_some() {
            bits |= UpdateFlags::ACTION;
        }
        if self.name.is_some() {
            bits |= UpdateFlags::NAME;
        }
        UpdateFlags::from_raw(bits)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }

    /// Returns `true` if the state change reports a region switch.
    #[must_use]
    pub const fn switch_region(&self) -> bool {
        match &self.state {
            Some(state) => state.switches_region(),
            None => false,
        }
    }

    /// Folds a later change set into this one.
    ///
    /// Groups present in `later` replace ours. A region switch reported by
    /// either side survives a later plain state change.
    pub fn merge(&mut self, later: Self) {
        let switched = self.switch_region() || later.switch_region();
        replace_if_some(&mut self.motion, later.motion);
        replace_if_some(&mut self.state, later.state);
        replace_if_some(&mut self.expression, later.expression);
        replace_if_some(&mut self.identity, later.identity);
        replace_if_some(&mut self.options, later.options);
        replace_if_some(&mut self.info, later.info);
        replace_if_some(&mut self.action, later.action);
        replace_if_some(&mut self.name, later.name);
        if switched {
            if let Some(state) = self.state {
                self.state = Some(StateChange::WithRegionSwitch(state.value()));
            }
        }
    }
}

fn replace_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// One entity's pending (or decoded) update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityUpdate {
    pub id: EntityId,
    pub changes: FieldChanges,
}

impl EntityUpdate {
    #[must_use]
    pub const fn new(id: EntityId, changes: FieldChanges) -> Self {
        Self { id, changes }
    }

    #[must_use]
    pub const fn flags(&self) -> UpdateFlags {
        self.changes.flags()
    }
}

/// Writes one record. Fails before writing if the flags would be invalid.
pub(crate) fn write_update(
    update: &EntityUpdate,
    limits: &CodecLimits,
    writer: &mut BitWriter,
) -> CodecResult<()> {
    let flags = UpdateFlags::parse(update.flags().raw())?;
    let changes = &update.changes;

    writer.write_u16_aligned(flags.raw())?;
    writer.write_varu32(update.id.raw())?;

    if let Some(motion) = &changes.motion {
        packing::write_motion(motion, writer)?;
    }
    if let Some(state) = &changes.state {
        packing::write_state(&state.value(), writer)?;
    }
    if let Some(expression) = changes.expression {
        packing::write_expression(expression, writer)?;
    }
    if let Some(identity) = changes.identity {
        packing::write_identity(identity, writer)?;
    }
    if let Some(options) = &changes.options {
        packing::write_options(options, writer)?;
    }
    if let Some(info) = &changes.info {
        packing::write_info(info, limits.max_info_bytes, writer)?;
    }
    if let Some(action) = changes.action {
        packing::write_action(action, writer)?;
    }
    if let Some(name) = &changes.name {
        packing::write_name(name, limits.max_name_bytes, writer)?;
    }
    Ok(())
}

/// Reads one record, leaving unflagged groups as `None`.
pub(crate) fn read_update(
    reader: &mut BitReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<EntityUpdate> {
    let flags = UpdateFlags::parse(reader.read_u16_aligned()?)?;
    let id = EntityId::new(reader.read_varu32()?);
    let mut changes = FieldChanges::new();

    if flags.contains(UpdateFlags::POSITION) {
        changes.motion = Some(packing::read_motion(reader)?);
    }
    if flags.contains(UpdateFlags::STATE) {
        let value = packing::read_state(reader)?;
        changes.state = Some(if flags.contains(UpdateFlags::SWITCH_REGION) {
            StateChange::WithRegionSwitch(value)
        } else {
            StateChange::Plain(value)
        });
    }
    if flags.contains(UpdateFlags::EXPRESSION) {
        changes.expression = Some(packing::read_expression(reader)?);
    }
    if flags.contains(UpdateFlags::TYPE) {
        changes.identity = Some(packing::read_identity(reader)?);
    }
    if flags.contains(UpdateFlags::OPTIONS) {
        changes.options = Some(packing::read_options(reader)?);
    }
    if flags.contains(UpdateFlags::INFO) {
        changes.info = Some(packing::read_info(reader, limits.max_info_bytes)?);
    }
    if flags.contains(UpdateFlags::ACTION) {
        changes.action = Some(packing::read_action(reader)?);
    }
    if flags.contains(UpdateFlags::NAME) {
        changes.name = Some(packing::read_name(reader, limits.max_name_bytes)?);
    }

    Ok(EntityUpdate { id, changes })
}
