use std::fmt::Write as _;

use anyhow::{Context, Result};
use codec::{decode_frame, CodecLimits, EntityUpdate, FrameKind, FrameMessage};
use quant::{Action, EntityOptions, Expression, Identity, Info, Motion, Name, StateValue};
use serde::Serialize;
use wire::Limits;

/// JSON view of a decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameJson {
    pub region_x: i16,
    pub region_y: i16,
    pub full: bool,
    pub removes: Vec<u32>,
    pub tiles: Vec<TileEditJson>,
    /// Row-major tile codes of a full frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_data: Option<Vec<u8>>,
    pub updates: Vec<UpdateJson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileEditJson {
    pub x: u8,
    pub y: u8,
    pub tile: u8,
}

/// One entity record. Groups the record did not carry are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateJson {
    pub id: u32,
    pub flags: u16,
    pub switch_region: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<Motion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<EntityOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
}

impl From<&EntityUpdate> for UpdateJson {
    fn from(update: &EntityUpdate) -> Self {
        let changes = &update.changes;
        Self {
            id: update.id.raw(),
            flags: update.flags().raw(),
            switch_region: changes.switch_region(),
            motion: changes.motion,
            state: changes.state.map(|state| state.value()),
            expression: changes.expression,
            identity: changes.identity,
            options: changes.options,
            info: changes.info.clone(),
            action: changes.action,
            name: changes.name.clone(),
        }
    }
}

impl From<&FrameMessage> for FrameJson {
    fn from(message: &FrameMessage) -> Self {
        Self {
            region_x: message.region.x,
            region_y: message.region.y,
            full: message.kind == FrameKind::Full,
            removes: message.removes.iter().map(|id| id.raw()).collect(),
            tiles: message
                .tiles
                .iter()
                .map(|edit| TileEditJson {
                    x: edit.x,
                    y: edit.y,
                    tile: edit.tile.0,
                })
                .collect(),
            tile_data: message
                .tile_data
                .as_ref()
                .map(|grid| grid.as_slice().iter().map(|tile| tile.0).collect()),
            updates: message.updates.iter().map(UpdateJson::from).collect(),
        }
    }
}

pub fn decode_frame_json(bytes: &[u8], wire_limits: &Limits, limits: &CodecLimits) -> Result<FrameJson> {
    let message = decode_frame(bytes, wire_limits, limits).context("decode frame")?;
    Ok(FrameJson::from(&message))
}

/// One line per element, for terminals.
pub fn format_decode_pretty(frame: &FrameJson) -> String {
    let mut out = String::new();
    let kind = if frame.full { "full" } else { "incremental" };
    let _ = writeln!(out, "{kind} frame for region ({}, {})", frame.region_x, frame.region_y);
    if !frame.removes.is_empty() {
        let _ = writeln!(out, "removes: {:?}", frame.removes);
    }
    for edit in &frame.tiles {
        let _ = writeln!(out, "tile ({}, {}) -> {}", edit.x, edit.y, edit.tile);
    }
    if let Some(tiles) = &frame.tile_data {
        let _ = writeln!(out, "tiles:");
        for row in tiles.chunks(usize::from(codec::REGION_SIZE)) {
            let row: Vec<String> = row.iter().map(u8::to_string).collect();
            let _ = writeln!(out, "  {}", row.join(" "));
        }
    }
    let _ = writeln!(out, "updates: {}", frame.updates.len());
    for update in &frame.updates {
        let _ = write!(out, "  #{} flags=0x{:04x}", update.id, update.flags);
        if let Some(motion) = update.motion {
            let _ = write!(
                out,
                " pos=({}, {}) vel=({}, {})",
                motion.x, motion.y, motion.vx, motion.vy
            );
        }
        if let Some(state) = update.state {
            let _ = write!(out, " state={}", state.state.0);
            if let Some(player) = state.player_state {
                let _ = write!(out, "/{}", player.get());
            }
        }
        if update.switch_region {
            let _ = write!(out, " switch_region");
        }
        if let Some(expression) = update.expression {
            let _ = write!(out, " expr=0x{:08x}", expression.0);
        }
        if let Some(identity) = update.identity {
            let _ = write!(out, " type={} crc={}", identity.kind.0, identity.crc.0);
        }
        if let Some(options) = update.options {
            let _ = write!(out, " options={}", options.len());
        }
        if let Some(info) = &update.info {
            let _ = write!(out, " info={}B", info.0.len());
        }
        if let Some(action) = update.action {
            let _ = write!(out, " action={}", action.0);
        }
        if let Some(name) = &update.name {
            let _ = write!(out, " name={:?}", String::from_utf8_lossy(&name.bytes));
            if name.filter {
                let _ = write!(out, " (filtered)");
            }
        }
        let _ = writeln!(out);
    }
    out
}
