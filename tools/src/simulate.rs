//! Deterministic world simulation that drives the real fan-out and codec.
//!
//! Entities wander across a square grid of regions, switch regions, despawn
//! and respawn under a reused id, and occasionally edit tiles. Clients follow
//! one region at a time, hop between regions and toggle hides. Every frame
//! produced is decoded again before it is handed to the caller.

use std::collections::BTreeMap;

use anyhow::{bail, ensure, Context, Result};
use codec::{
    decode_frame, AccountId, CodecLimits, Entity, EntityId, EntityUpdate, FieldChanges,
    FrameKind, Owner, Region, RegionCoord, TileType, Viewer, REGION_SIZE,
};
use fanout::{serve_tick, ClientFrame, ClientId, Subscriptions};
use quant::{Crc, EntityType, Identity, Motion, Name, StateChange, POSITION_SCALE};
use serde::Serialize;
use tracing::{debug, warn};
use wire::Limits;

/// World units covered by one region side.
const REGION_SPAN: i32 = 64;

/// Largest quantized velocity magnitude the wire accepts.
const MAX_VEL_Q: i32 = 799;

const PONY_TYPE: EntityType = EntityType(1);
const NPC_TYPE: EntityType = EntityType(2);

/// Parameters of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub entities: u32,
    pub clients: u32,
    pub ticks: u32,
    pub seed: u64,
    /// The world is `regions_per_side × regions_per_side` regions.
    pub regions_per_side: i16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            entities: 32,
            clients: 4,
            ticks: 120,
            seed: 1,
            regions_per_side: 2,
        }
    }
}

/// Linear congruential generator; identical seeds give identical runs.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `min..=max`; `max` must not be below `min`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = max.saturating_sub(min).unsigned_abs() + 1;
        let value = u64::from(self.next_u32()) % span;
        min + value as i64
    }

    /// `true` roughly once every `one_in` calls.
    pub fn chance(&mut self, one_in: u32) -> bool {
        one_in > 0 && self.next_u32() % one_in == 0
    }
}

/// Frame statistics of a run, written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub entities: u32,
    pub clients: u32,
    pub ticks: u32,
    pub seed: u64,
    pub regions: usize,
    pub full_count: u32,
    pub incremental_count: u32,
    pub full_bytes_total: u64,
    pub incremental_bytes_total: u64,
    pub avg_incremental_bytes: u64,
    pub p95_incremental_bytes: u64,
    pub max_frame_bytes: u64,
    pub failures: u32,
    pub region_switches: u32,
    pub respawns: u32,
    pub tile_edits: u32,
    pub hide_changes: u32,
    pub shadow_changes: u32,
    pub resubscribes: u32,
    #[serde(skip)]
    incremental_sizes: Vec<u64>,
}

impl Summary {
    fn new(config: &SimConfig, regions: usize) -> Self {
        Self {
            entities: config.entities,
            clients: config.clients,
            ticks: config.ticks,
            seed: config.seed,
            regions,
            full_count: 0,
            incremental_count: 0,
            full_bytes_total: 0,
            incremental_bytes_total: 0,
            avg_incremental_bytes: 0,
            p95_incremental_bytes: 0,
            max_frame_bytes: 0,
            failures: 0,
            region_switches: 0,
            respawns: 0,
            tile_edits: 0,
            hide_changes: 0,
            shadow_changes: 0,
            resubscribes: 0,
            incremental_sizes: Vec::new(),
        }
    }

    fn push_frame(&mut self, kind: FrameKind, bytes: u64) {
        match kind {
            FrameKind::Full => {
                self.full_count += 1;
                self.full_bytes_total += bytes;
            }
            FrameKind::Incremental => {
                self.incremental_count += 1;
                self.incremental_bytes_total += bytes;
                self.incremental_sizes.push(bytes);
            }
        }
        self.max_frame_bytes = self.max_frame_bytes.max(bytes);
    }

    fn finalize(&mut self) {
        if self.incremental_count > 0 {
            self.avg_incremental_bytes =
                self.incremental_bytes_total / u64::from(self.incremental_count);
            self.incremental_sizes.sort_unstable();
            let idx = ((self.incremental_sizes.len() as f64) * 0.95).ceil() as usize;
            let idx = idx.saturating_sub(1).min(self.incremental_sizes.len() - 1);
            self.p95_incremental_bytes = self.incremental_sizes[idx];
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    id: EntityId,
    kind: EntityType,
    crc: Crc,
    pos_q: [i32; 2],
    vel_q: [i32; 2],
    owner: Option<Owner>,
    region: usize,
}

impl Body {
    fn motion(&self) -> Motion {
        let scale = POSITION_SCALE as f32;
        Motion::new(
            self.pos_q[0] as f32 / scale,
            self.pos_q[1] as f32 / scale,
            self.vel_q[0] as f32 / scale,
            self.vel_q[1] as f32 / scale,
        )
    }

    fn entity(&self) -> Entity {
        let mut entity = Entity::new(self.id, Identity {
            kind: self.kind,
            crc: self.crc,
        })
        .with_motion(self.motion())
        .with_name(Name::new(format!("pony-{}", self.id), false));
        entity.owner = self.owner;
        entity
    }
}

#[derive(Debug, Clone)]
struct ClientSeat {
    id: ClientId,
    account: AccountId,
    region: RegionCoord,
}

struct World {
    side: i16,
    extent_q: i32,
    regions: Vec<Region>,
    bodies: Vec<Body>,
}

impl World {
    fn new(config: &SimConfig, rng: &mut Rng) -> Self {
        let side = config.regions_per_side.max(1);
        let mut regions = Vec::new();
        for y in 0..side {
            for x in 0..side {
                regions.push(Region::new(RegionCoord::new(x, y)));
            }
        }
        let extent_q = i32::from(side) * REGION_SPAN * POSITION_SCALE;

        let mut world = Self {
            side,
            extent_q,
            regions,
            bodies: Vec::with_capacity(config.entities as usize),
        };
        for idx in 0..config.entities {
            let owned = idx < config.clients;
            let pos_q = world.random_position(rng);
            let body = Body {
                id: EntityId::new(idx + 1),
                kind: if owned { PONY_TYPE } else { NPC_TYPE },
                crc: Crc::default(),
                pos_q,
                vel_q: [
                    rng.range_i64(-80, 80) as i32,
                    rng.range_i64(-80, 80) as i32,
                ],
                owner: owned.then(|| Owner::new(client_account(idx))),
                region: world.region_index(pos_q),
            };
            world.regions[body.region].insert_entity(body.entity());
            world.bodies.push(body);
        }
        world
    }

    fn random_position(&self, rng: &mut Rng) -> [i32; 2] {
        let max = i64::from(self.extent_q - 1);
        [rng.range_i64(0, max) as i32, rng.range_i64(0, max) as i32]
    }

    fn region_index(&self, pos_q: [i32; 2]) -> usize {
        let span = REGION_SPAN * POSITION_SCALE;
        let x = (pos_q[0] / span).clamp(0, i32::from(self.side) - 1);
        let y = (pos_q[1] / span).clamp(0, i32::from(self.side) - 1);
        (y * i32::from(self.side) + x) as usize
    }

    fn coord(&self, index: usize) -> RegionCoord {
        self.regions[index].coord()
    }

    fn step(&mut self, rng: &mut Rng, summary: &mut Summary) -> Result<()> {
        for index in 0..self.bodies.len() {
            if rng.chance(250) {
                self.respawn(index, rng)?;
                summary.respawns += 1;
                continue;
            }

            let mut body = self.bodies[index].clone();
            for axis in 0..2 {
                if rng.chance(10) {
                    let delta = rng.range_i64(-40, 40) as i32;
                    body.vel_q[axis] = (body.vel_q[axis] + delta).clamp(-MAX_VEL_Q, MAX_VEL_Q);
                }
                let next = body.pos_q[axis] + body.vel_q[axis] / POSITION_SCALE;
                if next < 0 || next >= self.extent_q {
                    body.vel_q[axis] = -body.vel_q[axis];
                } else {
                    body.pos_q[axis] = next;
                }
            }

            let target = self.region_index(body.pos_q);
            if target == body.region {
                self.regions[target]
                    .update_entity(body.id, FieldChanges::new().with_motion(body.motion()))?;
            } else {
                let Some(entity) = self.regions[body.region].remove_entity(body.id) else {
                    bail!("entity {} missing from region {}", body.id, self.coord(body.region));
                };
                let entity = entity.with_motion(body.motion());
                let mut changes = entity.full_changes();
                changes.state = Some(StateChange::WithRegionSwitch(entity.state));
                self.regions[target].insert_entity(entity);
                self.regions[target].queue_update(EntityUpdate::new(body.id, changes))?;
                body.region = target;
                summary.region_switches += 1;
            }
            self.bodies[index] = body;
        }

        if rng.chance(4) {
            let region = rng.next_u32() as usize % self.regions.len();
            let x = (rng.next_u32() % u32::from(REGION_SIZE)) as u8;
            let y = (rng.next_u32() % u32::from(REGION_SIZE)) as u8;
            let tile = TileType((rng.next_u32() % 4) as u8);
            self.regions[region].queue_tile_change(x, y, tile)?;
            summary.tile_edits += 1;
        }
        Ok(())
    }

    /// Despawns a body and brings a new logical entity back under the same id.
    fn respawn(&mut self, index: usize, rng: &mut Rng) -> Result<()> {
        let pos_q = self.random_position(rng);
        let target = self.region_index(pos_q);
        let body = &mut self.bodies[index];
        self.regions[body.region].remove_entity(body.id);

        body.crc = body.crc.bump();
        body.pos_q = pos_q;
        body.vel_q = [0, 0];
        body.region = target;
        let entity = body.entity();
        let update = EntityUpdate::new(body.id, entity.full_changes());
        self.regions[target].insert_entity(entity);
        self.regions[target].queue_update(update)?;
        Ok(())
    }

    /// Flips the shadow state of one owned entity. Returns its region.
    fn toggle_shadow(&mut self, rng: &mut Rng) -> Option<RegionCoord> {
        let owned: Vec<usize> = (0..self.bodies.len())
            .filter(|&index| self.bodies[index].owner.is_some())
            .collect();
        if owned.is_empty() {
            return None;
        }
        let index = owned[rng.next_u32() as usize % owned.len()];
        let body = &mut self.bodies[index];
        let owner = body.owner.as_mut()?;
        owner.shadowed = !owner.shadowed;
        let owner = *owner;
        let region = &mut self.regions[body.region];
        if let Some(entity) = region.entity_mut(body.id) {
            entity.owner = Some(owner);
        }
        Some(region.coord())
    }
}

fn client_account(idx: u32) -> AccountId {
    AccountId::new(1000 + idx)
}

/// Runs the simulation, passing every frame (after it decoded cleanly) to
/// `on_frame` together with its tick.
pub fn run_simulation<F>(
    config: &SimConfig,
    limits: &CodecLimits,
    wire_limits: &Limits,
    mut on_frame: F,
) -> Result<Summary>
where
    F: FnMut(u32, &ClientFrame) -> Result<()>,
{
    let mut rng = Rng::new(config.seed);
    let mut world = World::new(config, &mut rng);
    let mut summary = Summary::new(config, world.regions.len());

    let mut subscriptions = Subscriptions::new();
    let mut viewers: BTreeMap<ClientId, Viewer> = BTreeMap::new();
    let mut seats: Vec<ClientSeat> = (0..config.clients)
        .map(|idx| {
            let region = world.coord(idx as usize % world.regions.len());
            ClientSeat {
                id: ClientId(idx),
                account: client_account(idx),
                region,
            }
        })
        .collect();
    for seat in &seats {
        viewers.insert(seat.id, Viewer::new(seat.account));
        subscriptions.subscribe(seat.id, seat.region);
    }

    for tick in 1..=config.ticks {
        world.step(&mut rng, &mut summary)?;

        for seat in &mut seats {
            if config.clients > 1 && rng.chance(80) {
                let other = client_account(rng.next_u32() % config.clients);
                if other != seat.account {
                    if let Some(viewer) = viewers.get_mut(&seat.id) {
                        if !viewer.hides.remove(&other) {
                            viewer.hides.insert(other);
                        }
                    }
                    subscriptions.force_full(seat.id);
                    summary.hide_changes += 1;
                }
            }
            if rng.chance(60) {
                let next = world.coord(rng.next_u32() as usize % world.regions.len());
                if next != seat.region {
                    subscriptions.unsubscribe(seat.id, seat.region);
                    subscriptions.subscribe(seat.id, next);
                    seat.region = next;
                    summary.resubscribes += 1;
                }
            }
        }
        if rng.chance(150) {
            if let Some(region) = world.toggle_shadow(&mut rng) {
                subscriptions.force_full_region(region);
                summary.shadow_changes += 1;
            }
        }

        let output = serve_tick(&mut subscriptions, &mut world.regions, &viewers, limits);
        for failure in &output.failures {
            warn!(tick, region = %failure.region, error = %failure.error, "region encode failed");
            summary.failures += 1;
        }
        for frame in &output.frames {
            let message = decode_frame(&frame.bytes, wire_limits, limits).with_context(|| {
                format!(
                    "decode tick {tick} frame for client {} region {}",
                    frame.client.0, frame.region
                )
            })?;
            ensure!(
                message.kind == frame.kind && message.region == frame.region,
                "frame for client {} decoded as a different frame",
                frame.client.0
            );
            summary.push_frame(frame.kind, frame.bytes.len() as u64);
            on_frame(tick, frame)?;
        }
        debug!(tick, frames = output.frames.len(), "tick served");
    }

    summary.finalize();
    Ok(summary)
}
