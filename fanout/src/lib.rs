//! Region fan-out: decide which frame each subscriber gets, not how it is
//! encoded.
//!
//! Each tick the caller mutates its regions, then calls [`serve_tick`] once.
//! Per region, new subscribers (and clients marked with
//! [`Subscriptions::force_full`]) receive a full frame filtered for their
//! [`Viewer`]; everyone else shares one incremental frame. Every region passed
//! in is reset exactly once, after all of its subscribers have been served.
//! Regions are independent, so they are encoded in parallel.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use codec::{
    encode_full, encode_incremental, CodecError, CodecLimits, FrameKind, Region, RegionCoord,
    Viewer,
};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Client identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u32);

/// Source of per-client view settings (hide lists, shadow state).
pub trait ViewerDirectory {
    /// The client's current viewer, or `None` if the client is unknown.
    fn viewer(&self, client: ClientId) -> Option<&Viewer>;
}

impl ViewerDirectory for HashMap<ClientId, Viewer> {
    fn viewer(&self, client: ClientId) -> Option<&Viewer> {
        self.get(&client)
    }
}

impl ViewerDirectory for BTreeMap<ClientId, Viewer> {
    fn viewer(&self, client: ClientId) -> Option<&Viewer> {
        self.get(&client)
    }
}

#[derive(Debug, Clone, Default)]
struct RegionSubscribers {
    clients: BTreeSet<ClientId>,
    pending_full: BTreeSet<ClientId>,
}

/// Which clients follow which regions, and who is owed a full frame.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    regions: BTreeMap<RegionCoord, RegionSubscribers>,
}

impl Subscriptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `client` to `region` and queues a full frame for it.
    ///
    /// Returns `false` if the client was already subscribed.
    pub fn subscribe(&mut self, client: ClientId, region: RegionCoord) -> bool {
        let entry = self.regions.entry(region).or_default();
        if !entry.clients.insert(client) {
            return false;
        }
        entry.pending_full.insert(client);
        true
    }

    /// Returns `false` if the client was not subscribed.
    pub fn unsubscribe(&mut self, client: ClientId, region: RegionCoord) -> bool {
        let Some(entry) = self.regions.get_mut(&region) else {
            return false;
        };
        let removed = entry.clients.remove(&client);
        entry.pending_full.remove(&client);
        if entry.clients.is_empty() {
            self.regions.remove(&region);
        }
        removed
    }

    /// Drops every subscription of a disconnected client.
    pub fn remove_client(&mut self, client: ClientId) {
        self.regions.retain(|_, entry| {
            entry.clients.remove(&client);
            entry.pending_full.remove(&client);
            !entry.clients.is_empty()
        });
    }

    /// Queues a full frame of every region `client` follows, e.g. after its
    /// hide list changed. Returns the number of regions affected.
    pub fn force_full(&mut self, client: ClientId) -> usize {
        let mut count = 0;
        for entry in self.regions.values_mut() {
            if entry.clients.contains(&client) {
                entry.pending_full.insert(client);
                count += 1;
            }
        }
        count
    }

    /// Queues a full frame of `region` for all of its subscribers, e.g. after
    /// an owner inside it was shadow banned.
    pub fn force_full_region(&mut self, region: RegionCoord) {
        if let Some(entry) = self.regions.get_mut(&region) {
            entry.pending_full = entry.clients.clone();
        }
    }

    /// Subscribers of `region` in ascending id order.
    pub fn subscribers(&self, region: RegionCoord) -> impl Iterator<Item = ClientId> + '_ {
        self.regions
            .get(&region)
            .into_iter()
            .flat_map(|entry| entry.clients.iter().copied())
    }

    /// Regions with at least one subscriber.
    pub fn regions(&self) -> impl Iterator<Item = RegionCoord> + '_ {
        self.regions.keys().copied()
    }

    #[must_use]
    pub fn is_subscribed(&self, client: ClientId, region: RegionCoord) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|entry| entry.clients.contains(&client))
    }

    #[must_use]
    pub fn needs_full(&self, client: ClientId, region: RegionCoord) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|entry| entry.pending_full.contains(&client))
    }

    fn plan(&self, region: RegionCoord) -> RegionPlan {
        let Some(entry) = self.regions.get(&region) else {
            return RegionPlan::default();
        };
        let (full, incremental): (Vec<ClientId>, Vec<ClientId>) = entry
            .clients
            .iter()
            .partition(|client| entry.pending_full.contains(*client));
        RegionPlan { full, incremental }
    }

    fn mark_served(&mut self, region: RegionCoord, clients: &[ClientId]) {
        if let Some(entry) = self.regions.get_mut(&region) {
            for client in clients {
                entry.pending_full.remove(client);
            }
        }
    }
}

#[derive(Debug, Default)]
struct RegionPlan {
    full: Vec<ClientId>,
    incremental: Vec<ClientId>,
}

/// One encoded frame addressed to one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFrame {
    pub client: ClientId,
    pub region: RegionCoord,
    pub kind: FrameKind,
    /// Incremental frames share one buffer across every recipient.
    pub bytes: Arc<[u8]>,
}

/// A region whose frames could not be encoded this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFailure {
    pub region: RegionCoord,
    pub error: CodecError,
}

/// Everything produced by one [`serve_tick`] call, in region order.
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub frames: Vec<ClientFrame>,
    pub failures: Vec<RegionFailure>,
}

impl TickOutput {
    /// Frames addressed to `client`.
    pub fn frames_for(&self, client: ClientId) -> impl Iterator<Item = &ClientFrame> + '_ {
        self.frames.iter().filter(move |frame| frame.client == client)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.failures.is_empty()
    }
}

struct RegionOutcome {
    region: RegionCoord,
    result: Result<(Vec<ClientId>, Vec<ClientFrame>), CodecError>,
}

/// Encodes this tick's frames for every subscriber of `regions`, then resets
/// each region.
///
/// A region whose encode fails yields no frames at all; it is still reset and
/// all of its subscribers are owed a full frame on the next tick. A client
/// missing from `viewers` keeps its pending full frame and gets nothing for
/// that region until it appears. Regions without changes produce no
/// incremental frames.
pub fn serve_tick<V>(
    subscriptions: &mut Subscriptions,
    regions: &mut [Region],
    viewers: &V,
    limits: &CodecLimits,
) -> TickOutput
where
    V: ViewerDirectory + Sync,
{
    let plans: Vec<RegionPlan> = regions
        .iter()
        .map(|region| subscriptions.plan(region.coord()))
        .collect();

    let outcomes: Vec<RegionOutcome> = regions
        .par_iter_mut()
        .zip(plans.par_iter())
        .map(|(region, plan)| serve_region(region, plan, viewers, limits))
        .collect();

    let mut output = TickOutput::default();
    for outcome in outcomes {
        match outcome.result {
            Ok((served_full, frames)) => {
                subscriptions.mark_served(outcome.region, &served_full);
                output.frames.extend(frames);
            }
            Err(error) => {
                subscriptions.force_full_region(outcome.region);
                output.failures.push(RegionFailure {
                    region: outcome.region,
                    error,
                });
            }
        }
    }

    debug!(
        regions = regions.len(),
        frames = output.frames.len(),
        failures = output.failures.len(),
        "served tick"
    );
    output
}

fn serve_region<V: ViewerDirectory>(
    region: &mut Region,
    plan: &RegionPlan,
    viewers: &V,
    limits: &CodecLimits,
) -> RegionOutcome {
    let result = encode_region(region, plan, viewers, limits);
    region.reset();
    RegionOutcome {
        region: region.coord(),
        result,
    }
}

fn encode_region<V: ViewerDirectory>(
    region: &Region,
    plan: &RegionPlan,
    viewers: &V,
    limits: &CodecLimits,
) -> Result<(Vec<ClientId>, Vec<ClientFrame>), CodecError> {
    let coord = region.coord();
    let mut served_full = Vec::with_capacity(plan.full.len());
    let mut frames = Vec::with_capacity(plan.full.len() + plan.incremental.len());

    for &client in &plan.full {
        let Some(viewer) = viewers.viewer(client) else {
            debug!(client = client.0, region = %coord, "no viewer, full frame deferred");
            continue;
        };
        let bytes = encode_full(region, viewer, limits)?;
        frames.push(ClientFrame {
            client,
            region: coord,
            kind: FrameKind::Full,
            bytes: bytes.into(),
        });
        served_full.push(client);
    }

    if !plan.incremental.is_empty() && region.has_pending() {
        let bytes: Arc<[u8]> = encode_incremental(region, limits)?.into();
        frames.extend(plan.incremental.iter().map(|&client| ClientFrame {
            client,
            region: coord,
            kind: FrameKind::Incremental,
            bytes: Arc::clone(&bytes),
        }));
    }

    trace!(
        region = %coord,
        full = served_full.len(),
        incremental = plan.incremental.len(),
        "served region"
    );
    Ok((served_full, frames))
}
