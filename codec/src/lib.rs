//! Region frame encoding and decoding for regionsync.
//!
//! This crate ties together `bitstream`, `wire` and `quant` to turn a
//! region's per-tick changes into binary frames and back.
//!
//! # Frames
//!
//! - **Incremental**: the pending removals, tile edits and entity updates
//!   accumulated since the last [`Region::reset`]. Identical for every
//!   subscriber of the region, so it is encoded once per tick.
//! - **Full**: the compressed tile grid plus every entity the viewer may see,
//!   with every field group set. Carries the protocol hash.
//!
//! # Design Principles
//!
//! - **Strict decoding** - Anything unexpected rejects the whole frame.
//! - **Bounded** - Counts and lengths are checked against [`CodecLimits`]
//!   before allocating.
//! - **Deterministic** - The same region state always encodes to the same
//!   bytes.

mod decode;
mod encode;
mod entity;
mod error;
mod limits;
mod message;
mod record;
mod region;
mod tiles;
mod types;
mod visibility;

pub use decode::{decode_frame, decode_frame_from_wire};
pub use encode::{encode_full, encode_incremental};
pub use entity::Entity;
pub use error::{CodecError, CodecResult, LimitKind, RegionError, TileError};
pub use limits::CodecLimits;
pub use message::{FrameKind, FrameMessage};
pub use record::{EntityUpdate, FieldChanges};
pub use region::Region;
pub use tiles::{compress, decompress, in_bounds, TileGrid, TileType, REGION_SIZE, TILE_COUNT};
pub use types::{AccountId, EntityId, RegionCoord, TileEdit};
pub use visibility::{is_visible, visible_entities, Owner, Viewer};
pub use wire::Limits as WireLimits;
