//! Inspection, decoding and capture tools for regionsync frames.
//!
//! - Inspect frame structure and per-section sizes
//! - Decode frames into JSON or a readable listing
//! - Run a deterministic simulation that captures real frames
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

mod config;
mod inspect;
mod json;
mod simulate;

pub use config::{load_limits, parse_limits};
pub use inspect::{format_inspect, inspect_frame, InspectReport, SectionReport};
pub use json::{decode_frame_json, format_decode_pretty, FrameJson, TileEditJson, UpdateJson};
pub use simulate::{run_simulation, Rng, SimConfig, Summary};
