//! Wire framing for region frames.
//!
//! This crate handles the outer binary layout: the frame header (kind flags,
//! region coordinate, protocol hash on full frames), tagged length-prefixed
//! section framing, and limit enforcement. It knows nothing about entities or
//! tiles; section bodies are opaque byte slices borrowed from the input.
//!
//! # Layout
//!
//! ```text
//! flags:u8  region_x:i16le  region_y:i16le  [protocol_hash:u64le if FULL]
//! ( tag:u8  len:varu32  body:[u8; len] )*
//! ```

mod error;
mod frame;
mod header;
mod limits;

pub use error::{DecodeError, EncodeError, LimitKind, SectionFramingError, WireResult};
pub use frame::{
    decode_frame, decode_sections, encode_header, encode_section, SectionTag, WireFrame,
    WireSection,
};
pub use header::{FrameFlags, FrameHeader, FULL_HEADER_SIZE, INCREMENTAL_HEADER_SIZE};
pub use limits::Limits;
