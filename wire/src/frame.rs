//! Frame decoding and section framing.

use crate::error::{DecodeError, EncodeError, LimitKind, SectionFramingError, WireResult};
use crate::header::{FrameFlags, FrameHeader, FULL_HEADER_SIZE, INCREMENTAL_HEADER_SIZE};
use crate::limits::Limits;

/// Section tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum SectionTag {
    Removes = 1,
    Tiles = 2,
    TileData = 3,
    Updates = 4,
}

impl SectionTag {
    /// Parses a section tag from a raw byte.
    pub const fn parse(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(Self::Removes),
            2 => Ok(Self::Tiles),
            3 => Ok(Self::TileData),
            4 => Ok(Self::Updates),
            _ => Err(DecodeError::UnknownSectionTag { tag }),
        }
    }
}

/// A section within a wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSection<'a> {
    pub tag: SectionTag,
    pub body: &'a [u8],
}

/// A decoded wire frame: header plus borrowed section bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame<'a> {
    pub header: FrameHeader,
    pub sections: Vec<WireSection<'a>>,
}

/// Decodes a wire frame into header + section slices.
pub fn decode_frame<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<WireFrame<'a>> {
    if buf.len() < INCREMENTAL_HEADER_SIZE {
        return Err(DecodeError::FrameTooSmall {
            actual: buf.len(),
            required: INCREMENTAL_HEADER_SIZE,
        });
    }
    if buf.len() > limits.max_frame_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::FrameBytes,
            limit: limits.max_frame_bytes,
            actual: buf.len(),
        });
    }

    let flags = FrameFlags::from_raw(buf[0]);
    if !flags.is_valid() {
        return Err(DecodeError::InvalidFlags { flags: flags.raw() });
    }
    let region_x = i16::from_le_bytes([buf[1], buf[2]]);
    let region_y = i16::from_le_bytes([buf[3], buf[4]]);

    let (protocol_hash, header_len) = if flags.is_full() {
        if buf.len() < FULL_HEADER_SIZE {
            return Err(DecodeError::FrameTooSmall {
                actual: buf.len(),
                required: FULL_HEADER_SIZE,
            });
        }
        let mut hash = [0u8; 8];
        hash.copy_from_slice(&buf[INCREMENTAL_HEADER_SIZE..FULL_HEADER_SIZE]);
        (u64::from_le_bytes(hash), FULL_HEADER_SIZE)
    } else {
        (0, INCREMENTAL_HEADER_SIZE)
    };

    let header = FrameHeader {
        flags,
        region_x,
        region_y,
        protocol_hash,
    };
    let sections = decode_sections(&buf[header_len..], limits)?;

    Ok(WireFrame { header, sections })
}

/// Decodes sections from a payload buffer (no frame header).
pub fn decode_sections<'a>(payload: &'a [u8], limits: &Limits) -> WireResult<Vec<WireSection<'a>>> {
    let mut offset = 0usize;
    let mut sections = Vec::new();

    while offset < payload.len() {
        if sections.len() >= limits.max_sections {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::SectionCount,
                limit: limits.max_sections,
                actual: sections.len() + 1,
            });
        }

        let tag = SectionTag::parse(payload[offset])?;
        offset += 1;
        let (len, new_offset) = read_varu32(payload, offset)?;
        offset = new_offset;
        let len = len as usize;

        if len > limits.max_section_len {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::SectionLength,
                limit: limits.max_section_len,
                actual: len,
            });
        }
        let end = offset.saturating_add(len);
        if end > payload.len() {
            return Err(DecodeError::SectionFraming(
                SectionFramingError::Truncated {
                    needed: end,
                    available: payload.len(),
                },
            ));
        }

        sections.push(WireSection {
            tag,
            body: &payload[offset..end],
        });
        offset = end;
    }

    Ok(sections)
}

/// Appends an encoded frame header to `out`.
pub fn encode_header(header: &FrameHeader, out: &mut Vec<u8>) -> Result<usize, EncodeError> {
    if !header.flags.is_valid() {
        return Err(EncodeError::InvalidFlags {
            flags: header.flags.raw(),
        });
    }

    out.push(header.flags.raw());
    out.extend_from_slice(&header.region_x.to_le_bytes());
    out.extend_from_slice(&header.region_y.to_le_bytes());
    if header.flags.is_full() {
        out.extend_from_slice(&header.protocol_hash.to_le_bytes());
    }
    Ok(header.encoded_len())
}

/// Appends a single tagged, length-prefixed section to `out`.
pub fn encode_section(tag: SectionTag, body: &[u8], out: &mut Vec<u8>) -> Result<usize, EncodeError> {
    let len_u32 = u32::try_from(body.len())
        .map_err(|_| EncodeError::LengthOverflow { length: body.len() })?;
    let start = out.len();
    out.push(tag as u8);
    write_varu32(len_u32, out);
    out.extend_from_slice(body);
    Ok(out.len() - start)
}

fn read_varu32(buf: &[u8], mut offset: usize) -> Result<(u32, usize), DecodeError> {
    let mut value = 0u32;
    let mut shift = 0u32;
    for _ in 0..5 {
        if offset >= buf.len() {
            return Err(DecodeError::SectionFraming(
                SectionFramingError::Truncated {
                    needed: offset + 1,
                    available: buf.len(),
                },
            ));
        }
        let byte = buf[offset];
        offset += 1;
        if shift == 28 && byte > 0x0F {
            break;
        }
        value |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, offset));
        }
        shift += 7;
    }
    Err(DecodeError::SectionFraming(
        SectionFramingError::InvalidVarint,
    ))
}

fn write_varu32(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}
