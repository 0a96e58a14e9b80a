//! Frame decoding.
//!
//! Decoding is strict: each frame kind carries a fixed section sequence
//! (incremental: Removes, Tiles, Updates; full: TileData, Updates), and
//! missing, extra, repeated or reordered sections, counts over the
//! configured limits, trailing bits and out-of-range values all reject the
//! whole frame. Since every section is always present, a frame cut at any
//! byte fails to decode.

use std::collections::HashSet;

use bitstream::BitReader;
use quant::{protocol_hash, UpdateFlags};
use tracing::trace;
use wire::{Limits, SectionTag, WireFrame};

use crate::encode::check_count;
use crate::error::{CodecError, CodecResult, LimitKind, TileError};
use crate::limits::CodecLimits;
use crate::message::{FrameKind, FrameMessage};
use crate::record::{read_update, EntityUpdate};
use crate::tiles::{decompress, in_bounds, TileType};
use crate::types::{EntityId, RegionCoord, TileEdit};

/// Smallest possible update record: flags plus a one-byte id.
const MIN_RECORD_BYTES: usize = 3;

const INCREMENTAL_SECTIONS: [SectionTag; 3] =
    [SectionTag::Removes, SectionTag::Tiles, SectionTag::Updates];
const FULL_SECTIONS: [SectionTag; 2] = [SectionTag::TileData, SectionTag::Updates];

/// Decodes a frame from raw bytes.
pub fn decode_frame(
    bytes: &[u8],
    wire_limits: &Limits,
    limits: &CodecLimits,
) -> CodecResult<FrameMessage> {
    let frame = wire::decode_frame(bytes, wire_limits)?;
    decode_frame_from_wire(&frame, limits)
}

/// Decodes a frame that has already been split into sections.
pub fn decode_frame_from_wire(
    frame: &WireFrame<'_>,
    limits: &CodecLimits,
) -> CodecResult<FrameMessage> {
    let header = frame.header;
    let kind = if header.flags.is_full() {
        FrameKind::Full
    } else {
        FrameKind::Incremental
    };

    if kind == FrameKind::Full {
        let expected = protocol_hash();
        if header.protocol_hash != expected {
            return Err(CodecError::ProtocolMismatch {
                expected,
                found: header.protocol_hash,
            });
        }
    }

    check_section_layout(kind, frame)?;

    let mut message = FrameMessage::new(RegionCoord::new(header.region_x, header.region_y), kind);
    for section in &frame.sections {
        check_count(
            LimitKind::SectionBytes,
            limits.max_section_bytes,
            section.body.len(),
        )?;

        match section.tag {
            SectionTag::Removes => {
                message.removes = decode_removes(section.body, limits)?;
            }
            SectionTag::Tiles => {
                message.tiles = decode_tile_edits(section.body, limits)?;
            }
            SectionTag::TileData => {
                message.tile_data = Some(decompress(section.body)?);
            }
            SectionTag::Updates => {
                message.updates = decode_updates(section.body, kind, limits)?;
            }
            tag => return Err(CodecError::UnexpectedSection { section: tag }),
        }
    }

    trace!(
        region = %message.region,
        full = message.is_full(),
        removes = message.removes.len(),
        tiles = message.tiles.len(),
        updates = message.updates.len(),
        "decoded frame"
    );
    Ok(message)
}

/// Checks the section tags against the fixed sequence for `kind` before any
/// body is parsed.
fn check_section_layout(kind: FrameKind, frame: &WireFrame<'_>) -> CodecResult<()> {
    let expected: &[SectionTag] = match kind {
        FrameKind::Incremental => &INCREMENTAL_SECTIONS,
        FrameKind::Full => &FULL_SECTIONS,
    };

    let mut seen: Vec<SectionTag> = Vec::with_capacity(expected.len());
    for section in &frame.sections {
        if seen.contains(&section.tag) {
            return Err(CodecError::DuplicateSection {
                section: section.tag,
            });
        }
        if !expected.contains(&section.tag) {
            return Err(CodecError::UnexpectedSection {
                section: section.tag,
            });
        }
        seen.push(section.tag);
    }
    if let Some(&section) = expected.iter().find(|tag| !seen.contains(tag)) {
        return Err(CodecError::MissingSection { section });
    }
    if let Some((&section, _)) = seen.iter().zip(expected).find(|(found, want)| found != want) {
        return Err(CodecError::SectionOutOfOrder { section });
    }
    Ok(())
}

fn decode_removes(body: &[u8], limits: &CodecLimits) -> CodecResult<Vec<EntityId>> {
    let mut reader = BitReader::new(body);
    let count = reader.read_varu32()? as usize;
    check_count(LimitKind::Removes, limits.max_removes, count)?;

    let mut removes = Vec::with_capacity(count.min(body.len()));
    let mut seen = HashSet::with_capacity(count.min(body.len()));
    for _ in 0..count {
        let id = EntityId::new(reader.read_varu32()?);
        if !seen.insert(id) {
            return Err(CodecError::DuplicateEntity { id });
        }
        removes.push(id);
    }
    ensure_consumed(SectionTag::Removes, &reader)?;
    Ok(removes)
}

fn decode_tile_edits(body: &[u8], limits: &CodecLimits) -> CodecResult<Vec<TileEdit>> {
    let mut reader = BitReader::new(body);
    let count = reader.read_varu32()? as usize;
    check_count(LimitKind::TileEdits, limits.max_tile_edits, count)?;

    let mut edits = Vec::with_capacity(count.min(body.len() / 3));
    for _ in 0..count {
        let x = reader.read_u8_aligned()?;
        let y = reader.read_u8_aligned()?;
        let tile = TileType(reader.read_u8_aligned()?);
        if !in_bounds(x, y) {
            return Err(TileError::OutOfBounds { x, y }.into());
        }
        edits.push(TileEdit::new(x, y, tile));
    }
    ensure_consumed(SectionTag::Tiles, &reader)?;
    Ok(edits)
}

/// Full frames describe each entity completely, so their records must carry
/// every field group.
fn decode_updates(
    body: &[u8],
    kind: FrameKind,
    limits: &CodecLimits,
) -> CodecResult<Vec<EntityUpdate>> {
    let mut reader = BitReader::new(body);
    let count = reader.read_varu32()? as usize;
    check_count(LimitKind::Updates, limits.max_updates, count)?;

    let capacity = count.min(body.len() / MIN_RECORD_BYTES);
    let mut updates = Vec::with_capacity(capacity);
    let mut seen = HashSet::with_capacity(capacity);
    for _ in 0..count {
        let update = read_update(&mut reader, limits)?;
        if kind == FrameKind::Full && !update.flags().contains(UpdateFlags::ALL_GROUPS) {
            return Err(CodecError::IncompleteFullRecord { id: update.id });
        }
        if !seen.insert(update.id) {
            return Err(CodecError::DuplicateEntity { id: update.id });
        }
        updates.push(update);
    }
    ensure_consumed(SectionTag::Updates, &reader)?;
    Ok(updates)
}

fn ensure_consumed(section: SectionTag, reader: &BitReader<'_>) -> CodecResult<()> {
    let remaining_bits = reader.bits_remaining();
    if remaining_bits != 0 {
        return Err(CodecError::TrailingSectionData {
            section,
            remaining_bits,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_full, encode_incremental};
    use crate::entity::Entity;
    use crate::record::FieldChanges;
    use crate::region::Region;
    use crate::tiles::TileGrid;
    use crate::visibility::Viewer;
    use quant::{Identity, Motion};
    use wire::{encode_header, encode_section, FrameHeader};

    fn limits() -> CodecLimits {
        CodecLimits::for_testing()
    }

    fn decode(bytes: &[u8]) -> CodecResult<FrameMessage> {
        decode_frame(bytes, &Limits::for_testing(), &limits())
    }

    const EMPTY: &[u8] = &[0];
    const UNIFORM_TILES: &[u8] = &[1, 64, 0];

    /// An incremental frame with `section` in place of its empty counterpart.
    fn incremental_replacing(section: (SectionTag, &[u8])) -> Vec<u8> {
        let sections: Vec<(SectionTag, &[u8])> = INCREMENTAL_SECTIONS
            .iter()
            .map(|&tag| if tag == section.0 { section } else { (tag, EMPTY) })
            .collect();
        incremental_with(&sections)
    }

    fn incremental_with(sections: &[(SectionTag, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_header(&FrameHeader::incremental(0, 0), &mut out).unwrap();
        for (tag, body) in sections {
            encode_section(*tag, body, &mut out).unwrap();
        }
        out
    }

    fn full_with(hash: u64, sections: &[(SectionTag, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_header(&FrameHeader::full(0, 0, hash), &mut out).unwrap();
        for (tag, body) in sections {
            encode_section(*tag, body, &mut out).unwrap();
        }
        out
    }

    #[test]
    fn empty_incremental_decodes_empty() {
        let bytes = incremental_with(&[
            (SectionTag::Removes, EMPTY),
            (SectionTag::Tiles, EMPTY),
            (SectionTag::Updates, EMPTY),
        ]);
        let message = decode(&bytes).unwrap();
        assert_eq!(message.kind, FrameKind::Incremental);
        assert!(message.is_empty());
    }

    #[test]
    fn incremental_roundtrip() {
        let mut region = Region::new(RegionCoord::new(-3, 7));
        region.queue_removal(EntityId::new(9));
        region.queue_tile_change(7, 7, TileType(2)).unwrap();
        region
            .queue_update(EntityUpdate::new(
                EntityId::new(4),
                FieldChanges::new().with_motion(Motion::new(1.5, -2.0, 0.25, -0.5)),
            ))
            .unwrap();

        let bytes = encode_incremental(&region, &limits()).unwrap();
        let message = decode(&bytes).unwrap();
        assert_eq!(message.region, RegionCoord::new(-3, 7));
        assert_eq!(message.removes, region.pending_removes());
        assert_eq!(message.tiles, region.pending_tile_edits());
        assert_eq!(message.updates, region.pending_updates());
        assert!(message.tile_data.is_none());
    }

    #[test]
    fn full_roundtrip() {
        let mut grid = TileGrid::default();
        grid.set(3, 4, TileType(6)).unwrap();
        let mut region = Region::with_tiles(RegionCoord::new(2, 2), grid.clone());
        region.insert_entity(Entity::new(EntityId::new(1), Identity::new(5, 1)));

        let bytes = encode_full(&region, &Viewer::default(), &limits()).unwrap();
        let message = decode(&bytes).unwrap();
        assert!(message.is_full());
        assert_eq!(message.tile_data, Some(grid));
        assert_eq!(message.updates.len(), 1);
        assert_eq!(
            message.updates[0].changes,
            region.entities()[0].full_changes()
        );
    }

    #[test]
    fn protocol_mismatch_rejected() {
        let bytes = full_with(
            protocol_hash() ^ 1,
            &[(SectionTag::TileData, UNIFORM_TILES), (SectionTag::Updates, EMPTY)],
        );
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::ProtocolMismatch { .. }));
    }

    #[test]
    fn full_frame_requires_tile_data() {
        let bytes = full_with(protocol_hash(), &[(SectionTag::Updates, EMPTY)]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::MissingSection {
                section: SectionTag::TileData
            }
        );
    }

    #[test]
    fn full_frame_requires_updates() {
        let bytes = full_with(protocol_hash(), &[(SectionTag::TileData, UNIFORM_TILES)]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::MissingSection {
                section: SectionTag::Updates
            }
        );
    }

    #[test]
    fn incremental_requires_every_section() {
        let bytes = incremental_with(&[(SectionTag::Removes, &[1, 5]), (SectionTag::Tiles, EMPTY)]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::MissingSection {
                section: SectionTag::Updates
            }
        );
        assert_eq!(
            decode(&incremental_with(&[])).unwrap_err(),
            CodecError::MissingSection {
                section: SectionTag::Removes
            }
        );
    }

    #[test]
    fn sections_out_of_order_rejected() {
        let bytes = incremental_with(&[
            (SectionTag::Tiles, EMPTY),
            (SectionTag::Removes, EMPTY),
            (SectionTag::Updates, EMPTY),
        ]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::SectionOutOfOrder {
                section: SectionTag::Tiles
            }
        );
    }

    #[test]
    fn full_record_missing_groups_rejected() {
        let record = EntityUpdate::new(
            EntityId::new(7),
            FieldChanges::new().with_motion(Motion::at(1.0, 2.0)),
        );
        let mut writer = bitstream::BitWriter::new();
        writer.write_varu32(1).unwrap();
        crate::record::write_update(&record, &limits(), &mut writer).unwrap();
        let body = writer.finish();

        let bytes = full_with(
            protocol_hash(),
            &[(SectionTag::TileData, UNIFORM_TILES), (SectionTag::Updates, &body)],
        );
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::IncompleteFullRecord {
                id: EntityId::new(7)
            }
        );

        let bytes = incremental_replacing((SectionTag::Updates, &body));
        assert_eq!(decode(&bytes).unwrap().updates, vec![record]);
    }

    #[test]
    fn full_frame_rejects_removes() {
        let bytes = full_with(
            protocol_hash(),
            &[
                (SectionTag::TileData, UNIFORM_TILES),
                (SectionTag::Removes, EMPTY),
                (SectionTag::Updates, EMPTY),
            ],
        );
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::UnexpectedSection {
                section: SectionTag::Removes
            }
        );
    }

    #[test]
    fn incremental_rejects_tile_data() {
        let bytes = incremental_with(&[
            (SectionTag::Removes, EMPTY),
            (SectionTag::TileData, UNIFORM_TILES),
            (SectionTag::Tiles, EMPTY),
            (SectionTag::Updates, EMPTY),
        ]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::UnexpectedSection {
                section: SectionTag::TileData
            }
        );
    }

    #[test]
    fn duplicate_section_rejected() {
        let bytes = incremental_with(&[(SectionTag::Removes, EMPTY), (SectionTag::Removes, EMPTY)]);
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::DuplicateSection {
                section: SectionTag::Removes
            }
        );
    }

    #[test]
    fn trailing_bytes_rejected() {
        let bytes = incremental_replacing((SectionTag::Removes, &[1, 5, 0]));
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::TrailingSectionData {
                section: SectionTag::Removes,
                remaining_bits: 8
            }
        );
    }

    #[test]
    fn remove_count_over_limit_rejected() {
        let bytes = incremental_replacing((SectionTag::Removes, &[33]));
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            CodecError::LimitsExceeded {
                kind: LimitKind::Removes,
                limit: 32,
                actual: 33
            }
        ));
    }

    #[test]
    fn huge_count_with_unlimited_limits_fails_cleanly() {
        let bytes = incremental_replacing((SectionTag::Updates, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]));
        let err = decode_frame(&bytes, &Limits::unlimited(), &CodecLimits::unlimited()).unwrap_err();
        assert!(matches!(err, CodecError::Bitstream(_)));
    }

    #[test]
    fn duplicate_remove_rejected() {
        let bytes = incremental_replacing((SectionTag::Removes, &[2, 5, 5]));
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::DuplicateEntity {
                id: EntityId::new(5)
            }
        );
    }

    #[test]
    fn tile_edit_out_of_bounds_rejected() {
        let bytes = incremental_replacing((SectionTag::Tiles, &[1, 8, 0, 1]));
        assert_eq!(
            decode(&bytes).unwrap_err(),
            CodecError::Tile(TileError::OutOfBounds { x: 8, y: 0 })
        );
    }

    #[test]
    fn section_byte_limit_checked_before_parsing() {
        let body = vec![0u8; 100];
        let bytes = incremental_replacing((SectionTag::Updates, &body));
        let tight = CodecLimits {
            max_section_bytes: 50,
            ..limits()
        };
        let err = decode_frame(&bytes, &Limits::for_testing(), &tight).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::SectionBytes,
                ..
            }
        ));
    }
}
