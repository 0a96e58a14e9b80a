//! Frame encoding.

use bitstream::BitWriter;
use quant::protocol_hash;
use tracing::{debug, trace};
use wire::{encode_header, encode_section, FrameHeader, SectionTag};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::record::{write_update, EntityUpdate};
use crate::region::Region;
use crate::tiles::compress;
use crate::types::{EntityId, TileEdit};
use crate::visibility::{visible_entities, Viewer};

/// Encodes the region's pending changes as an incremental frame.
///
/// Removes, Tiles and Updates are always written, empty ones as a zero
/// count, so a frame cut at a section boundary cannot pass as complete. The
/// output is the same for every subscriber, so callers encode once per
/// region per tick. Any error aborts the whole frame.
pub fn encode_incremental(region: &Region, limits: &CodecLimits) -> CodecResult<Vec<u8>> {
    let coord = region.coord();
    let removes = region.pending_removes();
    let tiles = region.pending_tile_edits();
    let updates = region.pending_updates();

    check_count(LimitKind::Removes, limits.max_removes, removes.len())?;
    check_count(LimitKind::TileEdits, limits.max_tile_edits, tiles.len())?;
    check_count(LimitKind::Updates, limits.max_updates, updates.len())?;

    let mut out = Vec::new();
    encode_header(&FrameHeader::incremental(coord.x, coord.y), &mut out)?;

    write_section(SectionTag::Removes, limits, &mut out, |writer| {
        write_removes(removes, writer)
    })?;
    write_section(SectionTag::Tiles, limits, &mut out, |writer| {
        write_tile_edits(tiles, writer)
    })?;
    write_section(SectionTag::Updates, limits, &mut out, |writer| {
        writer.write_varu32(updates.len() as u32)?;
        updates
            .iter()
            .try_for_each(|update| write_update(update, limits, writer))
    })?;

    trace!(
        region = %coord,
        bytes = out.len(),
        removes = removes.len(),
        tiles = tiles.len(),
        updates = updates.len(),
        "encoded incremental frame"
    );
    Ok(out)
}

/// Encodes every entity `viewer` may see, with every field group, plus the
/// compressed tile grid. Both sections are always written.
pub fn encode_full(region: &Region, viewer: &Viewer, limits: &CodecLimits) -> CodecResult<Vec<u8>> {
    let coord = region.coord();
    let count = visible_entities(region, viewer).count();
    check_count(LimitKind::Updates, limits.max_updates, count)?;

    let mut out = Vec::new();
    encode_header(
        &FrameHeader::full(coord.x, coord.y, protocol_hash()),
        &mut out,
    )?;

    let tile_data = compress(region.tiles())?;
    check_count(LimitKind::SectionBytes, limits.max_section_bytes, tile_data.len())?;
    encode_section(SectionTag::TileData, &tile_data, &mut out)?;

    write_section(SectionTag::Updates, limits, &mut out, |writer| {
        writer.write_varu32(count as u32)?;
        visible_entities(region, viewer).try_for_each(|entity| {
            let update = EntityUpdate::new(entity.id, entity.full_changes());
            write_update(&update, limits, writer)
        })
    })?;

    debug!(
        region = %coord,
        viewer = viewer.account.raw(),
        bytes = out.len(),
        entities = count,
        hidden = region.entities().len() - count,
        "encoded full frame"
    );
    Ok(out)
}

fn write_section<F>(
    tag: SectionTag,
    limits: &CodecLimits,
    out: &mut Vec<u8>,
    write_body: F,
) -> CodecResult<()>
where
    F: FnOnce(&mut BitWriter) -> CodecResult<()>,
{
    let mut writer = BitWriter::new();
    write_body(&mut writer)?;
    let body = writer.finish();
    check_count(LimitKind::SectionBytes, limits.max_section_bytes, body.len())?;
    encode_section(tag, &body, out)?;
    Ok(())
}

fn write_removes(removes: &[EntityId], writer: &mut BitWriter) -> CodecResult<()> {
    writer.write_varu32(removes.len() as u32)?;
    for id in removes {
        writer.write_varu32(id.raw())?;
    }
    Ok(())
}

fn write_tile_edits(edits: &[TileEdit], writer: &mut BitWriter) -> CodecResult<()> {
    writer.write_varu32(edits.len() as u32)?;
    for edit in edits {
        writer.write_u8_aligned(edit.x)?;
        writer.write_u8_aligned(edit.y)?;
        writer.write_u8_aligned(edit.tile.0)?;
    }
    Ok(())
}

pub(crate) const fn check_count(kind: LimitKind, limit: usize, actual: usize) -> CodecResult<()> {
    if actual > limit {
        return Err(CodecError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}
