use std::fmt::Write as _;

use anyhow::{Context, Result};
use codec::{decode_frame_from_wire, CodecLimits, FrameKind, FrameMessage, RegionCoord};
use quant::UpdateFlags;
use wire::{Limits, SectionTag};

/// Structure and size breakdown of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub region: RegionCoord,
    pub kind: FrameKind,
    pub protocol_hash: Option<u64>,
    pub header_bytes: usize,
    pub total_bytes: usize,
    pub sections: Vec<SectionReport>,
    /// Number of update records carrying each field group, in wire order.
    pub groups: Vec<(&'static str, usize)>,
    pub region_switches: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub tag: SectionTag,
    /// Body length, excluding the tag and length prefix.
    pub byte_len: usize,
    /// Elements in the section; `None` for the tile grid.
    pub count: Option<usize>,
}

/// Decodes `bytes` fully and reports its layout.
pub fn inspect_frame(bytes: &[u8], wire_limits: &Limits, limits: &CodecLimits) -> Result<InspectReport> {
    let frame = wire::decode_frame(bytes, wire_limits).context("decode wire frame")?;
    let message = decode_frame_from_wire(&frame, limits).context("decode frame contents")?;

    let sections = frame
        .sections
        .iter()
        .map(|section| SectionReport {
            tag: section.tag,
            byte_len: section.body.len(),
            count: section_count(section.tag, &message),
        })
        .collect();

    let groups = UpdateFlags::GROUPS
        .iter()
        .map(|&bit| {
            let count = message
                .updates
                .iter()
                .filter(|update| update.flags().contains(bit))
                .count();
            (group_name(bit), count)
        })
        .collect();

    let region_switches = message
        .updates
        .iter()
        .filter(|update| update.changes.switch_region())
        .count();

    Ok(InspectReport {
        region: message.region,
        kind: message.kind,
        protocol_hash: frame
            .header
            .flags
            .is_full()
            .then_some(frame.header.protocol_hash),
        header_bytes: frame.header.encoded_len(),
        total_bytes: bytes.len(),
        sections,
        groups,
        region_switches,
    })
}

fn section_count(tag: SectionTag, message: &FrameMessage) -> Option<usize> {
    match tag {
        SectionTag::Removes => Some(message.removes.len()),
        SectionTag::Tiles => Some(message.tiles.len()),
        SectionTag::Updates => Some(message.updates.len()),
        _ => None,
    }
}

fn group_name(bit: u16) -> &'static str {
    match bit {
        UpdateFlags::POSITION => "position",
        UpdateFlags::STATE => "state",
        UpdateFlags::EXPRESSION => "expression",
        UpdateFlags::TYPE => "type",
        UpdateFlags::OPTIONS => "options",
        UpdateFlags::INFO => "info",
        UpdateFlags::ACTION => "action",
        UpdateFlags::NAME => "name",
        _ => "unknown",
    }
}

/// Renders a report the way `inspect` prints it.
pub fn format_inspect(report: &InspectReport) -> String {
    let mut out = String::new();
    let kind = match report.kind {
        FrameKind::Full => "full",
        FrameKind::Incremental => "incremental",
    };
    let _ = writeln!(
        out,
        "region: {} kind: {kind} total: {} bytes (header {})",
        report.region, report.total_bytes, report.header_bytes
    );
    if let Some(hash) = report.protocol_hash {
        let _ = writeln!(out, "protocol_hash: 0x{hash:016x}");
    }
    let _ = writeln!(out, "sections:");
    for section in &report.sections {
        let count = section
            .count
            .map_or_else(|| "grid".to_string(), |count| format!("{count} entries"));
        let _ = writeln!(
            out,
            "  {:?}: {count} ({} bytes)",
            section.tag, section.byte_len
        );
    }
    if report.groups.iter().any(|(_, count)| *count > 0) {
        let _ = writeln!(out, "field groups:");
        for (name, count) in report.groups.iter().filter(|(_, count)| *count > 0) {
            let _ = writeln!(out, "  {name}: {count}");
        }
    }
    if report.region_switches > 0 {
        let _ = writeln!(out, "region switches: {}", report.region_switches);
    }
    out
}
