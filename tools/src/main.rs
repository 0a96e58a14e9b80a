use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{CodecLimits, FrameKind};
use glob::Pattern;
use regionsync_tools::{
    decode_frame_json, format_decode_pretty, format_inspect, inspect_frame, load_limits,
    run_simulation, SimConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "regionsync-tools",
    version,
    about = "regionsync inspection, decoding and capture tools"
)]
struct Cli {
    /// Codec limits JSON; missing keys keep their defaults.
    #[arg(long, global = true)]
    limits: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect frame structure and sizes.
    Inspect {
        /// Path to a frame file or a directory of captures.
        frame_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected frames.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected frames (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a frame into structured JSON.
    Decode {
        /// Path to the frame bytes.
        frame_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Run the deterministic simulation and capture every frame it serves.
    Simulate {
        #[arg(long, default_value_t = 32)]
        entities: u32,
        #[arg(long, default_value_t = 4)]
        clients: u32,
        #[arg(long, default_value_t = 120)]
        ticks: u32,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value_t = 2)]
        regions_per_side: i16,
        /// Directory receiving the frame captures and `summary.json`.
        #[arg(long, default_value = "captures")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let limits = match &cli.limits {
        Some(path) => load_limits(path).context("load limits")?,
        None => CodecLimits::default(),
    };
    let wire_limits = wire::Limits::default();

    match cli.command {
        Command::Inspect {
            frame_path,
            glob,
            sort,
            limit,
        } => {
            if frame_path.is_dir() {
                let entries = collect_frame_entries(&frame_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read frame {}", entry.path.display()))?;
                    let report = inspect_frame(&bytes, &wire_limits, &limits)
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print!("{}", format_inspect(&report));
                }
            } else {
                let bytes = fs::read(&frame_path)
                    .with_context(|| format!("read frame {}", frame_path.display()))?;
                let report = inspect_frame(&bytes, &wire_limits, &limits)?;
                print!("{}", format_inspect(&report));
            }
        }
        Command::Decode { frame_file, format } => {
            let bytes = fs::read(&frame_file)
                .with_context(|| format!("read frame {}", frame_file.display()))?;
            let output = decode_frame_json(&bytes, &wire_limits, &limits)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&output));
                }
            }
        }
        Command::Simulate {
            entities,
            clients,
            ticks,
            seed,
            regions_per_side,
            out_dir,
        } => {
            let config = SimConfig {
                entities,
                clients,
                ticks,
                seed,
                regions_per_side,
            };
            simulate(&config, &limits, &wire_limits, &out_dir)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn simulate(
    config: &SimConfig,
    limits: &CodecLimits,
    wire_limits: &wire::Limits,
    out_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let summary = run_simulation(config, limits, wire_limits, |tick, frame| {
        let kind = match frame.kind {
            FrameKind::Full => "full",
            FrameKind::Incremental => "incr",
        };
        let name = format!(
            "tick_{tick:06}_client_{}_region_{}_{}_{kind}.bin",
            frame.client.0, frame.region.x, frame.region.y
        );
        let path = out_dir.join(name);
        fs::write(&path, &frame.bytes[..]).with_context(|| format!("write {}", path.display()))
    })?;

    let summary_path = out_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    fs::write(&summary_path, json)
        .with_context(|| format!("write {}", summary_path.display()))?;
    info!(
        full = summary.full_count,
        incremental = summary.incremental_count,
        p95 = summary.p95_incremental_bytes,
        out = %out_dir.display(),
        "simulation complete"
    );
    Ok(())
}

struct FrameEntry {
    path: PathBuf,
    size: u64,
}

fn collect_frame_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<FrameEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(FrameEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(mut entries: Vec<FrameEntry>, sort: Option<InspectSort>) -> Vec<FrameEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}
