use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use codec::CodecLimits;

/// Parses codec limits from JSON. Missing keys keep their default values.
pub fn parse_limits(json: &str) -> Result<CodecLimits> {
    serde_json::from_str(json).context("parse limits json")
}

pub fn load_limits(path: &Path) -> Result<CodecLimits> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read limits {}", path.display()))?;
    parse_limits(&contents)
}
