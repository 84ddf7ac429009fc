//! Schema migration command

use super::{emit, read};
use anyhow::{Context, Result};
use diorama_snapshot::{from_json, to_json_pretty};

pub fn run(snapshot: &str, out: Option<&str>) -> Result<()> {
    let content = read(snapshot)?;
    let upgraded = from_json(&content).with_context(|| format!("failed to migrate {}", snapshot))?;
    emit(&to_json_pretty(&upgraded)?, out)
}
