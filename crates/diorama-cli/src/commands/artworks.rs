//! Artwork selection merge command

use super::{emit, read};
use anyhow::{Context, Result};
use diorama_core::ObjectId;
use diorama_runtime::{merge_selected_artworks, ordered_resolver};
use diorama_snapshot::{from_json, to_json_pretty};

pub struct ArtworksArgs {
    pub snapshot: String,
    pub selection: String,
    pub frames: Vec<String>,
    pub keep_existing: bool,
    pub out: Option<String>,
}

pub fn run(args: ArtworksArgs) -> Result<()> {
    let mut snapshot = from_json(&read(&args.snapshot)?)
        .with_context(|| format!("failed to read {}", args.snapshot))?;
    let selection = read(&args.selection)?;
    let frames: Vec<ObjectId> = args
        .frames
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(ObjectId::from)
        .collect();

    let merged = merge_selected_artworks(
        &mut snapshot,
        &selection,
        ordered_resolver(&frames),
        !args.keep_existing,
    )?;
    for meta in &merged {
        eprintln!(
            "  {} <- {} ({})",
            meta.object_id,
            meta.title.as_deref().unwrap_or("untitled"),
            meta.source_id
        );
    }

    let out = args.out.as_deref().unwrap_or(&args.snapshot);
    emit(&to_json_pretty(&snapshot)?, Some(out))
}
