//! Snapshot summary command

use super::read;
use anyhow::{Context, Result};
use diorama_snapshot::{from_json, Snapshot};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn run(path: &str, format: &str) -> Result<()> {
    let content = read(path)?;
    let source_schema = declared_schema(&content);
    let snapshot = from_json(&content).with_context(|| format!("failed to read {}", path))?;

    if format == "json" {
        print_json(&snapshot, source_schema)
    } else {
        print_text(&snapshot, source_schema);
        Ok(())
    }
}

/// Schema version as written in the document; absent means v1
fn declared_schema(content: &str) -> u64 {
    serde_json::from_str::<Value>(content)
        .ok()
        .and_then(|doc| {
            doc.get("schema_version")
                .or_else(|| doc.get("schemaVersion"))
                .and_then(Value::as_u64)
        })
        .unwrap_or(1)
}

fn template_counts(snapshot: &Snapshot) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for record in snapshot.objects.iter().filter(|r| !r.is_fixed()) {
        *counts.entry(record.template.as_str()).or_insert(0) += 1;
    }
    counts
}

fn print_text(snapshot: &Snapshot, source_schema: u64) {
    let fixed = snapshot.objects.iter().filter(|r| r.is_fixed()).count();

    println!("Snapshot: {}", snapshot.name);
    println!("  created:     {}", snapshot.created_at);
    if !snapshot.app_version.is_empty() {
        println!("  app version: {}", snapshot.app_version);
    }
    if !snapshot.scene_base_id.is_empty() {
        println!("  scene:       {}", snapshot.scene_base_id);
    }
    println!("  schema:      v{} (read as v{})", source_schema, snapshot.schema_version);
    println!(
        "  objects:     {} ({} fixed, {} spawned)",
        snapshot.objects.len(),
        fixed,
        snapshot.objects.len() - fixed
    );
    for (template, count) in template_counts(snapshot) {
        println!("    {:<20} x{}", template, count);
    }
    println!("  artworks:    {}", snapshot.artworks.len());
    match (snapshot.skybox_name(), snapshot.skybox_rotation()) {
        (Some(name), Some(rotation)) => println!("  skybox:      {} @ {}°", name, rotation),
        (Some(name), None) => println!("  skybox:      {}", name),
        (None, _) => println!("  skybox:      (none)"),
    }
    if !snapshot.extra.is_empty() {
        let keys: Vec<&str> = snapshot.extra.keys().map(String::as_str).collect();
        println!("  other keys:  {}", keys.join(", "));
    }
    println!("  fingerprint: {}", snapshot.fingerprint());
}

fn print_json(snapshot: &Snapshot, source_schema: u64) -> Result<()> {
    let fixed = snapshot.objects.iter().filter(|r| r.is_fixed()).count();
    let output = serde_json::json!({
        "name": snapshot.name,
        "created_at": snapshot.created_at,
        "app_version": snapshot.app_version,
        "scene_base_id": snapshot.scene_base_id,
        "source_schema": source_schema,
        "schema_version": snapshot.schema_version,
        "objects": snapshot.objects.len(),
        "fixed": fixed,
        "spawned": template_counts(snapshot),
        "artworks": snapshot.artworks.len(),
        "skybox": snapshot.skybox_name(),
        "skybox_rotation": snapshot.skybox_rotation(),
        "fingerprint": snapshot.fingerprint().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
