//! Snapshot apply command

use super::{emit, read};
use anyhow::{Context, Result};
use diorama_catalog::Catalogs;
use diorama_reconcile::{ApplyReport, EnvironmentChange};
use diorama_runtime::{DioramaConfig, Session};
use diorama_scene::load_scene;
use diorama_snapshot::to_json_pretty;

pub struct ApplyArgs {
    pub snapshot: String,
    pub scene: String,
    pub catalog: String,
    pub out: Option<String>,
    pub format: String,
}

pub fn run(args: ApplyArgs) -> Result<()> {
    let config = DioramaConfig::load()?;
    let catalogs = Catalogs::load_from_file(&args.catalog)?;
    let (world, authored) = load_scene(&args.scene, &catalogs.materials)
        .with_context(|| format!("failed to load scene {}", args.scene))?;
    let json = read(&args.snapshot)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let mut session = Session::new(world, catalogs, config);

    let (report, images) = runtime.block_on(async {
        let applied = session
            .apply_json(&json)
            .with_context(|| format!("failed to apply {}", args.snapshot))?;
        let report = applied.report.clone();
        let images = applied.images_loaded().await;
        anyhow::Ok((report, images))
    })?;

    if args.format == "json" {
        print_report_json(&report, images.failed.len());
    } else {
        print_report_text(&report);
        println!(
            "  images: {} applied ({} downloaded), {} failed",
            images.applied.len(),
            images.fetched,
            images.failed.len()
        );
        for failure in &images.failed {
            println!("    {} <- {}: {}", failure.object_id, failure.url, failure.reason);
        }
    }

    if let Some(out) = args.out.as_deref() {
        let snapshot = session.capture(&authored.scene.name);
        emit(&to_json_pretty(&snapshot)?, Some(out))?;
    }
    Ok(())
}

fn print_report_text(report: &ApplyReport) {
    println!(
        "Applied (schema v{}): {} spawned, {} despawned, {} updated, {} unchanged",
        report.source_schema,
        report.spawned.len(),
        report.despawned.len(),
        report.updated.len(),
        report.unchanged
    );
    for id in &report.spawned {
        println!("  + {}", id);
    }
    for id in &report.despawned {
        println!("  - {}", id);
    }
    for id in &report.updated {
        println!("  ~ {}", id);
    }
    match &report.environment {
        EnvironmentChange::Unchanged => {}
        EnvironmentChange::Applied { material_id } => println!("  skybox: {}", material_id),
        EnvironmentChange::FellBack { requested, applied } => {
            println!("  skybox: {} (requested {})", applied, requested)
        }
        EnvironmentChange::Unresolved { requested } => {
            println!("  skybox: unchanged ({} unknown)", requested)
        }
    }
    if !report.warnings.is_empty() {
        println!("\n{} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [WARN ] {}", warning);
        }
    }
}

fn print_report_json(report: &ApplyReport, image_failures: usize) {
    let ids = |ids: &[diorama_core::ObjectId]| -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    };
    let output = serde_json::json!({
        "source_schema": report.source_schema,
        "spawned": ids(&report.spawned),
        "despawned": ids(&report.despawned),
        "updated": ids(&report.updated),
        "unchanged": report.unchanged,
        "bindings": report.bindings,
        "image_failures": image_failures,
        "warnings": report.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to render report: {}", e),
    }
}
