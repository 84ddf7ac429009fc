//! Snapshot capture command

use super::emit;
use anyhow::{Context, Result};
use diorama_catalog::Catalogs;
use diorama_reconcile::{CaptureEngine, EnvironmentApplier};
use diorama_runtime::DioramaConfig;
use diorama_scene::load_scene;
use diorama_snapshot::to_json_pretty;

pub struct CaptureArgs {
    pub scene: String,
    pub catalog: String,
    pub name: Option<String>,
    pub out: Option<String>,
}

pub fn run(args: CaptureArgs) -> Result<()> {
    let config = DioramaConfig::load()?;
    let catalogs = Catalogs::load_from_file(&args.catalog)?;
    let (world, authored) = load_scene(&args.scene, &catalogs.materials)
        .with_context(|| format!("failed to load scene {}", args.scene))?;

    let environment = EnvironmentApplier::new(catalogs.materials.clone())
        .with_default(config.default_environment.clone());
    let engine = CaptureEngine::new(catalogs.materials.clone(), environment)
        .with_app_version(config.app_version.clone())
        .with_scene_base_id(config.scene_base_id.clone());

    let name = args.name.unwrap_or(authored.scene.name);
    let snapshot = engine.capture(&world, &name);
    emit(&to_json_pretty(&snapshot)?, args.out.as_deref())
}
