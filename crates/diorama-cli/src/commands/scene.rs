//! Authored scene commands

use super::read;
use anyhow::{Context, Result};
use clap::Subcommand;
use diorama_scene::{save_scene, AuthoredScene};
use std::fs;
use std::path::Path;

#[derive(Subcommand)]
pub enum SceneCommands {
    /// Create a new scene file
    Create {
        /// Path to scene file
        path: String,

        /// Scene name (defaults to filename)
        #[arg(long)]
        name: Option<String>,
    },

    /// Give every object a stable id and save the file
    AssignIds {
        /// Path to scene file
        path: String,
    },

    /// Show scene information
    Info {
        /// Path to scene file
        path: String,
    },
}

pub fn run(cmd: SceneCommands) -> Result<()> {
    match cmd {
        SceneCommands::Create { path, name } => create(&path, name.as_deref()),
        SceneCommands::AssignIds { path } => assign_ids(&path),
        SceneCommands::Info { path } => info(&path),
    }
}

fn parse(path: &str) -> Result<AuthoredScene> {
    toml::from_str(&read(path)?).with_context(|| format!("failed to parse scene {}", path))
}

fn create(path: &str, name: Option<&str>) -> Result<()> {
    let path = if path.ends_with(".toml") {
        path.to_string()
    } else {
        format!("{}.scene.toml", path)
    };

    if Path::new(&path).exists() {
        anyhow::bail!("Scene file already exists: {}", path);
    }

    let scene_name = name.map(String::from).unwrap_or_else(|| {
        Path::new(&path)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_end_matches(".scene"))
            .unwrap_or("Untitled")
            .to_string()
    });

    if let Some(parent) = Path::new(&path).parent() {
        fs::create_dir_all(parent)?;
    }
    save_scene(&path, &AuthoredScene::new(scene_name))?;

    println!("Created scene: {}", path);
    Ok(())
}

fn assign_ids(path: &str) -> Result<()> {
    let mut scene = parse(path)?;
    let changed = scene.assign_ids();
    if changed == 0 {
        println!("All objects already have ids.");
        return Ok(());
    }
    save_scene(path, &scene)?;
    println!("Updated {} object id(s) in {}", changed, path);
    Ok(())
}

fn info(path: &str) -> Result<()> {
    let scene = parse(path)?;

    println!("Scene: {}", scene.scene.name);
    if let Some(description) = &scene.scene.description {
        println!("  {}", description);
    }
    println!("Objects: {}", scene.objects.len());
    for (key, object) in &scene.objects {
        let id = object
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(no id)".to_string());
        let mut tags = Vec::new();
        if object.prototype {
            tags.push("prototype");
        }
        if object.image_surface {
            tags.push("image");
        }
        if !object.active {
            tags.push("inactive");
        }
        println!(
            "  {:<20} {:<34} {:?} {}{}",
            key,
            id,
            object.position,
            object.material.as_deref().unwrap_or("-"),
            if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            }
        );
    }
    Ok(())
}
