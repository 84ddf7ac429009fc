//! Diorama CLI - Capture, apply and migrate scene snapshots

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{apply, artworks, capture, inspect, migrate, scene};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "diorama")]
#[command(about = "Capture and restore 3D scene snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Log per-object detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture an authored scene into a snapshot
    Capture {
        /// Path to scene file
        #[arg(long)]
        scene: String,

        /// Path to catalog file
        #[arg(long)]
        catalog: String,

        /// Snapshot name (defaults to the scene name)
        #[arg(long)]
        name: Option<String>,

        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Apply a snapshot to an authored scene and report what changed
    Apply {
        /// Snapshot file
        snapshot: String,

        /// Path to scene file
        #[arg(long)]
        scene: String,

        /// Path to catalog file
        #[arg(long)]
        catalog: String,

        /// Write a capture of the resulting scene here
        #[arg(short, long)]
        out: Option<String>,

        /// Report format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Upgrade a snapshot to the current schema
    Migrate {
        /// Snapshot file
        snapshot: String,

        /// Write the upgraded snapshot here instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Summarize a snapshot
    Inspect {
        /// Snapshot file
        snapshot: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Authored scene operations
    #[command(subcommand)]
    Scene(scene::SceneCommands),

    /// Merge a list of selected artworks into a snapshot
    Artworks {
        /// Snapshot file, updated in place unless --out is given
        snapshot: String,

        /// JSON array of { id, title, description, imageUrl }
        #[arg(long)]
        selection: String,

        /// Frame ids in selection order (comma-separated)
        #[arg(long, value_delimiter = ',')]
        frames: Vec<String>,

        /// Keep artworks already in the snapshot
        #[arg(long)]
        keep_existing: bool,

        #[arg(short, long)]
        out: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Capture {
            scene,
            catalog,
            name,
            out,
        } => capture::run(capture::CaptureArgs {
            scene,
            catalog,
            name,
            out,
        }),
        Commands::Apply {
            snapshot,
            scene,
            catalog,
            out,
            format,
        } => apply::run(apply::ApplyArgs {
            snapshot,
            scene,
            catalog,
            out,
            format,
        }),
        Commands::Migrate { snapshot, out } => migrate::run(&snapshot, out.as_deref()),
        Commands::Inspect { snapshot, format } => inspect::run(&snapshot, &format),
        Commands::Scene(cmd) => scene::run(cmd),
        Commands::Artworks {
            snapshot,
            selection,
            frames,
            keep_existing,
            out,
        } => artworks::run(artworks::ArtworksArgs {
            snapshot,
            selection,
            frames,
            keep_existing,
            out,
        }),
    }
}
