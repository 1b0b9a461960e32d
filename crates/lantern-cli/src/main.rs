//! Lantern CLI - Command-line interface for the Lantern engine

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{effect, render, snapshot, validate};

#[derive(Parser)]
#[command(name = "lantern")]
#[command(about = "Scene-graph rendering engine tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scene file and report what it references
    Validate {
        /// Path to scene file
        scene: String,

        /// Asset files to load first (effects, materials, models)
        #[arg(long = "asset")]
        assets: Vec<String>,
    },

    /// Inspect an effect file
    Effect {
        /// Path to effect file
        path: String,
    },

    /// Run a scene headlessly and print per-frame draw statistics
    Render {
        /// Path to scene file
        scene: String,

        /// Asset files to load first
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Number of frames to run
        #[arg(long, default_value = "1")]
        frames: u32,

        /// Simulated frame duration in seconds
        #[arg(long, default_value = "0.016")]
        dt: f32,
    },

    /// Render one frame on the GPU and save it as a PNG
    Snapshot {
        /// Path to scene file
        scene: String,

        /// Asset files to load first
        #[arg(long = "asset")]
        assets: Vec<String>,

        /// Output image path
        #[arg(short, long, default_value = "snapshot.png")]
        output: String,

        /// Image width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "720")]
        height: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scene, assets } => validate::run(&scene, &assets),
        Commands::Effect { path } => effect::run(&path),
        Commands::Render {
            scene,
            assets,
            frames,
            dt,
        } => render::run(render::RenderArgs {
            scene,
            assets,
            frames,
            dt,
        }),
        Commands::Snapshot {
            scene,
            assets,
            output,
            width,
            height,
        } => snapshot::run(snapshot::SnapshotArgs {
            scene,
            assets,
            output,
            width,
            height,
        }),
    }
}
