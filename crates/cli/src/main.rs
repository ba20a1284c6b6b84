//! Engagement Pivot - Main Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pivot_cli::{build_engine, init_logging, load_config, run_analysis};
use tracing::info;
use video_frame::ImageSequence;

/// Exam hall engagement analysis
#[derive(Parser, Debug)]
#[command(name = "engagement-pivot")]
#[command(about = "Scores exam hall engagement from recorded frames and recommends interventions")]
#[command(version)]
struct Args {
    /// Configuration file (TOML, JSON or YAML); `PIVOT__*` variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a recording supplied as a directory of still frames
    Analyze {
        /// Directory of frames, read in lexical order
        #[arg(long)]
        frames: PathBuf,

        /// Frame rate of the recording
        #[arg(long, default_value = "25")]
        fps: f64,

        /// Write annotated frames here
        #[arg(long)]
        annotate_dir: Option<PathBuf>,

        /// Sensitivity override (1-10)
        #[arg(long)]
        sensitivity: Option<u8>,

        /// Frame skip override (1-5)
        #[arg(long)]
        frame_skip: Option<u32>,

        /// Keep going without face/eye models (every frame scores as empty)
        #[arg(long)]
        allow_no_detector: bool,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json)?;

    info!("=== Engagement Pivot v{} ===", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Analyze {
            frames,
            fps,
            annotate_dir,
            sensitivity,
            frame_skip,
            allow_no_detector,
        } => {
            if let Some(sensitivity) = sensitivity {
                config.sensitivity = sensitivity;
            }
            if let Some(frame_skip) = frame_skip {
                config.frame_skip = frame_skip;
            }
            config.validate().context("invalid command-line override")?;

            let sequence = ImageSequence::open(&frames, fps)
                .with_context(|| format!("opening frames in {}", frames.display()))?;
            let engine = build_engine(config, allow_no_detector)?;

            let output = run_analysis(engine, sequence, annotate_dir).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
