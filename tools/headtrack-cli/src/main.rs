//! headtrack CLI: trajectory velocities, audio cues, and manual annotation.
//!
//! Usage:
//!   headtrack velocity <DIR>       Mean speed per segment across trial files
//!   headtrack cues <AUDIO>         Detect cue onsets in a soundtrack
//!   headtrack annotate [OPTIONS]   Mark head positions frame by frame
//!   headtrack config               Show or save the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use headtrack_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "headtrack",
    about = "Head-position velocity analysis and cue-aligned annotation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the mean speed of every segment of every trial file
    Velocity {
        /// Directory containing the trial files
        dir: PathBuf,

        /// File name regex; the first capture group orders the files
        #[arg(long)]
        pattern: Option<String>,

        /// Reordering of the sorted files, e.g. 2,0,1
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<usize>>,

        /// Multiplier applied to every speed
        #[arg(long)]
        scale: Option<f64>,

        /// Write the matrix as .json or .csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect cue onsets in a WAV soundtrack
    Cues {
        /// Path to the WAV file
        audio: PathBuf,

        /// Video frame rate the onsets are reported in
        #[arg(long)]
        fps: f64,

        /// Envelope threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Frame gap that separates two cues
        #[arg(long)]
        min_gap: Option<u64>,

        /// Number of cues the recording must contain
        #[arg(long)]
        expected: Option<usize>,
    },

    /// Annotate head positions in the windows after each cue
    Annotate {
        /// Path to the WAV soundtrack
        #[arg(long)]
        audio: PathBuf,

        /// Tracking CSV with per-frame body part coordinates
        #[arg(long)]
        coords: PathBuf,

        /// Video frame rate
        #[arg(long)]
        fps: f64,

        /// Number of frames in the video
        #[arg(long)]
        frames: usize,

        /// Annotation output file
        #[arg(short, long)]
        output: PathBuf,

        /// Continue from an existing output file
        #[arg(long)]
        resume: bool,

        /// Recording name stored in the output (defaults to the audio file stem)
        #[arg(long)]
        source: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Also write it to the user config location
        #[arg(long)]
        save: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    headtrack_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Velocity {
            dir,
            pattern,
            order,
            scale,
            output,
        } => commands::velocity::run(config, dir, pattern, order, scale, output),
        Commands::Cues {
            audio,
            fps,
            threshold,
            min_gap,
            expected,
        } => commands::cues::run(config, audio, fps, threshold, min_gap, expected),
        Commands::Annotate {
            audio,
            coords,
            fps,
            frames,
            output,
            resume,
            source,
        } => commands::annotate::run(
            config,
            commands::annotate::AnnotateArgs {
                audio,
                coords,
                fps,
                frames,
                output,
                resume,
                source,
            },
        ),
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
