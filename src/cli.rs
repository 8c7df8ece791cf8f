use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipforge")]
#[command(
    author,
    version,
    about = "Normalize video clips and join them with transitions"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the pipeline as agent tools over stdio
    Serve,

    /// Join clips with a transition between each pair
    Concat {
        /// Clips in playback order (at least two)
        #[arg(required = true)]
        clips: Vec<PathBuf>,

        /// Transition style (see `clipforge transitions`)
        #[arg(short, long)]
        transition: Option<String>,

        /// Transition length in seconds
        #[arg(short, long)]
        duration: Option<f64>,

        /// Output file (default: configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize clips to the configured profile without joining them
    Normalize {
        /// Clips to normalize
        #[arg(required = true)]
        clips: Vec<PathBuf>,

        /// Directory for the normalized files
        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transition styles
    Transitions,

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
