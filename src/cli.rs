use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Leading character marking the option string among the positional inputs
pub const OPTION_MARKER: char = '+';

#[derive(Parser)]
#[command(name = "ffcrush", version)]
#[command(about = "Batch video shrinker driving ffmpeg", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Optional option string starting with '+' (e.g. +HEhn24HD), then video
    /// files or directories. Without paths the current directory is listed
    /// and scanned after confirmation
    #[arg(value_name = "[+OPTIONS] PATHS")]
    pub inputs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Don't offer to customize the default parameters
    #[arg(long)]
    pub no_prompt: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check if the encoder is installed
    CheckFfmpeg,

    /// Count the frames of a video file
    Probe {
        /// Path to the video file
        file: PathBuf,
    },

    /// Show encoder commands without executing
    DryRun {
        /// Optional '+OPTIONS' followed by files or directories
        #[arg(value_name = "[+OPTIONS] PATHS")]
        inputs: Vec<PathBuf>,
    },

    /// Print the profile an option string resolves to, as JSON
    Profile {
        /// Option string, with or without the leading '+'
        options: Option<String>,
    },

    /// Show config status and location, or create default config if missing
    InitConfig,
}

/// Separate the option string (marker stripped) from the input paths
pub fn split_inputs(inputs: &[PathBuf]) -> (Option<String>, Vec<PathBuf>) {
    match inputs.split_first() {
        Some((first, rest)) => match first.to_str().and_then(|s| s.strip_prefix(OPTION_MARKER)) {
            Some(options) => (Some(options.to_string()), rest.to_vec()),
            None => (None, inputs.to_vec()),
        },
        None => (None, Vec::new()),
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
