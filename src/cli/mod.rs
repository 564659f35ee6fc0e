//! CLI Module
//!
//! Command-line interface for rendering files through the compressor and
//! inspecting meter ladders.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dsp::GainStageVariant;

/// Squeeze - analog-modelled compressor with bar-meter readout
#[derive(Parser, Debug)]
#[command(name = "squeeze")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a WAV file and print the final meter state
    #[command(name = "process")]
    Process {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Gain stage character (fet, optical)
        #[arg(long)]
        variant: Option<GainStageVariant>,

        /// Threshold in dBFS
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,

        /// Compression ratio
        #[arg(long)]
        ratio: Option<f64>,

        /// Frames per processing block
        #[arg(long)]
        block_size: Option<usize>,
    },

    /// Print the segment ladder for a crest factor
    #[command(name = "ladder")]
    Ladder {
        /// Headroom above 0 dB
        #[arg(long, default_value_t = 20.0)]
        crest_factor: f32,

        /// Level segments below the overload segment
        #[arg(long, default_value_t = 20)]
        bars: usize,
    },

    /// Write the default configuration
    #[command(name = "init-config")]
    InitConfig {
        /// Where to write the JSON file
        path: PathBuf,
    },
}
