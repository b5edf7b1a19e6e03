//! Command-line argument definitions for the Astrolabe CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, reference checking and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Astrolabe class-model tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input model file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output class plan file (TOML)
    #[arg(short, long, default_value = "plan.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Fail if any reference cannot be resolved
    #[arg(long)]
    pub strict: bool,
}
