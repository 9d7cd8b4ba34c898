pub mod completions;
pub mod process;
pub mod sample;

use clap::{Parser, Subcommand};

/// imp - Batch image packaging for app asset bundles
#[derive(Parser, Debug)]
#[command(name = "imp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process manifests into resized images and packages
    Process(process::ProcessArgs),

    /// Write an annotated sample manifest
    Sample(sample::SampleArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
