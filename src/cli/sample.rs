//! Sample command implementation.
//!
//! Writes an annotated manifest to start from.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::sample_manifest;
use crate::error::{ImpError, Result};
use crate::output::{display_path, Printer};

/// Write an annotated sample manifest
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Where to write the manifest
    #[arg(default_value = "imp.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: SampleArgs, printer: &Printer) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(ImpError::Validation {
            message: format!("{} already exists", args.path.display()),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    fs::write(&args.path, sample_manifest()).map_err(|e| ImpError::Io {
        path: args.path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    printer.success("Created", &display_path(&args.path));
    Ok(())
}
