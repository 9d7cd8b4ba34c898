//! Process command implementation.
//!
//! Runs every configuration of the given manifests and reports a summary.

use std::path::PathBuf;

use clap::Args;

use crate::error::{ImpError, Result};
use crate::output::{plural, Printer};
use crate::package::{SystemToolRunner, ToolRunner};
use crate::pipeline::{self, RunSummary};

/// Process manifests into resized images and packages
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Manifest files to process
    #[arg(required = true)]
    pub manifests: Vec<PathBuf>,

    /// Directory that `~~~/` paths in manifests refer to
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Show every file written or skipped
    #[arg(long, short)]
    pub verbose: bool,
}

pub fn run(args: ProcessArgs) -> Result<()> {
    let printer = Printer::new().with_verbose(args.verbose);
    run_with(&args, &printer, &SystemToolRunner)
}

/// Run with an explicit printer and tool runner.
pub fn run_with(args: &ProcessArgs, printer: &Printer, tools: &dyn ToolRunner) -> Result<()> {
    let summary = pipeline::run(&args.manifests, &args.output, printer, tools);
    report(&summary, printer);

    if summary.manifests_failed + summary.aborted > 0 {
        return Err(ImpError::Validation {
            message: format!(
                "{} and {} failed",
                plural(summary.manifests_failed, "manifest", "manifests"),
                plural(summary.aborted, "configuration", "configurations")
            ),
            help: Some("See the errors above".to_string()),
        });
    }
    Ok(())
}

fn report(summary: &RunSummary, printer: &Printer) {
    let mut line = format!(
        "{}, {} written",
        plural(summary.configurations, "configuration", "configurations"),
        plural(summary.written, "image", "images")
    );
    if summary.skipped > 0 {
        line.push_str(&format!(", {} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }

    if summary.has_failures() {
        printer.warning("Finished", &line);
    } else {
        printer.success("Finished", &line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_writes_output() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("art")).unwrap();
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("art/a.png"))
            .unwrap();
        let manifest = dir.path().join("imp.yaml");
        fs::write(&manifest, "src: ~~/art\ndst: ~~~/small\nmaxPx: 4\n").unwrap();

        let args = ProcessArgs {
            manifests: vec![manifest],
            output: dir.path().join("build"),
            verbose: false,
        };
        run_with(&args, &Printer::new(), &SystemToolRunner).unwrap();

        let image = image::open(dir.path().join("build/small/a.png")).unwrap();
        assert_eq!((image.width(), image.height()), (4, 4));
    }

    #[test]
    fn test_process_reports_aborted_configurations() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("imp.yaml");
        fs::write(&manifest, "dst: out\n").unwrap();

        let args = ProcessArgs {
            manifests: vec![manifest],
            output: dir.path().to_path_buf(),
            verbose: false,
        };
        let result = run_with(&args, &Printer::new(), &SystemToolRunner);

        assert!(result.is_err());
    }

    #[test]
    fn test_process_missing_manifest_file() {
        let dir = tempdir().unwrap();
        let args = ProcessArgs {
            manifests: vec![dir.path().join("nope.yaml")],
            output: dir.path().to_path_buf(),
            verbose: false,
        };

        assert!(run_with(&args, &Printer::new(), &SystemToolRunner).is_err());
    }
}
