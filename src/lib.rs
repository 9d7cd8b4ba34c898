//! imp - Batch image packaging engine
//!
//! A library for turning folders of source artwork into resized variants,
//! icon sets, sticker packs and asset catalogs, driven by YAML manifests.

pub mod cli;
pub mod discovery;
pub mod error;
pub mod geometry;
pub mod output;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod planner;
pub mod render;
pub mod types;

pub use discovery::{collect_files, Manifest, ManifestEntry, PathContext, SourceFiles, SourceUnit};
pub use error::{ImpError, Result};
pub use geometry::{aspect_fit, fill, rect_remainder, search_padding, Rect, Size};
pub use package::{PackagingContext, SegmentState, SystemToolRunner, ToolRunner};
pub use pipeline::{process_configuration, run, RunSummary};
pub use planner::{generate_plans, target_size};
pub use types::{Colour, Configuration, ImageFormat, PackageType, Plan, Preset};
