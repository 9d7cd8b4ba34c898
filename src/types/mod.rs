//! Core domain types for imp.
//!
//! This module contains the types shared by planning, packaging and the pipeline:
//! - `Configuration` - Normalized settings for one manifest entry
//! - `Plan` - A single resize/variant instruction
//! - `Preset` - Named plan recipes
//! - `ImageFormat` / `PackageType` - Output encodings and container flavors
//! - `Colour` - Background matte colour

mod colour;
mod config;
mod format;
mod plan;
mod preset;

pub use colour::Colour;
pub use config::{expand_extensions, Configuration, DEFAULT_EXTENSIONS};
pub use format::{ImageFormat, PackageType};
pub use plan::Plan;
pub use preset::{Preset, ScaleSet};
