//! A single resize instruction.

use std::path::Path;

use crate::paths::has_file_suffix;

use super::{ImageFormat, PackageType};

/// One resize/variant operation applied to each source image.
///
/// `scale` wins when non-zero; otherwise the box is used. A zero box side
/// is replaced by the other side, and a fully zero box means the source
/// resolution passes through unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    pub scale: f64,
    pub box_width: u32,
    pub box_height: u32,
    /// Shrink the output canvas to the aspect-fit size instead of
    /// letterboxing inside the full box.
    pub aspect_with_max_box: bool,
    pub output_format: ImageFormat,
    pub output_package: PackageType,
    /// Sources whose file stem lacks this suffix are skipped.
    pub required_suffix: Option<String>,
    pub remove_suffix: Option<String>,
    pub add_suffix: Option<String>,
}

impl Plan {
    /// A plan targeting a fixed box.
    pub fn boxed(width: u32, height: u32) -> Self {
        Self {
            box_width: width,
            box_height: height,
            ..Self::default()
        }
    }

    /// A plan scaling the source by a uniform multiplier.
    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn with_aspect(mut self, aspect: bool) -> Self {
        self.aspect_with_max_box = aspect;
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_package(mut self, package: PackageType) -> Self {
        self.output_package = package;
        self
    }

    pub fn requiring(mut self, suffix: &str) -> Self {
        self.required_suffix = Some(suffix.to_string());
        self
    }

    /// Rewrite the file stem suffix `from` to `to`.
    pub fn renaming(mut self, from: &str, to: &str) -> Self {
        self.remove_suffix = Some(from.to_string());
        self.add_suffix = Some(to.to_string());
        self
    }

    /// Append `suffix` to the file stem.
    pub fn suffixed(mut self, suffix: &str) -> Self {
        self.add_suffix = Some(suffix.to_string());
        self
    }

    /// Whether a source passes the required-suffix gate.
    pub fn admits(&self, source: &Path) -> bool {
        match &self.required_suffix {
            Some(suffix) => has_file_suffix(source, suffix),
            None => true,
        }
    }

    /// True when the plan rewrites the destination file stem.
    pub fn renames(&self) -> bool {
        self.remove_suffix.is_some() || self.add_suffix.is_some()
    }
}
