//! `.imageset` maintenance.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::paths::has_file_suffix;

use super::descriptor::{Descriptor, ImageSetDescriptor, ImageSetEntry};
use super::ensure_dir;

/// Density scale label implied by a file name.
pub fn density_scale(path: &Path) -> &'static str {
    if has_file_suffix(path, "@3x") {
        "3x"
    } else if has_file_suffix(path, "@2x") {
        "2x"
    } else {
        "1x"
    }
}

/// Recreate `set_dir` empty, with a fresh descriptor.
pub(super) fn reset_image_set(set_dir: &Path, printer: &Printer) -> Result<()> {
    if set_dir.exists() {
        if let Err(e) = fs::remove_dir_all(set_dir) {
            printer.warning("Failed", &format!("deleting {}: {}", display_path(set_dir), e));
        }
    }
    ensure_dir(set_dir)?;
    ImageSetDescriptor::default().save(set_dir)
}

/// Append a universal entry for `artifact` to the set at `set_dir`.
///
/// Returns the path the image must be written to.
pub(super) fn insert_image(set_dir: &Path, artifact: &Path) -> Result<PathBuf> {
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut set = ImageSetDescriptor::load(set_dir)?;
    set.images
        .push(ImageSetEntry::universal(&file_name, density_scale(artifact)));
    set.save(set_dir)?;

    Ok(set_dir.join(file_name))
}
