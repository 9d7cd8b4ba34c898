//! Asset catalog roots and folders.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::paths::segment_path;
use crate::types::Configuration;

use super::descriptor::{CatalogDescriptor, Descriptor};
use super::{clear_directory, ensure_dir, SegmentState};

/// Folder descriptor for a configuration, tagged per segment when split.
pub(super) fn folder_descriptor(
    config: &Configuration,
    segment_index: Option<usize>,
) -> CatalogDescriptor {
    let tag = config.catalog_folder_tag.as_ref().map(|tag| match segment_index {
        Some(index) => format!("{}_{}", tag, index),
        None => tag.clone(),
    });
    CatalogDescriptor::folder(config.catalog_folder_provides_namespace, tag)
}

/// Empty `dir` and write `descriptor` into it.
pub(super) fn clear_catalog(
    dir: &Path,
    descriptor: &CatalogDescriptor,
    printer: &Printer,
) -> Result<()> {
    clear_directory(dir, printer);
    descriptor.save(dir)
}

/// Write `descriptor` unless the directory already has one.
pub(super) fn ensure_descriptor(dir: &Path, descriptor: &CatalogDescriptor) -> Result<()> {
    if CatalogDescriptor::exists_in(dir) {
        return Ok(());
    }
    descriptor.save(dir)
}

/// Delete `base_0`, `base_1`, ... up to the first missing index.
pub(super) fn clear_segments(base: &Path, printer: &Printer) {
    let mut index = 0;
    loop {
        let path = segment_path(base, index);
        if !path.exists() {
            break;
        }
        if let Err(e) = fs::remove_dir_all(&path) {
            printer.warning("Failed", &format!("deleting {}: {}", display_path(&path), e));
        }
        index += 1;
    }
}

/// Create and initialise the current segment folder.
pub(super) fn setup_segment(
    segment: &SegmentState,
    config: &Configuration,
    printer: &Printer,
) -> Result<()> {
    let path = segment.current_path();
    ensure_dir(&path)?;
    clear_catalog(
        &path,
        &folder_descriptor(config, Some(segment.index)),
        printer,
    )
}
