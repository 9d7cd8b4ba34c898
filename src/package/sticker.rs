//! `.stickerpack` maintenance.

use std::path::{Path, PathBuf};

use crate::error::{ImpError, Result};
use crate::output::Printer;
use crate::paths::change_extension;

use super::descriptor::{Descriptor, StickerDescriptor, StickerPackDescriptor};
use super::{ensure_dir, remove_path};

/// Bring a sticker pack into its starting state.
///
/// With `replace`, every listed sticker directory is deleted and the list
/// emptied. The grid size is always rewritten.
pub(super) fn prepare_pack(
    pack_dir: &Path,
    replace: bool,
    grid_size: &str,
    printer: &Printer,
) -> Result<()> {
    let mut pack = if StickerPackDescriptor::exists_in(pack_dir) {
        StickerPackDescriptor::load(pack_dir)?
    } else {
        StickerPackDescriptor::default()
    };

    if replace {
        for sticker in &pack.stickers {
            remove_path(&pack_dir.join(&sticker.filename), printer);
        }
        pack.stickers.clear();
    }

    pack.properties.grid_size = grid_size.to_string();
    pack.save(pack_dir)
}

/// Wrap `artifact` in its own `.sticker` directory and list it in the pack.
///
/// Returns the image path inside the sticker directory.
pub(super) fn insert_sticker(artifact: &Path) -> Result<PathBuf> {
    let pack_dir = artifact.parent().ok_or_else(|| ImpError::Io {
        path: artifact.to_path_buf(),
        message: "Sticker has no enclosing pack".to_string(),
    })?;
    let file_name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sticker_dir = change_extension(artifact, "sticker");
    ensure_dir(&sticker_dir)?;
    StickerDescriptor::for_file(&file_name).save(&sticker_dir)?;

    let mut pack = StickerPackDescriptor::load(pack_dir)?;
    let entry = sticker_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if pack.add_sticker(&entry) {
        pack.save(pack_dir)?;
    }

    Ok(sticker_dir.join(file_name))
}
