//! File name rewriting helpers.
//!
//! A "file suffix" here is the tail of the file stem, before the
//! extension: `cat@3x.png` has the suffix `@3x`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Density markers stripped from base names.
pub const DENSITY_SUFFIXES: [&str; 2] = ["@2x", "@3x"];

/// Marker inserted into mask file names.
pub const MASK_MARKER: &str = "_mask";

/// Split a file name into stem and extension (without the dot).
///
/// Leading dots belong to the stem, so `.hidden` has no extension.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(0) | None => (name, None),
        Some(idx) => (&name[..idx], Some(&name[idx + 1..])),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Check whether the file stem of `path` ends with `suffix`.
pub fn has_file_suffix(path: &Path, suffix: &str) -> bool {
    let name = file_name(path);
    let (stem, _) = split_name(&name);
    stem.ends_with(suffix)
}

/// Rewrite the stem suffix `from` into `to`.
///
/// Nothing changes when the stem does not end with `from`; an empty `from`
/// appends `to`.
pub fn change_file_suffix(path: &Path, from: &str, to: &str) -> PathBuf {
    let name = file_name(path);
    let (stem, ext) = split_name(&name);
    let Some(kept) = stem.strip_suffix(from) else {
        return path.to_path_buf();
    };

    let mut renamed = format!("{}{}", kept, to);
    if let Some(ext) = ext {
        renamed.push('.');
        renamed.push_str(ext);
    }
    path.with_file_name(renamed)
}

/// Replace the extension; an empty `ext` removes it.
pub fn change_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// File name without extension and without a trailing `@2x`/`@3x`.
pub fn base_name(path: &Path) -> String {
    let name = file_name(path);
    let (stem, _) = split_name(&name);
    strip_density(stem).to_string()
}

fn strip_density(stem: &str) -> &str {
    let mut stem = stem;
    for suffix in DENSITY_SUFFIXES {
        if let Some(kept) = stem.strip_suffix(suffix) {
            stem = kept;
        }
    }
    stem
}

/// Image set directory for an artifact path: `dir/cat@2x.png` → `dir/cat.imageset`.
pub fn image_set_dir(artifact: &Path) -> PathBuf {
    let mut dir = change_extension(artifact, "imageset");
    for suffix in DENSITY_SUFFIXES {
        dir = change_file_suffix(&dir, suffix, "");
    }
    dir
}

/// Insert the mask marker ahead of any density suffix: `cat@2x.png` → `cat_mask@2x.png`.
pub fn mask_name(name: &str) -> String {
    let (stem, ext) = split_name(name);
    let plain = strip_density(stem);
    let density = &stem[plain.len()..];

    let mut renamed = format!("{}{}{}", plain, MASK_MARKER, density);
    if let Some(ext) = ext {
        renamed.push('.');
        renamed.push_str(ext);
    }
    renamed
}

/// Numbered segment directory: `Assets.xcassets/Pack` → `Assets.xcassets/Pack_3`.
pub fn segment_path(base: &Path, index: usize) -> PathBuf {
    let mut raw: OsString = base.as_os_str().to_owned();
    raw.push(format!("_{}", index));
    PathBuf::from(raw)
}

/// Check whether any component of `path` has the given extension.
pub fn has_component_with_extension(path: &Path, ext: &str) -> bool {
    path.components().any(|component| {
        Path::new(component.as_os_str())
            .extension()
            .is_some_and(|e| e == ext)
    })
}

/// Check the extension of the final component.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}
