//! Normalized per-manifest-entry settings.

use std::path::PathBuf;

use crate::error::{ImpError, Result};

use super::{Colour, ImageFormat, PackageType, Preset};

/// Extensions accepted when a manifest does not narrow them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tif", "tiff"];

/// One configuration, built from a manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub source_dir: Option<PathBuf>,
    pub oval_source_dir: Option<PathBuf>,
    pub square_source_dir: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub preset: Preset,
    pub output_format: ImageFormat,
    pub output_package: PackageType,
    pub replace_existing: bool,
    pub scale: f64,
    pub max_width: u32,
    pub max_height: u32,
    /// Segment budget in bytes; 0 leaves the catalog folder unsegmented.
    pub catalog_folder_max_size: u64,
    pub catalog_folder_tag: Option<String>,
    pub catalog_folder_provides_namespace: bool,
    pub background_color: Option<Colour>,
    pub masks_too: bool,
    pub valid_extensions: Vec<String>,
    /// Explicit ordered list of general source file names.
    pub files: Vec<String>,
    pub out_manifest: Option<PathBuf>,
    pub out_contact_sheet: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source_dir: None,
            oval_source_dir: None,
            square_source_dir: None,
            destination: None,
            preset: Preset::None,
            output_format: ImageFormat::Unchanged,
            output_package: PackageType::None,
            replace_existing: false,
            scale: 0.0,
            max_width: 0,
            max_height: 0,
            catalog_folder_max_size: 0,
            catalog_folder_tag: None,
            catalog_folder_provides_namespace: false,
            background_color: None,
            masks_too: false,
            valid_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            files: vec![],
            out_manifest: None,
            out_contact_sheet: None,
        }
    }
}

impl Configuration {
    /// Check the settings that must hold before any file is touched.
    pub fn validate(&self) -> Result<()> {
        let has_pair = self.oval_source_dir.is_some() && self.square_source_dir.is_some();
        if self.source_dir.is_none() && !has_pair {
            return Err(ImpError::Validation {
                message: "Missing src.".to_string(),
                help: Some("Set src, or both srcOval and srcSquare".to_string()),
            });
        }

        if self.destination.is_none() {
            return Err(ImpError::Validation {
                message: "Missing dst.".to_string(),
                help: None,
            });
        }

        if self.scale != 0.0 && (self.max_width != 0 || self.max_height != 0) {
            return Err(ImpError::Validation {
                message: "Can not specify scale and max-width / max-height.".to_string(),
                help: Some("Use either scale or maxPx/maxWidthPx/maxHeightPx".to_string()),
            });
        }

        if self.scale < 0.0 || !self.scale.is_finite() {
            return Err(ImpError::validation(format!(
                "Scale must be a positive number, got {}",
                self.scale
            )));
        }

        Ok(())
    }

    /// Check whether a file name has one of the accepted extensions.
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        let ext = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => return false,
        };
        self.valid_extensions.iter().any(|valid| *valid == ext)
    }
}

/// Expand a user-supplied extension list with the usual aliases.
pub fn expand_extensions(selected: &[String]) -> Vec<String> {
    if selected.is_empty() {
        return DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
    }

    let mut allowed: Vec<String> = Vec::new();
    for value in selected {
        let value = value.trim().to_ascii_lowercase();
        let alias = match value.as_str() {
            "jpg" => Some("jpeg"),
            "tif" => Some("tiff"),
            _ => None,
        };
        if !allowed.contains(&value) {
            allowed.push(value);
        }
        if let Some(alias) = alias {
            if !allowed.iter().any(|a| a == alias) {
                allowed.push(alias.to_string());
            }
        }
    }
    allowed
}
