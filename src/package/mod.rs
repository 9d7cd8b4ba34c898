//! Destination containers.
//!
//! Every configuration writes into one container flavor (see
//! [`PackageType`]). A [`PackagingContext`] checks the destination,
//! optionally clears it, keeps the running segment of a size-budgeted
//! catalog folder, and routes each produced artifact to the path it must
//! be written to while keeping the container's `Contents.json` in step.

mod catalog;
mod descriptor;
mod icon;
mod image_set;
mod sticker;
mod tool;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::SourceFiles;
use crate::error::{ImpError, Result};
use crate::output::{display_path, Printer};
use crate::paths::{has_component_with_extension, has_extension, image_set_dir, segment_path};
use crate::types::{Configuration, PackageType};

pub use descriptor::{
    CatalogDescriptor, Descriptor, FolderProperties, ImageSetDescriptor, ImageSetEntry, Info,
    StickerDescriptor, StickerEntry, StickerPackDescriptor, StickerPackProperties,
    StickerProperties, CONTENTS_FILE,
};
pub use icon::{
    ladder_name, write_app_icon_set, write_icns, write_icon_ladder, IconReport, IconSlot,
    ICON_LADDER,
};
pub use image_set::density_scale;
pub use tool::{SystemToolRunner, ToolRunner, ToolStatus};

/// Running byte budget of a catalog folder split into numbered segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentState {
    /// Zero leaves the folder unsegmented.
    pub max_size_bytes: u64,
    pub index: usize,
    pub accumulated_bytes: u64,
    pub base_path: PathBuf,
}

impl SegmentState {
    pub fn new(base_path: PathBuf, max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            index: 0,
            accumulated_bytes: 0,
            base_path,
        }
    }

    pub fn is_segmented(&self) -> bool {
        self.max_size_bytes != 0
    }

    /// Directory artifacts currently go to.
    pub fn current_path(&self) -> PathBuf {
        if self.is_segmented() {
            segment_path(&self.base_path, self.index)
        } else {
            self.base_path.clone()
        }
    }

    pub fn record(&mut self, bytes: u64) {
        self.accumulated_bytes += bytes;
    }

    pub fn should_advance(&self) -> bool {
        self.is_segmented() && self.accumulated_bytes > self.max_size_bytes
    }

    pub fn advance(&mut self) {
        self.index += 1;
        self.accumulated_bytes = 0;
    }
}

/// Packaging state for one configuration run.
pub struct PackagingContext<'a> {
    config: &'a Configuration,
    printer: &'a Printer,
    pub segment: SegmentState,
    /// Image sets already reset during the current mode pass.
    prepared_sets: HashSet<PathBuf>,
}

impl<'a> PackagingContext<'a> {
    /// Check the destination and bring the container into its initial state.
    ///
    /// Precondition failures abort the configuration.
    pub fn prepare(
        config: &'a Configuration,
        sources: &SourceFiles,
        printer: &'a Printer,
    ) -> Result<Self> {
        let dst = config
            .destination
            .clone()
            .ok_or_else(|| ImpError::validation("Missing dst."))?;
        let replace = config.replace_existing;
        let mut segment = SegmentState::new(dst.clone(), 0);

        match config.output_package {
            PackageType::None => {
                ensure_dir(&dst)?;
                if replace {
                    clear_directory(&dst, printer);
                }
            }
            PackageType::StickerPack => {
                if !has_extension(&dst, "stickerpack") {
                    return Err(not_a(&dst, ".stickerpack directory"));
                }
                ensure_dir(&dst)?;
                sticker::prepare_pack(&dst, replace, config.preset.sticker_grid_size(), printer)?;
            }
            PackageType::ImageSet => ensure_dir(&dst)?,
            PackageType::IconSet => {
                let generic = has_extension(&dst, "iconset");
                if !generic
                    && !has_extension(&dst, "appiconset")
                    && !has_extension(&dst, "stickersiconset")
                {
                    return Err(not_a(&dst, ".iconset, .appiconset, or .stickersiconset directory"));
                }
                check_single_source(sources, true)?;
                if generic {
                    ensure_dir(&dst)?;
                } else {
                    // slots come from the existing descriptor
                    ImageSetDescriptor::load(&dst)?;
                }
            }
            PackageType::Icns => {
                if !has_extension(&dst, "icns") {
                    return Err(not_a(&dst, ".icns file"));
                }
                check_single_source(sources, false)?;
                if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
                    ensure_dir(parent)?;
                }
            }
            PackageType::Catalog => {
                if !has_extension(&dst, "xcassets") {
                    return Err(not_a(&dst, ".xcassets directory"));
                }
                ensure_dir(&dst)?;
                let descriptor = CatalogDescriptor::root();
                if replace {
                    catalog::clear_catalog(&dst, &descriptor, printer)?;
                } else {
                    catalog::ensure_descriptor(&dst, &descriptor)?;
                }
            }
            PackageType::CatalogFolder => {
                if !has_component_with_extension(&dst, "xcassets") {
                    return Err(ImpError::package(
                        format!("{} is not in a .xcassets directory.", dst.display()),
                        "Catalog folders must live inside an asset catalog",
                    ));
                }
                if config.catalog_folder_max_size != 0 {
                    segment = SegmentState::new(dst.clone(), config.catalog_folder_max_size);
                    if replace {
                        catalog::clear_segments(&dst, printer);
                    }
                    catalog::setup_segment(&segment, config, printer)?;
                } else {
                    ensure_dir(&dst)?;
                    let descriptor = catalog::folder_descriptor(config, None);
                    if replace {
                        catalog::clear_catalog(&dst, &descriptor, printer)?;
                    } else {
                        catalog::ensure_descriptor(&dst, &descriptor)?;
                    }
                }
            }
        }

        Ok(Self {
            config,
            printer,
            segment,
            prepared_sets: HashSet::new(),
        })
    }

    pub fn package(&self) -> PackageType {
        self.config.output_package
    }

    /// Directory (or file, for icns) artifacts are written to right now.
    pub fn destination(&self) -> PathBuf {
        self.segment.current_path()
    }

    /// Open a new segment when the current one is over budget.
    ///
    /// Called before each source unit.
    pub fn advance_segment_if_needed(&mut self) -> Result<bool> {
        if !self.segment.should_advance() {
            return Ok(false);
        }
        self.segment.advance();
        catalog::setup_segment(&self.segment, self.config, self.printer)?;
        self.printer
            .info("Segment", &display_path(&self.segment.current_path()));
        Ok(true)
    }

    /// Start a mode pass for a source unit.
    pub fn begin_pass(&mut self) {
        self.prepared_sets.clear();
    }

    /// Finish a mode pass, charging its largest artifact to the segment.
    pub fn end_pass(&mut self, largest_artifact: u64) {
        self.segment.record(largest_artifact);
    }

    /// Register an artifact with the container.
    ///
    /// Returns the path the encoded image must be written to.
    pub fn insert(&mut self, artifact: &Path) -> Result<PathBuf> {
        match self.config.output_package {
            PackageType::None | PackageType::IconSet | PackageType::Icns => {
                Ok(artifact.to_path_buf())
            }
            PackageType::StickerPack => sticker::insert_sticker(artifact),
            PackageType::ImageSet | PackageType::Catalog | PackageType::CatalogFolder => {
                let set_dir = image_set_dir(artifact);
                if self.prepared_sets.insert(set_dir.clone()) {
                    image_set::reset_image_set(&set_dir, self.printer)?;
                }
                image_set::insert_image(&set_dir, artifact)
            }
        }
    }
}

fn not_a(dst: &Path, what: &str) -> ImpError {
    ImpError::package(
        format!("{} is not a {}.", dst.display(), what),
        "Rename dst to end with the matching extension, or change outPackage",
    )
}

fn check_single_source(sources: &SourceFiles, pairs_allowed: bool) -> Result<()> {
    let single = sources.general.len() == 1;
    let pair = pairs_allowed
        && sources.general.is_empty()
        && sources.oval.len() == 1
        && sources.square.len() == 1;
    if single || pair {
        return Ok(());
    }

    let found = if sources.general.is_empty() && pairs_allowed {
        format!("{}/{}", sources.oval.len(), sources.square.len())
    } else {
        sources.general.len().to_string()
    };
    Err(ImpError::package(
        format!("Only 1 source image allowed for this package. Found {}.", found),
        "Point src at a single image, or srcOval and srcSquare at one image each",
    ))
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ImpError::Io {
        path: dir.to_path_buf(),
        message: format!("Failed to create directory: {}", e),
    })
}

/// Remove a file or directory, logging failures.
pub(crate) fn remove_path(path: &Path, printer: &Printer) {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = result {
        printer.warning("Failed", &format!("deleting {}: {}", display_path(path), e));
    }
}

/// Delete everything inside `dir`, logging failures.
pub(crate) fn clear_directory(dir: &Path, printer: &Printer) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            printer.warning(
                "Failed",
                &format!("listing {}: {}", display_path(dir), e),
            );
            return;
        }
    };
    for entry in entries.filter_map(|e| e.ok()) {
        remove_path(&entry.path(), printer);
    }
}
