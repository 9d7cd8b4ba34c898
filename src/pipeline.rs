//! The processing run.
//!
//! Drives every configuration of every manifest: validate, collect, plan,
//! prepare the destination, then for each source unit, each mode and each
//! plan render one artifact and hand it to the container. Errors scoped to
//! one image are reported and skipped; errors scoped to a configuration
//! abort only that configuration.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use crate::discovery::{collect_files, Manifest, SourceUnit};
use crate::error::{ImpError, Result};
use crate::geometry::Size;
use crate::output::{display_path, plural, Printer};
use crate::package::{
    write_app_icon_set, write_icns, write_icon_ladder, IconReport, PackagingContext, ToolRunner,
};
use crate::paths::{base_name, change_file_suffix, has_extension, mask_name};
use crate::planner::{generate_plans, target_size};
use crate::render::{
    decode, render_within_limit, write_bytes, write_image, ContactSheet, ProcessMode, ScaleOptions,
    STICKER_SIZE_LIMIT,
};
use crate::types::{Configuration, ImageFormat, PackageType, Plan};

/// Totals for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub manifests_failed: usize,
    pub configurations: usize,
    pub aborted: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &ConfigurationReport) {
        self.written += report.written;
        self.skipped += report.skipped;
        self.failed += report.failed;
    }

    /// Whether anything went wrong.
    pub fn has_failures(&self) -> bool {
        self.manifests_failed + self.aborted + self.failed > 0
    }
}

/// Counts for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationReport {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Base names of the normal-mode artifacts, first occurrence order.
    pub names: Vec<String>,
}

impl ConfigurationReport {
    fn add_name(&mut self, name: String) {
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    fn add_icons(&mut self, report: IconReport) {
        self.written += report.written;
        self.failed += report.failed;
    }
}

/// A rendered, packaged and written image.
struct Artifact {
    path: PathBuf,
    bytes: u64,
    image: DynamicImage,
}

/// Process every configuration of every manifest.
///
/// Never stops early: failing manifests and configurations are reported
/// and counted.
pub fn run(
    manifests: &[PathBuf],
    output_dir: &Path,
    printer: &Printer,
    tools: &dyn ToolRunner,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for path in manifests {
        printer.status("Reading", &display_path(path));
        let configurations = match Manifest::load(path).and_then(|m| m.configurations(output_dir)) {
            Ok(configurations) => configurations,
            Err(e) => {
                printer.error("Failed", &format!("{}: {}", display_path(path), e));
                summary.manifests_failed += 1;
                continue;
            }
        };

        for config in &configurations {
            summary.configurations += 1;
            match process_configuration(config, printer, tools) {
                Ok(report) => summary.absorb(&report),
                Err(e) => {
                    printer.error("Aborted", &e.to_string());
                    summary.aborted += 1;
                }
            }
        }
    }

    summary
}

/// Run one configuration from validation to the final side outputs.
pub fn process_configuration(
    config: &Configuration,
    printer: &Printer,
    tools: &dyn ToolRunner,
) -> Result<ConfigurationReport> {
    config.validate()?;
    let sources = collect_files(config)?;
    let plans = generate_plans(config);
    let mut ctx = PackagingContext::prepare(config, &sources, printer)?;

    let units = sources.units();
    printer.status(
        "Processing",
        &format!(
            "{} into {}",
            plural(units.len(), "image", "images"),
            display_path(&ctx.destination())
        ),
    );

    let base = ScaleOptions {
        background: config.background_color,
        ..ScaleOptions::default()
    };
    let mut report = ConfigurationReport::default();
    let mut sheet = ContactSheet::new();

    for unit in &units {
        ctx.advance_segment_if_needed()?;

        if matches!(config.output_package, PackageType::IconSet | PackageType::Icns) {
            let icons = process_icons(&ctx, config, unit, &plans, &base, tools, printer)?;
            if icons.written > 0 {
                report.add_name(base_name(unit.primary()));
            }
            report.add_icons(icons);
            continue;
        }

        let mut source: Option<RgbaImage> = None;
        let mut first: Option<DynamicImage> = None;

        for mode in ProcessMode::passes(config.masks_too) {
            ctx.begin_pass();
            let mut largest = 0;

            for plan in &plans {
                match render_plan(&mut ctx, config, unit, plan, mode, &base, &mut source, printer) {
                    Ok(Some(artifact)) => {
                        report.written += 1;
                        largest = largest.max(artifact.bytes);
                        if mode == ProcessMode::Normal {
                            report.add_name(base_name(&artifact.path));
                            if first.is_none() {
                                first = Some(artifact.image);
                            }
                        }
                    }
                    Ok(None) => report.skipped += 1,
                    Err(e @ ImpError::Descriptor { .. }) => return Err(e),
                    Err(e) => {
                        printer.error("Failed", &e.to_string());
                        report.failed += 1;
                    }
                }
            }

            ctx.end_pass(largest);
        }

        if let Some(image) = &first {
            sheet.push(image);
        }
    }

    if let Some(path) = &config.out_manifest {
        write_out_manifest(path, &report.names)?;
        printer.info("Listed", &display_path(path));
    }
    if let Some(path) = &config.out_contact_sheet {
        write_contact_sheet(path, &sheet)?;
        printer.info("Sheet", &display_path(path));
    }

    printer.success(
        "Finished",
        &format!(
            "{} ({} written, {} skipped)",
            display_path(&ctx.destination()),
            report.written,
            report.skipped
        ),
    );
    Ok(report)
}

/// File name a plan produces for `source` in `mode`.
pub fn artifact_name(source: &Path, plan: &Plan, mode: ProcessMode, ext: &str) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = PathBuf::from(file_name).with_extension(ext);
    if mode == ProcessMode::Mask {
        name = PathBuf::from(mask_name(&name.to_string_lossy()));
    }

    let add = plan.add_suffix.as_deref().unwrap_or("");
    match plan.remove_suffix.as_deref() {
        Some(remove) => change_file_suffix(&name, remove, add),
        None if !add.is_empty() => change_file_suffix(&name, "", add),
        None => name,
    }
}

/// Render one plan for one unit. `Ok(None)` means the plan does not apply.
#[allow(clippy::too_many_arguments)]
fn render_plan(
    ctx: &mut PackagingContext<'_>,
    config: &Configuration,
    unit: &SourceUnit,
    plan: &Plan,
    mode: ProcessMode,
    base: &ScaleOptions,
    source: &mut Option<RgbaImage>,
    printer: &Printer,
) -> Result<Option<Artifact>> {
    let path = unit.primary();
    if !plan.admits(path) {
        printer.verbose("Skipped", &display_path(path));
        return Ok(None);
    }

    if ImageFormat::for_path(path) == ImageFormat::Unchanged {
        printer.warning("Unsupported", &display_path(path));
        return Ok(None);
    }
    let (format, ext) = match mode {
        ProcessMode::Mask => (ImageFormat::Png, Some("png".to_string())),
        ProcessMode::Normal => (
            plan.output_format.resolve(path),
            plan.output_format.output_extension(path),
        ),
    };
    let ext = ext.ok_or_else(|| ImpError::Image {
        path: path.to_path_buf(),
        message: "No output format".to_string(),
    })?;
    let dst = ctx
        .destination()
        .join(artifact_name(path, plan, mode, &ext));

    if source.is_none() {
        *source = Some(decode(path)?);
    }
    let Some(image) = source.as_ref() else {
        return Ok(None);
    };
    let source_size = Size::of(image);
    let target = target_size(plan, source_size);

    let limit = (config.output_package == PackageType::StickerPack && target.is_some())
        .then_some(STICKER_SIZE_LIMIT);
    let options = ScaleOptions {
        process_mode: mode,
        ..*base
    };
    let search = render_within_limit(
        image,
        target.unwrap_or(source_size),
        &options,
        format,
        limit,
        &dst,
    )?;
    if !search.within_limit {
        printer.warning(
            "Oversize",
            &format!(
                "{} is {} bytes after {} padding attempts",
                display_path(&dst),
                search.size,
                search.attempts
            ),
        );
    } else if search.padding > 0.0 {
        printer.verbose(
            "Padded",
            &format!("{} by {:.2}", display_path(&dst), search.padding),
        );
    }

    let written = ctx.insert(&dst)?;
    write_bytes(&written, &search.accepted.bytes)?;
    printer.verbose("Wrote", &display_path(&written));

    Ok(Some(Artifact {
        path: written,
        bytes: search.size,
        image: search.accepted.image,
    }))
}

/// Icon packages render once per plan in normal mode only.
fn process_icons(
    ctx: &PackagingContext<'_>,
    config: &Configuration,
    unit: &SourceUnit,
    plans: &[Plan],
    base: &ScaleOptions,
    tools: &dyn ToolRunner,
    printer: &Printer,
) -> Result<IconReport> {
    let dst = ctx.destination();
    let mut total = IconReport::default();

    for plan in plans {
        let report = if config.output_package == PackageType::Icns {
            write_icns(&dst, unit.primary(), plan, base, tools, printer)?
        } else if has_extension(&dst, "iconset") {
            write_icon_ladder(&dst, unit.primary(), plan, base, printer)?
        } else {
            write_app_icon_set(&dst, unit, plan, base, printer)?
        };
        total.written += report.written;
        total.failed += report.failed;
    }

    Ok(total)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ImpError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }
    Ok(())
}

/// Write the emitted base names as a pretty JSON array.
fn write_out_manifest(path: &Path, names: &[String]) -> Result<()> {
    let json = serde_json::to_string_pretty(names).map_err(|e| ImpError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to serialize output manifest: {}", e),
    })?;
    ensure_parent(path)?;
    write_bytes(path, json.as_bytes())
}

fn write_contact_sheet(path: &Path, sheet: &ContactSheet) -> Result<()> {
    let format = match ImageFormat::for_path(path) {
        ImageFormat::Unchanged => ImageFormat::Png,
        format => format,
    };
    ensure_parent(path)?;
    write_image(&DynamicImage::ImageRgba8(sheet.compose()), format, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{
        CatalogDescriptor, Descriptor, ImageSetDescriptor, StickerPackDescriptor, ToolStatus,
    };
    use crate::paths::segment_path;
    use crate::types::Preset;
    use image::{GenericImageView, Rgb, RgbImage, Rgba};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct NoTools;

    impl ToolRunner for NoTools {
        fn run(&self, program: &str, _args: &[String]) -> Result<ToolStatus> {
            panic!("unexpected tool run: {}", program);
        }
    }

    struct CountingTools {
        runs: Cell<usize>,
    }

    impl ToolRunner for CountingTools {
        fn run(&self, _program: &str, args: &[String]) -> Result<ToolStatus> {
            self.runs.set(self.runs.get() + 1);
            fs::write(&args[3], b"icns").unwrap();
            Ok(ToolStatus::ok())
        }
    }

    fn save(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]))
            .save(path)
            .unwrap();
    }

    fn dims(path: &Path) -> (u32, u32) {
        image::open(path).unwrap().dimensions()
    }

    #[test]
    fn test_artifact_names() {
        let src = Path::new("/src/cat@3x.jpg");
        let plain = Plan::default();
        let strip = Plan::scaled(0.5).renaming("@3x", "");
        let double = Plan::scaled(0.5).renaming("@3x", "@2x");
        let sticker = Plan::boxed(300, 300).suffixed("@3x");

        assert_eq!(artifact_name(src, &plain, ProcessMode::Normal, "png"), PathBuf::from("cat@3x.png"));
        assert_eq!(artifact_name(src, &strip, ProcessMode::Normal, "jpg"), PathBuf::from("cat.jpg"));
        assert_eq!(artifact_name(src, &double, ProcessMode::Mask, "png"), PathBuf::from("cat_mask@2x.png"));
        assert_eq!(
            artifact_name(Path::new("dog.png"), &sticker, ProcessMode::Mask, "png"),
            PathBuf::from("dog_mask@3x.png")
        );

        let unchanged = ImageFormat::Unchanged;
        for source in ["/src/photo.jpeg", "/src/scan.TIFF"] {
            let source = Path::new(source);
            let ext = unchanged.output_extension(source).unwrap();
            assert_eq!(
                artifact_name(source, &plain, ProcessMode::Normal, &ext),
                PathBuf::from(source.file_name().unwrap())
            );
        }
    }

    #[test]
    fn test_small_sticker_scenario() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("art");
        fs::create_dir_all(&src).unwrap();
        save(&src.join("cat.png"), 1200, 1200);
        let dst = dir.path().join("Stickers.stickerpack");

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(dst.clone()),
            preset: Preset::SmallSticker,
            output_package: PackageType::StickerPack,
            ..Default::default()
        };
        let report = process_configuration(&config, &Printer::new(), &NoTools).unwrap();

        assert_eq!(report.written, 1);
        let image = dst.join("cat@3x.sticker/cat@3x.png");
        assert_eq!(dims(&image), (300, 300));
        let pack = StickerPackDescriptor::load(&dst).unwrap();
        assert_eq!(pack.properties.grid_size, "small");
        assert_eq!(pack.stickers.len(), 1);
        assert_eq!(pack.stickers[0].filename, "cat@3x.sticker");
    }

    #[test]
    fn test_image_set_variants() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("art");
        fs::create_dir_all(&src).unwrap();
        save(&src.join("hero@3x.png"), 300, 150);
        save(&src.join("plain.png"), 30, 30);
        let dst = dir.path().join("out");

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(dst.clone()),
            preset: Preset::ImageSet,
            output_package: PackageType::ImageSet,
            ..Default::default()
        };
        let report = process_configuration(&config, &Printer::new(), &NoTools).unwrap();

        assert_eq!(report.written, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.names, vec!["hero"]);
        let set_dir = dst.join("hero.imageset");
        assert_eq!(dims(&set_dir.join("hero.png")), (100, 50));
        assert_eq!(dims(&set_dir.join("hero@2x.png")), (200, 100));
        assert_eq!(dims(&set_dir.join("hero@3x.png")), (300, 150));

        let set = ImageSetDescriptor::load(&set_dir).unwrap();
        let scales: Vec<&str> = set.images.iter().filter_map(|e| e.scale.as_deref()).collect();
        assert_eq!(scales, vec!["1x", "2x", "3x"]);
    }

    #[test]
    fn test_unchanged_format_keeps_source_extension() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("art");
        fs::create_dir_all(&src).unwrap();
        RgbImage::from_pixel(40, 20, Rgb([90, 120, 200]))
            .save_with_format(src.join("photo.jpeg"), image::ImageFormat::Jpeg)
            .unwrap();
        RgbaImage::from_pixel(30, 30, Rgba([200, 40, 40, 255]))
            .save_with_format(src.join("scan.TIFF"), image::ImageFormat::Tiff)
            .unwrap();
        let dst = dir.path().join("out");

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(dst.clone()),
            scale: 0.5,
            masks_too: true,
            ..Default::default()
        };
        let report = process_configuration(&config, &Printer::new(), &NoTools).unwrap();

        assert_eq!(report.written, 4);
        assert_eq!(dims(&dst.join("photo.jpeg")), (20, 10));
        assert_eq!(dims(&dst.join("scan.TIFF")), (15, 15));
        assert!(!dst.join("photo.jpg").exists());
        assert!(!dst.join("scan.tif").exists());
        assert!(dst.join("photo_mask.png").exists());
        assert!(dst.join("scan_mask.png").exists());
        assert_eq!(
            image::ImageFormat::from_path(dst.join("scan.TIFF")).unwrap(),
            image::ImageFormat::Tiff
        );
    }

    #[test]
    fn test_masks_and_side_outputs() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("art");
        fs::create_dir_all(&src).unwrap();
        let mut image = RgbaImage::new(40, 40);
        for (x, _, pixel) in image.enumerate_pixels_mut() {
            *pixel = if x < 20 { Rgba([0, 0, 255, 255]) } else { Rgba([0, 0, 0, 0]) };
        }
        image.save(src.join("a.png")).unwrap();
        save(&src.join("b.png"), 20, 10);
        let dst = dir.path().join("out");

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(dst.clone()),
            scale: 0.5,
            masks_too: true,
            out_manifest: Some(dir.path().join("meta/names.json")),
            out_contact_sheet: Some(dir.path().join("sheet.png")),
            ..Default::default()
        };
        let report = process_configuration(&config, &Printer::new(), &NoTools).unwrap();

        assert_eq!(report.written, 4);
        assert_eq!(dims(&dst.join("a.png")), (20, 20));
        let mask = image::open(dst.join("a_mask.png")).unwrap().to_luma8();
        assert_eq!(mask.dimensions(), (20, 20));
        assert_eq!(mask.get_pixel(0, 10).0, [255]);
        assert_eq!(mask.get_pixel(19, 10).0, [0]);

        let names: Vec<String> =
            serde_json::from_str(&fs::read_to_string(dir.path().join("meta/names.json")).unwrap())
                .unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(dims(&dir.path().join("sheet.png")), (640, 920));
    }

    #[test]
    fn test_segmented_catalog_folder() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("art");
        fs::create_dir_all(&src).unwrap();
        save(&src.join("one.png"), 16, 16);
        save(&src.join("two.png"), 16, 16);
        let base = dir.path().join("Assets.xcassets/Levels");

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(base.clone()),
            output_package: PackageType::CatalogFolder,
            catalog_folder_max_size: 1,
            catalog_folder_tag: Some("levels".to_string()),
            ..Default::default()
        };
        process_configuration(&config, &Printer::new(), &NoTools).unwrap();

        let first = segment_path(&base, 0);
        let second = segment_path(&base, 1);
        assert!(first.join("one.imageset/one.png").exists());
        assert!(second.join("two.imageset/two.png").exists());
        assert_eq!(
            CatalogDescriptor::load(&second).unwrap(),
            CatalogDescriptor::folder(false, Some("levels_1".to_string()))
        );
    }

    #[test]
    fn test_icns_configuration() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("logo.png");
        save(&src, 128, 128);
        let dst = dir.path().join("App.icns");
        let tools = CountingTools { runs: Cell::new(0) };

        let config = Configuration {
            source_dir: Some(src),
            destination: Some(dst.clone()),
            output_package: PackageType::Icns,
            masks_too: true,
            ..Default::default()
        };
        let report = process_configuration(&config, &Printer::new(), &tools).unwrap();

        assert_eq!(report.written, 10);
        assert_eq!(tools.runs.get(), 1);
        assert!(dst.exists());
    }

    #[test]
    fn test_run_continues_after_aborted_configuration() {
        let dir = tempdir().unwrap();
        let art = dir.path().join("art");
        fs::create_dir_all(&art).unwrap();
        save(&art.join("a.png"), 10, 10);
        let manifest = dir.path().join("imp.yaml");
        fs::write(
            &manifest,
            "src: ~~/missing\ndst: ~~~/one\n---\nsrc: ~~/art\ndst: ~~~/two\nscale: 2\n",
        )
        .unwrap();
        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "src: a\ndst: b\npreset: huge\n").unwrap();
        let output = dir.path().join("build");

        let summary = run(&[manifest, bad], &output, &Printer::new(), &NoTools);

        assert_eq!(summary.manifests_failed, 1);
        assert_eq!(summary.configurations, 2);
        assert_eq!(summary.aborted, 1);
        assert_eq!(summary.written, 1);
        assert!(summary.has_failures());
        assert_eq!(dims(&output.join("two/a.png")), (20, 20));
    }
}
