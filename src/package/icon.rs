//! Icon sets and `.icns` files.
//!
//! App and sticker icon sets already list their slots in `Contents.json`;
//! each slot is re-rendered in place. A plain `.iconset` gets the fixed
//! ladder `iconutil` expects, and an `.icns` is built from a scratch
//! `.iconset` of that ladder.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::discovery::SourceUnit;
use crate::error::{ImpError, Result};
use crate::geometry::Size;
use crate::output::{display_path, Printer};
use crate::render::{decode, scale_image, write_image, ScaleMode, ScaleOptions};
use crate::types::Plan;

use super::descriptor::{Descriptor, ImageSetDescriptor};
use super::tool::ToolRunner;
use super::{ensure_dir, remove_path};

/// Point sizes and densities of a generic `.iconset`.
pub const ICON_LADDER: [(u32, u32); 10] = [
    (16, 1),
    (16, 2),
    (32, 1),
    (32, 2),
    (128, 1),
    (128, 2),
    (256, 1),
    (256, 2),
    (512, 1),
    (512, 2),
];

/// Counts from one icon run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconReport {
    pub written: usize,
    pub failed: usize,
}

/// A slot of an icon set descriptor: point size and density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconSlot {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl IconSlot {
    /// Parse descriptor values such as `"83.5x83.5"` and `"2x"`.
    pub fn parse(size: &str, scale: &str) -> Option<Self> {
        let (width, height) = size.split_once('x')?;
        let scale = scale.strip_suffix('x')?;
        let slot = Self {
            width: width.trim().parse().ok()?,
            height: height.trim().parse().ok()?,
            scale: scale.trim().parse().ok()?,
        };
        let valid = [slot.width, slot.height, slot.scale]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        valid.then_some(slot)
    }

    /// Pixel size, truncated.
    pub fn pixels(&self) -> Size {
        Size::new(
            (self.width * self.scale) as u32,
            (self.height * self.scale) as u32,
        )
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn icon_options(base: &ScaleOptions) -> ScaleOptions {
    ScaleOptions {
        scale_mode: ScaleMode::Fill,
        ..*base
    }
}

/// Decoded sources, loaded on first use.
#[derive(Default)]
struct SourceCache {
    images: HashMap<PathBuf, RgbaImage>,
}

impl SourceCache {
    fn get(&mut self, path: &Path) -> Result<&RgbaImage> {
        if !self.images.contains_key(path) {
            let image = decode(path)?;
            self.images.insert(path.to_path_buf(), image);
        }
        self.images.get(path).ok_or_else(|| ImpError::Image {
            path: path.to_path_buf(),
            message: "Decoded image went missing".to_string(),
        })
    }
}

/// Re-render every slot listed in an app or sticker icon set descriptor.
///
/// Non-square slots use the oval source of a pair. A slot without size or
/// scale aborts the run before any file is touched.
pub fn write_app_icon_set(
    dir: &Path,
    unit: &SourceUnit,
    plan: &Plan,
    base: &ScaleOptions,
    printer: &Printer,
) -> Result<IconReport> {
    let mut set = ImageSetDescriptor::load(dir)?;
    let descriptor_path = ImageSetDescriptor::path_in(dir);

    let mut slots = Vec::with_capacity(set.images.len());
    for (index, entry) in set.images.iter().enumerate() {
        let (Some(size), Some(scale)) = (entry.size.as_deref(), entry.scale.as_deref()) else {
            return Err(ImpError::Descriptor {
                path: descriptor_path,
                message: format!("Image {} is missing size or scale", index),
            });
        };
        let slot = IconSlot::parse(size, scale).ok_or_else(|| ImpError::Descriptor {
            path: descriptor_path.clone(),
            message: format!("Image {} has unreadable size {:?} or scale {:?}", index, size, scale),
        })?;
        slots.push((slot, format!("-{}-{}", size, scale)));
    }

    let options = icon_options(base);
    let mut cache = SourceCache::default();
    let mut report = IconReport::default();

    for (entry, (slot, label)) in set.images.iter_mut().zip(slots) {
        if let Some(old) = entry.filename.take() {
            let old = dir.join(old);
            if let Err(e) = fs::remove_file(&old) {
                if e.kind() != io::ErrorKind::NotFound {
                    printer.warning("Failed", &format!("deleting {}: {}", display_path(&old), e));
                }
            }
        }

        let source = match unit.oval() {
            Some(oval) if !slot.is_square() => oval,
            _ => unit.primary(),
        };
        if !plan.admits(source) {
            printer.verbose("Skipped", &display_path(source));
            continue;
        }
        let Some(ext) = plan.output_format.output_extension(source) else {
            printer.warning("Unsupported", &display_path(source));
            report.failed += 1;
            continue;
        };

        let name = format!("{}{}.{}", file_stem(source), label, ext);
        let path = dir.join(&name);
        let written = cache.get(source).and_then(|image| {
            let rendered = scale_image(image, slot.pixels(), &options);
            write_image(&rendered, plan.output_format.resolve(source), &path)
        });
        match written {
            Ok(_) => {
                printer.verbose("Wrote", &display_path(&path));
                entry.filename = Some(name);
                report.written += 1;
            }
            Err(e) => {
                printer.error("Failed", &e.to_string());
                report.failed += 1;
            }
        }
    }

    set.save(dir)?;
    Ok(report)
}

/// Name of a ladder file, following `iconutil` conventions.
pub fn ladder_name(point_size: u32, scale: u32, ext: &str) -> String {
    let density = if scale == 1 {
        String::new()
    } else {
        format!("@{}x", scale)
    };
    format!("icon_{0}x{0}{1}.{2}", point_size, density, ext)
}

/// Write the generic icon ladder for `source` into `dir`.
pub fn write_icon_ladder(
    dir: &Path,
    source: &Path,
    plan: &Plan,
    base: &ScaleOptions,
    printer: &Printer,
) -> Result<IconReport> {
    let mut report = IconReport::default();
    if !plan.admits(source) {
        printer.verbose("Skipped", &display_path(source));
        return Ok(report);
    }
    let format = plan.output_format.resolve(source);
    let Some(ext) = plan.output_format.output_extension(source) else {
        printer.warning("Unsupported", &display_path(source));
        report.failed += 1;
        return Ok(report);
    };

    let image = match decode(source) {
        Ok(image) => image,
        Err(e) => {
            printer.error("Failed", &e.to_string());
            report.failed += 1;
            return Ok(report);
        }
    };

    ensure_dir(dir)?;
    let options = icon_options(base);
    for (point_size, scale) in ICON_LADDER {
        let edge = point_size * scale;
        let path = dir.join(ladder_name(point_size, scale, &ext));
        let rendered = scale_image(&image, Size::new(edge, edge), &options);
        match write_image(&rendered, format, &path) {
            Ok(_) => {
                printer.verbose("Wrote", &display_path(&path));
                report.written += 1;
            }
            Err(e) => {
                printer.error("Failed", &e.to_string());
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Build `dst` from a scratch ladder using `iconutil`.
///
/// A failing packer is reported and not retried; the scratch directory is
/// removed either way.
pub fn write_icns(
    dst: &Path,
    source: &Path,
    plan: &Plan,
    base: &ScaleOptions,
    tools: &dyn ToolRunner,
    printer: &Printer,
) -> Result<IconReport> {
    let scratch = dst.with_extension("iconset");
    let report = write_icon_ladder(&scratch, source, plan, base, printer)?;
    if report.written == 0 {
        if scratch.exists() {
            remove_path(&scratch, printer);
        }
        return Ok(report);
    }

    let args = vec![
        "--convert".to_string(),
        "icns".to_string(),
        "--output".to_string(),
        dst.to_string_lossy().into_owned(),
        scratch.to_string_lossy().into_owned(),
    ];
    match tools.run("iconutil", &args) {
        Ok(status) if status.success => printer.status("Packed", &display_path(dst)),
        Ok(status) => {
            let code = status
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            printer.error(
                "Failed",
                &format!("iconutil exited with {}: {}", code, status.stderr),
            );
        }
        Err(e) => printer.error("Failed", &e.to_string()),
    }

    remove_path(&scratch, printer);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::descriptor::ImageSetEntry;
    use crate::package::tool::ToolStatus;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn write_source(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]))
            .save(path)
            .unwrap();
    }

    fn slot(size: &str, scale: &str) -> ImageSetEntry {
        ImageSetEntry {
            idiom: Some("iphone".to_string()),
            size: Some(size.to_string()),
            scale: Some(scale.to_string()),
            ..Default::default()
        }
    }

    struct FakeTools {
        calls: RefCell<Vec<Vec<String>>>,
        succeed: bool,
    }

    impl ToolRunner for FakeTools {
        fn run(&self, program: &str, args: &[String]) -> Result<ToolStatus> {
            assert_eq!(program, "iconutil");
            // the scratch ladder must be complete when the packer runs
            let scratch = Path::new(&args[4]);
            assert_eq!(fs::read_dir(scratch).unwrap().count(), ICON_LADDER.len());
            self.calls.borrow_mut().push(args.to_vec());
            if self.succeed {
                fs::write(&args[3], b"icns").unwrap();
                Ok(ToolStatus::ok())
            } else {
                Ok(ToolStatus {
                    success: false,
                    code: Some(1),
                    stderr: "bad iconset".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_slot_parse() {
        let slot = IconSlot::parse("83.5x83.5", "2x").unwrap();
        assert_eq!(slot.pixels(), Size::new(167, 167));
        assert!(slot.is_square());

        let wide = IconSlot::parse("60x45", "3x").unwrap();
        assert_eq!(wide.pixels(), Size::new(180, 135));
        assert!(!wide.is_square());

        assert_eq!(IconSlot::parse("20", "2x"), None);
        assert_eq!(IconSlot::parse("20x20", "two"), None);
        assert_eq!(IconSlot::parse("0x20", "1x"), None);
    }

    #[test]
    fn test_ladder_names() {
        assert_eq!(ladder_name(16, 1, "png"), "icon_16x16.png");
        assert_eq!(ladder_name(512, 2, "png"), "icon_512x512@2x.png");
    }

    #[test]
    fn test_app_icon_set_rewritten_in_place() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("AppIcon.png");
        write_source(&source, 300, 300);
        let set_dir = dir.path().join("AppIcon.appiconset");
        fs::create_dir_all(&set_dir).unwrap();
        fs::write(set_dir.join("old.png"), b"stale").unwrap();
        let mut first = slot("20x20", "2x");
        first.filename = Some("old.png".to_string());
        ImageSetDescriptor {
            images: vec![first, slot("83.5x83.5", "2x")],
            ..Default::default()
        }
        .save(&set_dir)
        .unwrap();

        let report = write_app_icon_set(
            &set_dir,
            &SourceUnit::Single(source),
            &Plan::default(),
            &ScaleOptions::default(),
            &Printer::new(),
        )
        .unwrap();

        assert_eq!(report.written, 2);
        assert!(!set_dir.join("old.png").exists());
        let set = ImageSetDescriptor::load(&set_dir).unwrap();
        let names: Vec<&str> = set.images.iter().filter_map(|e| e.filename.as_deref()).collect();
        assert_eq!(names, vec!["AppIcon-20x20-2x.png", "AppIcon-83.5x83.5-2x.png"]);
        let small = image::open(set_dir.join("AppIcon-20x20-2x.png")).unwrap();
        assert_eq!((small.width(), small.height()), (40, 40));
        let large = image::open(set_dir.join("AppIcon-83.5x83.5-2x.png")).unwrap();
        assert_eq!((large.width(), large.height()), (167, 167));
    }

    #[test]
    fn test_app_icon_set_uses_oval_for_wide_slots() {
        let dir = tempdir().unwrap();
        let oval = dir.path().join("oval.png");
        let square = dir.path().join("square.png");
        write_source(&oval, 200, 150);
        write_source(&square, 200, 200);
        let set_dir = dir.path().join("Stickers.stickersiconset");
        fs::create_dir_all(&set_dir).unwrap();
        ImageSetDescriptor {
            images: vec![slot("29x29", "2x"), slot("60x45", "2x")],
            ..Default::default()
        }
        .save(&set_dir)
        .unwrap();

        write_app_icon_set(
            &set_dir,
            &SourceUnit::Pair { oval, square },
            &Plan::default(),
            &ScaleOptions::default(),
            &Printer::new(),
        )
        .unwrap();

        let set = ImageSetDescriptor::load(&set_dir).unwrap();
        let names: Vec<&str> = set.images.iter().filter_map(|e| e.filename.as_deref()).collect();
        assert_eq!(names, vec!["square-29x29-2x.png", "oval-60x45-2x.png"]);
        let wide = image::open(set_dir.join("oval-60x45-2x.png")).unwrap();
        assert_eq!((wide.width(), wide.height()), (120, 90));
    }

    #[test]
    fn test_app_icon_set_missing_scale_is_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("AppIcon.png");
        write_source(&source, 64, 64);
        let set_dir = dir.path().join("AppIcon.appiconset");
        fs::create_dir_all(&set_dir).unwrap();
        let mut broken = slot("20x20", "2x");
        broken.scale = None;
        ImageSetDescriptor {
            images: vec![slot("20x20", "1x"), broken],
            ..Default::default()
        }
        .save(&set_dir)
        .unwrap();

        let result = write_app_icon_set(
            &set_dir,
            &SourceUnit::Single(source),
            &Plan::default(),
            &ScaleOptions::default(),
            &Printer::new(),
        );

        assert!(matches!(result, Err(ImpError::Descriptor { .. })));
        assert_eq!(fs::read_dir(&set_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_icon_ladder() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("logo.png");
        write_source(&source, 1024, 1024);
        let out = dir.path().join("Logo.iconset");

        let report = write_icon_ladder(
            &out,
            &source,
            &Plan::default(),
            &ScaleOptions::default(),
            &Printer::new(),
        )
        .unwrap();

        assert_eq!(report.written, 10);
        let big = image::open(out.join("icon_512x512@2x.png")).unwrap();
        assert_eq!(big.width(), 1024);
        let small = image::open(out.join("icon_16x16.png")).unwrap();
        assert_eq!(small.width(), 16);
    }

    #[test]
    fn test_icns_runs_packer_and_removes_scratch() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("logo.png");
        write_source(&source, 256, 256);
        let dst = dir.path().join("App.icns");
        let tools = FakeTools {
            calls: RefCell::new(Vec::new()),
            succeed: true,
        };

        write_icns(
            &dst,
            &source,
            &Plan::default(),
            &ScaleOptions::default(),
            &tools,
            &Printer::new(),
        )
        .unwrap();

        let calls = tools.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][..3], ["--convert", "icns", "--output"]);
        assert!(dst.exists());
        assert!(!dir.path().join("App.iconset").exists());
    }

    #[test]
    fn test_icns_packer_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("logo.png");
        write_source(&source, 64, 64);
        let dst = dir.path().join("App.icns");
        let tools = FakeTools {
            calls: RefCell::new(Vec::new()),
            succeed: false,
        };

        let report = write_icns(
            &dst,
            &source,
            &Plan::default(),
            &ScaleOptions::default(),
            &tools,
            &Printer::new(),
        )
        .unwrap();

        assert_eq!(report.written, 10);
        assert_eq!(tools.calls.borrow().len(), 1);
        assert!(!dst.exists());
        assert!(!dir.path().join("App.iconset").exists());
    }
}
