//! Plan generation: turns a configuration's preset and overrides into an
//! ordered list of resize plans.

use crate::geometry::{aspect_fit, Size};
use crate::types::{Configuration, ImageFormat, Plan, Preset, ScaleSet};

/// Fixed sticker canvas edge lengths.
pub const SMALL_STICKER_BOX: u32 = 300;
pub const MEDIUM_STICKER_BOX: u32 = 408;
pub const LARGE_STICKER_BOX: u32 = 618;
pub const THUMB_BOX: u32 = 256;

/// Density boxes for the sticker image presets, 1x, 2x and 3x.
pub const STICKER_IMAGE_BOXES: [u32; 3] = [206, 412, 618];

/// Suffix marking a full resolution source for the `imageSet` preset.
pub const FULL_RESOLUTION_SUFFIX: &str = "@3x";

/// Generate the ordered plans for a configuration.
///
/// Depends only on the preset, scale, box and output settings. Scale and
/// box are not re-validated here.
pub fn generate_plans(config: &Configuration) -> Vec<Plan> {
    let format = config.output_format;
    let package = config.output_package;

    match config.preset {
        Preset::None => {
            let plan = Plan {
                scale: config.scale,
                box_width: config.max_width,
                box_height: config.max_height,
                ..Plan::default()
            };
            vec![plan.with_format(format).with_package(package)]
        }
        Preset::SmallSticker => vec![sticker_plan(SMALL_STICKER_BOX, config).suffixed("@3x")],
        Preset::MediumSticker => vec![sticker_plan(MEDIUM_STICKER_BOX, config).suffixed("@3x")],
        Preset::LargeSticker => vec![sticker_plan(LARGE_STICKER_BOX, config).suffixed("@3x")],
        Preset::Thumb256 => vec![sticker_plan(THUMB_BOX, config)],
        Preset::ImageSet => image_set_plans(config),
        Preset::StickerImageSet(scales) => sticker_image_plans(scales, config, true),
        Preset::StickerImageFiles(scales) => sticker_image_plans(scales, config, false),
    }
}

fn sticker_plan(edge: u32, config: &Configuration) -> Plan {
    Plan::boxed(edge, edge)
        .with_aspect(true)
        .with_format(ImageFormat::Png)
        .with_package(config.output_package)
}

fn image_set_plans(config: &Configuration) -> Vec<Plan> {
    let boxed = config.max_width != 0 || config.max_height != 0;

    let variant = |thirds: u32| -> Plan {
        let plan = if boxed {
            let third = |side: u32| (side as f64 * thirds as f64 / 3.0).round() as u32;
            Plan::boxed(third(config.max_width), third(config.max_height)).with_aspect(true)
        } else {
            Plan::scaled(thirds as f64 / 3.0)
        };
        plan.with_format(config.output_format)
            .with_package(config.output_package)
            .requiring(FULL_RESOLUTION_SUFFIX)
    };

    vec![
        variant(1).renaming(FULL_RESOLUTION_SUFFIX, ""),
        variant(2).renaming(FULL_RESOLUTION_SUFFIX, "@2x"),
        variant(3),
    ]
}

fn sticker_image_plans(scales: ScaleSet, config: &Configuration, placeholders: bool) -> Vec<Plan> {
    let selected = [scales.one, scales.two, scales.three];
    let suffixes: [&str; 3] = if placeholders {
        ["", "@2x", "@3x"]
    } else {
        ["@1x", "@2x", "@3x"]
    };

    let mut plans = Vec::with_capacity(3);
    for i in 0..3 {
        let edge = if selected[i] {
            STICKER_IMAGE_BOXES[i]
        } else if placeholders {
            1
        } else {
            continue;
        };

        plans.push(
            Plan::boxed(edge, edge)
                .with_format(ImageFormat::Png)
                .with_package(config.output_package)
                .suffixed(suffixes[i]),
        );
    }
    plans
}

/// Pixel size a plan renders a source of size `source` at.
///
/// `None` means the source resolution passes through unchanged.
pub fn target_size(plan: &Plan, source: Size) -> Option<Size> {
    let target = if plan.scale != 0.0 {
        if plan.scale == 1.0 {
            return None;
        }
        Size::new(
            (source.width as f64 * plan.scale).round() as u32,
            (source.height as f64 * plan.scale).round() as u32,
        )
    } else {
        let (width, height) = match (plan.box_width, plan.box_height) {
            (0, 0) => return None,
            (0, h) => (h, h),
            (w, 0) => (w, w),
            (w, h) => (w, h),
        };
        let bounds = Size::new(width, height);
        if plan.aspect_with_max_box {
            aspect_fit(source, bounds)
        } else {
            bounds
        }
    };

    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}
