//! Resampling a source image onto a target canvas.
//!
//! Normal renders composite the resized source over a transparent canvas,
//! optionally matted with a background colour. Mask renders produce a
//! grayscale image that is white where the source is opaque and black
//! everywhere else.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use crate::geometry::{aspect_fit_centered, fill, padding_inset, rect_remainder, Rect, Size};
use crate::types::Colour;

/// How the source is placed inside the drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Fit entirely inside, letterboxed and centered.
    #[default]
    AspectFit,
    /// Cover the area, cropping the centered overflow.
    Fill,
}

/// Which variant of an image is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessMode {
    Normal,
    Mask,
}

impl ProcessMode {
    /// Modes to run for a configuration.
    pub fn passes(masks_too: bool) -> Vec<ProcessMode> {
        if masks_too {
            vec![ProcessMode::Normal, ProcessMode::Mask]
        } else {
            vec![ProcessMode::Normal]
        }
    }
}

/// Options for a single render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleOptions {
    pub scale_mode: ScaleMode,
    pub process_mode: ProcessMode,
    /// Fraction of each side left empty around the image.
    pub padding: f64,
    pub background: Option<Colour>,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            scale_mode: ScaleMode::AspectFit,
            process_mode: ProcessMode::Normal,
            padding: 0.0,
            background: None,
        }
    }
}

impl ScaleOptions {
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

/// Render `source` onto a canvas of exactly `target` pixels.
pub fn scale_image(source: &RgbaImage, target: Size, options: &ScaleOptions) -> DynamicImage {
    let area = padding_inset(target, options.padding);
    let (placed, pixels) = place(source, area, options.scale_mode);

    match options.process_mode {
        ProcessMode::Normal => {
            let mut canvas = RgbaImage::new(target.width, target.height);
            if let Some(colour) = options.background {
                fill_rect(&mut canvas, area, Rgba::from(colour));
            }
            if let Some(pixels) = pixels {
                let at = placed.to_raster(target.height);
                imageops::overlay(&mut canvas, &pixels, at.x, at.y);
            }
            DynamicImage::ImageRgba8(canvas)
        }
        ProcessMode::Mask => {
            let mut canvas = GrayImage::new(target.width, target.height);
            if let Some(pixels) = pixels {
                let at = placed.to_raster(target.height);
                paint_alpha(&mut canvas, &pixels, at);
            }
            for strip in rect_remainder(area, placed) {
                fill_gray(&mut canvas, strip, Luma([0]));
            }
            DynamicImage::ImageLuma8(canvas)
        }
    }
}

/// Resize the source for `area`, returning where it lands and the pixels.
fn place(source: &RgbaImage, area: Rect, mode: ScaleMode) -> (Rect, Option<RgbaImage>) {
    let src = Size::of(source);
    if src.is_empty() || area.is_empty() {
        return (Rect::new(area.x, area.y, 0, 0), None);
    }

    match mode {
        ScaleMode::AspectFit => {
            let placed = aspect_fit_centered(src, area);
            if placed.is_empty() {
                return (placed, None);
            }
            let resized = imageops::resize(source, placed.width, placed.height, FilterType::Lanczos3);
            (placed, Some(resized))
        }
        ScaleMode::Fill => {
            let crop = fill(src, area.size());
            let resized = imageops::resize(
                source,
                crop.scaled.width,
                crop.scaled.height,
                FilterType::Lanczos3,
            );
            let window = crop.window.to_raster(crop.scaled.height);
            let cropped = imageops::crop_imm(
                &resized,
                window.x as u32,
                window.y as u32,
                window.width,
                window.height,
            )
            .to_image();
            (area, Some(cropped))
        }
    }
}

/// Fill a lower-left-origin rectangle, clipped to the canvas.
pub(crate) fn fill_rect(canvas: &mut RgbaImage, rect: Rect, colour: Rgba<u8>) {
    let height = canvas.height();
    if let Some(r) = clip(rect, Size::of(canvas)) {
        let raster = r.to_raster(height);
        for y in raster.y..raster.y + raster.height as i64 {
            for x in raster.x..raster.x + raster.width as i64 {
                canvas.put_pixel(x as u32, y as u32, colour);
            }
        }
    }
}

fn fill_gray(canvas: &mut GrayImage, rect: Rect, value: Luma<u8>) {
    let height = canvas.height();
    if let Some(r) = clip(rect, Size::of(canvas)) {
        let raster = r.to_raster(height);
        for y in raster.y..raster.y + raster.height as i64 {
            for x in raster.x..raster.x + raster.width as i64 {
                canvas.put_pixel(x as u32, y as u32, value);
            }
        }
    }
}

/// Write source coverage into the mask: opaque white, transparent black.
fn paint_alpha(canvas: &mut GrayImage, pixels: &RgbaImage, at: Rect) {
    let (width, height) = canvas.dimensions();
    for (px, py, pixel) in pixels.enumerate_pixels() {
        let x = at.x + px as i64;
        let y = at.y + py as i64;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            continue;
        }
        canvas.put_pixel(x as u32, y as u32, Luma([pixel[3]]));
    }
}

fn clip(rect: Rect, canvas: Size) -> Option<Rect> {
    rect.intersection(&Rect::from_size(canvas))
}
