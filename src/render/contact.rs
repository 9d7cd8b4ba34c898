//! Contact sheet composition.
//!
//! Lays the first rendered image of every source unit out in a grid of
//! square cells on a dark gray background.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::geometry::{aspect_fit_centered, Rect, Size};
use crate::types::Colour;

use super::scale::fill_rect;

/// Edge length of one cell.
pub const CELL: u32 = 160;

const MIN_WIDTH: u32 = 640;
const MIN_HEIGHT: u32 = 920;

/// Grid layout for a contact sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactLayout {
    pub columns: u32,
    pub rows: u32,
    pub size: Size,
}

impl ContactLayout {
    /// Layout for `count` images, roughly three columns to every two rows.
    pub fn for_count(count: usize) -> Self {
        let wanted = (count as f64 * 2.0 / 3.0).sqrt().ceil() as u32;
        let width = (wanted * CELL).max(MIN_WIDTH);
        let columns = width / CELL;
        let rows = (count as u32).div_ceil(columns);
        let height = (rows * CELL).max(MIN_HEIGHT);

        Self {
            columns,
            rows,
            size: Size::new(width, height),
        }
    }

    /// Cell for the image at `index`, filled from the top row down.
    pub fn cell(&self, index: usize) -> Rect {
        let index = index as u32;
        let column = index % self.columns;
        let row = index / self.columns;
        Rect::new(
            (column * CELL) as i64,
            self.size.height as i64 - CELL as i64 - (row * CELL) as i64,
            CELL,
            CELL,
        )
    }
}

/// Collects one thumbnail per source unit.
#[derive(Debug, Default)]
pub struct ContactSheet {
    images: Vec<RgbaImage>,
}

impl ContactSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: &DynamicImage) {
        // thumbnails keep memory flat for large batches
        self.images.push(image.thumbnail(CELL, CELL).to_rgba8());
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Compose the sheet.
    pub fn compose(&self) -> RgbaImage {
        let layout = ContactLayout::for_count(self.images.len());
        let mut sheet = RgbaImage::new(layout.size.width, layout.size.height);
        fill_rect(&mut sheet, Rect::from_size(layout.size), Rgba::from(Colour::SHEET_GRAY));

        for (index, image) in self.images.iter().enumerate() {
            let placed = aspect_fit_centered(Size::of(image), layout.cell(index));
            if placed.is_empty() {
                continue;
            }
            let resized = imageops::resize(image, placed.width, placed.height, FilterType::Lanczos3);
            let at = placed.to_raster(layout.size.height);
            imageops::overlay(&mut sheet, &resized, at.x, at.y);
        }

        sheet
    }
}
