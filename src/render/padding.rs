//! Size-capped rendering for sticker packs.

use std::path::Path;

use image::{DynamicImage, RgbaImage};

use crate::error::Result;
use crate::geometry::{search_padding, PaddingSearch, Size};
use crate::types::ImageFormat;

use super::encode::encode;
use super::scale::{scale_image, ScaleOptions};

/// Largest sticker file the pack accepts, in bytes.
pub const STICKER_SIZE_LIMIT: u64 = 500_000;

/// A rendered image held in memory with its encoding.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: DynamicImage,
    pub bytes: Vec<u8>,
}

impl Rendered {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Render and encode, adding padding until the encoding fits `size_limit`.
///
/// Nothing touches the filesystem; the caller writes the accepted result.
pub fn render_within_limit(
    source: &RgbaImage,
    target: Size,
    options: &ScaleOptions,
    format: ImageFormat,
    size_limit: Option<u64>,
    path: &Path,
) -> Result<PaddingSearch<Rendered>> {
    search_padding(size_limit, |padding| {
        let image = scale_image(source, target, &options.with_padding(padding));
        let bytes = encode(&image, format, path)?;
        let size = bytes.len() as u64;
        Ok((Rendered { image, bytes }, size))
    })
}
