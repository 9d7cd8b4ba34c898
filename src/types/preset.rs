//! Named plan recipes.

use std::fmt;
use std::str::FromStr;

use crate::error::{ImpError, Result};

/// Which of the 1x/2x/3x density buckets a sticker preset emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScaleSet {
    pub one: bool,
    pub two: bool,
    pub three: bool,
}

impl ScaleSet {
    /// Parse a digit string such as `"13"` or `"123"`.
    fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() {
            return None;
        }
        let mut set = ScaleSet::default();
        let mut last = '0';
        for c in digits.chars() {
            // digits must be strictly ascending: "12" is valid, "21" and "11" are not
            if c <= last {
                return None;
            }
            match c {
                '1' => set.one = true,
                '2' => set.two = true,
                '3' => set.three = true,
                _ => return None,
            }
            last = c;
        }
        Some(set)
    }

    fn digits(&self) -> String {
        let mut s = String::new();
        if self.one {
            s.push('1');
        }
        if self.two {
            s.push('2');
        }
        if self.three {
            s.push('3');
        }
        s
    }
}

/// Canned plan-generation recipe selected by a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    #[default]
    None,
    SmallSticker,
    MediumSticker,
    LargeSticker,
    Thumb256,
    ImageSet,
    /// One image set per source with a slot for every density; unselected
    /// densities get a 1x1 placeholder.
    StickerImageSet(ScaleSet),
    /// Loose files for the selected densities only.
    StickerImageFiles(ScaleSet),
}

impl Preset {
    /// Sticker pack `grid-size` for this preset.
    pub fn sticker_grid_size(&self) -> &'static str {
        match self {
            Preset::SmallSticker => "small",
            Preset::LargeSticker => "large",
            _ => "regular",
        }
    }
}

impl FromStr for Preset {
    type Err = ImpError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let preset = match s {
            "none" => Some(Preset::None),
            "smallSticker" => Some(Preset::SmallSticker),
            "mediumSticker" => Some(Preset::MediumSticker),
            "largeSticker" => Some(Preset::LargeSticker),
            "thumb256" => Some(Preset::Thumb256),
            "imageSet" => Some(Preset::ImageSet),
            _ => {
                if let Some(digits) = s.strip_prefix("stickerImageSet") {
                    ScaleSet::from_digits(digits).map(Preset::StickerImageSet)
                } else if let Some(digits) = s.strip_prefix("stickerImageFiles") {
                    ScaleSet::from_digits(digits).map(Preset::StickerImageFiles)
                } else {
                    None
                }
            }
        };

        preset.ok_or_else(|| ImpError::Parse {
            message: format!("Unknown preset '{}'", s),
            help: Some(
                "Use none, smallSticker, mediumSticker, largeSticker, thumb256, imageSet, \
                 stickerImageSet<N> or stickerImageFiles<N> (N one of 1, 2, 3, 12, 13, 23, 123)"
                    .to_string(),
            ),
        })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::None => f.write_str("none"),
            Preset::SmallSticker => f.write_str("smallSticker"),
            Preset::MediumSticker => f.write_str("mediumSticker"),
            Preset::LargeSticker => f.write_str("largeSticker"),
            Preset::Thumb256 => f.write_str("thumb256"),
            Preset::ImageSet => f.write_str("imageSet"),
            Preset::StickerImageSet(set) => write!(f, "stickerImageSet{}", set.digits()),
            Preset::StickerImageFiles(set) => write!(f, "stickerImageFiles{}", set.digits()),
        }
    }
}
