//! Output image formats and package types.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ImpError, Result};

/// Image encoding selected for an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Keep whatever format the source file has.
    #[default]
    Unchanged,
    Jpeg,
    Png,
    Gif,
    Tiff,
}

impl ImageFormat {
    /// Canonical file extension, `None` for [`ImageFormat::Unchanged`].
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ImageFormat::Unchanged => None,
            ImageFormat::Jpeg => Some("jpg"),
            ImageFormat::Png => Some("png"),
            ImageFormat::Gif => Some("gif"),
            ImageFormat::Tiff => Some("tif"),
        }
    }

    /// Format implied by a path's extension. Unknown extensions map to
    /// [`ImageFormat::Unchanged`], which callers treat as unsupported.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "gif" => ImageFormat::Gif,
            "tif" | "tiff" => ImageFormat::Tiff,
            _ => ImageFormat::Unchanged,
        }
    }

    /// Extension for a file converted from `source` into this format.
    ///
    /// [`ImageFormat::Unchanged`] keeps the source's own extension as
    /// written, so `photo.jpeg` stays `photo.jpeg`. `None` when the source
    /// is not a supported image.
    pub fn output_extension(&self, source: &Path) -> Option<String> {
        match self {
            ImageFormat::Unchanged => {
                ImageFormat::for_path(source).extension()?;
                source
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
            }
            format => format.extension().map(str::to_string),
        }
    }

    /// Concrete format for a file converted from `source`.
    pub fn resolve(&self, source: &Path) -> Self {
        match self {
            ImageFormat::Unchanged => ImageFormat::for_path(source),
            format => *format,
        }
    }

    /// The `image` crate codec for this format.
    pub fn codec(&self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Unchanged => None,
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = ImpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "unchanged" => Ok(ImageFormat::Unchanged),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "gif" => Ok(ImageFormat::Gif),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            other => Err(ImpError::Parse {
                message: format!("Unknown output format '{}'", other),
                help: Some("Use one of: unchanged, jpg, png, gif, tif".to_string()),
            }),
        }
    }
}

/// Destination container flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageType {
    /// Plain files in a directory.
    #[default]
    None,
    StickerPack,
    ImageSet,
    IconSet,
    Icns,
    Catalog,
    /// A folder inside an asset catalog, optionally split into size-budgeted segments.
    CatalogFolder,
}

impl PackageType {
    pub fn name(&self) -> &'static str {
        match self {
            PackageType::None => "none",
            PackageType::StickerPack => "stickerpack",
            PackageType::ImageSet => "imageset",
            PackageType::IconSet => "iconset",
            PackageType::Icns => "icns",
            PackageType::Catalog => "catalog",
            PackageType::CatalogFolder => "catalogfolder",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageType {
    type Err = ImpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "none" => Ok(PackageType::None),
            "stickerpack" => Ok(PackageType::StickerPack),
            "imageset" => Ok(PackageType::ImageSet),
            "iconset" => Ok(PackageType::IconSet),
            "icns" => Ok(PackageType::Icns),
            "catalog" => Ok(PackageType::Catalog),
            "catalogfolder" => Ok(PackageType::CatalogFolder),
            other => Err(ImpError::Parse {
                message: format!("Unknown output package '{}'", other),
                help: Some(
                    "Use one of: none, stickerpack, imageset, iconset, icns, catalog, catalogfolder"
                        .to_string(),
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_path() {
        assert_eq!(ImageFormat::for_path(Path::new("a/b.JPEG")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::for_path(Path::new("b.jpg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::for_path(Path::new("b@3x.png")), ImageFormat::Png);
        assert_eq!(ImageFormat::for_path(Path::new("b.tiff")), ImageFormat::Tiff);
        assert_eq!(ImageFormat::for_path(Path::new("b.gif")), ImageFormat::Gif);
        assert_eq!(ImageFormat::for_path(Path::new("b.webp")), ImageFormat::Unchanged);
        assert_eq!(ImageFormat::for_path(Path::new("noext")), ImageFormat::Unchanged);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("unchanged".parse::<ImageFormat>().unwrap(), ImageFormat::Unchanged);
        assert!("bmp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ImageFormat::Tiff.extension(), Some("tif"));
        assert_eq!(ImageFormat::Unchanged.extension(), None);
        assert_eq!(ImageFormat::Png.codec(), Some(image::ImageFormat::Png));
    }

    #[test]
    fn test_package_parse_and_name() {
        for name in [
            "none",
            "stickerpack",
            "imageset",
            "iconset",
            "icns",
            "catalog",
            "catalogfolder",
        ] {
            let package: PackageType = name.parse().unwrap();
            assert_eq!(package.name(), name);
        }
        assert!("bundle".parse::<PackageType>().is_err());
    }

    #[test]
    fn test_output_extension_keeps_source_spelling() {
        let unchanged = ImageFormat::Unchanged;
        assert_eq!(
            unchanged.output_extension(Path::new("/src/photo.jpeg")).as_deref(),
            Some("jpeg")
        );
        assert_eq!(
            unchanged.output_extension(Path::new("scan.TIFF")).as_deref(),
            Some("TIFF")
        );
        assert_eq!(unchanged.output_extension(Path::new("clip.webp")), None);
        assert_eq!(unchanged.resolve(Path::new("scan.TIFF")), ImageFormat::Tiff);

        let png = ImageFormat::Png;
        assert_eq!(png.output_extension(Path::new("photo.jpeg")).as_deref(), Some("png"));
        assert_eq!(png.resolve(Path::new("photo.jpeg")), ImageFormat::Png);
    }
}
