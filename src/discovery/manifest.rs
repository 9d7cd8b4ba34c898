//! Manifest (YAML) parsing.
//!
//! A manifest file holds one or more YAML documents. Each non-empty
//! document describes one [`Configuration`]. Keys are camelCase; values
//! naming presets, formats and packages are checked while the file is
//! read, so one bad value rejects the whole file.

use std::path::{Path, PathBuf};

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ImpError, Result};
use crate::types::{expand_extensions, Colour, Configuration, ImageFormat, PackageType, Preset};

/// One manifest document as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestEntry {
    pub src: Option<String>,
    pub src_oval: Option<String>,
    pub src_square: Option<String>,
    pub dst: Option<String>,
    /// Explicit source file names, processed in this order.
    pub files: Vec<String>,
    pub preset: Option<String>,
    pub out_format: Option<String>,
    pub out_package: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub out_package_replace: bool,
    #[serde(deserialize_with = "float")]
    pub scale: Option<f64>,
    /// Sets both `maxWidthPx` and `maxHeightPx`.
    #[serde(deserialize_with = "pixels")]
    pub max_px: Option<u32>,
    #[serde(deserialize_with = "pixels")]
    pub max_width_px: Option<u32>,
    #[serde(deserialize_with = "pixels")]
    pub max_height_px: Option<u32>,
    #[serde(deserialize_with = "byte_count")]
    pub catalog_folder_max_size: Option<u64>,
    pub catalog_folder_tag: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub catalog_folder_namespace: bool,
    /// `r:g:b` or `r:g:b:a`, components 0-255.
    pub background_color: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub masks_too: bool,
    /// Colon separated extensions, e.g. `jpg:png`.
    pub valid_format: Option<String>,
    pub out_manifest: Option<String>,
    pub out_contact_sheet: Option<String>,
}

/// A scalar manifest value. Numbers and flags may be written bare or quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(_) => None,
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Bool(_) | Scalar::Float(_) => None,
            Scalar::Int(i) => u64::try_from(*i).ok(),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }

    /// `true`/`false` in any case, or an integer where non-zero is true.
    fn as_flag(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(i) => Some(*i != 0),
            Scalar::Float(_) => None,
            Scalar::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    s.parse::<i64>().ok().map(|i| i != 0)
                }
            }
        }
    }

    fn unexpected(&self) -> Unexpected<'_> {
        match self {
            Scalar::Bool(b) => Unexpected::Bool(*b),
            Scalar::Int(i) => Unexpected::Signed(*i),
            Scalar::Float(f) => Unexpected::Float(*f),
            Scalar::Text(s) => Unexpected::Str(s),
        }
    }
}

fn scalar<'de, D, T>(
    deserializer: D,
    expected: &'static str,
    convert: impl Fn(&Scalar) -> Option<T>,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => convert(&value)
            .map(Some)
            .ok_or_else(|| de::Error::invalid_value(value.unexpected(), &expected)),
    }
}

fn float<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    scalar(d, "a number", Scalar::as_f64)
}

fn pixels<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u32>, D::Error> {
    scalar(d, "a pixel count", |v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
}

fn byte_count<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<u64>, D::Error> {
    scalar(d, "a byte count", Scalar::as_u64)
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(scalar(d, "true, false or an integer", Scalar::as_flag)?.unwrap_or(false))
}

/// Anchors for the path prefixes a manifest may use.
///
/// `~~~/` is relative to the output directory, `~~/` to the manifest's own
/// directory and `~` to the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub manifest_dir: PathBuf,
    pub output_dir: PathBuf,
    pub home: Option<PathBuf>,
}

impl PathContext {
    /// Anchors for a manifest file, with the home directory from `$HOME`.
    pub fn for_manifest(manifest: &Path, output_dir: &Path) -> Self {
        let manifest_dir = manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            manifest_dir,
            output_dir: output_dir.to_path_buf(),
            home: std::env::var_os("HOME").map(PathBuf::from),
        }
    }

    /// Expand a manifest path value.
    pub fn resolve(&self, value: &str) -> PathBuf {
        if let Some(rest) = value.strip_prefix("~~~/") {
            return self.output_dir.join(rest);
        }
        if let Some(rest) = value.strip_prefix("~~/") {
            return self.manifest_dir.join(rest);
        }
        if let (Some(rest), Some(home)) = (value.strip_prefix('~'), &self.home) {
            return home.join(rest.trim_start_matches('/'));
        }
        PathBuf::from(value)
    }
}

/// A parsed manifest file.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub path: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ImpError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            entries: Self::parse(&content)?,
        })
    }

    /// Parse every document of a manifest. Empty documents are skipped.
    pub fn parse(content: &str) -> Result<Vec<ManifestEntry>> {
        let mut entries = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = serde_yaml::Value::deserialize(document).map_err(invalid)?;
            if value.is_null() {
                continue;
            }
            entries.push(serde_yaml::from_value(value).map_err(invalid)?);
        }
        Ok(entries)
    }

    /// Build every configuration, failing on the first bad value.
    pub fn configurations(&self, output_dir: &Path) -> Result<Vec<Configuration>> {
        let paths = PathContext::for_manifest(&self.path, output_dir);
        self.entries
            .iter()
            .map(|entry| entry.to_configuration(&paths))
            .collect()
    }
}

fn invalid(e: serde_yaml::Error) -> ImpError {
    ImpError::Parse {
        message: format!("Invalid manifest: {}", e),
        help: Some("Check the manifest's YAML syntax and key names".to_string()),
    }
}

impl ManifestEntry {
    /// Normalize into a configuration, resolving paths against `paths`.
    pub fn to_configuration(&self, paths: &PathContext) -> Result<Configuration> {
        let resolve = |value: &Option<String>| value.as_deref().map(|v| paths.resolve(v));

        let mut config = Configuration {
            source_dir: resolve(&self.src),
            oval_source_dir: resolve(&self.src_oval),
            square_source_dir: resolve(&self.src_square),
            destination: resolve(&self.dst),
            replace_existing: self.out_package_replace,
            scale: self.scale.unwrap_or(0.0),
            catalog_folder_max_size: self.catalog_folder_max_size.unwrap_or(0),
            catalog_folder_tag: self.catalog_folder_tag.clone(),
            catalog_folder_provides_namespace: self.catalog_folder_namespace,
            masks_too: self.masks_too,
            files: self.files.clone(),
            out_manifest: resolve(&self.out_manifest),
            out_contact_sheet: resolve(&self.out_contact_sheet),
            ..Default::default()
        };

        if let Some(preset) = &self.preset {
            config.preset = preset.parse::<Preset>()?;
        }
        if let Some(format) = &self.out_format {
            config.output_format = format.parse::<ImageFormat>()?;
        }
        if let Some(package) = &self.out_package {
            config.output_package = package.parse::<PackageType>()?;
        }
        if let Some(colour) = &self.background_color {
            config.background_color = Some(colour.parse::<Colour>()?);
        }

        if let Some(max) = self.max_px {
            config.max_width = max;
            config.max_height = max;
        }
        if let Some(width) = self.max_width_px {
            config.max_width = width;
        }
        if let Some(height) = self.max_height_px {
            config.max_height = height;
        }

        if let Some(valid) = &self.valid_format {
            let selected: Vec<String> = valid
                .split(':')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            config.valid_extensions = expand_extensions(&selected);
        }

        Ok(config)
    }
}

/// An annotated manifest showing every key.
pub fn sample_manifest() -> String {
    let mut yaml = String::new();

    yaml.push_str("# imp manifest. Each YAML document is one configuration.\n");
    yaml.push_str("# Paths: ~~~/ is the output directory, ~~/ this file's directory, ~ home.\n");
    yaml.push('\n');

    yaml.push_str("# Sticker pack from a folder of large artwork\n");
    yaml.push_str("src: ~~/artwork\n");
    yaml.push_str("dst: ~~~/Stickers.stickerpack\n");
    yaml.push_str("# none, smallSticker, mediumSticker, largeSticker, thumb256, imageSet,\n");
    yaml.push_str("# stickerImageSet<N>, stickerImageFiles<N> (N: 1, 2, 3, 12, 13, 23, 123)\n");
    yaml.push_str("preset: smallSticker\n");
    yaml.push_str("# none, stickerpack, imageset, iconset, icns, catalog, catalogfolder\n");
    yaml.push_str("outPackage: stickerpack\n");
    yaml.push_str("outPackageReplace: true\n");
    yaml.push_str("validFormat: png:jpg\n");
    yaml.push_str("outContactSheet: ~~~/stickers-contact.png\n");
    yaml.push_str("---\n");

    yaml.push_str("# Size-budgeted catalog folder with masks\n");
    yaml.push_str("src: ~~/levels\n");
    yaml.push_str("dst: ~~~/Assets.xcassets/Levels\n");
    yaml.push_str("outPackage: catalogfolder\n");
    yaml.push_str("# unchanged, jpg, png, gif, tif\n");
    yaml.push_str("outFormat: jpg\n");
    yaml.push_str("maxPx: 1024\n");
    yaml.push_str("backgroundColor: 255:255:255\n");
    yaml.push_str("masksToo: true\n");
    yaml.push_str("catalogFolderMaxSize: 20000000\n");
    yaml.push_str("catalogFolderTag: levels\n");
    yaml.push_str("catalogFolderNamespace: true\n");
    yaml.push_str("outManifest: ~~~/levels.json\n");

    yaml
}
