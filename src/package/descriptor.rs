//! `Contents.json` descriptor records.
//!
//! Each container directory carries one descriptor listing what it claims
//! to hold. Descriptors are read before every mutation and rewritten as
//! pretty JSON afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ImpError, Result};

/// File name of every descriptor.
pub const CONTENTS_FILE: &str = "Contents.json";

/// Load/save behaviour shared by all descriptor kinds.
pub trait Descriptor: Serialize + DeserializeOwned {
    /// Descriptor path inside a container directory.
    fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONTENTS_FILE)
    }

    fn exists_in(dir: &Path) -> bool {
        Self::path_in(dir).is_file()
    }

    /// Read the descriptor of the container at `dir`.
    fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        let content = fs::read_to_string(&path).map_err(|e| ImpError::Descriptor {
            path: path.clone(),
            message: format!("Failed to read: {}", e),
        })?;
        serde_json::from_str(&content).map_err(|e| ImpError::Descriptor {
            path,
            message: format!("Invalid JSON: {}", e),
        })
    }

    /// Write the descriptor into the container at `dir`.
    fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let json = serde_json::to_string_pretty(self).map_err(|e| ImpError::Descriptor {
            path: path.clone(),
            message: format!("Failed to serialize: {}", e),
        })?;
        fs::write(&path, json).map_err(|e| ImpError::Io {
            path,
            message: format!("Failed to write descriptor: {}", e),
        })
    }
}

/// Authoring metadata present in every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub version: u32,
    pub author: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            version: 1,
            author: "xcode".to_string(),
        }
    }
}

/// `.stickerpack` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerPackDescriptor {
    pub stickers: Vec<StickerEntry>,
    pub info: Info,
    pub properties: StickerPackProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerEntry {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerPackProperties {
    #[serde(rename = "grid-size")]
    pub grid_size: String,
}

impl Default for StickerPackProperties {
    fn default() -> Self {
        Self {
            grid_size: "regular".to_string(),
        }
    }
}

impl Descriptor for StickerPackDescriptor {}

impl StickerPackDescriptor {
    /// Append a sticker bundle unless it is already listed.
    pub fn add_sticker(&mut self, filename: &str) -> bool {
        if self.stickers.iter().any(|s| s.filename == filename) {
            return false;
        }
        self.stickers.push(StickerEntry {
            filename: filename.to_string(),
        });
        true
    }
}

/// `.sticker` bundle descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerDescriptor {
    pub info: Info,
    pub properties: StickerProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StickerProperties {
    pub filename: String,
}

impl Descriptor for StickerDescriptor {}

impl StickerDescriptor {
    pub fn for_file(filename: &str) -> Self {
        Self {
            info: Info::default(),
            properties: StickerProperties {
                filename: filename.to_string(),
            },
        }
    }
}

/// `.imageset`, `.appiconset` and `.stickersiconset` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSetDescriptor {
    pub images: Vec<ImageSetEntry>,
    pub info: Info,
}

/// One image slot. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSetEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idiom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl Descriptor for ImageSetDescriptor {}

impl ImageSetEntry {
    /// A universal entry for a produced file.
    pub fn universal(filename: &str, scale: &str) -> Self {
        Self {
            filename: Some(filename.to_string()),
            idiom: Some("universal".to_string()),
            scale: Some(scale.to_string()),
            ..Self::default()
        }
    }
}

/// Asset catalog descriptor.
///
/// The catalog root carries only `info`; folders inside a catalog also
/// carry `properties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CatalogRecord", into = "CatalogRecord")]
pub enum CatalogDescriptor {
    Root {
        info: Info,
    },
    Folder {
        info: Info,
        properties: FolderProperties,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderProperties {
    #[serde(rename = "provides-namespace", default)]
    pub provides_namespace: bool,
    #[serde(
        rename = "on-demand-resource-tags",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub on_demand_resource_tags: Vec<String>,
}

/// On-disk shape of [`CatalogDescriptor`].
#[derive(Serialize, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<FolderProperties>,
}

impl From<CatalogRecord> for CatalogDescriptor {
    fn from(record: CatalogRecord) -> Self {
        match record.properties {
            Some(properties) => CatalogDescriptor::Folder {
                info: record.info,
                properties,
            },
            None => CatalogDescriptor::Root { info: record.info },
        }
    }
}

impl From<CatalogDescriptor> for CatalogRecord {
    fn from(descriptor: CatalogDescriptor) -> Self {
        match descriptor {
            CatalogDescriptor::Root { info } => CatalogRecord {
                info,
                properties: None,
            },
            CatalogDescriptor::Folder { info, properties } => CatalogRecord {
                info,
                properties: Some(properties),
            },
        }
    }
}

impl Descriptor for CatalogDescriptor {}

impl CatalogDescriptor {
    pub fn root() -> Self {
        CatalogDescriptor::Root {
            info: Info::default(),
        }
    }

    pub fn folder(provides_namespace: bool, tag: Option<String>) -> Self {
        CatalogDescriptor::Folder {
            info: Info::default(),
            properties: FolderProperties {
                provides_namespace,
                on_demand_resource_tags: tag.into_iter().collect(),
            },
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, CatalogDescriptor::Folder { .. })
    }
}
