//! Finding out what to work on.
//!
//! Manifests are read into [`Configuration`](crate::types::Configuration)
//! values, and each configuration's source groups are resolved to concrete
//! file lists.

mod collect;
mod manifest;

pub use collect::{collect_files, SourceFiles, SourceGroup, SourceUnit};
pub use manifest::{sample_manifest, Manifest, ManifestEntry, PathContext};
