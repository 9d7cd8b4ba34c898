//! Source file collection.
//!
//! Lists the images a configuration works on: one general group, or a
//! paired oval/square group where each oval image has a square partner at
//! the same position.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{ImpError, Result};
use crate::types::Configuration;

/// The three source groups a configuration can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceGroup {
    General,
    Oval,
    Square,
}

impl SourceGroup {
    pub const ALL: [SourceGroup; 3] = [SourceGroup::General, SourceGroup::Oval, SourceGroup::Square];

    pub fn name(&self) -> &'static str {
        match self {
            SourceGroup::General => "src",
            SourceGroup::Oval => "srcOval",
            SourceGroup::Square => "srcSquare",
        }
    }

    /// The configured location for this group.
    pub fn location<'a>(&self, config: &'a Configuration) -> Option<&'a Path> {
        match self {
            SourceGroup::General => config.source_dir.as_deref(),
            SourceGroup::Oval => config.oval_source_dir.as_deref(),
            SourceGroup::Square => config.square_source_dir.as_deref(),
        }
    }
}

/// One logical input: a single image, or an oval/square pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUnit {
    Single(PathBuf),
    Pair { oval: PathBuf, square: PathBuf },
}

impl SourceUnit {
    /// The image used for everything except non-square icon slots.
    pub fn primary(&self) -> &Path {
        match self {
            SourceUnit::Single(path) => path,
            SourceUnit::Pair { square, .. } => square,
        }
    }

    pub fn oval(&self) -> Option<&Path> {
        match self {
            SourceUnit::Single(_) => None,
            SourceUnit::Pair { oval, .. } => Some(oval),
        }
    }
}

/// Resolved absolute file lists for every group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFiles {
    pub general: Vec<PathBuf>,
    pub oval: Vec<PathBuf>,
    pub square: Vec<PathBuf>,
}

impl SourceFiles {
    fn group_mut(&mut self, group: SourceGroup) -> &mut Vec<PathBuf> {
        match group {
            SourceGroup::General => &mut self.general,
            SourceGroup::Oval => &mut self.oval,
            SourceGroup::Square => &mut self.square,
        }
    }

    /// Whether the oval/square pairing drives processing.
    pub fn is_paired(&self) -> bool {
        !self.oval.is_empty() && self.oval.len() == self.square.len()
    }

    /// Source units in processing order.
    pub fn units(&self) -> Vec<SourceUnit> {
        if self.is_paired() {
            self.oval
                .iter()
                .zip(&self.square)
                .map(|(oval, square)| SourceUnit::Pair {
                    oval: oval.clone(),
                    square: square.clone(),
                })
                .collect()
        } else {
            self.general.iter().cloned().map(SourceUnit::Single).collect()
        }
    }
}

/// Collect every configured group.
pub fn collect_files(config: &Configuration) -> Result<SourceFiles> {
    let mut files = SourceFiles::default();

    for group in SourceGroup::ALL {
        let Some(location) = group.location(config) else {
            continue;
        };
        let explicit: &[String] = match group {
            SourceGroup::General => &config.files,
            _ => &[],
        };
        *files.group_mut(group) = collect_group(config, group, location, explicit)?;
    }

    if config.oval_source_dir.is_some()
        && config.square_source_dir.is_some()
        && files.oval.len() != files.square.len()
    {
        return Err(ImpError::Collection {
            message: format!(
                "srcOval has {} image(s) but srcSquare has {}",
                files.oval.len(),
                files.square.len()
            ),
            help: Some("Oval and square images are paired by sorted position".to_string()),
        });
    }

    Ok(files)
}

fn collect_group(
    config: &Configuration,
    group: SourceGroup,
    location: &Path,
    explicit: &[String],
) -> Result<Vec<PathBuf>> {
    if !location.exists() {
        return Err(ImpError::Collection {
            message: format!("Src does not exist. [{}]", location.display()),
            help: Some(format!("Check the {} path in the manifest", group.name())),
        });
    }

    let location = fs::canonicalize(location).map_err(|e| ImpError::Io {
        path: location.to_path_buf(),
        message: format!("Failed to resolve source: {}", e),
    })?;

    // a single file stands for a directory holding just that file
    let (dir, found) = if location.is_dir() {
        (location.clone(), list_directory(&location))
    } else {
        let name = location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = location.parent().map(Path::to_path_buf).unwrap_or_default();
        (dir, vec![name])
    };

    let found: Vec<String> = found
        .into_iter()
        .filter(|name| config.accepts_extension(name))
        .collect();

    if explicit.is_empty() {
        return Ok(found.iter().map(|name| dir.join(name)).collect());
    }

    let missing: Vec<&str> = explicit
        .iter()
        .filter(|name| !found.contains(name))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(ImpError::Collection {
            message: "Src is missing files listed in manifest.".to_string(),
            help: Some(format!("Not found in {}: {}", dir.display(), missing.join(", "))),
        });
    }

    Ok(explicit.iter().map(|name| dir.join(name)).collect())
}

/// File names directly inside `dir`, sorted.
fn list_directory(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"x").unwrap();
        }
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_collect_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["b.png", "a.jpg", "notes.txt", "c.tiff"]);
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let config = Configuration {
            source_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let files = collect_files(&config).unwrap();

        assert_eq!(names(&files.general), vec!["a.jpg", "b.png", "c.tiff"]);
        assert!(files.general.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_collect_single_file_source() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["icon.png", "other.png"]);

        let config = Configuration {
            source_dir: Some(dir.path().join("icon.png")),
            ..Default::default()
        };
        let files = collect_files(&config).unwrap();

        assert_eq!(names(&files.general), vec!["icon.png"]);
    }

    #[test]
    fn test_collect_explicit_list_keeps_order() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.png", "b.png", "c.png"]);

        let config = Configuration {
            source_dir: Some(dir.path().to_path_buf()),
            files: vec!["c.png".to_string(), "a.png".to_string()],
            ..Default::default()
        };
        let files = collect_files(&config).unwrap();

        assert_eq!(names(&files.general), vec!["c.png", "a.png"]);
    }

    #[test]
    fn test_collect_explicit_list_missing_file() {
        let dir = tempdir().unwrap();
        touch(dir.path(), &["a.png"]);

        let config = Configuration {
            source_dir: Some(dir.path().to_path_buf()),
            files: vec!["a.png".to_string(), "gone.png".to_string()],
            ..Default::default()
        };
        let result = collect_files(&config);

        assert!(matches!(result, Err(ImpError::Collection { .. })));
    }

    #[test]
    fn test_collect_missing_directory() {
        let config = Configuration {
            source_dir: Some(PathBuf::from("/nonexistent/imp/src")),
            ..Default::default()
        };
        assert!(matches!(
            collect_files(&config),
            Err(ImpError::Collection { .. })
        ));
    }

    #[test]
    fn test_collect_pairs() {
        let dir = tempdir().unwrap();
        let oval = dir.path().join("oval");
        let square = dir.path().join("square");
        fs::create_dir_all(&oval).unwrap();
        fs::create_dir_all(&square).unwrap();
        touch(&oval, &["1.png", "2.png"]);
        touch(&square, &["1.png", "2.png"]);

        let config = Configuration {
            oval_source_dir: Some(oval),
            square_source_dir: Some(square),
            ..Default::default()
        };
        let files = collect_files(&config).unwrap();
        let units = files.units();

        assert!(files.is_paired());
        assert_eq!(units.len(), 2);
        assert!(units[0].oval().unwrap().ends_with("oval/1.png"));
        assert!(units[0].primary().ends_with("square/1.png"));
    }

    #[test]
    fn test_collect_pair_length_mismatch() {
        let dir = tempdir().unwrap();
        let oval = dir.path().join("oval");
        let square = dir.path().join("square");
        fs::create_dir_all(&oval).unwrap();
        fs::create_dir_all(&square).unwrap();
        touch(&oval, &["1.png", "2.png"]);
        touch(&square, &["1.png"]);

        let config = Configuration {
            oval_source_dir: Some(oval),
            square_source_dir: Some(square),
            ..Default::default()
        };
        assert!(matches!(
            collect_files(&config),
            Err(ImpError::Collection { .. })
        ));
    }

    #[test]
    fn test_units_general() {
        let files = SourceFiles {
            general: vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")],
            ..Default::default()
        };
        assert_eq!(
            files.units(),
            vec![
                SourceUnit::Single(PathBuf::from("/a.png")),
                SourceUnit::Single(PathBuf::from("/b.png"))
            ]
        );
    }
}
