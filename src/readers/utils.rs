use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

const GEOTIFF_PATTERNS: [&str; 4] = ["*.tif", "*.tiff", "*.TIF", "*.TIFF"];

pub fn is_geotiff(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("tif") | Some("tiff")
    )
}

/// Lists the GeoTIFFs under `root`, sorted and without duplicates.
///
/// Only the top level is scanned unless `recursive` is set.
pub fn list_geotiffs(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    if recursive {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && is_geotiff(entry.path()) {
                files.insert(entry.into_path());
            }
        }
    } else {
        let Some(root_str) = root.to_str() else {
            warn!("Skipping non UTF-8 folder: {}", root.display());
            return Vec::new();
        };
        // Folder names like `scenes[2023]` must match literally.
        let escaped = PathBuf::from(glob::Pattern::escape(root_str));
        for pattern in GEOTIFF_PATTERNS {
            let full = escaped.join(pattern);
            let Some(full) = full.to_str() else {
                continue;
            };
            match glob::glob(full) {
                Ok(paths) => files.extend(paths.filter_map(|p| p.ok()).filter(|p| p.is_file())),
                Err(e) => warn!("Invalid glob pattern {}: {}", full, e),
            }
        }
    }

    files.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    #[test]
    fn test_is_geotiff() {
        assert!(is_geotiff(Path::new("a/b/scene.tif")));
        assert!(is_geotiff(Path::new("scene.TIFF")));
        assert!(!is_geotiff(Path::new("scene.png")));
        assert!(!is_geotiff(Path::new("tif")));
    }

    #[test]
    fn test_list_geotiffs() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("b_20230101.tif")).unwrap();
        File::create(dir.path().join("a_20230101.TIFF")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        File::create(dir.path().join("nested").join("c_20230101.tif")).unwrap();

        let flat = list_geotiffs(dir.path(), false);
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_20230101.TIFF", "b_20230101.tif"]);

        let deep = list_geotiffs(dir.path(), true);
        assert_eq!(deep.len(), 3);
        assert!(deep.iter().any(|p| p.ends_with("nested/c_20230101.tif")));
    }

    #[test]
    fn test_list_geotiffs_in_folder_with_glob_characters() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("scenes[2023]");
        fs::create_dir(&root).unwrap();
        File::create(root.join("x_20230101.tif")).unwrap();

        let flat = list_geotiffs(&root, false);
        assert_eq!(flat, vec![root.join("x_20230101.tif")]);
        assert_eq!(list_geotiffs(&root, true).len(), 1);
    }
}
