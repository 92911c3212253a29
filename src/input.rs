//! Native folder input.
//!
//! Turns folder and file paths into [`ImageFile`]s. Folders are scanned
//! recursively and results are sorted by path so repeated runs see the same
//! order. Every file is read, images or not; the pipeline and the plate do
//! the image filtering themselves.

use std::path::{Path, PathBuf};

use crate::model::ImageFile;

/// Error reading an input path.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read folder {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0:?} is neither a file nor a folder")]
    NotFound(PathBuf),
}

/// Load every file below `folder`.
///
/// Relative paths start with the folder's own name, as a browser folder
/// picker reports them. Unreadable subfolders are skipped with a warning.
pub fn load_folder(folder: &Path) -> Result<Vec<ImageFile>, InputError> {
    let mut paths = Vec::new();
    scan_folder_recursive(folder, &mut paths)?;
    paths.sort();

    let root = folder.parent().unwrap_or(folder);
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_file(&path, root)?);
    }

    log::info!(
        "📂 Recursively scanned folder {:?}: found {} files",
        folder,
        files.len()
    );
    Ok(files)
}

/// Load a list of paths: files are read directly, folders are scanned.
pub fn load_paths(paths: &[PathBuf]) -> Result<Vec<ImageFile>, InputError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(load_folder(path)?);
        } else if path.is_file() {
            let root = path.parent().unwrap_or(path);
            files.push(read_file(path, root)?);
        } else {
            return Err(InputError::NotFound(path.clone()));
        }
    }
    Ok(files)
}

fn scan_folder_recursive(folder: &Path, paths: &mut Vec<PathBuf>) -> Result<(), InputError> {
    let entries = std::fs::read_dir(folder).map_err(|source| InputError::ReadDir {
        path: folder.to_path_buf(),
        source,
    })?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();

        if path.is_file() {
            paths.push(path);
        } else if path.is_dir() {
            if let Err(e) = scan_folder_recursive(&path, paths) {
                log::warn!("Failed to scan subdirectory {:?}: {}", path, e);
            }
        }
    }

    Ok(())
}

fn read_file(path: &Path, root: &Path) -> Result<ImageFile, InputError> {
    let data = std::fs::read(path).map_err(|source| InputError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    log::debug!("Read {:?} ({} bytes)", path, data.len());
    Ok(ImageFile::from_bytes(name, data).with_relative_path(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_tree(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("smartsort-input-{}-{}", tag, std::process::id()));
        let photos = root.join("photos");
        std::fs::create_dir_all(photos.join("nested")).unwrap();
        std::fs::write(photos.join("b.png"), [2u8]).unwrap();
        std::fs::write(photos.join("a.jpg"), [1u8]).unwrap();
        std::fs::write(photos.join("notes.txt"), b"hi").unwrap();
        std::fs::write(photos.join("nested").join("c.gif"), [3u8]).unwrap();
        root
    }

    #[test]
    fn test_load_folder_sorted_with_relative_paths() {
        let root = temp_tree("sorted");
        let files = load_folder(&root.join("photos")).unwrap();

        let paths: Vec<_> = files.iter().filter_map(|f| f.relative_path()).collect();
        assert_eq!(
            paths,
            vec!["photos/a.jpg", "photos/b.png", "photos/nested/c.gif", "photos/notes.txt"]
        );
        assert_eq!(files[0].name(), "a.jpg");
        assert_eq!(files[0].data(), &[1u8]);
        assert_eq!(files[2].mime(), "image/gif");
        assert!(!files[3].is_image());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_load_paths_mixes_files_and_folders() {
        let root = temp_tree("mixed");
        let photos = root.join("photos");
        let files = load_paths(&[photos.join("a.jpg"), photos.join("nested")]).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a.jpg", "c.gif"]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let missing = std::env::temp_dir().join("smartsort-definitely-missing");
        assert!(matches!(
            load_paths(&[missing]),
            Err(InputError::NotFound(_))
        ));
    }
}
