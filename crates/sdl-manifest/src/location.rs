//! Locating `config.sdl` on disk.

use crate::ManifestError;
use std::path::{Path, PathBuf};

/// The manifest filename.
pub const MANIFEST_FILE: &str = "config.sdl";

/// Where a manifest lives and the project root it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    /// Path to the manifest file.
    pub manifest_path: PathBuf,

    /// Directory containing the manifest. Scripts run here.
    pub root: PathBuf,
}

impl ManifestLocation {
    /// Use an explicit manifest path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist.
    pub fn at(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let manifest_path = path.as_ref().to_path_buf();
        if !manifest_path.is_file() {
            return Err(ManifestError::NotFound(manifest_path));
        }
        let root = match manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            manifest_path,
            root,
        })
    }

    /// Find the nearest manifest by searching upward from `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if no manifest is found in the directory tree.
    pub fn find(start: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let mut current = start.as_ref().to_path_buf();

        loop {
            let manifest_path = current.join(MANIFEST_FILE);
            if manifest_path.is_file() {
                tracing::debug!(path = %manifest_path.display(), "found manifest");
                return Ok(Self {
                    manifest_path,
                    root: current,
                });
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(ManifestError::NotFound(start.as_ref().to_path_buf())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_manifest_in_parent() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "name \"x\"\n").unwrap();
        let nested = temp.path().join("src").join("components");
        std::fs::create_dir_all(&nested).unwrap();

        let location = ManifestLocation::find(&nested).unwrap();
        assert_eq!(location.root, temp.path());
        assert_eq!(location.manifest_path, temp.path().join(MANIFEST_FILE));
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = ManifestLocation::find(temp.path());
        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }

    #[test]
    fn explicit_path_uses_parent_as_root() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.sdl");
        std::fs::write(&path, "name \"x\"\n").unwrap();

        let location = ManifestLocation::at(&path).unwrap();
        assert_eq!(location.root, temp.path());
        assert!(ManifestLocation::at(temp.path().join("nope.sdl")).is_err());
    }
}
