//! On-disk index catalog
//!
//! The catalog is a directory holding one subdirectory per index
//! generation plus a HEAD file naming the currently published one.
//! Generations are never mutated once sealed; publication is a single
//! HEAD write, and superseded generations linger until reclaimed.
//!
//! Layout:
//!
//! ```text
//! <base_path>/
//!     HEAD                                    # name of the published generation
//!     0b06877c-5bca-41b4-a4b8-66f586d33bc5/   # one directory per generation
//!     6e7b32de-6d85-4f9c-8a7e-8c0b5f8f2f11/
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::CatalogError;

/// Name of the catalog file pointing at the published generation
pub const HEAD_FILE_NAME: &str = "HEAD";

/// HEAD file permissions
const HEAD_FILE_MODE: u32 = 0o600;

/// Generate a fresh generation name
pub fn new_generation_name() -> String {
    Uuid::new_v4().to_string()
}

/// Path of the HEAD file under the given base path
pub fn head_path(base_path: &Path) -> PathBuf {
    base_path.join(HEAD_FILE_NAME)
}

/// Read the name of the published generation from HEAD
pub fn read_head(base_path: &Path) -> Result<String, CatalogError> {
    let path = head_path(base_path);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CatalogError::HeadDoesNotExist),
        Err(e) => Err(CatalogError::Read { path, source: e }),
    }
}

/// Publish a generation by rewriting HEAD with its name
///
/// Open-truncate-write-close; callers decide whether a write is needed
/// at all, this function always writes.
pub fn write_head(base_path: &Path, name: &str) -> Result<(), CatalogError> {
    let path = head_path(base_path);
    let write = |path: &Path| -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(HEAD_FILE_MODE)
            .open(path)?;
        file.write_all(name.as_bytes())
    };
    write(&path).map_err(|e| CatalogError::Write { path, source: e })?;
    debug!(name, "HEAD updated");
    Ok(())
}

/// Reclaim every generation except the named one
///
/// Removes all entries of the base path other than HEAD and `keep`.
/// Any removal error surfaces immediately with the offending path.
pub fn remove_generations_except(base_path: &Path, keep: &str) -> Result<(), CatalogError> {
    let entries = fs::read_dir(base_path).map_err(|e| CatalogError::Read {
        path: base_path.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::Read {
            path: base_path.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        if name == HEAD_FILE_NAME || name.to_string_lossy() == keep {
            continue;
        }

        let path = entry.path();
        debug!(path = %path.display(), "reclaiming stale generation");
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| CatalogError::Reclaim { path, source: e })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_head_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_head(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::HeadDoesNotExist));
    }

    #[test]
    fn test_write_then_read_head() {
        let dir = tempdir().unwrap();
        write_head(dir.path(), "gen-1").unwrap();
        assert_eq!(read_head(dir.path()).unwrap(), "gen-1");

        // rewriting replaces the previous contents entirely
        write_head(dir.path(), "gen-2").unwrap();
        assert_eq!(read_head(dir.path()).unwrap(), "gen-2");
    }

    #[test]
    fn test_read_head_trims_whitespace() {
        let dir = tempdir().unwrap();
        fs::write(head_path(dir.path()), "gen-1\n").unwrap();
        assert_eq!(read_head(dir.path()).unwrap(), "gen-1");
    }

    #[test]
    fn test_generation_names_are_unique() {
        let a = new_generation_name();
        let b = new_generation_name();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_remove_generations_except_keeps_head_and_named() {
        let dir = tempdir().unwrap();
        write_head(dir.path(), "keep").unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        fs::create_dir(dir.path().join("stale-1")).unwrap();
        fs::create_dir(dir.path().join("stale-2")).unwrap();

        remove_generations_except(dir.path(), "keep").unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["HEAD".to_string(), "keep".to_string()]);
    }

    #[test]
    fn test_remove_generations_except_on_empty_catalog() {
        let dir = tempdir().unwrap();
        remove_generations_except(dir.path(), "anything").unwrap();
    }
}
