//! Transient file handling
//!
//! Raw and prepared images live only for one pipeline run. Removal
//! failures are logged, never propagated: a leftover file must not stop
//! the control loop.

use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};

/// Delete each file, ignoring ones that are already gone
pub fn remove_files<P: AsRef<Path>>(paths: &[P]) {
    for path in paths {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("could not delete {}: {err}", path.display()),
        }
    }
}

/// Delete every file below `dir`, keeping the directories
///
/// Returns the number of files deleted.
pub fn clean_directory(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("error while cleaning up {}: {err}", dir.display());
            return 0;
        }
    };

    let mut deleted = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            deleted += clean_directory(&path);
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted {}", path.display());
                deleted += 1;
            }
            Err(err) => warn!("could not delete {}: {err}", path.display()),
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_files_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("capture.jpg");
        fs::write(&present, b"x").unwrap();

        remove_files(&[present.clone(), dir.path().join("never-written.jpg")]);
        assert!(!present.exists());
    }

    #[test]
    fn test_clean_directory_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("capture.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old/img.jpg"), b"y").unwrap();

        assert_eq!(clean_directory(dir.path()), 2);
        assert!(dir.path().join("old").is_dir());
        assert_eq!(fs::read_dir(dir.path().join("old")).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clean_directory(&dir.path().join("absent")), 0);
    }
}
