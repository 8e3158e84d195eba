//! Local filesystem adapter using std::fs.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path};

use qaforge_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{DomainError, FileMetadata, FileMode, RelativePath},
    error::{ForgeError, ForgeResult},
};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }

    /// Create the parent directories of `relative` under `root` one level
    /// at a time. An existing symlink anywhere on the way is rejected before
    /// anything below it is created.
    fn create_parents(root: &Path, relative: &RelativePath) -> ForgeResult<()> {
        fs::create_dir_all(root).map_err(|e| map_io_error(root, e, "create directory"))?;

        let Some(parent) = relative.as_path().parent() else {
            return Ok(());
        };
        let mut current = root.to_path_buf();
        for component in parent.components() {
            current.push(component);
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(DomainError::PathTraversalRejected {
                        path: relative.to_string(),
                        reason: "a parent directory is a symbolic link",
                    }
                    .into());
                }
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(map_io_error(
                        &current,
                        io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
                        "create directory",
                    ));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    fs::create_dir(&current)
                        .map_err(|e| map_io_error(&current, e, "create directory"))?;
                }
                Err(e) => return Err(map_io_error(&current, e, "inspect path")),
            }
        }
        Ok(())
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(
        &self,
        root: &Path,
        relative: &RelativePath,
        content: &[u8],
        mode: Option<FileMode>,
    ) -> ForgeResult<()> {
        // RelativePath already has no `..`; this only re-checks the shape.
        if relative
            .as_path()
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(outside_root(relative));
        }

        Self::create_parents(root, relative)?;
        let target = root.join(relative.as_path());

        let is_symlink = fs::symlink_metadata(&target)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if is_symlink {
            return Err(DomainError::PathTraversalRejected {
                path: relative.to_string(),
                reason: "target is a symbolic link",
            }
            .into());
        }

        fs::write(&target, content).map_err(|e| map_io_error(&target, e, "write file"))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = mode {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode.bits()))
                    .map_err(|e| map_io_error(&target, e, "set permissions"))?;
            }
        }
        #[cfg(windows)]
        {
            // No mode bits on Windows
            let _ = mode;
        }

        Ok(())
    }

    fn scan(&self, root: &Path) -> ForgeResult<Vec<FileMetadata>> {
        let mut listing = Vec::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                map_io_error(&path, e.into(), "scan directory")
            })?;

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let file_type = entry.file_type();
            if file_type.is_dir() {
                listing.push(FileMetadata::directory(relative));
            } else if file_type.is_file() {
                let size = entry
                    .metadata()
                    .map(|m| m.len())
                    .map_err(|e| map_io_error(entry.path(), e.into(), "stat file"))?;
                listing.push(FileMetadata::file(relative, size));
            } else {
                warn!(path = %entry.path().display(), "Skipping non-regular entry");
            }
        }
        listing.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %root.display(), entries = listing.len(), "Scanned");
        Ok(listing)
    }

    fn open_read(&self, path: &Path) -> ForgeResult<Option<(Box<dyn Read + Send>, u64)>> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io_error(path, e, "open file")),
        };
        let size = file
            .metadata()
            .map_err(|e| map_io_error(path, e, "stat file"))?
            .len();
        Ok(Some((Box::new(io::BufReader::new(file)), size)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        match fs::remove_dir_all(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(map_io_error(path, e, "remove directory"))
            }
            _ => Ok(()),
        }
    }

    fn remove_file(&self, path: &Path) -> ForgeResult<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(map_io_error(path, e, "remove file"))
            }
            _ => Ok(()),
        }
    }
}

fn outside_root(relative: &RelativePath) -> ForgeError {
    DomainError::PathTraversalRejected {
        path: relative.to_string(),
        reason: "resolves outside the project root",
    }
    .into()
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ForgeError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaforge_core::domain::FileKind;
    use tempfile::TempDir;

    fn rel(s: &str) -> RelativePath {
        RelativePath::sanitize(s).unwrap()
    }

    #[test]
    fn write_creates_parents_and_scan_lists_sorted() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        fs.write_file(tmp.path(), &rel("src/test/java/LoginTest.java"), b"class", None)
            .unwrap();
        fs.write_file(tmp.path(), &rel("README.md"), b"# hi", None)
            .unwrap();

        let listing = fs.scan(tmp.path()).unwrap();
        let paths: Vec<_> = listing.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "README.md",
                "src",
                "src/test",
                "src/test/java",
                "src/test/java/LoginTest.java"
            ]
        );
        assert_eq!(listing[0].size, Some(4));
        assert_eq!(listing[1].kind, FileKind::Directory);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_escaping_root_is_rejected() {
        let outside = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

        let fs = LocalFilesystem::new();
        for path in ["link/evil.txt", "link/sub/deeper/evil.txt"] {
            let err = fs.write_file(root.path(), &rel(path), b"x", None).unwrap_err();
            assert!(matches!(
                err,
                ForgeError::Domain(DomainError::PathTraversalRejected { .. })
            ));
        }
        assert!(!outside.path().join("evil.txt").exists());
        assert!(!outside.path().join("sub").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_inside_root_is_rejected_too() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("real")).unwrap();
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("alias")).unwrap();

        let err = LocalFilesystem::new()
            .write_file(root.path(), &rel("alias/a/b.txt"), b"x", None)
            .unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Domain(DomainError::PathTraversalRejected { .. })
        ));
        assert!(!root.path().join("real/a").exists());
    }

    #[cfg(unix)]
    #[test]
    fn mode_is_applied() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        fs.write_file(tmp.path(), &rel("gradlew"), b"#!/bin/sh", Some(FileMode::EXECUTABLE))
            .unwrap();

        let mode = std::fs::metadata(tmp.path().join("gradlew"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn missing_targets_are_tolerated() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        assert!(fs.remove_dir_all(&tmp.path().join("nope")).is_ok());
        assert!(fs.remove_file(&tmp.path().join("nope.zip")).is_ok());
        assert!(fs.open_read(&tmp.path().join("nope.zip")).unwrap().is_none());
    }

    #[test]
    fn open_read_reports_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.zip");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let (mut reader, size) = LocalFilesystem::new().open_read(&path).unwrap().unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(size, 4);
        assert_eq!(buf, b"PK\x03\x04");
    }
}
