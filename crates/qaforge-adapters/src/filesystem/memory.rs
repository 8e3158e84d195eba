//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    io::{Cursor, Read},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use qaforge_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{FileMetadata, FileMode, RelativePath},
    error::ForgeResult,
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    modes: HashMap<PathBuf, FileMode>,
}

impl MemoryFilesystemInner {
    fn add_dir_with_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(ancestor.to_path_buf());
        }
    }

    fn remove_under(&mut self, path: &Path) {
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
        self.modes.retain(|p, _| !p.starts_with(path));
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// Place a file directly, bypassing root checks (testing helper).
    pub fn put_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.into();
            if let Some(parent) = path.parent() {
                inner.add_dir_with_parents(parent);
            }
            inner.files.insert(path, content.into());
        }
    }

    /// Mode a file was written with, if any.
    pub fn mode_of(&self, path: &Path) -> Option<FileMode> {
        self.inner.read().ok()?.modes.get(path).copied()
    }

    /// All file paths, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.add_dir_with_parents(path);
        Ok(())
    }

    fn write_file(
        &self,
        root: &Path,
        relative: &RelativePath,
        content: &[u8],
        mode: Option<FileMode>,
    ) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let target = root.join(relative.as_path());
        if let Some(parent) = target.parent() {
            inner.add_dir_with_parents(parent);
        }
        if let Some(mode) = mode {
            inner.modes.insert(target.clone(), mode);
        }
        inner.files.insert(target, content.to_vec());
        Ok(())
    }

    fn scan(&self, root: &Path) -> ForgeResult<Vec<FileMetadata>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let relative = |p: &Path| -> Option<String> {
            let rel = p.strip_prefix(root).ok()?;
            if rel.as_os_str().is_empty() {
                return None;
            }
            Some(
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
            )
        };

        let mut listing: Vec<FileMetadata> = inner
            .directories
            .iter()
            .filter_map(|d| relative(d).map(FileMetadata::directory))
            .chain(inner.files.iter().filter_map(|(p, content)| {
                relative(p).map(|r| FileMetadata::file(r, content.len() as u64))
            }))
            .collect();
        listing.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(listing)
    }

    fn open_read(&self, path: &Path) -> ForgeResult<Option<(Box<dyn Read + Send>, u64)>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.files.get(path).map(|content| {
            let size = content.len() as u64;
            (Box::new(Cursor::new(content.clone())) as Box<dyn Read + Send>, size)
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.remove_under(path);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.files.remove(path);
        inner.modes.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_lists_directories_and_files_below_root() {
        let fs = MemoryFilesystem::new();
        let root = Path::new("/work/projects/p1");
        let rel = RelativePath::sanitize("src/test/A.java").unwrap();

        fs.write_file(root, &rel, b"abc", Some(FileMode::REGULAR))
            .unwrap();
        fs.put_file("/work/projects/p1.zip", b"PK".to_vec());

        let listing = fs.scan(root).unwrap();
        let paths: Vec<_> = listing.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["src", "src/test", "src/test/A.java"]);
        assert_eq!(listing[2].size, Some(3));
        assert_eq!(
            fs.mode_of(&root.join("src/test/A.java")),
            Some(FileMode::REGULAR)
        );
    }

    #[test]
    fn remove_dir_all_drops_subtree_only() {
        let fs = MemoryFilesystem::new();
        fs.put_file("/w/a/x.txt", b"1".to_vec());
        fs.put_file("/w/b/y.txt", b"2".to_vec());

        fs.remove_dir_all(Path::new("/w/a")).unwrap();

        assert!(!fs.exists(Path::new("/w/a/x.txt")));
        assert!(!fs.exists(Path::new("/w/a")));
        assert!(fs.exists(Path::new("/w/b/y.txt")));
    }
}
