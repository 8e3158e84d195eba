//! Directory-backed pack source.
//!
//! # Directory layout expected
//!
//! ```text
//! packs/
//! ├── selenium-java-junit5/
//! │   ├── manifest.json        ← manifest (required)
//! │   └── files/
//! │       ├── pom.xml.hbs
//! │       └── src/test/java/{{packagePath}}/BaseTest.java.hbs
//! └── playwright-typescript/
//!     ├── manifest.json
//!     └── files/
//!         └── ...
//! ```
//!
//! Manifest paths are relative to the pack's `files/` directory. The pack's
//! directory name is its identifier and must equal the manifest `id`.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use qaforge_core::{
    application::{ApplicationError, ports::PackSource},
    domain::{DomainError, Manifest, PackId, RelativePath},
    error::ForgeResult,
};

use crate::filesystem::map_io_error;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const FILES_DIR: &str = "files";

/// Reads packs from `<root>/<id>/`.
#[derive(Debug, Clone)]
pub struct DirectoryPackSource {
    root: PathBuf,
}

impl DirectoryPackSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pack_dir(&self, id: &PackId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Files present under the pack's `files/` directory that the manifest
    /// does not list. These are never emitted.
    pub fn unlisted_files(&self, manifest: &Manifest) -> ForgeResult<Vec<String>> {
        let files_dir = self.pack_dir(&manifest.id).join(FILES_DIR);
        if !files_dir.is_dir() {
            return Ok(Vec::new());
        }

        let listed: HashSet<&str> = manifest.files.iter().map(|f| f.path.as_str()).collect();
        let mut unlisted = Vec::new();
        for entry in WalkDir::new(&files_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| map_io_error(&files_dir, e.into(), "walk pack"))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&files_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !listed.contains(relative.as_str()) {
                unlisted.push(relative);
            }
        }
        Ok(unlisted)
    }
}

impl PackSource for DirectoryPackSource {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn list(&self) -> ForgeResult<Vec<PackId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Packs directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(map_io_error(&self.root, e, "read packs directory")),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| map_io_error(&self.root, e, "read packs directory"))?;
            let path = entry.path();
            if !path.join(MANIFEST_FILE).is_file() {
                debug!(dir = %path.display(), "No manifest, skipping");
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match PackId::new(name) {
                Ok(id) => ids.push(id),
                Err(e) => warn!(dir = %path.display(), error = %e, "Skipping pack with invalid name"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_manifest(&self, id: &PackId) -> ForgeResult<Vec<u8>> {
        let dir = self.pack_dir(id);
        if !dir.is_dir() {
            return Err(ApplicationError::TemplateNotFound {
                pack: id.to_string(),
            }
            .into());
        }

        let path = dir.join(MANIFEST_FILE);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DomainError::ManifestInvalid {
                pack: id.to_string(),
                reason: format!("missing {MANIFEST_FILE}"),
            }
            .into()),
            Err(e) => Err(map_io_error(&path, e, "read manifest")),
        }
    }

    fn read_file(&self, id: &PackId, path: &RelativePath) -> ForgeResult<Option<Vec<u8>>> {
        let full = self.pack_dir(id).join(FILES_DIR).join(path.as_path());
        if full.is_dir() {
            return Ok(None);
        }
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(&full, e, "read pack file")),
        }
    }
}
