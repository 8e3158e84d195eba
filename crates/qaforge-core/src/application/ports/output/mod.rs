//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the engine needs from external systems. The
//! `qaforge-adapters` crate provides implementations.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::{
    ArchiveSummary, Context, FileMetadata, FileMode, GeneratedProject, PackId, ProjectId,
    RelativePath,
};
use crate::error::ForgeResult;

/// Port for reading packs.
///
/// Implemented by:
/// - `qaforge_adapters::pack_source::DirectoryPackSource` (`<root>/<id>/manifest.json`)
/// - `qaforge_adapters::pack_source::InMemoryPackSource` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait PackSource: Send + Sync {
    /// Identifiers of every pack the source can serve, sorted.
    fn list(&self) -> ForgeResult<Vec<PackId>>;

    /// Raw `manifest.json` bytes. `TemplateNotFound` if the pack does not exist.
    fn read_manifest(&self, id: &PackId) -> ForgeResult<Vec<u8>>;

    /// Raw bytes of one pack file; `None` if the file is absent.
    fn read_file(&self, id: &PackId, path: &RelativePath) -> ForgeResult<Option<Vec<u8>>>;
}

/// Port for template expansion.
///
/// Implemented by:
/// - `qaforge_adapters::renderer::HandlebarsRenderer`
pub trait TemplateRenderer: Send + Sync {
    /// Expand `template` against `context`. `name` identifies the template
    /// in error messages. Any unresolvable expression is a `RenderError`.
    fn render_str(&self, name: &str, template: &str, context: &Context) -> ForgeResult<String>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `qaforge_adapters::filesystem::LocalFilesystem` (production)
/// - `qaforge_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()>;

    /// Write `content` to `root/relative`, creating parents. The resolved
    /// location must stay strictly inside `root`.
    fn write_file(
        &self,
        root: &Path,
        relative: &RelativePath,
        content: &[u8],
        mode: Option<FileMode>,
    ) -> ForgeResult<()>;

    /// Recursive listing of `root`, sorted by relative path.
    fn scan(&self, root: &Path) -> ForgeResult<Vec<FileMetadata>>;

    /// Open a file for streaming. `None` if it does not exist.
    fn open_read(&self, path: &Path) -> ForgeResult<Option<(Box<dyn Read + Send>, u64)>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents. Missing directories are not an error.
    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()>;

    /// Remove a file. Missing files are not an error.
    fn remove_file(&self, path: &Path) -> ForgeResult<()>;
}

/// Port for packaging an assembled tree.
///
/// Implemented by:
/// - `qaforge_adapters::archiver::ZipArchiver`
#[cfg_attr(test, mockall::automock)]
pub trait Archiver: Send + Sync {
    /// Write `entries` (in order) from `root` into a single archive at
    /// `destination`. Failures are `ArchiveError`.
    fn archive(
        &self,
        root: &Path,
        entries: &[FileMetadata],
        destination: &Path,
    ) -> ForgeResult<ArchiveSummary>;

    /// File extension of produced archives, without the dot.
    fn extension(&self) -> &'static str;
}

/// Port for project record storage.
///
/// Implemented by:
/// - `qaforge_adapters::project_store::InMemoryProjectStore`
/// - `qaforge_adapters::project_store::JsonFileProjectStore` (`records/<id>.json`)
pub trait ProjectStore: Send + Sync {
    fn insert(&self, project: GeneratedProject) -> ForgeResult<()>;

    fn get(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>>;

    /// Apply `change` atomically. If it fails, nothing is stored. Returns the
    /// updated record, or `None` if the id is unknown.
    fn update(
        &self,
        id: ProjectId,
        change: &mut dyn FnMut(&mut GeneratedProject) -> ForgeResult<()>,
    ) -> ForgeResult<Option<GeneratedProject>>;

    fn remove(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>>;

    fn list(&self) -> ForgeResult<Vec<GeneratedProject>>;
}

/// Port for the current time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
