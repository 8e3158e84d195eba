//! Zip archiver.
//!
//! Output is reproducible: entries follow the listing order, every entry
//! carries the fixed DOS epoch timestamp (1980-01-01 00:00) and the same
//! compression settings, so identical trees give byte-identical archives.
//! The archive is written to `<destination>.part` and renamed into place.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use ::zip::{
    CompressionMethod, DateTime, ZipWriter,
    result::ZipError,
    write::SimpleFileOptions,
};
use tracing::{debug, instrument};

use qaforge_core::{
    application::{ApplicationError, ports::Archiver},
    domain::{ArchiveSummary, FileKind, FileMetadata},
    error::{ForgeError, ForgeResult},
};

/// Deflate-compressed zip writer.
#[derive(Debug, Clone, Copy)]
pub struct ZipArchiver {
    compression_level: i64,
}

impl ZipArchiver {
    pub const DEFAULT_LEVEL: i64 = 9;

    pub fn new() -> Self {
        Self {
            compression_level: Self::DEFAULT_LEVEL,
        }
    }

    fn options(&self, mode: u32) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level))
            .last_modified_time(DateTime::default())
            .unix_permissions(mode)
    }

    fn write_entries(
        &self,
        root: &Path,
        entries: &[FileMetadata],
        part: &Path,
    ) -> Result<(usize, usize), ArchiveFailure> {
        let file = File::create(part)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let (mut files, mut directories) = (0, 0);

        for entry in entries {
            match entry.kind {
                FileKind::Directory => {
                    zip.add_directory(format!("{}/", entry.path), self.options(0o755))?;
                    directories += 1;
                }
                FileKind::File => {
                    let source = root.join(&entry.path);
                    let mode = file_mode(&source)?;
                    zip.start_file(entry.path.as_str(), self.options(mode))?;
                    let mut reader = File::open(&source)?;
                    io::copy(&mut reader, &mut zip)?;
                    files += 1;
                }
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| ArchiveFailure::Io(e.into_error()))?
            .sync_all()?;
        Ok((files, directories))
    }
}

impl Default for ZipArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Archiver for ZipArchiver {
    #[instrument(skip(self, entries), fields(root = %root.display(), entries = entries.len()))]
    fn archive(
        &self,
        root: &Path,
        entries: &[FileMetadata],
        destination: &Path,
    ) -> ForgeResult<ArchiveSummary> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| archive_error(destination, e))?;
        }
        let part = part_path(destination);

        let (file_entries, directory_entries) = match self.write_entries(root, entries, &part) {
            Ok(counts) => counts,
            Err(e) => {
                let _ = fs::remove_file(&part);
                return Err(archive_error(destination, e));
            }
        };

        fs::rename(&part, destination).map_err(|e| {
            let _ = fs::remove_file(&part);
            archive_error(destination, e)
        })?;

        let compressed_size = fs::metadata(destination)
            .map_err(|e| archive_error(destination, e))?
            .len();
        debug!(compressed_size, file_entries, directory_entries, "Zip written");

        Ok(ArchiveSummary {
            path: destination.to_path_buf(),
            compressed_size,
            file_entries,
            directory_entries,
        })
    }

    fn extension(&self) -> &'static str {
        "zip"
    }
}

#[derive(Debug)]
enum ArchiveFailure {
    Io(io::Error),
    Zip(ZipError),
}

impl std::fmt::Display for ArchiveFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Zip(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for ArchiveFailure {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ZipError> for ArchiveFailure {
    fn from(e: ZipError) -> Self {
        Self::Zip(e)
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::metadata(path)?.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(path: &Path) -> io::Result<u32> {
    fs::metadata(path)?;
    Ok(qaforge_core::domain::FileMode::REGULAR.bits())
}

fn archive_error(path: &Path, e: impl std::fmt::Display) -> ForgeError {
    ApplicationError::ArchiveError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
    .into()
}
