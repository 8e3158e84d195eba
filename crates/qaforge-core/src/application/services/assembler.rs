//! Project Assembler - writes rendered files into an isolated root.
//!
//! Every path is sanitized and checked for duplicates before the first byte
//! is written, so a rejected file set leaves nothing behind.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::Filesystem,
    domain::{DomainError, FileMetadata, RelativePath},
    error::ForgeResult,
};

use super::render::RenderedFile;

pub struct ProjectAssembler {
    filesystem: Arc<dyn Filesystem>,
}

impl ProjectAssembler {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Write `files` under `output_root` and return the sorted listing.
    /// `progress(done, total)` is called after each written file.
    #[instrument(skip_all, fields(root = %output_root.display(), files = files.len()))]
    pub fn assemble(
        &self,
        files: &[RenderedFile],
        output_root: &Path,
        progress: &mut dyn FnMut(usize, usize),
    ) -> ForgeResult<Vec<FileMetadata>> {
        let mut seen = HashSet::with_capacity(files.len());
        let mut planned = Vec::with_capacity(files.len());
        for file in files {
            let path = RelativePath::sanitize(&file.path)?;
            if !seen.insert(path.clone()) {
                return Err(DomainError::DuplicatePath {
                    path: path.to_string(),
                }
                .into());
            }
            planned.push((path, file));
        }

        self.filesystem.create_dir_all(output_root)?;

        let total = planned.len();
        for (i, (path, file)) in planned.iter().enumerate() {
            self.filesystem
                .write_file(output_root, path, &file.content, file.mode)?;
            progress(i + 1, total);
        }

        let listing = self.filesystem.scan(output_root)?;
        info!(entries = listing.len(), "Project assembled");
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileKind, FileMode};
    use crate::error::ForgeError;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Minimal recording filesystem.
    #[derive(Default)]
    struct RecordingFs {
        files: Mutex<BTreeMap<String, usize>>,
    }

    impl Filesystem for RecordingFs {
        fn create_dir_all(&self, _path: &Path) -> ForgeResult<()> {
            Ok(())
        }
        fn write_file(
            &self,
            _root: &Path,
            relative: &RelativePath,
            content: &[u8],
            _mode: Option<FileMode>,
        ) -> ForgeResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(relative.to_string(), content.len());
            Ok(())
        }
        fn scan(&self, _root: &Path) -> ForgeResult<Vec<FileMetadata>> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .iter()
                .map(|(p, n)| FileMetadata::file(p.clone(), *n as u64))
                .collect())
        }
        fn open_read(
            &self,
            _path: &Path,
        ) -> ForgeResult<Option<(Box<dyn std::io::Read + Send>, u64)>> {
            Ok(None)
        }
        fn exists(&self, _path: &Path) -> bool {
            false
        }
        fn remove_dir_all(&self, _path: &Path) -> ForgeResult<()> {
            Ok(())
        }
        fn remove_file(&self, _path: &Path) -> ForgeResult<()> {
            Ok(())
        }
    }

    fn file(path: &str) -> RenderedFile {
        RenderedFile {
            path: path.into(),
            content: b"x".to_vec(),
            mode: None,
        }
    }

    #[test]
    fn traversal_rejected_before_any_write() {
        let fs = Arc::new(RecordingFs::default());
        let assembler = ProjectAssembler::new(fs.clone());

        let err = assembler
            .assemble(
                &[file("ok.txt"), file("../../evil.txt")],
                &PathBuf::from("/out"),
                &mut |_, _| {},
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ForgeError::Domain(DomainError::PathTraversalRejected { .. })
        ));
        assert!(fs.files.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicates_after_normalization_are_rejected() {
        let assembler = ProjectAssembler::new(Arc::new(RecordingFs::default()));
        let err = assembler
            .assemble(
                &[file("src/A.java"), file(r"src\.\A.java")],
                Path::new("/out"),
                &mut |_, _| {},
            )
            .unwrap_err();
        assert!(matches!(err, ForgeError::Domain(DomainError::DuplicatePath { .. })));
    }

    #[test]
    fn writes_normalized_paths_and_reports_progress() {
        let fs = Arc::new(RecordingFs::default());
        let assembler = ProjectAssembler::new(fs.clone());
        let mut ticks = Vec::new();

        let listing = assembler
            .assemble(
                &[file(r"src\main\App.java"), file("./README.md")],
                Path::new("/out"),
                &mut |done, total| ticks.push((done, total)),
            )
            .unwrap();

        assert_eq!(ticks, vec![(1, 2), (2, 2)]);
        assert_eq!(listing.len(), 2);
        assert!(listing.iter().all(|m| m.kind == FileKind::File));
        assert!(fs.files.lock().unwrap().contains_key("src/main/App.java"));
    }
}
