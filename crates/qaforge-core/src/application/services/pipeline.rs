//! Generation Pipeline - one generation, stage by stage.
//!
//! ```text
//! load pack ─▶ resolve ─▶ render ─▶ assemble ─▶ archive
//!    10%         20%      20→60%     60→85%       90%
//! ```
//!
//! Stages run strictly in order on the calling thread. Any error stops the
//! run and is reported together with the stage it happened in.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    application::ports::Archiver,
    domain::{ArchiveSummary, Configuration, Context, FileMetadata, PackId, resolve},
    error::ForgeError,
};

use super::{assembler::ProjectAssembler, pack_registry::PackRegistry, render::RenderService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadPack,
    Resolve,
    Render,
    Assemble,
    Archive,
}

impl Stage {
    /// Wording used in the project's failure message.
    pub const fn activity(self) -> &'static str {
        match self {
            Self::LoadPack => "pack loading",
            Self::Resolve => "file resolution",
            Self::Render => "rendering",
            Self::Assemble => "assembly",
            Self::Archive => "archiving",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.activity())
    }
}

/// A pipeline failure tagged with its stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageError {
    pub stage: Stage,
    pub source: ForgeError,
}

impl StageError {
    /// Summary stored on the project record.
    pub fn summary(&self) -> String {
        format!("generation failed during {}", self.stage)
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary(), self.source)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub files: Vec<FileMetadata>,
    pub archive: ArchiveSummary,
}

pub struct GenerationPipeline {
    registry: Arc<PackRegistry>,
    renderer: RenderService,
    assembler: ProjectAssembler,
    archiver: Arc<dyn Archiver>,
}

/// Scale `done/total` into `[from, to]`.
fn span(from: u8, to: u8, done: usize, total: usize) -> u8 {
    if total == 0 {
        return to;
    }
    let width = usize::from(to - from);
    from + (width * done / total) as u8
}

impl GenerationPipeline {
    pub fn new(
        registry: Arc<PackRegistry>,
        renderer: RenderService,
        assembler: ProjectAssembler,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            registry,
            renderer,
            assembler,
            archiver,
        }
    }

    pub fn archive_extension(&self) -> &'static str {
        self.archiver.extension()
    }

    #[instrument(skip_all, fields(pack = %pack_id, root = %output_root.display()))]
    pub fn run(
        &self,
        pack_id: &PackId,
        config: &Configuration,
        output_root: &Path,
        archive_path: &Path,
        progress: &mut dyn FnMut(u8),
    ) -> Result<PipelineOutput, StageError> {
        let at = |stage: Stage| move |source: ForgeError| StageError { stage, source };

        let pack = self.registry.load(pack_id).map_err(at(Stage::LoadPack))?;
        progress(10);

        let context = Context::from_configuration(config);
        let included = resolve(&pack.manifest().files, &context);
        info!(
            included = included.len(),
            total = pack.manifest().files.len(),
            "Files resolved"
        );
        progress(20);

        let rendered = self
            .renderer
            .render_all(&pack, &included, &context, &mut |done, total| {
                progress(span(20, 60, done, total))
            })
            .map_err(at(Stage::Render))?;

        let files = self
            .assembler
            .assemble(&rendered, output_root, &mut |done, total| {
                progress(span(60, 85, done, total))
            })
            .map_err(at(Stage::Assemble))?;

        let archive = self
            .archiver
            .archive(output_root, &files, archive_path)
            .map_err(at(Stage::Archive))?;
        progress(90);

        info!(
            files = archive.file_entries,
            bytes = archive.compressed_size,
            "Archive written"
        );
        Ok(PipelineOutput { files, archive })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_scales_linearly() {
        assert_eq!(span(20, 60, 0, 4), 20);
        assert_eq!(span(20, 60, 1, 4), 30);
        assert_eq!(span(20, 60, 4, 4), 60);
        assert_eq!(span(60, 85, 0, 0), 85);
    }

    #[test]
    fn failure_summary_names_the_stage() {
        let err = StageError {
            stage: Stage::Render,
            source: ForgeError::Internal {
                message: "x".into(),
            },
        };
        assert_eq!(err.summary(), "generation failed during rendering");
    }
}
