//! Render Service - turns resolved manifest entries into output bytes.
//!
//! Templates get both their path and their content expanded; a trailing
//! `.hbs` is dropped from the rendered path. Static files are copied
//! byte-for-byte under their manifest path.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{Context, DomainError, FileEntry, FileMode, Pack},
    error::ForgeResult,
};

pub const TEMPLATE_SUFFIX: &str = ".hbs";

/// One file ready for assembly. `path` is not yet sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub content: Vec<u8>,
    pub mode: Option<FileMode>,
}

pub struct RenderService {
    renderer: Arc<dyn TemplateRenderer>,
}

impl RenderService {
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }

    pub fn render(&self, pack: &Pack, entry: &FileEntry, context: &Context) -> ForgeResult<RenderedFile> {
        let raw = pack.content(&entry.path).ok_or_else(|| {
            DomainError::ManifestInvalid {
                pack: pack.id().to_string(),
                reason: format!("no content for '{}'", entry.path),
            }
        })?;

        if !entry.is_template {
            return Ok(RenderedFile {
                path: entry.path.to_string(),
                content: raw.to_vec(),
                mode: entry.mode,
            });
        }

        let source = std::str::from_utf8(raw).map_err(|e| ApplicationError::RenderError {
            path: entry.path.to_string(),
            reason: format!("template is not valid UTF-8: {e}"),
        })?;

        let rendered_path = self.renderer.render_str(
            &format!("{} (path)", entry.path),
            entry.path.as_str(),
            context,
        )?;
        let path = rendered_path
            .strip_suffix(TEMPLATE_SUFFIX)
            .unwrap_or(&rendered_path)
            .to_string();

        let content = self
            .renderer
            .render_str(entry.path.as_str(), source, context)?;

        Ok(RenderedFile {
            path,
            content: content.into_bytes(),
            mode: entry.mode,
        })
    }

    /// Render every entry in order; the first failure aborts.
    /// `progress(done, total)` is called after each file.
    #[instrument(skip_all, fields(pack = %pack.id(), files = entries.len()))]
    pub fn render_all(
        &self,
        pack: &Pack,
        entries: &[&FileEntry],
        context: &Context,
        progress: &mut dyn FnMut(usize, usize),
    ) -> ForgeResult<Vec<RenderedFile>> {
        let total = entries.len();
        let mut rendered = Vec::with_capacity(total);
        for (i, entry) in entries.iter().enumerate() {
            let file = self.render(pack, entry, context)?;
            debug!(source = %entry.path, target = %file.path, "Rendered");
            rendered.push(file);
            progress(i + 1, total);
        }
        Ok(rendered)
    }
}
