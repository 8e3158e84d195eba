//! Lifecycle Manager - the engine's single entry point.
//!
//! Owns the project records and drives each one through
//! `pending → generating → completed | failed`. Generation runs on Tokio's
//! blocking pool; callers poll [`LifecycleManager::get`]. Expired projects
//! are invisible to every read and are purged by [`LifecycleManager::sweep_expired`],
//! which [`LifecycleManager::spawn_sweeper`] runs on an interval.
//!
//! Layout under the work directory:
//!
//! ```text
//! projects/<id>/       staging tree
//! projects/<id>.zip    archive
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Clock, Filesystem, ProjectStore},
    },
    domain::{Configuration, FileMetadata, GeneratedProject, PackId, ProjectId, ProjectStatus},
    error::ForgeResult,
};

use super::{pack_registry::PackRegistry, pipeline::GenerationPipeline};

/// Engine settings the manager needs.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub work_dir: PathBuf,
    pub ttl: chrono::Duration,
}

/// An opened archive ready to stream.
pub struct Download {
    pub file_name: String,
    pub size: u64,
    pub reader: Box<dyn Read + Send>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

pub struct LifecycleManager {
    registry: Arc<PackRegistry>,
    pipeline: Arc<GenerationPipeline>,
    store: Arc<dyn ProjectStore>,
    filesystem: Arc<dyn Filesystem>,
    clock: Arc<dyn Clock>,
    settings: LifecycleSettings,
}

impl LifecycleManager {
    pub fn new(
        registry: Arc<PackRegistry>,
        pipeline: Arc<GenerationPipeline>,
        store: Arc<dyn ProjectStore>,
        filesystem: Arc<dyn Filesystem>,
        clock: Arc<dyn Clock>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            registry,
            pipeline,
            store,
            filesystem,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    pub fn project_dir(&self, id: ProjectId) -> PathBuf {
        self.settings.work_dir.join("projects").join(id.to_string())
    }

    pub fn archive_path(&self, id: ProjectId) -> PathBuf {
        self.settings
            .work_dir
            .join("projects")
            .join(format!("{id}.{}", self.pipeline.archive_extension()))
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Validate, create the `pending` record and start generation in the
    /// background. Returns the record as created.
    #[instrument(skip_all, fields(tool = %config.tool, language = %config.language))]
    pub async fn generate(self: &Arc<Self>, config: Configuration) -> ForgeResult<GeneratedProject> {
        let (project, _task) = self.submit(config)?;
        Ok(project)
    }

    /// Like [`generate`](Self::generate) but also hands back the background
    /// task. Must be called from within a Tokio runtime.
    pub fn submit(
        self: &Arc<Self>,
        config: Configuration,
    ) -> ForgeResult<(GeneratedProject, JoinHandle<()>)> {
        config.validate()?;
        let pack_id = self.registry.resolve_pack_id(&config)?;
        let project = GeneratedProject::new(config, pack_id, self.clock.now(), self.settings.ttl)?;
        self.store.insert(project.clone())?;

        let id = project.id();
        info!(project_id = %id, pack = %project.pack_id(), "Project accepted");

        let this = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || this.run_generation(id));
        Ok((project, task))
    }

    #[instrument(skip(self), fields(project_id = %id))]
    fn run_generation(&self, id: ProjectId) {
        let project = match self.store.update(id, &mut |p| Ok(p.start()?)) {
            Ok(Some(project)) => project,
            Ok(None) => {
                warn!("Project vanished before generation started");
                return;
            }
            Err(e) => {
                error!(error = %e, "Could not start generation");
                return;
            }
        };

        let dir = self.project_dir(id);
        let archive = self.archive_path(id);
        let pack_id: PackId = project.pack_id().clone();

        let mut report = |progress: u8| {
            if let Err(e) = self.store.update(id, &mut |p| {
                p.advance(progress);
                Ok(())
            }) {
                warn!(error = %e, progress, "Progress update failed");
            }
        };

        let outcome = self
            .pipeline
            .run(&pack_id, project.configuration(), &dir, &archive, &mut report);

        match outcome {
            Ok(output) => {
                let mut files = Some(output.files);
                let archive_path = output.archive.path.clone();
                let completed = self.store.update(id, &mut |p| {
                    Ok(p.complete(files.take().unwrap_or_default(), archive_path.clone())?)
                });
                match completed {
                    Ok(Some(_)) => info!(
                        files = output.archive.file_entries,
                        "Generation completed"
                    ),
                    Ok(None) => {
                        warn!("Project removed during generation, discarding output");
                        self.remove_outputs(id);
                    }
                    Err(e) => {
                        error!(error = %e, "Could not mark project completed");
                        self.mark_failed(id, "generation failed during completion");
                    }
                }
            }
            Err(stage_error) => {
                error!(stage = %stage_error.stage, error = %stage_error.source, "Generation failed");
                self.mark_failed(id, &stage_error.summary());
            }
        }
    }

    /// Record the failure and synchronously remove partial output.
    fn mark_failed(&self, id: ProjectId, summary: &str) {
        if let Err(e) = self.store.update(id, &mut |p| Ok(p.fail(summary)?)) {
            error!(project_id = %id, error = %e, "Could not mark project failed");
        }
        self.remove_outputs(id);
    }

    fn remove_outputs(&self, id: ProjectId) {
        let dir = self.project_dir(id);
        if let Err(e) = self.filesystem.remove_dir_all(&dir) {
            warn!(project_id = %id, error = %e, "Failed to remove project directory");
        }
        let archive = self.archive_path(id);
        if let Err(e) = self.filesystem.remove_file(&archive) {
            warn!(project_id = %id, error = %e, "Failed to remove archive");
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Live project. Unknown and expired ids are both `ProjectNotFound`.
    pub fn get(&self, id: ProjectId) -> ForgeResult<GeneratedProject> {
        match self.store.get(id)? {
            Some(project) if !project.is_expired(self.clock.now()) => Ok(project),
            _ => Err(not_found(id)),
        }
    }

    /// Open the archive of a completed project and count the download.
    #[instrument(skip(self), fields(project_id = %id))]
    pub fn download(&self, id: ProjectId) -> ForgeResult<Download> {
        let project = self.get(id)?;
        if project.status() != ProjectStatus::Completed {
            return Err(ApplicationError::NotReady {
                id: id.to_string(),
                status: project.status(),
            }
            .into());
        }
        let archive = project.archive().ok_or_else(|| not_found(id))?;

        let Some((reader, size)) = self.filesystem.open_read(archive)? else {
            warn!(archive = %archive.display(), "Archive vanished before download");
            return Err(not_found(id));
        };

        if self
            .store
            .update(id, &mut |p| {
                p.record_download();
                Ok(())
            })?
            .is_none()
        {
            return Err(not_found(id));
        }

        debug!(size, "Download started");
        Ok(Download {
            file_name: file_name_of(archive),
            size,
            reader,
        })
    }

    /// File listing of a live project; empty until completed.
    pub fn list_files(&self, id: ProjectId) -> ForgeResult<Vec<FileMetadata>> {
        Ok(self.get(id)?.files().to_vec())
    }

    /// Remove the record and its files, whatever the status. `false` if the
    /// id was unknown or already expired; an expired record is still purged.
    #[instrument(skip(self), fields(project_id = %id))]
    pub fn delete(&self, id: ProjectId) -> ForgeResult<bool> {
        let now = self.clock.now();
        let removed = self.store.remove(id)?;
        self.remove_outputs(id);
        let live = removed.is_some_and(|p| !p.is_expired(now));
        if live {
            info!("Project deleted");
        }
        Ok(live)
    }

    /// Every live project, oldest first.
    pub fn list_all(&self) -> ForgeResult<Vec<GeneratedProject>> {
        let now = self.clock.now();
        let mut live: Vec<_> = self
            .store
            .list()?
            .into_iter()
            .filter(|p| !p.is_expired(now))
            .collect();
        live.sort_by_key(|p| (p.created_at(), p.id()));
        Ok(live)
    }

    /// Purge expired projects. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn sweep_expired(&self) -> ForgeResult<usize> {
        let now = self.clock.now();
        let mut swept = 0;
        for project in self.store.list()? {
            if !project.is_expired(now) {
                continue;
            }
            if self.store.remove(project.id())?.is_some() {
                self.remove_outputs(project.id());
                swept += 1;
            }
        }
        if swept > 0 {
            info!(swept, "Expired projects removed");
        }
        Ok(swept)
    }

    /// Mark records left `pending`/`generating` by an earlier process as
    /// failed. Returns how many were recovered.
    pub fn recover_interrupted(&self) -> ForgeResult<usize> {
        let mut recovered = 0;
        for project in self.store.list()? {
            if project.status().is_terminal() {
                continue;
            }
            let updated = self.store.update(project.id(), &mut |p| {
                if p.status() == ProjectStatus::Pending {
                    p.start()?;
                }
                Ok(p.fail("generation interrupted")?)
            })?;
            if updated.is_some() {
                self.remove_outputs(project.id());
                recovered += 1;
            }
        }
        if recovered > 0 {
            warn!(recovered, "Interrupted generations marked failed");
        }
        Ok(recovered)
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `every`, starting now.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let this = Arc::clone(&self);
                match tokio::task::spawn_blocking(move || this.sweep_expired()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!(error = %e, "Expiry sweep failed"),
                    Err(e) => warn!(error = %e, "Expiry sweep task panicked"),
                }
            }
        })
    }
}

fn not_found(id: ProjectId) -> crate::error::ForgeError {
    ApplicationError::ProjectNotFound { id: id.to_string() }.into()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project.zip".to_string())
}
