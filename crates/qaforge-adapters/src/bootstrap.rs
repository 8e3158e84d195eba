//! Wiring of the production engine.
//!
//! Builds a [`LifecycleManager`] from the directory pack source, the
//! Handlebars renderer, the local filesystem, the zip archiver and either
//! the JSON-file or the in-memory record store.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use qaforge_core::{
    application::{
        GenerationPipeline, LifecycleManager, LifecycleSettings, PackRegistry, ProjectAssembler,
        RenderService,
        ports::{Filesystem, ProjectStore},
    },
    domain::DomainError,
    error::ForgeResult,
};

use crate::{
    archiver::ZipArchiver,
    clock::SystemClock,
    filesystem::LocalFilesystem,
    pack_source::DirectoryPackSource,
    project_store::{InMemoryProjectStore, JsonFileProjectStore},
    renderer::HandlebarsRenderer,
};

/// Engine knobs, usually the `[engine]` table of the CLI config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Root holding one directory per pack.
    pub packs_dir: PathBuf,
    /// Staging trees, archives and (if persisted) records live here.
    pub work_dir: PathBuf,
    /// Lifetime of a project after creation.
    pub ttl_hours: u64,
    /// How often the background sweeper runs.
    pub sweep_interval_secs: u64,
    /// Refuse unmapped combinations instead of using the fallback pack.
    pub strict_pack_mapping: bool,
    /// Keep records in `work_dir/records` so they outlive the process.
    pub persist_records: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            packs_dir: PathBuf::from("packs"),
            work_dir: std::env::temp_dir().join("qaforge"),
            ttl_hours: 24,
            sweep_interval_secs: 3600,
            strict_pack_mapping: false,
            persist_records: true,
        }
    }
}

impl EngineSettings {
    pub fn records_dir(&self) -> PathBuf {
        self.work_dir.join("records")
    }

    pub fn ttl(&self) -> ForgeResult<chrono::Duration> {
        let hours = i64::try_from(self.ttl_hours)
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| {
                DomainError::InvalidConfiguration(format!(
                    "engine.ttl_hours must be between 1 and {}, got {}",
                    i64::MAX,
                    self.ttl_hours
                ))
            })?;
        chrono::Duration::try_hours(hours).ok_or_else(|| {
            DomainError::InvalidConfiguration(format!("engine.ttl_hours too large: {hours}"))
                .into()
        })
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// A wired engine plus the pieces the CLI inspects directly.
pub struct Engine {
    pub manager: Arc<LifecycleManager>,
    pub registry: Arc<PackRegistry>,
    pub packs: Arc<DirectoryPackSource>,
    pub settings: EngineSettings,
}

#[instrument(skip_all, fields(packs = %settings.packs_dir.display(), work = %settings.work_dir.display()))]
pub fn build_engine(settings: EngineSettings) -> ForgeResult<Engine> {
    let filesystem: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
    filesystem.create_dir_all(&settings.work_dir.join("projects"))?;

    let store: Arc<dyn ProjectStore> = if settings.persist_records {
        Arc::new(JsonFileProjectStore::open(settings.records_dir())?)
    } else {
        Arc::new(InMemoryProjectStore::new())
    };

    let packs = Arc::new(DirectoryPackSource::new(settings.packs_dir.clone()));
    let registry = Arc::new(
        PackRegistry::new(packs.clone()).with_strict_mapping(settings.strict_pack_mapping),
    );

    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::clone(&registry),
        RenderService::new(Arc::new(HandlebarsRenderer::new())),
        ProjectAssembler::new(Arc::clone(&filesystem)),
        Arc::new(ZipArchiver::new()),
    ));

    let manager = Arc::new(LifecycleManager::new(
        Arc::clone(&registry),
        pipeline,
        store,
        filesystem,
        Arc::new(SystemClock),
        LifecycleSettings {
            work_dir: settings.work_dir.clone(),
            ttl: settings.ttl()?,
        },
    ));

    info!(persist = settings.persist_records, "Engine ready");
    Ok(Engine {
        manager,
        registry,
        packs,
        settings,
    })
}
