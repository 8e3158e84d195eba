//! Pack Registry - loads, validates and caches packs.
//!
//! Each pack is read from the [`PackSource`] at most once per cache
//! lifetime, even when several generations ask for it at the same moment.
//! Concurrent first loads of the *same* id wait for one loader; loads of
//! different ids proceed in parallel. Failed loads are not cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::PackSource},
    domain::{
        Configuration, Manifest, Pack, PackId, PackSelection, catalog, select_pack,
    },
    error::ForgeResult,
};

/// Per-id cache cell. `init` serializes the first load.
#[derive(Default)]
struct Slot {
    value: OnceLock<Arc<Pack>>,
    init: Mutex<()>,
}

/// Display data for one pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSummary {
    pub id: PackId,
    pub version: String,
    pub description: Option<String>,
    pub file_count: usize,
    /// Combinations mapped to this pack in the catalog, e.g. `selenium/java/junit5`.
    pub serves: Vec<String>,
}

pub struct PackRegistry {
    source: Arc<dyn PackSource>,
    strict_mapping: bool,
    cache: Mutex<HashMap<PackId, Arc<Slot>>>,
}

impl PackRegistry {
    pub fn new(source: Arc<dyn PackSource>) -> Self {
        Self {
            source,
            strict_mapping: false,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Reject unmapped combinations instead of using the fallback pack.
    pub fn with_strict_mapping(mut self, strict: bool) -> Self {
        self.strict_mapping = strict;
        self
    }

    /// Map the configuration to a pack id.
    pub fn resolve_pack_id(&self, config: &Configuration) -> ForgeResult<PackId> {
        match select_pack(&config.tool, &config.language, &config.test_runner) {
            PackSelection::Mapped(id) => Ok(id),
            PackSelection::Fallback { requested, .. } if self.strict_mapping => {
                Err(ApplicationError::UnsupportedCombination { requested }.into())
            }
            PackSelection::Fallback { requested, pack } => {
                warn!(%requested, fallback = %pack, "No dedicated pack, using fallback");
                Ok(pack)
            }
        }
    }

    /// Load a pack, reading it from the source only on first use.
    #[instrument(skip_all, fields(pack = %id))]
    pub fn load(&self, id: &PackId) -> ForgeResult<Arc<Pack>> {
        let slot = {
            let mut cache = self
                .cache
                .lock()
                .map_err(|_| ApplicationError::StoreLockError)?;
            Arc::clone(cache.entry(id.clone()).or_default())
        };

        if let Some(pack) = slot.value.get() {
            debug!("Pack cache hit");
            return Ok(Arc::clone(pack));
        }

        let _init = slot
            .init
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if let Some(pack) = slot.value.get() {
            return Ok(Arc::clone(pack));
        }

        let pack = Arc::new(self.read_pack(id)?);
        let _ = slot.value.set(Arc::clone(&pack));
        info!(
            version = %pack.manifest().version,
            files = pack.manifest().files.len(),
            "Pack loaded"
        );
        Ok(pack)
    }

    fn read_pack(&self, id: &PackId) -> ForgeResult<Pack> {
        let bytes = self.source.read_manifest(id)?;
        let manifest = Manifest::parse(id, &bytes)?;

        let mut contents = HashMap::with_capacity(manifest.files.len());
        for entry in &manifest.files {
            if let Some(bytes) = self.source.read_file(id, &entry.path)? {
                contents.insert(entry.path.clone(), bytes);
            }
        }

        Ok(Pack::new(manifest, contents)?)
    }

    /// Drop every cached pack.
    pub fn reload(&self) -> ForgeResult<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "Pack cache cleared");
        Ok(())
    }

    /// Identifiers available from the source.
    pub fn list_packs(&self) -> ForgeResult<Vec<PackId>> {
        self.source.list()
    }

    pub fn summary(&self, id: &PackId) -> ForgeResult<PackSummary> {
        let pack = self.load(id)?;
        let manifest = pack.manifest();
        let serves = catalog::PACK_REGISTRY
            .iter()
            .filter(|def| def.pack == id.as_str())
            .map(|def| def.key.to_string())
            .collect();

        Ok(PackSummary {
            id: id.clone(),
            version: manifest.version.to_string(),
            description: manifest.description.clone(),
            file_count: manifest.files.len(),
            serves,
        })
    }

    /// Number of packs currently held in the cache.
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .map(|cache| cache.values().filter(|s| s.value.get().is_some()).count())
            .unwrap_or(0)
    }
}
