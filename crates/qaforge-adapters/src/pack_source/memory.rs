//! In-memory pack source for tests and embedding.

use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
};

use qaforge_core::{
    application::{ApplicationError, ports::PackSource},
    domain::{PackId, RelativePath},
    error::ForgeResult,
};

#[derive(Debug, Default, Clone)]
struct StoredPack {
    manifest: Vec<u8>,
    files: HashMap<String, Vec<u8>>,
}

/// Pack source backed by maps. Manifests are stored raw, so invalid ones
/// surface at load time exactly like on disk.
#[derive(Debug, Default)]
pub struct InMemoryPackSource {
    packs: RwLock<BTreeMap<PackId, StoredPack>>,
}

impl InMemoryPackSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a pack.
    pub fn insert(&self, id: PackId, manifest: impl Into<Vec<u8>>, files: &[(&str, &[u8])]) {
        let pack = StoredPack {
            manifest: manifest.into(),
            files: files
                .iter()
                .map(|(path, content)| ((*path).to_string(), content.to_vec()))
                .collect(),
        };
        if let Ok(mut packs) = self.packs.write() {
            packs.insert(id, pack);
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_pack(self, id: PackId, manifest: impl Into<Vec<u8>>, files: &[(&str, &[u8])]) -> Self {
        self.insert(id, manifest, files);
        self
    }
}

impl PackSource for InMemoryPackSource {
    fn list(&self) -> ForgeResult<Vec<PackId>> {
        let packs = self
            .packs
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(packs.keys().cloned().collect())
    }

    fn read_manifest(&self, id: &PackId) -> ForgeResult<Vec<u8>> {
        let packs = self
            .packs
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        packs.get(id).map(|p| p.manifest.clone()).ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                pack: id.to_string(),
            }
            .into()
        })
    }

    fn read_file(&self, id: &PackId, path: &RelativePath) -> ForgeResult<Option<Vec<u8>>> {
        let packs = self
            .packs
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(packs
            .get(id)
            .and_then(|p| p.files.get(path.as_str()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_inserted_packs() {
        let id = PackId::new("demo").unwrap();
        let source = InMemoryPackSource::new().with_pack(
            id.clone(),
            r#"{"id":"demo"}"#,
            &[("README.md", b"# demo".as_slice())],
        );

        assert_eq!(source.list().unwrap(), vec![id.clone()]);
        assert_eq!(source.read_manifest(&id).unwrap(), br#"{"id":"demo"}"#);
        let readme = RelativePath::sanitize("README.md").unwrap();
        assert_eq!(source.read_file(&id, &readme).unwrap().unwrap(), b"# demo");
    }

    #[test]
    fn unknown_pack_is_not_found() {
        let source = InMemoryPackSource::new();
        assert!(source.read_manifest(&PackId::new("x").unwrap()).is_err());
    }
}
