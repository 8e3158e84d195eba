//! In-memory project record store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use qaforge_core::{
    application::{ApplicationError, ports::ProjectStore},
    domain::{GeneratedProject, ProjectId},
    error::ForgeResult,
};

/// Thread-safe in-memory record store. Records die with the process.
#[derive(Clone, Default)]
pub struct InMemoryProjectStore {
    inner: Arc<RwLock<HashMap<ProjectId, GeneratedProject>>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn insert(&self, project: GeneratedProject) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(project.id(), project);
        Ok(())
    }

    fn get(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(&id).cloned())
    }

    fn update(
        &self,
        id: ProjectId,
        change: &mut dyn FnMut(&mut GeneratedProject) -> ForgeResult<()>,
    ) -> ForgeResult<Option<GeneratedProject>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let Some(current) = inner.get_mut(&id) else {
            return Ok(None);
        };
        // Work on a copy so a failed change leaves the record untouched.
        let mut next = current.clone();
        change(&mut next)?;
        *current = next.clone();
        Ok(Some(next))
    }

    fn remove(&self, id: ProjectId) -> ForgeResult<Option<GeneratedProject>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.remove(&id))
    }

    fn list(&self) -> ForgeResult<Vec<GeneratedProject>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.values().cloned().collect())
    }
}
